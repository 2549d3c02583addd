
use std::sync::Arc;

use rowflow_core::{BreakpointListener, DebugSession, FieldCondition, ObservationMode, ObservationSpec};
use test_support::{engine, observer, pipeline, rows, value_meta, RecordingListener};

#[test]
fn active_spec_count_follows_mode_rules() {
    let mut session = DebugSession::new(pipeline(&["a", "b", "c", "d", "e"]));
    session.register("a", ObservationSpec::preview(0));
    session.register("b", ObservationSpec::breakpoint(5, FieldCondition::empty()));
    session.register("c", ObservationSpec::breakpoint(0, FieldCondition::parse("value > 1").unwrap()));
    session.register("d", ObservationSpec::preview(10));
    session.register("e", ObservationSpec::disabled());
    assert_eq!(session.len(), 5);
    assert_eq!(session.active_spec_count(), 2);
}

#[test]
fn total_hits_sums_every_spec() {
    let (_engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["two", "zero", "five"]));
    session.register("two", ObservationSpec::preview(1));
    session.register("zero", ObservationSpec::preview(5));
    session.register("five", ObservationSpec::breakpoint(3, FieldCondition::parse("value > 0").unwrap()));
    let session = Arc::new(session);
    let meta = value_meta();

    let feed = |step: &str, n: usize| {
        let obs = observer(&session, step, &dyn_engine);
        for r in rows(&vec![1; n]) {
            obs.observe(&meta, &r).unwrap();
        }
    };
    feed("two", 3);
    feed("zero", 1);
    feed("five", 5);

    let counts: Vec<u64> = session.all_specs().map(|s| s.hit_count()).collect();
    assert_eq!(counts, vec![2, 0, 5]);
    assert_eq!(session.total_hits(), 7);
}

#[test]
fn specs_keep_registration_order_and_unknown_steps_are_empty() {
    let mut session = DebugSession::new(pipeline(&["z", "a", "m"]));
    session.register("z", ObservationSpec::preview(1));
    session.register("a", ObservationSpec::disabled());
    session.register("m", ObservationSpec::preview(2));
    let order: Vec<&str> = session.entries().map(|(s, _)| s.as_str()).collect();
    assert_eq!(order, vec!["z", "a", "m"]);
    assert!(session.get("nope").is_none());

    let replaced = session.register("a", ObservationSpec::preview(4));
    assert_eq!(replaced.map(|s| s.mode()), Some(ObservationMode::Disabled));
    assert_eq!(session.len(), 3);
    assert_eq!(session.get("a").unwrap().capacity(), 4);
}

#[test]
fn listeners_register_and_unregister_by_identity() {
    let mut session = DebugSession::new(pipeline(&["a", "b"]));
    session.register("a", ObservationSpec::preview(1));
    session.register("b", ObservationSpec::preview(1));

    let first: Arc<dyn BreakpointListener> = Arc::new(RecordingListener::default());
    let second: Arc<dyn BreakpointListener> = Arc::new(RecordingListener::default());
    assert!(!session.register_listener("missing", Arc::clone(&first)));
    assert!(session.register_listener("a", Arc::clone(&first)));
    session.add_listener_to_all(Arc::clone(&second));
    assert_eq!(session.get("a").unwrap().listener_count(), 2);
    assert_eq!(session.get("b").unwrap().listener_count(), 1);

    assert!(session.unregister_listener("a", &first));
    assert!(!session.unregister_listener("a", &first));
    assert!(!session.unregister_listener("missing", &second));
    assert_eq!(session.get("a").unwrap().listener_count(), 1);
}

#[test]
fn listeners_fire_in_registration_order() {
    let (_engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["a"]));
    session.register("a", ObservationSpec::breakpoint(1, FieldCondition::parse("value = 7").unwrap()));
    let session = Arc::new(session);

    struct Tagged(&'static str, Arc<std::sync::Mutex<Vec<&'static str>>>);
    impl BreakpointListener for Tagged {
        fn break_point_hit(&self, _s: &DebugSession, _h: &rowflow_core::BreakpointHit<'_>) {
            self.1.lock().unwrap().push(self.0);
        }
    }
    let log = Arc::new(std::sync::Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        session.register_listener("a", Arc::new(Tagged(tag, Arc::clone(&log))));
    }

    observer(&session, "a", &dyn_engine).observe(&value_meta(), &rows(&[7])[0]).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "third"]);
}
