
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rowflow_core::engine::CopyOutcome;
use rowflow_core::{DebugSession, Observation, ObservationInjector, ObservationSpec, PipelineEngine};
use test_support::{engine, ids, observer, pipeline, rows, value_meta, RecordingListener};

#[test]
fn preview_captures_first_rows_then_pauses_once() {
    let (engine, dyn_engine) = engine();
    let handle = engine.define_step("read", 1).remove(0);

    let mut session = DebugSession::new(pipeline(&["read"]));
    session.register("read", ObservationSpec::preview(3));
    let session = Arc::new(session);
    let recorder = Arc::new(RecordingListener::default());
    assert!(session.register_listener("read", recorder.clone()));

    let injector = ObservationInjector::new(dyn_engine);
    assert_eq!(injector.activate(&session), 1);

    let runner = {
        let engine = Arc::clone(&engine);
        let handle = handle.clone();
        thread::spawn(move || engine.run_copy(&handle, value_meta(), rows(&[10, 20, 30, 40, 50])))
    };

    assert!(engine.signal().wait_for_pause(Duration::from_secs(5)), "R4 should pause the pipeline");
    let spec = session.get("read").unwrap();
    assert_eq!(ids(&spec.buffer()), vec![1, 2, 3]);
    assert_eq!(engine.signal().pause_requests(), 1);
    assert_eq!(spec.hit_count(), 1);
    assert_eq!(recorder.hit_numbers(), vec![1]);
    assert_eq!(spec.buffer_meta().unwrap().index_of("value"), Some(1));

    engine.stop();
    let outcome = runner.join().unwrap().unwrap();
    assert_eq!(outcome, CopyOutcome::Stopped { rows: 4 });
    assert_eq!(ids(&spec.buffer()), vec![1, 2, 3], "R5 must not change the buffer");
    assert_eq!(injector.deactivate(&session), 1);
}

#[test]
fn full_preview_buffer_keeps_its_rows_on_further_hits() {
    let (_engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["read"]));
    session.register("read", ObservationSpec::preview(2));
    let session = Arc::new(session);
    let obs = observer(&session, "read", &dyn_engine);
    let meta = value_meta();

    let outcomes: Vec<Observation> = rows(&[1, 2, 3, 4]).iter().map(|r| obs.observe(&meta, r).unwrap()).collect();
    assert_eq!(outcomes,
               vec![Observation::Captured, Observation::Captured, Observation::Hit(1), Observation::Hit(2)]);
    assert_eq!(ids(&session.get("read").unwrap().buffer()), vec![1, 2]);
    assert!(dyn_engine.is_paused());
}

#[test]
fn preview_without_capacity_and_disabled_specs_are_inert() {
    let (engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["a", "b"]));
    session.register("a", ObservationSpec::preview(0));
    session.register("b", ObservationSpec::disabled());
    let session = Arc::new(session);
    let meta = value_meta();

    for step in ["a", "b"] {
        let obs = observer(&session, step, &dyn_engine);
        for r in rows(&[1, 2, 3]) {
            assert_eq!(obs.observe(&meta, &r).unwrap(), Observation::Ignored);
        }
        let spec = session.get(step).unwrap();
        assert!(spec.buffer().is_empty());
        assert!(spec.buffer_meta().is_none());
    }
    assert_eq!(session.total_hits(), 0);
    assert_eq!(engine.signal().pause_requests(), 0);
}
