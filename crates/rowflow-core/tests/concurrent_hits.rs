
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rowflow_core::{DebugSession, FieldCondition, ObservationInjector, ObservationSpec, PipelineEngine};
use test_support::{engine, observer, pipeline, rows, value_meta, RecordingListener};

#[test]
fn parallel_copies_both_hitting_are_counted_twice() {
    let (engine, dyn_engine) = engine();
    let handles = engine.define_step("calc", 2);
    let mut session = DebugSession::new(pipeline(&["calc"]));
    session.register("calc", ObservationSpec::breakpoint(4, FieldCondition::parse("value > 10").unwrap()));
    let session = Arc::new(session);
    let recorder = Arc::new(RecordingListener::default());
    session.register_listener("calc", recorder.clone());

    let injector = ObservationInjector::new(dyn_engine);
    assert_eq!(injector.activate(&session), 2);

    let barrier = Arc::new(Barrier::new(2));
    let runners: Vec<_> = handles.into_iter()
                                 .map(|handle| {
                                     let engine = Arc::clone(&engine);
                                     let barrier = Arc::clone(&barrier);
                                     thread::spawn(move || {
                                         barrier.wait();
                                         engine.run_copy(&handle, value_meta(), rows(&[50]))
                                     })
                                 })
                                 .collect();

    // Una copia puede quedar frenada por la pausa que pidió la otra: se
    // reanuda hasta que ambas terminen.
    let spec = Arc::clone(session.get("calc").unwrap());
    while spec.hit_count() < 2 {
        if engine.signal().wait_for_pause(Duration::from_millis(50)) && spec.hit_count() < 2 {
            engine.resume_running();
        }
    }
    engine.resume_running();
    for r in runners {
        assert_eq!(r.join().unwrap().unwrap().rows(), 1);
    }

    assert_eq!(spec.hit_count(), 2);
    let mut numbers = recorder.hit_numbers();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2]);
    assert_eq!(spec.buffer_len(), 2);
    assert!(engine.signal().pause_requests() >= 2);
}

#[test]
fn concurrent_observers_never_lose_hits() {
    const THREADS: usize = 8;
    const ROWS: usize = 200;
    const CAPACITY: i64 = 16;

    let (_engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["calc"]));
    session.register("calc", ObservationSpec::breakpoint(CAPACITY, FieldCondition::parse("value >= 0").unwrap()));
    let session = Arc::new(session);
    let recorder = Arc::new(RecordingListener::default());
    session.register_listener("calc", recorder.clone());
    let meta = value_meta();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let obs = observer(&session, "calc", &dyn_engine);
            let meta = Arc::clone(&meta);
            scope.spawn(move || {
                for r in rows(&vec![t as i64; ROWS]) {
                    obs.observe(&meta, &r).unwrap();
                }
            });
        }
    });

    let spec = session.get("calc").unwrap();
    let expected = (THREADS * ROWS) as u64;
    assert_eq!(spec.hit_count(), expected);
    assert_eq!(session.total_hits(), expected);
    assert_eq!(recorder.len(), THREADS * ROWS);
    let mut numbers = recorder.hit_numbers();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=expected).collect::<Vec<_>>());
    assert_eq!(spec.buffer_len(), CAPACITY as usize);
}

#[test]
fn per_thread_order_survives_interleaving() {
    const ROWS: usize = 50;

    let (_engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["calc"]));
    // capacidad suficiente para todas las filas de ambos hilos
    session.register("calc", ObservationSpec::breakpoint(1000, FieldCondition::parse("value < 0").unwrap()));
    let session = Arc::new(session);
    let meta = value_meta();

    thread::scope(|scope| {
        for t in 0..2i64 {
            let obs = observer(&session, "calc", &dyn_engine);
            let meta = Arc::clone(&meta);
            scope.spawn(move || {
                // `value` identifica al hilo, `id` el orden de emisión
                for r in rows(&vec![t; ROWS]) {
                    obs.observe(&meta, &r).unwrap();
                }
            });
        }
    });

    let buffer = session.get("calc").unwrap().buffer();
    assert_eq!(buffer.len(), 2 * ROWS);
    for t in 0..2i64 {
        let seq: Vec<i64> = buffer.iter()
                                  .filter(|r| r.values[1].as_i64() == Some(t))
                                  .map(|r| r.values[0].as_i64().unwrap())
                                  .collect();
        // más reciente primero dentro de cada hilo
        let expected: Vec<i64> = (1..=ROWS as i64).rev().collect();
        assert_eq!(seq, expected);
    }
}

#[test]
fn redundant_pause_requests_leave_state_untouched() {
    let (engine, dyn_engine) = engine();
    let mut session = DebugSession::new(pipeline(&["calc"]));
    session.register("calc", ObservationSpec::breakpoint(2, FieldCondition::parse("value > 10").unwrap()));
    let session = Arc::new(session);
    let recorder = Arc::new(RecordingListener::default());
    session.register_listener("calc", recorder.clone());
    let injector = ObservationInjector::new(Arc::clone(&dyn_engine));

    observer(&session, "calc", &dyn_engine).observe(&value_meta(), &rows(&[20])[0]).unwrap();
    let spec = session.get("calc").unwrap();
    let before = spec.buffer();

    injector.coordinator().request_pause();
    injector.coordinator().request_pause();

    assert!(dyn_engine.is_paused());
    assert_eq!(engine.signal().pause_requests(), 3);
    assert_eq!(spec.hit_count(), 1);
    assert_eq!(recorder.len(), 1);
    assert_eq!(spec.buffer(), before);
}
