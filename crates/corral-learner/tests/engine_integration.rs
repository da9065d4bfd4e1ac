//! Integration tests against the packaged native engine.
//!
//! These tests need a real engine module on the search path (see
//! `corral_learner::loader`). Hosts without one skip every test gracefully
//! instead of failing, so the suite can run in environments where the
//! engine is not packaged.

use corral_learner::{create, create_from_args, engine_available};

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Probe for the packaged engine, logging the skip once per test.
fn engine_ready(test: &str) -> bool {
    init_logging();
    if engine_available() {
        return true;
    }
    eprintln!("skipping {test}: no packaged engine module on this host");
    false
}

#[test]
fn test_create_and_close() {
    if !engine_ready("test_create_and_close") {
        return;
    }
    let mut learner = create("--quiet").unwrap().into_scalar().unwrap();
    assert!(learner.is_open());
    learner.close().unwrap();
    learner.close().unwrap();
    assert!(!learner.is_open());
}

#[test]
fn test_create_two_learners() {
    if !engine_ready("test_create_two_learners") {
        return;
    }
    let mut outer = create("--quiet --adaptive --invariant --l2 0.0001")
        .unwrap()
        .into_scalar()
        .unwrap();
    let mut inner = create("--quiet --l1 0.0001").unwrap().into_scalar().unwrap();
    outer.learn("1 |yo yo").unwrap();
    inner.learn("2 |yo yo yay").unwrap();
    inner.close().unwrap();
    outer.close().unwrap();
}

#[test]
fn test_independent_instances_converge_to_their_own_labels() {
    if !engine_ready("test_independent_instances_converge_to_their_own_labels") {
        return;
    }
    let train = |label: f32| {
        let mut learner = create("--quiet").unwrap().into_scalar().unwrap();
        let example = format!("{label} |f const");
        for _ in 0..1000 {
            learner.learn(&example).unwrap();
        }
        learner.predict("|f const").unwrap()
    };

    let handle_a = std::thread::spawn(move || train(1.0));
    let handle_b = std::thread::spawn(move || train(2.0));
    let prediction_a = handle_a.join().unwrap();
    let prediction_b = handle_b.join().unwrap();

    assert!(
        (prediction_a - 1.0).abs() < 0.2,
        "instance A drifted: {prediction_a}"
    );
    assert!(
        (prediction_b - 2.0).abs() < 0.2,
        "instance B drifted: {prediction_b}"
    );
}

#[test]
fn test_saved_model_round_trip() {
    if !engine_ready("test_saved_model_round_trip") {
        return;
    }
    let model_dir = tempfile::tempdir().unwrap();
    let model_path = model_dir.path().join("round-trip.model");

    let expected = {
        let mut learner = create("--quiet").unwrap().into_scalar().unwrap();
        for _ in 0..100 {
            learner.learn("1 |f price:0.23 sqft:0.25").unwrap();
        }
        learner.save_model(&model_path).unwrap();
        let prediction = learner.predict("|f price:0.23 sqft:0.25").unwrap();
        learner.close().unwrap();
        prediction
    };

    // Argument-vector form keeps the path intact even with whitespace in it.
    let mut reloaded = create_from_args([
        "corral",
        "--quiet",
        "--testonly",
        "-i",
        model_path.to_str().unwrap(),
    ])
    .unwrap()
    .into_scalar()
    .unwrap();
    let prediction = reloaded.predict("|f price:0.23 sqft:0.25").unwrap();
    reloaded.close().unwrap();

    assert!(
        (prediction - expected).abs() < 1e-6,
        "reloaded model diverged: {prediction} vs {expected}"
    );
}

#[test]
fn test_unknown_output_type_does_not_leak() {
    if !engine_ready("test_unknown_output_type_does_not_leak") {
        return;
    }
    // A configuration selecting a reduction this runtime has no variant for
    // must fail cleanly; repeated attempts would exhaust native memory if
    // the orphaned resource were not closed.
    for _ in 0..50 {
        match create("--quiet --unrecognized_output_reduction") {
            Err(_) => {}
            Ok(mut learner) => {
                // Engine builds without that reduction just reject or ignore
                // the flag; either way nothing must leak.
                learner.close().unwrap();
            }
        }
    }
}
