use std::thread;
use std::time::{Duration, Instant};

use attitude_fusion::{AttitudeEngine, CancelToken, EngineSettings, IngestError, Sample};
use nalgebra::{UnitQuaternion, Vector3};

const DT: f32 = 1.0 / 60.0;
const EPSILON: f32 = 1e-5;

fn still_sample(timestamp: Instant) -> Sample {
    Sample::new(
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::zeros(),
        Some(24.0),
        timestamp,
    )
}

fn no_calibration() -> EngineSettings {
    EngineSettings {
        calibration_duration: Duration::ZERO,
        ..Default::default()
    }
}

/// The unit-norm invariant holds through sustained, aggressive motion.
#[test]
fn test_quaternion_norm_preserved_through_motion() {
    let engine = AttitudeEngine::new(no_calibration());
    let start = Instant::now();

    for i in 0..500u64 {
        let t = i as f32 * DT;
        let gyro = Vector3::new(
            180.0 * (t * 3.0).sin(),
            -240.0 * (t * 1.7).cos(),
            300.0 * (t * 0.9).sin(),
        );
        let accel = Vector3::new(0.3 * t.sin(), -0.2 * t.cos(), 1.0);
        let sample = Sample::new(accel, gyro, None, start + Duration::from_millis(i * 16));
        engine.ingest(sample, None).unwrap();
        engine.tick(DT);

        let q = engine.snapshot().quaternion;
        assert!((q.as_ref().norm() - 1.0).abs() < EPSILON);
        assert!(q.as_ref().coords.iter().all(|c| c.is_finite()));
    }
}

/// Integrating with dt = 0 (or a negative interval) leaves orientation
/// untouched.
#[test]
fn test_zero_and_negative_dt_are_noops() {
    let engine = AttitudeEngine::new(no_calibration());
    let start = Instant::now();
    let spinning = Sample::new(
        Vector3::new(0.0, 0.0, 1.0),
        Vector3::new(90.0, 45.0, -30.0),
        None,
        start,
    );
    engine.ingest(spinning, None).unwrap();

    engine.tick(0.0);
    assert_eq!(engine.snapshot().quaternion, UnitQuaternion::identity());
    engine.tick(-DT);
    assert_eq!(engine.snapshot().quaternion, UnitQuaternion::identity());
}

/// With gyro held at the bias and accel at (0,0,1) g, identity is a fixed
/// point regardless of gain.
#[test]
fn test_identity_fixed_point_for_any_gain() {
    for gain in [0.1, 1.0, 3.0, 50.0] {
        let settings = EngineSettings {
            gain,
            ..no_calibration()
        };
        let engine = AttitudeEngine::new(settings);
        engine.ingest(still_sample(Instant::now()), None).unwrap();
        for _ in 0..120 {
            engine.tick(DT);
        }
        let q = engine.snapshot().quaternion;
        assert!(q.angle() < 1e-4, "gain {gain} moved orientation");
    }
}

/// One aligned, at-rest tick with unit gain leaves orientation exactly
/// unchanged: the correction error is zero when the estimate already agrees
/// with gravity.
#[test]
fn test_single_aligned_tick_is_neutral() {
    let engine = AttitudeEngine::new(no_calibration());
    engine.ingest(still_sample(Instant::now()), None).unwrap();
    engine.tick(DT);
    assert_eq!(engine.snapshot().quaternion, UnitQuaternion::identity());
}

/// Two identical gyro samples during the startup window calibrate the bias
/// to exactly that reading; the next sample is then fully explained by it.
#[test]
fn test_startup_calibration_scenario() {
    let start = Instant::now();
    let engine = AttitudeEngine::new_at(EngineSettings::default(), start);
    let reading = Vector3::new(1.0, 0.0, 0.0);

    for i in 0..2u64 {
        let sample = Sample::new(
            Vector3::new(0.0, 0.0, 1.0),
            reading,
            None,
            start + Duration::from_millis(i * 50),
        );
        engine.ingest(sample, None).unwrap();
    }
    assert_eq!(engine.snapshot().bias_dps, reading);

    let late = Sample::new(
        Vector3::new(0.0, 0.0, 1.0),
        reading,
        None,
        start + Duration::from_secs(3),
    );
    engine.ingest(late, None).unwrap();
    let snapshot = engine.snapshot();
    let corrected = snapshot.latest_raw.unwrap().gyro_dps - snapshot.bias_dps;
    assert!(corrected.norm() < EPSILON);
}

/// While the body is moving, repeated ingests never change the bias.
#[test]
fn test_bias_frozen_during_motion() {
    let start = Instant::now();
    let engine = AttitudeEngine::new_at(no_calibration(), start);

    // Establish a nonzero bias by resting with a small constant offset.
    let offset = Vector3::new(0.4, -0.3, 0.2);
    for i in 0..200u64 {
        let sample = Sample::new(
            Vector3::new(0.0, 0.0, 1.0),
            offset,
            None,
            start + Duration::from_millis(i * 10),
        );
        engine.ingest(sample, None).unwrap();
    }
    let settled = engine.snapshot().bias_dps;
    assert!(settled.norm() > 0.0);

    // Fast rotation and off-norm accel: stationarity fails both ways.
    for i in 0..200u64 {
        let sample = Sample::new(
            Vector3::new(0.8, 0.3, 1.4),
            Vector3::new(120.0, -60.0, 90.0),
            None,
            start + Duration::from_millis(2000 + i * 10),
        );
        engine.ingest(sample, None).unwrap();
    }
    assert_eq!(engine.snapshot().bias_dps, settled);
}

/// Capacity 3, temperatures [10, 11, 12, 13]: the oldest entry is evicted
/// and order is preserved.
#[test]
fn test_history_eviction_scenario() {
    let settings = EngineSettings {
        history_capacity: 3,
        history_window: None,
        ..no_calibration()
    };
    let engine = AttitudeEngine::new(settings);
    let start = Instant::now();
    for (i, temp) in [10.0, 11.0, 12.0, 13.0].into_iter().enumerate() {
        let sample = Sample::new(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::zeros(),
            Some(temp),
            start + Duration::from_millis(i as u64 * 100),
        );
        engine.ingest(sample, None).unwrap();
    }
    let temps: Vec<f32> = engine
        .snapshot()
        .temp_history_raw
        .into_iter()
        .map(|(_, t)| t)
        .collect();
    assert_eq!(temps, vec![11.0, 12.0, 13.0]);
}

/// The raw and averaged streams keep independent temperature histories.
#[test]
fn test_averaged_stream_tracked_separately() {
    let engine = AttitudeEngine::new(no_calibration());
    let start = Instant::now();
    for i in 0..5u64 {
        let ts = start + Duration::from_millis(i * 100);
        let raw = Sample::new(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::zeros(),
            Some(20.0 + i as f32),
            ts,
        );
        // The averaged stream only reports temperature on every other event.
        let averaged = (i % 2 == 0).then(|| {
            Sample::new(
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::zeros(),
                Some(19.5 + i as f32),
                ts,
            )
        });
        engine.ingest(raw, averaged).unwrap();
    }
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.temp_history_raw.len(), 5);
    assert_eq!(snapshot.temp_history_averaged.len(), 3);
    assert!(snapshot.latest_averaged.is_some());
}

/// A malformed sample is rejected whole: no history append, no bias change,
/// no latest-reading update.
#[test]
fn test_invalid_sample_fails_fast() {
    let engine = AttitudeEngine::new(no_calibration());
    let mut bad = still_sample(Instant::now());
    bad.gyro_dps.x = f32::NAN;
    assert_eq!(
        engine.ingest(bad, None),
        Err(IngestError::InvalidSample { field: "gyro" })
    );
    let snapshot = engine.snapshot();
    assert!(snapshot.latest_raw.is_none());
    assert!(snapshot.temp_history_raw.is_empty());
    assert_eq!(snapshot.bias_dps, Vector3::zeros());
}

/// The estimate converges to the accelerometer's gravity direction when the
/// body rests tilted.
#[test]
fn test_tilt_convergence() {
    let engine = AttitudeEngine::new(no_calibration());
    let start = Instant::now();
    let tilted = Sample::new(Vector3::new(1.0, 0.0, 0.0), Vector3::zeros(), None, start);
    engine.ingest(tilted, None).unwrap();
    for _ in 0..600 {
        engine.tick(DT);
    }
    let snapshot = engine.snapshot();
    let up_body = snapshot
        .rotation
        .inverse_transform_vector(&Vector3::z());
    assert!((up_body - Vector3::new(1.0, 0.0, 0.0)).norm() < 0.02);
}

/// Producer, integration clock, and a consumer run concurrently; snapshots
/// stay well-formed and cancellation winds everything down within one loop
/// iteration.
#[test]
fn test_concurrent_ingest_integrate_snapshot() {
    let settings = EngineSettings {
        calibration_duration: Duration::from_millis(50),
        ..Default::default()
    };
    let engine = AttitudeEngine::new(settings);
    let token = CancelToken::new();

    let integrator = engine
        .spawn_integrator(token.clone())
        .expect("spawn integrator thread");

    let producer_engine = engine.clone();
    let producer_token = token.clone();
    let producer = thread::spawn(move || {
        let start = Instant::now();
        let mut i = 0u64;
        while !producer_token.is_cancelled() {
            let sample = Sample::new(
                Vector3::new(0.0, 0.0, 1.0),
                Vector3::new(0.2, -0.1, 0.05),
                Some(24.0 + (i as f32) * 0.01),
                start + Duration::from_millis(i),
            );
            producer_engine
                .ingest(sample, Some(sample))
                .expect("finite sample");
            i += 1;
            thread::sleep(Duration::from_millis(1));
        }
    });

    for _ in 0..20 {
        let snapshot = engine.snapshot();
        let q = snapshot.quaternion;
        assert!((q.as_ref().norm() - 1.0).abs() < EPSILON);
        assert!(snapshot.temp_history_raw.len() <= engine.settings().history_capacity);
        thread::sleep(Duration::from_millis(5));
    }

    token.cancel();
    producer.join().expect("producer exits cleanly");
    integrator.join().expect("integrator exits cleanly");

    // Post-shutdown state is still readable and coherent.
    let snapshot = engine.snapshot();
    assert!(snapshot.latest_raw.is_some());
}
