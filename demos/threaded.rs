//! Full producer / integrator / consumer topology with a synthetic sensor.
//!
//! A producer thread feeds noisy samples at 10 Hz (still for the first
//! three seconds, then a slow spin about Z), the integration clock runs at
//! its own 60 Hz, and the main thread plays display consumer at 2 Hz.

use std::thread;
use std::time::{Duration, Instant};

use attitude_fusion::{AttitudeEngine, CancelToken, EngineSettings, Sample};
use nalgebra::Vector3;
use rand::prelude::*;
use rand_pcg::Pcg64;

fn main() {
    tracing_subscriber::fmt().init();

    let engine = AttitudeEngine::new(EngineSettings::default());
    let token = CancelToken::new();

    let integrator = engine
        .spawn_integrator(token.clone())
        .expect("spawn integrator thread");

    let producer_engine = engine.clone();
    let producer_token = token.clone();
    let producer = thread::spawn(move || {
        let mut rng = Pcg64::seed_from_u64(7);
        let start = Instant::now();
        while !producer_token.is_cancelled() {
            let elapsed = start.elapsed().as_secs_f32();
            let spin = if elapsed > 3.0 {
                Vector3::new(0.0, 0.0, 30.0)
            } else {
                Vector3::zeros()
            };
            let gyro = spin
                + Vector3::new(
                    rng.random_range(-0.3..0.3),
                    rng.random_range(-0.3..0.3),
                    rng.random_range(-0.3..0.3),
                );
            let accel = Vector3::new(
                rng.random_range(-0.01..0.01),
                rng.random_range(-0.01..0.01),
                1.0 + rng.random_range(-0.01..0.01),
            );
            let temp = 24.0 + 0.05 * elapsed + rng.random_range(-0.05..0.05);

            let sample = Sample::new(accel, gyro, Some(temp), Instant::now());
            producer_engine
                .ingest(sample, None)
                .expect("finite sample");
            thread::sleep(Duration::from_millis(100));
        }
    });

    for _ in 0..16 {
        thread::sleep(Duration::from_millis(500));
        let snapshot = engine.snapshot();
        let (roll, pitch, yaw) = snapshot.euler_degrees();
        let temp = snapshot
            .temp_history_raw
            .last()
            .map(|&(_, t)| format!("{t:5.2} C"))
            .unwrap_or_else(|| "n/a".into());
        println!(
            "roll {roll:7.2}  pitch {pitch:7.2}  yaw {yaw:7.2}  bias ({:5.2}, {:5.2}, {:5.2})  temp {temp}  points {}",
            snapshot.bias_dps.x,
            snapshot.bias_dps.y,
            snapshot.bias_dps.z,
            snapshot.temp_history_raw.len(),
        );
    }

    token.cancel();
    producer.join().expect("producer exits cleanly");
    integrator.join().expect("integrator exits cleanly");
}
