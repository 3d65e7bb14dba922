use std::time::{Duration, Instant};

use attitude_fusion::{AttitudeEngine, EngineSettings, Sample};
use nalgebra::Vector3;

const TICK_DT: f32 = 1.0 / 60.0;

fn main() {
    let settings = EngineSettings {
        calibration_duration: Duration::ZERO,
        ..Default::default()
    };
    let engine = AttitudeEngine::new(settings);
    let start = Instant::now();

    for i in 0..10u64 {
        // this loop should repeat each time new sensor data is available
        let accelerometer = Vector3::new(0.0, 0.0, 1.0); // replace with actual accelerometer data in g
        let gyroscope = Vector3::new(0.0, 0.0, 0.0); // replace with actual gyroscope data in degrees/s
        let temperature = Some(24.5); // replace with actual die temperature in Celsius

        let sample = Sample::new(
            accelerometer,
            gyroscope,
            temperature,
            start + Duration::from_millis(i * 16),
        );
        engine.ingest(sample, None).expect("finite sample");
        engine.tick(TICK_DT);

        let snapshot = engine.snapshot();
        let (roll, pitch, yaw) = snapshot.euler_degrees();
        println!("Roll: {roll:.2}, Pitch: {pitch:.2}, Yaw: {yaw:.2}");
    }
}
