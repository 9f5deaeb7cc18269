mod common;

use chrono::Utc;
use common::*;
use plumb_tilt::*;
use std::sync::{Arc, Mutex};

/// Sensor whose readings are pushed by the test
#[derive(Default)]
struct ScriptedSensor {
    sink: Mutex<Option<ReadingSink>>,
}

impl ScriptedSensor {
    fn push(&self, vector: RotationVector) {
        if let Some(sink) = self.sink.lock().unwrap().clone() {
            sink(RotationReading {
                vector,
                timestamp: Utc::now(),
            });
        }
    }
}

impl RotationSource for ScriptedSensor {
    fn is_supported(&self) -> bool {
        true
    }

    fn register(&self, sink: ReadingSink) {
        *self.sink.lock().unwrap() = Some(sink);
    }

    fn unregister(&self) {
        *self.sink.lock().unwrap() = None;
    }
}

fn pitched(degrees: f64) -> RotationVector {
    let half = degrees.to_radians() / 2.0;
    RotationVector::with_scalar(half.sin(), 0.0, 0.0, half.cos())
}

#[test]
fn test_capture_with_live_sample() {
    let sensor = Arc::new(ScriptedSensor::default());
    let monitor = OrientationMonitor::new(sensor.clone());
    assert!(monitor.start());
    assert!(monitor.sample().is_none());

    sensor.push(pitched(1.0));
    sensor.push(pitched(4.0));
    let sample = monitor.sample().unwrap();
    assert!(!sample.is_level(2.0));

    let pipeline = pipeline_with(leaning_verticals(&[5.0; 6]));
    let estimate = pipeline.analyze(&blank_image(), Some(&sample)).unwrap();

    assert!((estimate.corrected_vertical - 1.0).abs() < 1e-6);
    assert!((estimate.camera_compensation.unwrap() - 4.0).abs() < 1e-6);
    assert_eq!(estimate.severity, Severity::Minor);
}

#[test]
fn test_capture_after_stop_keeps_last_sample() {
    let sensor = Arc::new(ScriptedSensor::default());
    let monitor = OrientationMonitor::new(sensor.clone());
    monitor.start();
    sensor.push(pitched(0.5));
    monitor.stop();
    sensor.push(pitched(20.0));

    let sample = monitor.sample().unwrap();
    assert!(sample.is_level(1.0));
}
