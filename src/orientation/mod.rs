//! Device orientation sampling.
//!
//! The monitor subscribes to a fused rotation source and publishes the most
//! recent reading as an immutable [`OrientationSample`]. Readers never wait on
//! the sensor callback path; there is no smoothing or history.

pub mod rotation;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub use rotation::{orientation_from_vector, DeviceAngles, RotationVector};

/// Point-in-time device attitude, in degrees from level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub pitch: f64,
    pub roll: f64,
    pub magnitude: f64,
    pub timestamp: DateTime<Utc>,
}

impl OrientationSample {
    pub fn new(pitch: f64, roll: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            pitch,
            roll,
            magnitude: (pitch * pitch + roll * roll).sqrt(),
            timestamp,
        }
    }

    pub fn now(pitch: f64, roll: f64) -> Self {
        Self::new(pitch, roll, Utc::now())
    }

    pub fn from_rotation_vector(vector: &RotationVector, timestamp: DateTime<Utc>) -> Self {
        let angles = orientation_from_vector(vector);
        Self::new(angles.pitch, angles.roll, timestamp)
    }

    /// Whether the device is within `tolerance_degrees` of level.
    pub fn is_level(&self, tolerance_degrees: f64) -> bool {
        self.magnitude <= tolerance_degrees
    }
}

/// One callback delivery from a rotation source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationReading {
    pub vector: RotationVector,
    pub timestamp: DateTime<Utc>,
}

pub type ReadingSink = Arc<dyn Fn(RotationReading) + Send + Sync>;

/// Platform rotation sensor the monitor subscribes to
pub trait RotationSource: Send + Sync {
    /// Whether the device has a fused rotation sensor at all
    fn is_supported(&self) -> bool;

    /// Start delivering readings to `sink`, replacing any previous sink
    fn register(&self, sink: ReadingSink);

    /// Stop delivering readings
    fn unregister(&self);
}

pub struct OrientationMonitor {
    source: Arc<dyn RotationSource>,
    latest: Arc<watch::Sender<Option<OrientationSample>>>,
    receiver: watch::Receiver<Option<OrientationSample>>,
    // Liveness flag of the current subscription; `None` while stopped. The
    // sink publishes while holding it, so `stop` cannot interleave.
    subscription: Mutex<Option<Arc<Mutex<bool>>>>,
}

impl OrientationMonitor {
    pub fn new(source: Arc<dyn RotationSource>) -> Self {
        let (sender, receiver) = watch::channel(None);
        Self {
            source,
            latest: Arc::new(sender),
            receiver,
            subscription: Mutex::new(None),
        }
    }

    /// Subscribe to the rotation source.
    ///
    /// Returns `false` when the device has no rotation sensor. Calling it
    /// while already running is a no-op.
    pub fn start(&self) -> bool {
        if !self.source.is_supported() {
            tracing::debug!("Rotation sensor unsupported, orientation monitor stays idle");
            return false;
        }

        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if subscription.is_some() {
            return true;
        }

        let active = Arc::new(Mutex::new(true));
        let sink_active = Arc::clone(&active);
        let latest = Arc::clone(&self.latest);
        let sink: ReadingSink = Arc::new(move |reading: RotationReading| {
            let active = sink_active
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if !*active {
                return;
            }
            let sample = OrientationSample::from_rotation_vector(&reading.vector, reading.timestamp);
            latest.send_replace(Some(sample));
        });

        self.source.register(sink);
        *subscription = Some(active);
        tracing::debug!("Orientation monitor started");
        true
    }

    /// Unsubscribe. Safe to call in any state.
    ///
    /// Once this returns no reading is published, including one whose
    /// callback was already running.
    pub fn stop(&self) {
        let mut subscription = self
            .subscription
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(active) = subscription.take() {
            *active.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = false;
            self.source.unregister();
            tracing::debug!("Orientation monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.subscription
            .lock()
            .map(|subscription| subscription.is_some())
            .unwrap_or(false)
    }

    /// Most recent sample, or `None` if no reading has arrived yet.
    pub fn sample(&self) -> Option<OrientationSample> {
        *self.receiver.borrow()
    }

    /// Receiver for live-preview polling of the latest sample.
    pub fn subscribe(&self) -> watch::Receiver<Option<OrientationSample>> {
        self.receiver.clone()
    }
}

impl Drop for OrientationMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
