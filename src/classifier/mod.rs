//! Classifier Module - anomaly model adapter
//!
//! Marshals one `DetectionRecord` into the pre-trained model and maps the
//! first output back to a `Label`. The model itself is opaque.

pub mod inference;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::models::{DetectionRecord, Label};

pub use inference::OnnxClassifier;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct InferenceError(pub String);

/// Engine status for the health report
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub model_name: String,
    pub inputs: Vec<String>,
    pub inference_device: String,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

/// A loaded model that labels one record at a time
pub trait Classifier: Send + Sync {
    fn predict(&self, record: &DetectionRecord) -> Result<Label, InferenceError>;
    fn status(&self) -> EngineStatus;
}

/// Latency counters, kept per classifier instance
#[derive(Debug, Default)]
pub struct InferenceStats {
    latency_sum_us: AtomicU64,
    count: AtomicU64,
}

impl InferenceStats {
    pub fn record(&self, elapsed: Duration) {
        self.latency_sum_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.count();
        if count > 0 {
            (sum as f32 / count as f32) / 1000.0
        } else {
            0.0
        }
    }
}
