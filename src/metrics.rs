//! Request metrics for production monitoring
//!
//! Tracks recommendation throughput, error categories, and the one-hot
//! degradation counters: a soil or crop name whose indicator column is
//! missing from the trained schema is served with an all-zero encoding by
//! design, and these counters are the only externally visible signal that
//! the leniency fired. A climbing `unknown_*_encodings` count means the
//! serving mappings have drifted from the trained schema.
//!
//! Counters are relaxed atomics: requests are independent and the numbers
//! are monotonic, so no stronger ordering is needed.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Central metrics collector shared across request handlers
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    /// Total recommendation requests processed
    total_requests: Arc<AtomicUsize>,
    /// Requests that produced a recommendation
    successful_requests: Arc<AtomicUsize>,
    /// Requests rejected for an unknown soil or crop ID
    invalid_category_rejections: Arc<AtomicUsize>,
    /// Requests whose predicted class had no fertilizer mapping
    unmappable_predictions: Arc<AtomicUsize>,
    /// Soil names served with an all-zero one-hot encoding
    unknown_soil_encodings: Arc<AtomicUsize>,
    /// Crop names served with an all-zero one-hot encoding
    unknown_crop_encodings: Arc<AtomicUsize>,
    /// Total time spent in scale + predict, microseconds
    total_inference_time_us: Arc<AtomicU64>,
}

impl MetricsCollector {
    /// Create a new collector with all counters at zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful recommendation
    #[allow(clippy::cast_possible_truncation)]
    pub fn record_success(&self, inference_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_inference_time_us
            .fetch_add(inference_time.as_micros() as u64, Ordering::Relaxed);
    }

    /// Record a request rejected for an unknown soil or crop ID
    pub fn record_invalid_category(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.invalid_category_rejections
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Record a request whose prediction could not be mapped to a name
    pub fn record_unmappable_prediction(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.unmappable_predictions.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a soil name encoded all-zero (one-hot column missing)
    pub fn record_unknown_soil_encoding(&self) {
        self.unknown_soil_encodings.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a crop name encoded all-zero (one-hot column missing)
    pub fn record_unknown_crop_encoding(&self) {
        self.unknown_crop_encodings.fetch_add(1, Ordering::Relaxed);
    }

    /// Current counter values
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            invalid_category_rejections: self.invalid_category_rejections.load(Ordering::Relaxed),
            unmappable_predictions: self.unmappable_predictions.load(Ordering::Relaxed),
            unknown_soil_encodings: self.unknown_soil_encodings.load(Ordering::Relaxed),
            unknown_crop_encodings: self.unknown_crop_encodings.load(Ordering::Relaxed),
            total_inference_time_us: self.total_inference_time_us.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of all counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Total recommendation requests processed
    pub total_requests: usize,
    /// Requests that produced a recommendation
    pub successful_requests: usize,
    /// Requests rejected for an unknown soil or crop ID
    pub invalid_category_rejections: usize,
    /// Requests whose predicted class had no fertilizer mapping
    pub unmappable_predictions: usize,
    /// Soil names served with an all-zero one-hot encoding
    pub unknown_soil_encodings: usize,
    /// Crop names served with an all-zero one-hot encoding
    pub unknown_crop_encodings: usize,
    /// Total time spent in scale + predict, microseconds
    pub total_inference_time_us: u64,
}

impl MetricsSnapshot {
    /// Render in Prometheus text exposition format
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        format!(
            "# HELP abonar_requests_total Total recommendation requests\n\
             # TYPE abonar_requests_total counter\n\
             abonar_requests_total {}\n\
             # HELP abonar_requests_success Successful recommendations\n\
             # TYPE abonar_requests_success counter\n\
             abonar_requests_success {}\n\
             # HELP abonar_invalid_category_rejections Requests with unknown soil/crop IDs\n\
             # TYPE abonar_invalid_category_rejections counter\n\
             abonar_invalid_category_rejections {}\n\
             # HELP abonar_unmappable_predictions Predictions with no fertilizer mapping\n\
             # TYPE abonar_unmappable_predictions counter\n\
             abonar_unmappable_predictions {}\n\
             # HELP abonar_unknown_soil_encodings Soil names encoded all-zero\n\
             # TYPE abonar_unknown_soil_encodings counter\n\
             abonar_unknown_soil_encodings {}\n\
             # HELP abonar_unknown_crop_encodings Crop names encoded all-zero\n\
             # TYPE abonar_unknown_crop_encodings counter\n\
             abonar_unknown_crop_encodings {}\n\
             # HELP abonar_inference_time_us_total Cumulative scale+predict time in microseconds\n\
             # TYPE abonar_inference_time_us_total counter\n\
             abonar_inference_time_us_total {}\n",
            self.total_requests,
            self.successful_requests,
            self.invalid_category_rejections,
            self.unmappable_predictions,
            self.unknown_soil_encodings,
            self.unknown_crop_encodings,
            self.total_inference_time_us,
        )
    }
}
