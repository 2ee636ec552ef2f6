//! Per-pair progress updates, emitted by the runner in completion order.

use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub done: usize,
    pub total: usize,
    pub run_no: u32,
    pub input_id: String,
    pub config_id: String,
    pub score: Option<f64>,
}

/// Called once per recorded pair. Implementations must not block for long.
pub type ProgressSink = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
