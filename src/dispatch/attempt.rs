use crate::resilience::ErrorClass;
use serde::Serialize;

/// Record of one try against one provider within a single dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchAttempt {
    pub provider: String,
    /// 1-based index within this provider's attempt loop.
    pub attempt_index: u32,
    /// `None` when the attempt succeeded.
    pub error_class: Option<ErrorClass>,
    pub delay_before_ms: u64,
    pub latency_ms: f64,
}

impl DispatchAttempt {
    pub fn succeeded(&self) -> bool {
        self.error_class.is_none()
    }
}
