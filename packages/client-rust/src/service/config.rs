use serde::Deserialize;

use redop_core::Codec;

/// Invocation pipeline configuration.
///
/// Controls request metrics, slow-operation detection and the default codec.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Track the active-request gauge and per-call counters.
    pub metrics_enabled: bool,
    /// Calls taking at least this long are logged and recorded as slow.
    /// `None` disables slow-operation detection.
    pub slow_operation_threshold_ms: Option<u64>,
    /// How many slow-operation records the default registry keeps.
    pub slow_operation_capacity: usize,
    /// Codec used when a method does not declare one.
    pub default_codec: Codec,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            slow_operation_threshold_ms: Some(1_000),
            slow_operation_capacity: 256,
            default_codec: Codec::String,
        }
    }
}
