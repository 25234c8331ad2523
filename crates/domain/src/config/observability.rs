use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Observability
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Logging and trace export for `serve`.
///
/// Liveness events (`aws_call`, `result_polled`, `session_resolved`) go to
/// the log either way. With `otlp_endpoint` set, the request and poll-loop
/// spans are also exported over OTLP/gRPC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// OTLP gRPC endpoint (e.g. `http://localhost:4317`).
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// The `service.name` resource attribute reported to the collector.
    #[serde(default = "d_service_name")]
    pub service_name: String,

    /// Reported as `deployment.environment` (`prod`, `staging`, ...).
    #[serde(default)]
    pub environment: Option<String>,

    /// Trace sampling rate (`0.0` = never, `1.0` = always).
    #[serde(default = "d_sample_rate")]
    pub sample_rate: f64,

    /// Log line format on stdout.
    #[serde(default)]
    pub log_format: LogFormat,

    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "d_log_filter")]
    pub log_filter: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line, for log shippers.
    #[default]
    Json,
    /// Human-readable single-line output for local runs.
    Compact,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: d_service_name(),
            environment: None,
            sample_rate: d_sample_rate(),
            log_format: LogFormat::default(),
            log_filter: d_log_filter(),
        }
    }
}

fn d_service_name() -> String {
    "liveness-gateway".into()
}

fn d_sample_rate() -> f64 {
    1.0
}

fn d_log_filter() -> String {
    "info,lv_gateway=debug,lv_providers=debug".into()
}
