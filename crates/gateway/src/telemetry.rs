//! Tracing setup for the `serve` and one-shot commands.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig as _;
use opentelemetry_sdk::trace::{Sampler, SdkTracerProvider};
use opentelemetry_sdk::Resource;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use lv_domain::config::{LogFormat, ObservabilityConfig};

/// Install the global subscriber for `serve`.
///
/// Logs go to stdout in the configured format. When `otlp_endpoint` is set
/// an OpenTelemetry layer exports every span as well; the returned provider
/// must be shut down on exit to flush pending spans.
pub fn init_server_tracing(obs: &ObservabilityConfig) -> Option<SdkTracerProvider> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&obs.log_filter));
    let json = (obs.log_format == LogFormat::Json).then(|| tracing_subscriber::fmt::layer().json());
    let compact =
        (obs.log_format == LogFormat::Compact).then(|| tracing_subscriber::fmt::layer().compact());

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(compact);

    let Some(endpoint) = obs.otlp_endpoint.as_deref() else {
        registry.init();
        return None;
    };

    let exporter = match opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
    {
        Ok(e) => e,
        Err(e) => {
            registry.init();
            tracing::warn!(%endpoint, error = %e, "OTLP exporter unavailable, spans stay local");
            return None;
        }
    };

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_sampler(Sampler::ParentBased(Box::new(Sampler::TraceIdRatioBased(
            obs.sample_rate,
        ))))
        .with_resource(resource(obs))
        .build();

    let otel_layer =
        tracing_opentelemetry::layer().with_tracer(tracer_provider.tracer(obs.service_name.clone()));
    registry.with(otel_layer).init();

    tracing::info!(%endpoint, sample_rate = obs.sample_rate, "exporting spans over OTLP");
    Some(tracer_provider)
}

/// Compact stderr-only tracing for one-shot commands, so stdout carries
/// nothing but the JSON result.
pub fn init_cli_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn resource(obs: &ObservabilityConfig) -> Resource {
    Resource::builder()
        .with_service_name(obs.service_name.clone())
        .with_attributes(resource_attributes(obs))
        .build()
}

/// Attributes attached to every exported span besides `service.name`.
fn resource_attributes(obs: &ObservabilityConfig) -> Vec<KeyValue> {
    let mut attrs = vec![KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))];
    if let Some(ref env) = obs.environment {
        attrs.push(KeyValue::new("deployment.environment", env.clone()));
    }
    attrs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_always_reported() {
        let attrs = resource_attributes(&ObservabilityConfig::default());
        assert_eq!(
            attrs,
            vec![KeyValue::new("service.version", env!("CARGO_PKG_VERSION"))]
        );
    }

    #[test]
    fn environment_is_reported_when_set() {
        let obs = ObservabilityConfig {
            environment: Some("staging".into()),
            ..Default::default()
        };
        let attrs = resource_attributes(&obs);
        assert!(attrs.contains(&KeyValue::new("deployment.environment", "staging")));
    }
}
