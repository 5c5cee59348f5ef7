use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::overlay::{
    METRIC_ORPHANED_TOTAL, METRIC_PLUGIN_UNRESOLVED_TOTAL, METRIC_RESOLVE_TOTAL,
    METRIC_STORE_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Output goes to stderr so command results on stdout stay machine-readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            METRIC_RESOLVE_TOTAL,
            Unit::Count,
            "Total number of effective configurations resolved."
        );
        describe_counter!(
            METRIC_STORE_TOTAL,
            Unit::Count,
            "Total number of translation overlays extracted."
        );
        describe_counter!(
            METRIC_ORPHANED_TOTAL,
            Unit::Count,
            "Total number of overlay values ignored because no current plugin declares them."
        );
        describe_counter!(
            METRIC_PLUGIN_UNRESOLVED_TOTAL,
            Unit::Count,
            "Total number of selected plugin ids missing from the registry."
        );
    });
}
