//! Process-wide logging and the optional Prometheus listener.

use flood_config::ServiceConfig;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{AddrParseError, SocketAddr};
use tracing_subscriber::EnvFilter;

/// Counters emitted by the dispatch core, with their help text.
pub const DISPATCH_COUNTERS: &[(&str, &str)] = &[
    (
        "flood_dispatch_operations_total",
        "Dispatch operations that committed, by operation",
    ),
    (
        "flood_dispatch_rejections_total",
        "Dispatch operations rejected, by operation and error code",
    ),
    (
        "flood_dispatch_supply_units_consumed_total",
        "Supply units handed out to rescue requests",
    ),
];

const FALLBACK_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
    pub metrics_addr: Option<String>,
}

impl ObservabilityConfig {
    pub fn from_service(config: &ServiceConfig) -> Self {
        Self {
            service_name: config.service_name.clone(),
            environment: config.environment.to_string(),
            log_level: config.log_level.clone(),
            metrics_addr: config.metrics_addr.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricsExporter {
    Disabled,
    Listening(SocketAddr),
    /// Configured but not running; the service keeps serving without it.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ObservabilityHandle {
    pub service_name: String,
    pub environment: String,
    pub metrics: MetricsExporter,
    /// Set when the configured level did not parse and `info` was used.
    pub rejected_log_level: Option<String>,
}

impl ObservabilityHandle {
    pub fn metrics_enabled(&self) -> bool {
        matches!(self.metrics, MetricsExporter::Listening(_))
    }
}

pub fn init(config: &ObservabilityConfig) -> ObservabilityHandle {
    let (filter, rejected_log_level) = match EnvFilter::try_new(&config.log_level) {
        Ok(filter) => (filter, None),
        Err(_) => (
            EnvFilter::new(FALLBACK_LOG_LEVEL),
            Some(config.log_level.clone()),
        ),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);

    let metrics = init_metrics(config);
    if matches!(metrics, MetricsExporter::Listening(_)) {
        for (name, help) in DISPATCH_COUNTERS {
            metrics::describe_counter!(*name, *help);
        }
    }

    ObservabilityHandle {
        service_name: config.service_name.clone(),
        environment: config.environment.clone(),
        metrics,
        rejected_log_level,
    }
}

pub fn log_startup(handle: &ObservabilityHandle) {
    if let Some(level) = &handle.rejected_log_level {
        tracing::warn!(
            requested = %level,
            using = FALLBACK_LOG_LEVEL,
            "Invalid FLOOD_LOG_LEVEL value"
        );
    }
    match &handle.metrics {
        MetricsExporter::Failed(reason) => tracing::warn!(
            service = %handle.service_name,
            error = %reason,
            "Prometheus exporter not running"
        ),
        MetricsExporter::Listening(addr) => {
            tracing::debug!(metrics_addr = %addr, "Prometheus exporter listening")
        }
        MetricsExporter::Disabled => {}
    }
    tracing::info!(
        service = %handle.service_name,
        environment = %handle.environment,
        metrics_enabled = handle.metrics_enabled(),
        "Flood coordination service starting"
    );
}

/// Blank or missing means the exporter is off.
pub fn parse_metrics_addr(value: Option<&str>) -> Result<Option<SocketAddr>, AddrParseError> {
    match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse().map(Some),
        None => Ok(None),
    }
}

fn init_metrics(config: &ObservabilityConfig) -> MetricsExporter {
    let addr = match parse_metrics_addr(config.metrics_addr.as_deref()) {
        Ok(Some(addr)) => addr,
        Ok(None) => return MetricsExporter::Disabled,
        Err(err) => return MetricsExporter::Failed(format!("invalid FLOOD_METRICS_ADDR: {err}")),
    };

    let builder = PrometheusBuilder::new()
        .with_http_listener(addr)
        .add_global_label("service", config.service_name.clone())
        .add_global_label("environment", config.environment.clone());

    match builder.install() {
        Ok(()) => MetricsExporter::Listening(addr),
        Err(err) => MetricsExporter::Failed(err.to_string()),
    }
}
