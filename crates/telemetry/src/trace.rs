use tracing_appender::non_blocking;
use tracing_subscriber::{prelude::*, EnvFilter};

const ENV_OTEL_TRACES_EXPORTER: &str = "OTEL_TRACES_EXPORTER";
const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum TraceInitError {
    Opentelemetry(#[from] opentelemetry::trace::TraceError),
    ParseError(#[from] tracing_subscriber::filter::ParseError),
    TryInitError(#[from] tracing_subscriber::util::TryInitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceExporter {
    None,
    Jaeger,
}

impl TraceExporter {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some("jaeger") => TraceExporter::Jaeger,
            _ => TraceExporter::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Keeps the log writer alive and flushes pending spans on drop.
pub struct TraceGuard {
    _non_blocking_worker: non_blocking::WorkerGuard,
    trace_exporter: TraceExporter,
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        if !matches!(self.trace_exporter, TraceExporter::None) {
            opentelemetry::global::shutdown_tracer_provider(); // Sending remaining spans
        }
    }
}

/// Install the global subscriber.
///
/// Filtering follows `RUST_LOG` (default `info`), `LOG_FORMAT=json` switches
/// to json lines and `OTEL_TRACES_EXPORTER=jaeger` exports spans to a local
/// jaeger agent.
pub fn init() -> Result<TraceGuard, TraceInitError> {
    let trace_exporter =
        TraceExporter::from_env_value(std::env::var(ENV_OTEL_TRACES_EXPORTER).ok().as_deref());
    let log_format = match trace_exporter {
        // Json carries span fields for trace correlation.
        TraceExporter::Jaeger => LogFormat::Json,
        TraceExporter::None => {
            LogFormat::from_env_value(std::env::var(ENV_LOG_FORMAT).ok().as_deref())
        }
    };

    let env_filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_LOG_LEVEL))?;

    let (non_blocking_stdout, _non_blocking_worker) = non_blocking(std::io::stdout());
    let fmt_layer = {
        let layer = tracing_subscriber::fmt::layer().with_writer(non_blocking_stdout);
        match log_format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .boxed(),
        }
    };

    let trace_layer = match trace_exporter {
        TraceExporter::Jaeger => {
            opentelemetry::global::set_text_map_propagator(opentelemetry_jaeger::Propagator::new());

            // Service name comes from `OTEL_SERVICE_NAME`
            let tracer = opentelemetry_jaeger::new_agent_pipeline()
                .with_auto_split_batch(true)
                .install_batch(opentelemetry::runtime::Tokio)?;

            Some(tracing_opentelemetry::layer().with_tracer(tracer).boxed())
        }
        TraceExporter::None => None,
    };

    let registry = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter_layer);

    match trace_layer {
        Some(layer) => registry.with(layer).try_init()?,
        None => registry.try_init()?,
    }

    Ok(TraceGuard {
        _non_blocking_worker,
        trace_exporter,
    })
}
