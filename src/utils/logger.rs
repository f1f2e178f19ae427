use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Installs the global tracing subscriber.
///
/// Output goes to stderr so command output on stdout stays machine readable.
/// `RUST_LOG` directives, when set, refine the configured level.
pub fn init_logging(logging_config: &LoggingConfig) -> Result<(), String> {
    let level_filter = logging_config.level_filter()?;

    let filter_layer = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .from_env_lossy();

    let fmt_layer = match logging_config.format.to_lowercase().as_str() {
        "json" => fmt::layer()
            .json()
            .with_current_span(false)
            .with_writer(std::io::stderr)
            .boxed(),
        "console" => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        // Fallback to compact console output if unknown
        _ => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
    };

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(fmt_layer)
            .with(filter_layer),
    )
    .map_err(|e| format!("Failed to install tracing subscriber: {}", e))?;

    // Bridge `log` records from dependencies into tracing.
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to bridge log records: {}", e))
}
