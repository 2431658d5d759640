use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;

pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let writer = match &config.file_path {
        Some(file_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file_path)?;
            BoxMakeWriter::new(Arc::new(file))
        }
        None => BoxMakeWriter::new(std::io::stdout),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
        _ => {
            let fmt_layer = fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_thread_ids(true)
                .with_writer(writer);
            registry.with(fmt_layer).try_init()?;
        }
    }

    tracing::info!(level = %config.level, format = %config.format, "Logging initialized");
    Ok(())
}
