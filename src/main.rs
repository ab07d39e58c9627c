//! GitFeed CLI entrypoint: refresh the feed once and print the cache.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use gitfeed::telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetrySink};
use gitfeed::{EventFeedService, FeedError, FeedStore, GitFeedConfig, OctocrabEventGateway};
use ortho_config::OrthoConfig;
use tracing::level_filters::LevelFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), FeedError> {
    let config = load_config()?;
    init_tracing(config.log_level())?;

    let token = config.resolve_token()?;
    let api_base = config.api_base()?;
    let gateway = OctocrabEventGateway::for_api_base(&api_base, token.as_ref())?;
    let store = FeedStore::new(config.cache_dir()?)?;
    let telemetry: Arc<dyn TelemetrySink> = if config.telemetry {
        Arc::new(StderrJsonlTelemetrySink)
    } else {
        Arc::new(NoopTelemetrySink)
    };

    let service = EventFeedService::builder(Arc::new(gateway), store)
        .telemetry(telemetry)
        .options(config.feed_options()?)
        .build();

    let summary = service.initialize().await?;
    tracing::debug!(
        events = summary.events_loaded,
        degraded = summary.degraded.len(),
        "loaded cached feed"
    );

    let report = service.refresh_now(config.feed_target()?).await?;
    if let Some(error) = &report.persistence_error {
        tracing::warn!("feed refreshed but not saved: {error}");
    }

    write_events(&report.snapshot)
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`FeedError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<GitFeedConfig, FeedError> {
    GitFeedConfig::load().map_err(|error| FeedError::Configuration {
        message: error.to_string(),
    })
}

fn init_tracing(level: &str) -> Result<(), FeedError> {
    let filter: LevelFilter = level.parse().map_err(|_| FeedError::Configuration {
        message: format!("unknown log level: {level}"),
    })?;

    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn write_events(events: &[gitfeed::Event]) -> Result<(), FeedError> {
    let mut stdout = io::stdout().lock();
    for event in events {
        writeln!(stdout, "{}", event.summary_line()).map_err(|error| FeedError::Io {
            message: error.to_string(),
        })?;
    }
    Ok(())
}
