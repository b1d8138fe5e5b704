pub mod config;
pub mod pipeline;

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::config::SorterConfig;
use crate::pipeline::sorting::{start_background_scheduler, BatchSorter, SortError};

/// Entry point for the binary: load config, then run once or on a schedule.
pub fn run() -> Result<(), SortError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = SorterConfig::load(&config::default_config_path())?;
    let interval = config.schedule_interval_secs;
    let sorter = BatchSorter::new(config)?;

    match interval {
        Some(secs) => {
            start_background_scheduler(sorter, Duration::from_secs(secs)).wait();
        }
        None => {
            let result = sorter.run_once();
            tracing::info!(
                finished = result.is_finished(),
                files = result.files_processed(),
                failed = result.files_failed(),
                "Run complete"
            );
        }
    }
    Ok(())
}
