//! Run command - dispatch loop for due scheduled posts

use anyhow::{Context, Result};
use brandcast_adapters::state::SqliteScheduleStore;
use brandcast_domain::{
    DispatchResult, SystemClock,
    usecases::{DispatchConfig, DispatchLoop},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::args::RunArgs;
use crate::commands::publish::{build_brand, build_factory, build_policy};
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let dry_run = args.dry_run || config.general.dry_run;

    tracing::info!(
        dry_run = dry_run,
        once = args.once,
        brand = %config.brand.name,
        "Starting brandcast dispatch"
    );

    // Build dependencies
    let store = Arc::new(
        SqliteScheduleStore::new(&config.general.state_db_path)
            .await
            .context("Failed to initialize SQLite schedule store")?,
    );

    let factory = Arc::new(build_factory(&config));
    let brand = build_brand(&config);
    let policy = build_policy(&config);
    let clock = Arc::new(SystemClock);

    let dispatch_config = DispatchConfig {
        dry_run,
        max_concurrent: config.general.max_concurrent,
        rate_limit_per_minute: rate_limit_from_config(config.general.rate_limit_per_minute),
        rate_limit_per_hour: rate_limit_from_config(config.general.rate_limit_per_hour),
    };

    let dispatch = DispatchLoop::new(brand, factory, store, clock, policy, dispatch_config);

    // Execute
    if args.once {
        tracing::info!("Running single dispatch cycle");
        let results = dispatch.poll_once().await?;
        tracing::info!(processed = results.len(), "Dispatch cycle complete");

        for (post_id, result) in results {
            match result {
                DispatchResult::Published { platform_post_id } => {
                    tracing::info!(
                        post_id = %post_id,
                        platform_post_id = ?platform_post_id,
                        "Published"
                    );
                }
                DispatchResult::Skipped { reason } => {
                    tracing::debug!(post_id = %post_id, reason = %reason, "Skipped");
                }
                DispatchResult::Failed { error } => {
                    tracing::error!(post_id = %post_id, error = %error, "Failed");
                }
            }
        }
    } else {
        // Continuous dispatch loop
        let poll_interval = Duration::from_secs(config.dispatch.poll_interval_secs);
        let mut ticker = interval(poll_interval);

        // Set up graceful shutdown
        let shutdown = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
            tracing::info!("Shutdown signal received");
        };

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match dispatch.poll_once().await {
                        Ok(results) => {
                            if !results.is_empty() {
                                tracing::info!(processed = results.len(), "Dispatch cycle complete");
                            }
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Dispatch cycle failed");
                        }
                    }
                }
                _ = &mut shutdown => {
                    tracing::info!("Shutting down gracefully");
                    break;
                }
            }
        }
    }

    tracing::info!("brandcast dispatch completed");
    Ok(())
}

fn rate_limit_from_config(value: u32) -> Option<u32> {
    if value == 0 { None } else { Some(value) }
}
