//! Batch command handler: many targets through the worker pool.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use tracing::info;

use alchemy_cli::output::{render_batch, BatchEntry, OutputFormat};
use alchemy_cli::terminal::ColorPalette;
use alchemy_lib::{run_batch, GraphStore, PoolConfig, SearchAlgorithm, SearchRequest};

use super::load_dataset;

/// Arguments for the batch command.
#[derive(Debug, Clone)]
pub struct BatchCommandArgs {
    pub targets: Vec<String>,
    pub algorithm: SearchAlgorithm,
    pub max_paths: Option<usize>,
    /// Overrides `ALCHEMY_WORKERS`.
    pub workers: Option<usize>,
}

impl BatchCommandArgs {
    fn requests(&self) -> Vec<SearchRequest> {
        self.targets
            .iter()
            .map(|target| SearchRequest {
                max_paths: self.max_paths,
                ..SearchRequest::new(target.clone(), self.algorithm)
            })
            .collect()
    }

    fn pool_config(&self) -> PoolConfig {
        match self.workers {
            Some(workers) => PoolConfig::with_workers(workers),
            None => PoolConfig::from_env(),
        }
    }
}

/// Handle the batch subcommand.
///
/// Every target becomes one job; results print in job order. Any failed job
/// makes the command fail after all results are printed.
pub async fn handle_batch_command(
    args: &BatchCommandArgs,
    format: OutputFormat,
    data_dir: Option<&Path>,
) -> Result<()> {
    let graph = tokio::task::block_in_place(|| load_dataset(data_dir))?;
    let store = Arc::new(GraphStore::new(graph));
    let config = args.pool_config();
    info!(jobs = args.targets.len(), workers = config.workers, "running batch");

    let results = run_batch(store, config, args.requests()).await;
    let entries: Vec<BatchEntry> = results
        .iter()
        .map(|result| BatchEntry::from_job(result, &args.targets))
        .collect();
    print!("{}", render_batch(&entries, format, &ColorPalette::detect())?);

    let failed = entries.iter().filter(|entry| entry.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} of {} batch jobs failed", entries.len());
    }
    Ok(())
}
