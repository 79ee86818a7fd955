//! Bounded async worker pool for running many searches at once.
//!
//! Jobs flow through a bounded queue to a fixed set of tokio workers. Each
//! worker takes a fresh graph snapshot per job and runs the search on the
//! blocking thread pool, so a panicking search fails only its own job.

use std::any::Any;
use std::env;
use std::sync::Arc;
use std::thread;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::graph::{GraphStore, RecipeGraph};
use crate::search::{search, SearchOutcome, SearchRequest};

/// Environment variable overriding the worker count.
pub const WORKERS_ENV_VAR: &str = "ALCHEMY_WORKERS";

/// Environment variable overriding the job queue capacity.
pub const QUEUE_CAPACITY_ENV_VAR: &str = "ALCHEMY_QUEUE_CAPACITY";

type Runner = Arc<dyn Fn(&RecipeGraph, &SearchRequest) -> Result<SearchOutcome> + Send + Sync>;

/// Sizing for a [`WorkerPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub workers: usize,
    /// Capacity of both the job queue and the result channel.
    pub queue_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let workers = thread::available_parallelism()
            .map(|count| count.get())
            .unwrap_or(4);
        Self::with_workers(workers)
    }
}

impl PoolConfig {
    /// `workers` workers with a queue twice that size.
    pub fn with_workers(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            workers,
            queue_capacity: workers * 2,
        }
    }

    /// Defaults overridden by `ALCHEMY_WORKERS` and `ALCHEMY_QUEUE_CAPACITY`.
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = match read_env_usize(WORKERS_ENV_VAR) {
            Some(workers) => Self::with_workers(workers),
            None => Self::default(),
        };
        if let Some(capacity) = read_env_usize(QUEUE_CAPACITY_ENV_VAR) {
            config.queue_capacity = capacity;
        }
        config.normalized()
    }

    fn normalized(self) -> Self {
        Self {
            workers: self.workers.max(1),
            queue_capacity: self.queue_capacity.max(1),
        }
    }
}

fn read_env_usize(name: &str) -> Option<usize> {
    let value = env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(variable = name, value = %value, "ignoring non-numeric pool setting");
            None
        }
    }
}

/// A search submitted to the pool.
#[derive(Debug, Clone)]
pub struct SearchJob {
    pub id: u64,
    pub request: SearchRequest,
}

/// Outcome of one job, tagged with its id.
#[derive(Debug)]
pub struct JobResult {
    pub id: u64,
    pub outcome: Result<SearchOutcome>,
}

/// Sending half of a running pool. Dropping it (or calling [`close`]) lets
/// the workers drain the queue and exit.
///
/// [`close`]: JobSubmitter::close
#[derive(Debug, Clone)]
pub struct JobSubmitter {
    jobs: mpsc::Sender<SearchJob>,
}

impl JobSubmitter {
    /// Queue a job, waiting while the queue is full.
    pub async fn submit(&self, job: SearchJob) -> Result<()> {
        self.jobs.send(job).await.map_err(|_| Error::PoolClosed)
    }

    pub fn close(self) {}
}

/// Receiving half of a running pool. The stream ends once every worker has
/// exited.
#[derive(Debug)]
pub struct JobResults {
    results: mpsc::Receiver<JobResult>,
}

impl JobResults {
    pub async fn next(&mut self) -> Option<JobResult> {
        self.results.recv().await
    }

    /// Drain every remaining result, ordered by job id.
    pub async fn collect_sorted(mut self) -> Vec<JobResult> {
        let mut collected = Vec::new();
        while let Some(result) = self.results.recv().await {
            collected.push(result);
        }
        collected.sort_by_key(|result| result.id);
        collected
    }
}

/// Fixed-size pool of search workers.
pub struct WorkerPool;

impl WorkerPool {
    /// Start `config.workers` workers on the current tokio runtime.
    ///
    /// Both channels are bounded: submit from a separate task (or use
    /// [`run_batch`]) when queuing more jobs than the capacity before reading
    /// results.
    pub fn spawn(store: Arc<GraphStore>, config: PoolConfig) -> (JobSubmitter, JobResults) {
        Self::spawn_with(store, config, Arc::new(search))
    }

    pub(crate) fn spawn_with(
        store: Arc<GraphStore>,
        config: PoolConfig,
        runner: Runner,
    ) -> (JobSubmitter, JobResults) {
        let config = config.normalized();
        let (job_tx, job_rx) = mpsc::channel(config.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel(config.queue_capacity);
        let job_rx = Arc::new(Mutex::new(job_rx));

        for worker in 0..config.workers {
            tokio::spawn(worker_loop(
                worker,
                Arc::clone(&store),
                Arc::clone(&job_rx),
                result_tx.clone(),
                Arc::clone(&runner),
            ));
        }
        info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "search worker pool started"
        );

        (
            JobSubmitter { jobs: job_tx },
            JobResults { results: result_rx },
        )
    }
}

async fn worker_loop(
    worker: usize,
    store: Arc<GraphStore>,
    jobs: Arc<Mutex<mpsc::Receiver<SearchJob>>>,
    results: mpsc::Sender<JobResult>,
    runner: Runner,
) {
    loop {
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        let id = job.id;
        let graph = store.snapshot();
        let run = Arc::clone(&runner);
        debug!(worker, job_id = id, "running search job");
        let handle = tokio::task::spawn_blocking(move || run(graph.as_ref(), &job.request));
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(error) => {
                let message = join_error_message(error);
                error!(worker, job_id = id, %message, "search job panicked; worker continues");
                Err(Error::JobPanicked {
                    job_id: id,
                    message,
                })
            }
        };

        if results.send(JobResult { id, outcome }).await.is_err() {
            debug!(worker, "result receiver dropped; worker exiting");
            break;
        }
    }
    debug!(worker, "search worker stopped");
}

fn join_error_message(error: JoinError) -> String {
    if error.is_panic() {
        panic_message(error.into_panic())
    } else {
        error.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "search panicked".to_string()
    }
}

/// Run `requests` through a fresh pool and return their results ordered by
/// job id, which is each request's index.
pub async fn run_batch(
    store: Arc<GraphStore>,
    config: PoolConfig,
    requests: Vec<SearchRequest>,
) -> Vec<JobResult> {
    let (submitter, results) = WorkerPool::spawn(store, config);
    let feeder = tokio::spawn(async move {
        for (id, request) in (0u64..).zip(requests) {
            if let Err(error) = submitter.submit(SearchJob { id, request }).await {
                warn!(job_id = id, %error, "could not queue search job");
                break;
            }
        }
    });

    let collected = results.collect_sorted().await;
    if let Err(error) = feeder.await {
        warn!(%error, "job feeder task failed");
    }
    collected
}
