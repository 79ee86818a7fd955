//! Alchemy recipe library entry points.
//!
//! This crate exposes helpers to locate and load the recipe dataset, build
//! the tiered recipe graph, and search it for crafting paths. Higher-level
//! consumers (CLI, HTTP service) should only depend on the functions exported
//! here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod dataset;
pub mod error;
pub mod graph;
pub mod output;
pub mod path;
pub mod pool;
pub mod search;

pub use dataset::{default_dataset_path, load_graph, load_records, resolve_dataset_path, RecipeRecord};
pub use error::{Error, Result};
pub use graph::{build_graph, GraphStore, Recipe, RecipeGraph, Tier, BASE_ELEMENTS};
pub use output::{RecipeReport, RenderMode, SearchSummary};
pub use path::{CraftPath, PathDefect, Step};
pub use pool::{run_batch, JobResult, JobResults, JobSubmitter, PoolConfig, SearchJob, WorkerPool};
pub use search::{
    search, SearchAlgorithm, SearchOutcome, SearchRequest, SearchStats, StrategyKind,
    DEFAULT_MAX_DEPTH, DEFAULT_MAX_PATHS,
};
