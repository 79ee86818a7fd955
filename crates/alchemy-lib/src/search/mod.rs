//! Path search over the recipe graph.
//!
//! This module provides:
//! - [`SearchAlgorithm`] - Supported traversal orders (BFS, DFS)
//! - [`SearchRequest`] - High-level search request
//! - [`SearchOutcome`] - Paths found plus search statistics
//! - [`search`] - Main entry point for running a search
//!
//! # Strategy Pattern
//!
//! Each way of searching (single path, bidirectional, multi-path) is
//! encapsulated in a [`SearchStrategy`]. [`select_strategy`] picks one from
//! the request and [`search`] handles validation, the trivial targets, and
//! timing around it.
//!
//! # Example
//!
//! ```ignore
//! use alchemy_lib::{load_graph, search, SearchRequest};
//!
//! let graph = load_graph("path/to/recipes.json".as_ref())?;
//! let outcome = search(&graph, &SearchRequest::bfs("Life"))?;
//! for step in outcome.path().map(|p| p.rendered()).unwrap_or_default() {
//!     println!("{step}");
//! }
//! ```

mod bfs;
mod bidirectional;
mod dfs;
mod multi;
mod strategy;

pub use strategy::{
    select_strategy, BfsStrategy, BidirectionalStrategy, DfsStrategy, MultiBfsStrategy,
    MultiDfsStrategy, SearchStrategy,
};

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

use crate::error::{Error, Result};
use crate::graph::{is_base_element, normalize_element, RecipeGraph, BASE_ELEMENTS};
use crate::path::CraftPath;

/// Depth limit applied when a request does not set one. Depth-first strategies
/// treat it as a recursion valve, breadth-first ones as a level cap.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Number of paths requested by callers that ask for "several" without a count.
pub const DEFAULT_MAX_PATHS: usize = 3;

/// Supported traversal orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchAlgorithm {
    /// Breadth-first: fewest discovery levels.
    #[default]
    Bfs,
    /// Depth-first: first complete derivation in recipe order.
    Dfs,
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            SearchAlgorithm::Bfs => "bfs",
            SearchAlgorithm::Dfs => "dfs",
        };
        f.write_str(value)
    }
}

impl FromStr for SearchAlgorithm {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bfs" => Ok(SearchAlgorithm::Bfs),
            "dfs" => Ok(SearchAlgorithm::Dfs),
            _ => Err(Error::UnknownAlgorithm {
                name: value.to_string(),
            }),
        }
    }
}

/// Which strategy produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    Bfs,
    Dfs,
    BidirectionalBfs,
    BidirectionalDfs,
    MultiBfs,
    MultiDfs,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            StrategyKind::Bfs => "bfs",
            StrategyKind::Dfs => "dfs",
            StrategyKind::BidirectionalBfs => "bidirectional-bfs",
            StrategyKind::BidirectionalDfs => "bidirectional-dfs",
            StrategyKind::MultiBfs => "multi-bfs",
            StrategyKind::MultiDfs => "multi-dfs",
        };
        f.write_str(value)
    }
}

/// High-level search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub target: String,
    pub algorithm: SearchAlgorithm,
    /// Meet-in-the-middle search. Ignored when `max_paths` is set.
    pub bidirectional: bool,
    /// Elements treated as already available. Empty means the base elements.
    pub start_elements: Vec<String>,
    pub max_depth: Option<usize>,
    /// Enumerate up to this many distinct paths instead of returning one.
    pub max_paths: Option<usize>,
}

impl SearchRequest {
    pub fn new(target: impl Into<String>, algorithm: SearchAlgorithm) -> Self {
        Self {
            target: target.into(),
            algorithm,
            bidirectional: false,
            start_elements: Vec::new(),
            max_depth: None,
            max_paths: None,
        }
    }

    /// Convenience constructor for a single breadth-first path.
    pub fn bfs(target: impl Into<String>) -> Self {
        Self::new(target, SearchAlgorithm::Bfs)
    }

    /// Convenience constructor for a single depth-first path.
    pub fn dfs(target: impl Into<String>) -> Self {
        Self::new(target, SearchAlgorithm::Dfs)
    }

    pub fn with_bidirectional(mut self, bidirectional: bool) -> Self {
        self.bidirectional = bidirectional;
        self
    }

    pub fn with_max_paths(mut self, max_paths: usize) -> Self {
        self.max_paths = Some(max_paths);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub fn with_start_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_elements = elements.into_iter().map(Into::into).collect();
        self
    }

    fn validate(&self) -> Result<()> {
        if normalize_element(&self.target).is_empty() {
            return Err(Error::EmptyTarget);
        }
        if self.max_paths == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_paths",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_depth == Some(0) {
            return Err(Error::InvalidParameter {
                name: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Counters reported with every outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// Element discoveries or expansions, depending on the strategy.
    pub nodes_visited: usize,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Search result returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutcome {
    pub strategy: StrategyKind,
    pub target: String,
    pub found: bool,
    /// One path for single-path strategies, up to `max_paths` otherwise. A
    /// leaf target yields a single empty path.
    pub paths: Vec<CraftPath>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    /// The first path, if any was found.
    pub fn path(&self) -> Option<&CraftPath> {
        self.paths.first()
    }
}

/// Read-only inputs shared by every strategy for one search.
#[derive(Debug, Clone)]
pub struct SearchContext<'g> {
    pub graph: &'g RecipeGraph,
    pub target: String,
    /// Elements that need no derivation.
    pub leaves: HashSet<String>,
    pub max_depth: usize,
    pub max_paths: usize,
}

impl<'g> SearchContext<'g> {
    fn from_request(graph: &'g RecipeGraph, request: &SearchRequest) -> Self {
        let mut leaves: HashSet<String> = request
            .start_elements
            .iter()
            .map(|name| normalize_element(name))
            .filter(|name| !name.is_empty())
            .collect();
        if leaves.is_empty() {
            leaves = BASE_ELEMENTS.iter().map(|base| base.to_string()).collect();
        }

        Self {
            graph,
            target: normalize_element(&request.target),
            leaves,
            max_depth: request.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
            max_paths: request.max_paths.unwrap_or(1),
        }
    }

    pub fn is_leaf(&self, element: &str) -> bool {
        self.leaves.contains(element)
    }
}

/// Paths and work counter produced by one strategy run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTrace {
    pub paths: Vec<CraftPath>,
    pub nodes_visited: usize,
}

impl SearchTrace {
    pub(crate) fn found(path: CraftPath, nodes_visited: usize) -> Self {
        Self {
            paths: vec![path],
            nodes_visited,
        }
    }

    pub(crate) fn not_found(nodes_visited: usize) -> Self {
        Self {
            paths: Vec::new(),
            nodes_visited,
        }
    }
}

/// Run a search against `graph`.
///
/// Requests are validated first. Base and start elements resolve immediately
/// to an empty path; targets the graph does not know resolve to not-found
/// without traversal.
pub fn search(graph: &RecipeGraph, request: &SearchRequest) -> Result<SearchOutcome> {
    request.validate()?;
    let strategy = select_strategy(request);
    let ctx = SearchContext::from_request(graph, request);
    let started = Instant::now();

    let trace = if ctx.is_leaf(&ctx.target) || is_base_element(&ctx.target) {
        SearchTrace::found(CraftPath::new(), 1)
    } else if !graph.contains(&ctx.target) {
        debug!(target_element = %ctx.target, "target is not in the recipe graph");
        SearchTrace::not_found(0)
    } else {
        strategy.run(&ctx)
    };

    if tracing::enabled!(Level::DEBUG) {
        for path in &trace.paths {
            if let Err(defect) = path.verify(graph, &ctx.leaves, &ctx.target) {
                debug!(strategy = %strategy.kind(), %defect, "search produced an invalid path");
            }
        }
    }

    let outcome = SearchOutcome {
        strategy: strategy.kind(),
        target: ctx.target,
        found: !trace.paths.is_empty(),
        paths: trace.paths,
        stats: SearchStats {
            nodes_visited: trace.nodes_visited,
            elapsed: started.elapsed(),
        },
    };
    info!(
        strategy = %outcome.strategy,
        target_element = %outcome.target,
        found = outcome.found,
        paths = outcome.paths.len(),
        nodes_visited = outcome.stats.nodes_visited,
        "search complete"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RecipeRecord;
    use crate::graph::build_graph;

    fn graph() -> RecipeGraph {
        build_graph(&[
            RecipeRecord::new("energy", "fire", "air", 1),
            RecipeRecord::new("mud", "water", "earth", 1),
            RecipeRecord::new("life", "energy", "mud", 2),
        ])
    }

    #[test]
    fn algorithm_parses_case_insensitively() {
        assert_eq!("BFS".parse::<SearchAlgorithm>().unwrap(), SearchAlgorithm::Bfs);
        assert_eq!(" dfs ".parse::<SearchAlgorithm>().unwrap(), SearchAlgorithm::Dfs);
        assert!(matches!(
            "astar".parse::<SearchAlgorithm>(),
            Err(Error::UnknownAlgorithm { .. })
        ));
    }

    #[test]
    fn empty_target_is_rejected() {
        let error = search(&graph(), &SearchRequest::bfs("  ")).unwrap_err();
        assert!(matches!(error, Error::EmptyTarget));
    }

    #[test]
    fn zero_max_paths_is_rejected() {
        let error = search(&graph(), &SearchRequest::bfs("life").with_max_paths(0)).unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidParameter {
                name: "max_paths",
                ..
            }
        ));
    }

    #[test]
    fn base_target_short_circuits() {
        for base in BASE_ELEMENTS {
            let outcome = search(&graph(), &SearchRequest::dfs(base)).unwrap();
            assert!(outcome.found);
            assert_eq!(outcome.paths, vec![CraftPath::new()]);
            assert_eq!(outcome.stats.nodes_visited, 1);
        }
    }

    #[test]
    fn unknown_target_is_not_found() {
        let outcome = search(&graph(), &SearchRequest::bfs("unobtainium")).unwrap();
        assert!(!outcome.found);
        assert!(outcome.paths.is_empty());
        assert_eq!(outcome.stats.nodes_visited, 0);
    }

    #[test]
    fn target_is_normalized() {
        let outcome = search(&graph(), &SearchRequest::bfs(" Life ")).unwrap();
        assert_eq!(outcome.target, "life");
        assert!(outcome.found);
    }

    #[test]
    fn start_elements_act_as_leaves() {
        let request = SearchRequest::bfs("life").with_start_elements(["Energy", "mud"]);
        let outcome = search(&graph(), &request).unwrap();
        assert_eq!(
            outcome.path().unwrap().rendered(),
            vec!["energy + mud = life"]
        );
    }
}
