//! Search strategies implementing the Strategy pattern.
//!
//! This module provides the `SearchStrategy` trait and one implementation per
//! way of searching. [`select_strategy`] maps a request onto a strategy so the
//! `search` orchestrator never branches on request flags itself.

use super::bidirectional::FrontierOrder;
use super::{bfs, bidirectional, dfs, multi};
use super::{SearchAlgorithm, SearchContext, SearchRequest, SearchTrace, StrategyKind};

/// Trait for path search strategies.
pub trait SearchStrategy: Send + Sync {
    /// The identifier reported in outcomes.
    fn kind(&self) -> StrategyKind;

    /// Search for `ctx.target`. Leaf and unknown targets are handled before
    /// a strategy runs.
    fn run(&self, ctx: &SearchContext<'_>) -> SearchTrace;
}

/// Level-synchronous breadth-first search; the returned path uses the fewest
/// discovery levels.
#[derive(Debug, Clone, Default)]
pub struct BfsStrategy;

impl SearchStrategy for BfsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Bfs
    }

    fn run(&self, ctx: &SearchContext<'_>) -> SearchTrace {
        bfs::find_path(ctx)
    }
}

/// Backtracking depth-first search; returns the first derivation in recipe
/// order.
#[derive(Debug, Clone, Default)]
pub struct DfsStrategy;

impl SearchStrategy for DfsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Dfs
    }

    fn run(&self, ctx: &SearchContext<'_>) -> SearchTrace {
        dfs::find_path(ctx)
    }
}

/// Meet-in-the-middle search, forward from the leaves and backward from the
/// target.
#[derive(Debug, Clone)]
pub struct BidirectionalStrategy {
    algorithm: SearchAlgorithm,
}

impl BidirectionalStrategy {
    pub fn new(algorithm: SearchAlgorithm) -> Self {
        Self { algorithm }
    }
}

impl SearchStrategy for BidirectionalStrategy {
    fn kind(&self) -> StrategyKind {
        match self.algorithm {
            SearchAlgorithm::Bfs => StrategyKind::BidirectionalBfs,
            SearchAlgorithm::Dfs => StrategyKind::BidirectionalDfs,
        }
    }

    fn run(&self, ctx: &SearchContext<'_>) -> SearchTrace {
        let order = match self.algorithm {
            SearchAlgorithm::Bfs => FrontierOrder::Fifo,
            SearchAlgorithm::Dfs => FrontierOrder::Lifo,
        };
        bidirectional::find_path(ctx, order)
    }
}

/// Up to `max_paths` distinct paths via breadth-first discovery.
#[derive(Debug, Clone, Default)]
pub struct MultiBfsStrategy;

impl SearchStrategy for MultiBfsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiBfs
    }

    fn run(&self, ctx: &SearchContext<'_>) -> SearchTrace {
        multi::enumerate_bfs(ctx)
    }
}

/// Up to `max_paths` distinct paths via depth-first enumeration, one rayon
/// task per recipe of the target.
#[derive(Debug, Clone, Default)]
pub struct MultiDfsStrategy;

impl SearchStrategy for MultiDfsStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MultiDfs
    }

    fn run(&self, ctx: &SearchContext<'_>) -> SearchTrace {
        multi::enumerate_dfs(ctx)
    }
}

/// Select the strategy for a request.
///
/// `max_paths` takes precedence over `bidirectional`.
pub fn select_strategy(request: &SearchRequest) -> Box<dyn SearchStrategy> {
    match (request.max_paths, request.bidirectional, request.algorithm) {
        (Some(_), _, SearchAlgorithm::Bfs) => Box::new(MultiBfsStrategy),
        (Some(_), _, SearchAlgorithm::Dfs) => Box::new(MultiDfsStrategy),
        (None, true, algorithm) => Box::new(BidirectionalStrategy::new(algorithm)),
        (None, false, SearchAlgorithm::Bfs) => Box::new(BfsStrategy),
        (None, false, SearchAlgorithm::Dfs) => Box::new(DfsStrategy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_by_request_flags() {
        let cases = [
            (SearchRequest::bfs("x"), StrategyKind::Bfs),
            (SearchRequest::dfs("x"), StrategyKind::Dfs),
            (
                SearchRequest::bfs("x").with_bidirectional(true),
                StrategyKind::BidirectionalBfs,
            ),
            (
                SearchRequest::dfs("x").with_bidirectional(true),
                StrategyKind::BidirectionalDfs,
            ),
            (SearchRequest::bfs("x").with_max_paths(3), StrategyKind::MultiBfs),
            (
                SearchRequest::dfs("x")
                    .with_max_paths(3)
                    .with_bidirectional(true),
                StrategyKind::MultiDfs,
            ),
        ];
        for (request, expected) in cases {
            assert_eq!(select_strategy(&request).kind(), expected);
        }
    }
}
