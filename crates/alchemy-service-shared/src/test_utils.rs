//! Test utilities for microservice handler testing.
//!
//! Provides an [`AppState`] built from the checked-in recipe fixture.

use std::path::PathBuf;
use std::sync::OnceLock;

use alchemy_lib::{load_graph, PoolConfig, RecipeGraph};

use crate::middleware::RequestId;
use crate::state::AppState;

/// Path to the test fixture dataset.
pub const TEST_FIXTURE_PATH: &str =
    concat!(env!("CARGO_MANIFEST_DIR"), "/../../docs/fixtures/recipes.json");

static FIXTURE_GRAPH: OnceLock<RecipeGraph> = OnceLock::new();

/// A fresh `AppState` over the fixture graph with a two-worker pool.
///
/// The parsed graph is cached, but each call gets its own store, so tests
/// that upload recipes do not leak into each other.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded. This indicates a test
/// configuration issue.
pub fn test_state() -> AppState {
    let graph = FIXTURE_GRAPH.get_or_init(|| {
        let path = fixture_dataset_path();
        load_graph(&path)
            .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
    });
    AppState::from_graph(graph.clone(), PoolConfig::with_workers(2))
}

pub fn fixture_dataset_path() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_PATH)
}

/// Element names in the fixture, for use in tests.
pub mod fixture_elements {
    /// Tier 2, two admissible paths.
    pub const LIFE: &str = "life";

    /// Tier 4, needs both `wall` and `human`.
    pub const HOUSE: &str = "house";

    /// Only recipe uses itself as an ingredient.
    pub const PARADOX: &str = "paradox";

    /// Recipe ingredient `ectoplasm` is never produced.
    pub const GHOST: &str = "ghost";
}

pub fn test_request_id() -> String {
    format!("test-{}", RequestId::generate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_path_exists() {
        let path = fixture_dataset_path();
        assert!(path.exists(), "fixture dataset not found at {:?}", path);
    }

    #[test]
    fn test_state_contains_expected_elements() {
        let graph = test_state().graph();
        for element in [
            fixture_elements::LIFE,
            fixture_elements::HOUSE,
            fixture_elements::PARADOX,
            fixture_elements::GHOST,
        ] {
            assert!(graph.contains(element), "{element} should exist in fixture");
        }
    }

    #[test]
    fn test_states_do_not_share_stores() {
        let first = test_state();
        let second = test_state();
        first.replace_graph(RecipeGraph::default());
        assert!(!second.graph().is_empty());
    }

    #[test]
    fn test_request_id_unique() {
        assert_ne!(test_request_id(), test_request_id());
    }
}
