//! Common test utilities and fixture helpers.

use std::collections::HashSet;
use std::path::PathBuf;

use alchemy_lib::{load_graph, RecipeGraph, BASE_ELEMENTS};

/// Path to the fixture recipe dataset shared by every crate's tests.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/recipes.json")
}

pub fn fixture_graph() -> RecipeGraph {
    load_graph(&fixture_path()).expect("fixture dataset loads")
}

#[allow(dead_code)]
pub fn base_leaves() -> HashSet<String> {
    BASE_ELEMENTS.iter().map(|base| base.to_string()).collect()
}
