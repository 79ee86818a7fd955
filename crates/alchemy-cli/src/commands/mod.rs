// Module exports for CLI subcommands
//
// Each module handles a specific CLI subcommand. main.rs dispatches to these
// handlers, keeping the entry point focused on parsing and coordination.

pub mod batch;
pub mod recipes;
pub mod search;

use std::path::Path;

use anyhow::{Context, Result};

use alchemy_lib::{load_graph, resolve_dataset_path, RecipeGraph, SearchAlgorithm};

/// Locate and load the recipe dataset shared by every subcommand.
pub fn load_dataset(data_dir: Option<&Path>) -> Result<RecipeGraph> {
    let path = resolve_dataset_path(data_dir).context("failed to locate the recipe dataset")?;
    load_graph(&path).with_context(|| format!("failed to load dataset from {}", path.display()))
}

/// clap value parser for `--algorithm`.
pub fn parse_algorithm(value: &str) -> std::result::Result<SearchAlgorithm, String> {
    value.parse().map_err(|error: alchemy_lib::Error| error.to_string())
}
