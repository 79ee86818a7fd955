//! Recipes command handler for inspecting one element.

use std::path::Path;

use anyhow::Result;

use alchemy_cli::output::{render_recipes, OutputFormat};
use alchemy_lib::RecipeReport;

use super::load_dataset;

/// Handle the recipes subcommand.
///
/// Unknown names fail with close-match suggestions.
pub fn handle_recipes_command(
    element: &str,
    format: OutputFormat,
    data_dir: Option<&Path>,
) -> Result<()> {
    let graph = load_dataset(data_dir)?;
    let report = RecipeReport::from_graph(&graph, element)?;
    print!("{}", render_recipes(&report, format)?);
    Ok(())
}
