//! Search command handler for finding crafting paths to one element.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use alchemy_lib::{search, SearchAlgorithm, SearchRequest, SearchSummary, DEFAULT_MAX_PATHS};
use alchemy_cli::output::{render_search, OutputFormat};
use alchemy_cli::terminal::ColorPalette;

use super::load_dataset;

/// Arguments for the search command.
#[derive(Debug, Clone)]
pub struct SearchCommandArgs {
    pub target: String,
    pub algorithm: SearchAlgorithm,
    pub bidirectional: bool,
    pub max_paths: Option<usize>,
    /// Enumerate `DEFAULT_MAX_PATHS` paths when `max_paths` is unset.
    pub multi: bool,
    pub max_depth: Option<usize>,
    pub start: Vec<String>,
}

impl SearchCommandArgs {
    /// Convert CLI args to a library SearchRequest.
    pub fn to_request(&self) -> SearchRequest {
        SearchRequest {
            target: self.target.clone(),
            algorithm: self.algorithm,
            bidirectional: self.bidirectional,
            start_elements: self.start.clone(),
            max_depth: self.max_depth,
            max_paths: self
                .max_paths
                .or(self.multi.then_some(DEFAULT_MAX_PATHS)),
        }
    }
}

/// Handle the search subcommand.
pub fn handle_search_command(
    args: &SearchCommandArgs,
    format: OutputFormat,
    data_dir: Option<&Path>,
) -> Result<()> {
    let graph = load_dataset(data_dir)?;
    if !args.target.trim().is_empty() {
        if let Err(error) = graph.resolve(&args.target) {
            warn!("{error}");
        }
    }

    let outcome = search(&graph, &args.to_request())
        .with_context(|| format!("search for '{}' failed", args.target))?;
    let summary = SearchSummary::from_outcome(&outcome);
    print!("{}", render_search(&summary, format, &ColorPalette::detect())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> SearchCommandArgs {
        SearchCommandArgs {
            target: "life".to_string(),
            algorithm: SearchAlgorithm::Dfs,
            bidirectional: false,
            max_paths: None,
            multi: false,
            max_depth: None,
            start: Vec::new(),
        }
    }

    #[test]
    fn multi_flag_uses_default_path_count() {
        let mut args = args();
        assert_eq!(args.to_request().max_paths, None);

        args.multi = true;
        assert_eq!(args.to_request().max_paths, Some(DEFAULT_MAX_PATHS));

        args.max_paths = Some(7);
        assert_eq!(args.to_request().max_paths, Some(7));
    }
}
