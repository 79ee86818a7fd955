use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{build_graph, RecipeGraph, Tier};

/// Default filename for the recipe dataset.
pub const DATASET_FILENAME: &str = "recipes.json";

/// Environment variable that overrides the dataset location.
pub const DATASET_ENV_VAR: &str = "ALCHEMY_DATASET";

/// One row of the scraped recipe dataset.
///
/// Field names follow the scraper's JSON output. Image URLs are carried by the
/// file but not needed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRecord {
    #[serde(rename = "Element")]
    pub element: String,
    #[serde(rename = "Ingredient1")]
    pub first: String,
    #[serde(rename = "Ingredient2")]
    pub second: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl RecipeRecord {
    pub fn new(
        element: impl Into<String>,
        first: impl Into<String>,
        second: impl Into<String>,
        tier: Tier,
    ) -> Self {
        Self {
            element: element.into(),
            first: first.into(),
            second: second.into(),
            tier: Some(tier),
        }
    }
}

/// Resolve the default dataset location using platform-specific project directories.
pub fn default_dataset_path() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("dev", "alchemy", "alchemy").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(DATASET_FILENAME))
}

/// Resolve which dataset file to load.
///
/// Precedence: the explicit `target` (a file, or a directory holding
/// `recipes.json`), then `ALCHEMY_DATASET`, then the platform data directory.
pub fn resolve_dataset_path(target: Option<&Path>) -> Result<PathBuf> {
    let candidate = match target {
        Some(path) if path.is_dir() => path.join(DATASET_FILENAME),
        Some(path) => path.to_path_buf(),
        None => match env::var_os(DATASET_ENV_VAR) {
            Some(value) if !value.is_empty() => PathBuf::from(value),
            _ => default_dataset_path()?,
        },
    };

    debug!(path = %candidate.display(), "resolved dataset path");
    if !candidate.is_file() {
        return Err(Error::DatasetNotFound { path: candidate });
    }
    Ok(candidate)
}

/// Read recipe records from a JSON dataset file.
pub fn load_records(path: &Path) -> Result<Vec<RecipeRecord>> {
    if !path.exists() {
        return Err(Error::DatasetNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    parse_records(&contents).map_err(|source| Error::DatasetParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse recipe records from JSON text.
pub fn parse_records(contents: &str) -> std::result::Result<Vec<RecipeRecord>, serde_json::Error> {
    serde_json::from_str(contents)
}

/// Load a dataset file and build its recipe graph.
///
/// A dataset without records is fatal: nothing can be searched without a graph.
pub fn load_graph(path: &Path) -> Result<RecipeGraph> {
    let records = load_records(path)?;
    if records.is_empty() {
        return Err(Error::EmptyDataset {
            path: path.to_path_buf(),
        });
    }
    let graph = build_graph(&records);
    info!(
        path = %path.display(),
        records = records.len(),
        elements = graph.element_count(),
        "recipe dataset loaded"
    );
    Ok(graph)
}
