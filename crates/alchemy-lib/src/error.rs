use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the alchemy library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Dataset could not be located at the resolved path.
    #[error("dataset not found at {path}")]
    DatasetNotFound { path: PathBuf },

    /// Dataset file exists but is not a valid list of recipe records.
    #[error("failed to parse dataset {path}: {source}")]
    DatasetParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Dataset parsed successfully but contained no usable records.
    #[error("dataset at {path} contains no recipes")]
    EmptyDataset { path: PathBuf },

    /// No suitable project directories could be resolved for this platform.
    #[error("failed to resolve project directories for the dataset")]
    ProjectDirsUnavailable,

    /// Raised when a search is requested without a target element.
    #[error("target element is required and cannot be empty")]
    EmptyTarget,

    /// Raised when a search strategy name is not recognised.
    #[error("unknown search algorithm '{name}'; expected one of: bfs, dfs")]
    UnknownAlgorithm { name: String },

    /// Raised when a numeric search parameter is out of range.
    #[error("invalid value for {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Raised when an element name could not be found in the recipe graph.
    #[error("Unknown element '{name}'{}", format_suggestions(.suggestions))]
    UnknownElement {
        name: String,
        suggestions: Vec<String>,
    },

    /// A pool job failed unexpectedly; the worker recovered and kept running.
    #[error("job {job_id} failed: {message}")]
    JobPanicked { job_id: u64, message: String },

    /// Raised when submitting to a worker pool whose workers have exited.
    #[error("worker pool is closed")]
    PoolClosed,

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the error was caused by caller input rather than by the engine.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::EmptyTarget | Error::UnknownAlgorithm { .. } | Error::InvalidParameter { .. }
        )
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
