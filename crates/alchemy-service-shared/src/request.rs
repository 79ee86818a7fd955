//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use alchemy_lib::{
    build_graph, RecipeGraph, RecipeRecord, SearchAlgorithm, SearchRequest, DEFAULT_MAX_PATHS,
};

use crate::ProblemDetails;

/// Upper bound on targets accepted by one batch request.
pub const MAX_BATCH_TARGETS: usize = 256;

/// Validation trait for request types.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// Body of `POST /api/v1/search`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchApiRequest {
    /// Element to craft.
    pub target: String,

    /// "bfs" (default) or "dfs", case-insensitive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    #[serde(default)]
    pub bidirectional: bool,

    /// Elements to start from instead of the base elements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Enumerate up to this many distinct paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_paths: Option<usize>,

    /// Enumerate `DEFAULT_MAX_PATHS` paths when `max_paths` is absent.
    #[serde(default)]
    pub multiple: bool,
}

impl SearchApiRequest {
    /// Build the library request. Call after [`Validate::validate`].
    pub fn to_search_request(&self) -> alchemy_lib::Result<SearchRequest> {
        let algorithm = parse_algorithm(self.algorithm.as_deref())?;
        Ok(SearchRequest {
            target: self.target.clone(),
            algorithm,
            bidirectional: self.bidirectional,
            start_elements: self.start.clone(),
            max_depth: self.max_depth,
            max_paths: self.max_paths.or(self.multiple.then_some(DEFAULT_MAX_PATHS)),
        })
    }
}

impl Validate for SearchApiRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.target.trim().is_empty() {
            return Err(bad_request(
                "The 'target' field is required and cannot be empty",
                request_id,
            ));
        }

        if self.start.iter().any(|element| element.trim().is_empty()) {
            return Err(bad_request(
                "The 'start' field cannot contain empty element names",
                request_id,
            ));
        }

        validate_algorithm(self.algorithm.as_deref(), request_id)?;
        validate_positive("max_depth", self.max_depth, request_id)?;
        validate_positive("max_paths", self.max_paths, request_id)
    }
}

/// Body of `POST /api/v1/search/batch`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSearchRequest {
    pub targets: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_paths: Option<usize>,
}

impl BatchSearchRequest {
    /// One library request per target, in order. Individual targets are not
    /// checked here: a blank one fails as its own job.
    pub fn to_search_requests(&self) -> alchemy_lib::Result<Vec<SearchRequest>> {
        let algorithm = parse_algorithm(self.algorithm.as_deref())?;
        Ok(self
            .targets
            .iter()
            .map(|target| SearchRequest {
                max_paths: self.max_paths,
                ..SearchRequest::new(target.clone(), algorithm)
            })
            .collect())
    }
}

impl Validate for BatchSearchRequest {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.targets.is_empty() {
            return Err(bad_request(
                "The 'targets' field must list at least one element",
                request_id,
            ));
        }

        if self.targets.len() > MAX_BATCH_TARGETS {
            return Err(bad_request(
                format!(
                    "The 'targets' field accepts at most {} elements (got {})",
                    MAX_BATCH_TARGETS,
                    self.targets.len()
                ),
                request_id,
            ));
        }

        validate_algorithm(self.algorithm.as_deref(), request_id)?;
        validate_positive("max_paths", self.max_paths, request_id)
    }
}

/// Body of `POST /api/v1/recipes`: a complete replacement dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeUpload(pub Vec<RecipeRecord>);

impl RecipeUpload {
    pub fn build_graph(&self) -> RecipeGraph {
        build_graph(&self.0)
    }
}

impl Validate for RecipeUpload {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        if self.0.is_empty() {
            return Err(bad_request(
                "The recipe list must contain at least one record",
                request_id,
            ));
        }
        Ok(())
    }
}

fn parse_algorithm(value: Option<&str>) -> alchemy_lib::Result<SearchAlgorithm> {
    value.map_or(Ok(SearchAlgorithm::default()), str::parse)
}

fn validate_algorithm(value: Option<&str>, request_id: &str) -> Result<(), Box<ProblemDetails>> {
    parse_algorithm(value)
        .map(|_| ())
        .map_err(|e| bad_request(e.to_string(), request_id))
}

fn validate_positive(
    field: &str,
    value: Option<usize>,
    request_id: &str,
) -> Result<(), Box<ProblemDetails>> {
    if value == Some(0) {
        return Err(bad_request(
            format!("The '{}' field must be a positive integer", field),
            request_id,
        ));
    }
    Ok(())
}

fn bad_request(detail: impl Into<String>, request_id: &str) -> Box<ProblemDetails> {
    Box::new(ProblemDetails::bad_request(detail, request_id))
}
