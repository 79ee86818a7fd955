//! Shared infrastructure for alchemy HTTP microservices.
//!
//! This crate provides common functionality used by the service binaries:
//!
//! - [`AppState`]: The live recipe graph snapshot plus worker pool sizing
//! - [`health`]: Health check handlers for liveness/readiness probes
//! - [`ProblemDetails`]: RFC 9457 Problem Details for consistent error responses
//! - [`ServiceResponse`]: Wrapper for successful responses with content type
//! - [`logging`]: Structured JSON logging setup
//! - [`middleware`]: Request correlation IDs
//! - Request types with validation for each endpoint
//!
//! # Architecture
//!
//! The services follow a thin-handler pattern where all search logic resides
//! in `alchemy-lib`. This crate provides only HTTP glue:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  axum Handler                                               │
//! │  - Parse request JSON                                       │
//! │  - Validate parameters                                      │
//! │  - Call alchemy-lib APIs                                    │
//! │  - Format response                                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Testing Support
//!
//! The [`test_utils`] module provides a fixture-backed state for handler
//! testing. Enable the `test-utils` feature to access it from dependent crates.

#![deny(warnings)]

mod health;
pub mod logging;
pub mod middleware;
mod problem;
mod request;
mod response;
mod state;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use health::{health_live, health_ready, HealthStatus};
pub use logging::{init_logging, LogFormat, LoggingConfig};
pub use middleware::{extract_or_generate_request_id, RequestId, REQUEST_ID_HEADER};
pub use problem::{
    from_lib_error, ProblemDetails, PROBLEM_INTERNAL_ERROR, PROBLEM_INVALID_REQUEST,
    PROBLEM_SERVICE_UNAVAILABLE, PROBLEM_UNKNOWN_ELEMENT,
};
pub use request::{
    BatchSearchRequest, RecipeUpload, SearchApiRequest, Validate, MAX_BATCH_TARGETS,
};
pub use response::ServiceResponse;
pub use state::{AppState, AppStateError};
