//! Health check handlers for liveness and readiness probes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health status response for liveness and readiness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// "ok" or "not_ready: <reason>".
    pub status: String,

    pub service: String,

    pub version: String,

    /// Elements in the current graph snapshot (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elements_loaded: Option<usize>,

    /// Recipes in the current graph snapshot (readiness only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipes_loaded: Option<usize>,
}

impl HealthStatus {
    pub fn alive(service: &str, version: &str) -> Self {
        Self {
            status: "ok".to_string(),
            service: service.to_string(),
            version: version.to_string(),
            elements_loaded: None,
            recipes_loaded: None,
        }
    }

    pub fn ready(service: &str, version: &str, elements: usize, recipes: usize) -> Self {
        Self {
            elements_loaded: Some(elements),
            recipes_loaded: Some(recipes),
            ..Self::alive(service, version)
        }
    }

    pub fn not_ready(service: &str, version: &str, reason: &str) -> Self {
        Self {
            status: format!("not_ready: {}", reason),
            ..Self::alive(service, version)
        }
    }
}

/// `GET /health/live`: 200 whenever the process is serving.
pub async fn health_live() -> impl IntoResponse {
    let status = HealthStatus::alive(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    (StatusCode::OK, Json(status))
}

/// `GET /health/ready`: 200 once the current snapshot has at least one
/// recipe, 503 otherwise.
///
/// ```text
/// GET /health/ready
/// {"status":"ok","service":"alchemy-service-shared","version":"0.1.0","elements_loaded":23,"recipes_loaded":20}
/// ```
pub async fn health_ready(State(state): State<AppState>) -> Response {
    let service = env!("CARGO_PKG_NAME");
    let version = env!("CARGO_PKG_VERSION");

    let graph = state.graph();
    if graph.is_empty() {
        let status = HealthStatus::not_ready(service, version, "no recipes loaded");
        return (StatusCode::SERVICE_UNAVAILABLE, Json(status)).into_response();
    }

    let status = HealthStatus::ready(
        service,
        version,
        graph.element_count(),
        graph.recipe_count(),
    );
    (StatusCode::OK, Json(status)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemy_lib::{PoolConfig, RecipeGraph};

    #[test]
    fn test_health_status_alive() {
        let status = HealthStatus::alive("search", "1.0.0");
        assert_eq!(status.status, "ok");
        assert!(status.elements_loaded.is_none());

        let json = serde_json::to_string(&status).unwrap();
        assert!(!json.contains("elements_loaded"));
    }

    #[test]
    fn test_health_status_ready() {
        let status = HealthStatus::ready("search", "1.0.0", 23, 20);
        assert_eq!(status.elements_loaded, Some(23));
        assert_eq!(status.recipes_loaded, Some(20));
    }

    #[test]
    fn test_health_status_not_ready() {
        let status = HealthStatus::not_ready("search", "1.0.0", "no data");
        assert!(status.status.starts_with("not_ready:"));
        assert!(status.status.contains("no data"));
    }

    #[tokio::test]
    async fn test_ready_handler_with_empty_graph() {
        let state = AppState::from_graph(RecipeGraph::default(), PoolConfig::with_workers(1));
        let response = health_ready(State(state)).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
