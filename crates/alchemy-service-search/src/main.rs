//! Recipe path search HTTP microservice.
//!
//! # Endpoints
//!
//! - `POST /api/v1/search` - Find one or several crafting paths to an element
//! - `POST /api/v1/search/batch` - Search many targets on the worker pool
//! - `POST /api/v1/recipes` - Replace the recipe dataset without a restart
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//!
//! # Configuration
//!
//! - `ALCHEMY_DATASET` - Path to the recipes.json file (default: /data/recipes.json)
//! - `ALCHEMY_WORKERS` / `ALCHEMY_QUEUE_CAPACITY` - Batch worker pool sizing
//! - `RUST_LOG` - Log level (default: info)
//! - `LOG_FORMAT` - Log format: json (default) or text
//! - `SERVICE_PORT` - HTTP port (default: 8080)

use std::env;
use std::net::SocketAddr;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use alchemy_lib::dataset::DATASET_ENV_VAR;
use alchemy_lib::{run_batch, search, JobResult, SearchSummary};
use alchemy_service_shared::{
    extract_or_generate_request_id, from_lib_error, health_live, health_ready, init_logging,
    AppState, BatchSearchRequest, LoggingConfig, ProblemDetails, RecipeUpload, SearchApiRequest,
    ServiceResponse, Validate,
};

const DEFAULT_DATASET_PATH: &str = "/data/recipes.json";
const DEFAULT_PORT: u16 = 8080;

/// One target's entry in a batch response.
#[derive(Debug, Serialize)]
struct BatchItem {
    id: u64,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<SearchSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BatchItem {
    fn from_job(job: JobResult, targets: &[String]) -> Self {
        let target = usize::try_from(job.id)
            .ok()
            .and_then(|index| targets.get(index))
            .cloned()
            .unwrap_or_default();
        let (result, error) = match job.outcome {
            Ok(outcome) => (Some(SearchSummary::from_outcome(&outcome)), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            id: job.id,
            target,
            result,
            error,
        }
    }
}

#[derive(Debug, Serialize)]
struct BatchResponse {
    results: Vec<BatchItem>,
    failed: usize,
}

#[derive(Debug, Serialize)]
struct ReloadResponse {
    records: usize,
    elements: usize,
    recipes: usize,
}

/// HTTP response - either success or RFC 9457 error.
#[derive(Debug)]
enum ApiResponse<T> {
    Success(ServiceResponse<T>),
    Error(ProblemDetails),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiResponse::Success(data) => (StatusCode::OK, Json(data)).into_response(),
            ApiResponse::Error(problem) => problem.into_response(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging_config = LoggingConfig::from_env().with_service("search");
    init_logging(&logging_config);

    let data_path =
        env::var(DATASET_ENV_VAR).unwrap_or_else(|_| DEFAULT_DATASET_PATH.to_string());
    let port: u16 = env::var("SERVICE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    info!(data_path = %data_path, port = port, "starting search service");

    let state = AppState::load(&data_path).map_err(|e| {
        error!(error = %e, path = %data_path, "failed to load application state");
        e
    })?;
    info!(state = ?state, "application state loaded");

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(addr = %addr, "listening on");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/search", post(search_handler))
        .route("/api/v1/search/batch", post(batch_handler))
        .route("/api/v1/recipes", post(recipes_handler))
        .route("/health/live", get(health_live))
        .route("/health/ready", get(health_ready))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle POST /api/v1/search requests.
async fn search_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SearchApiRequest>,
) -> ApiResponse<SearchSummary> {
    let request_id = extract_or_generate_request_id(&headers);

    info!(
        request_id = %request_id,
        target = %request.target,
        algorithm = ?request.algorithm,
        bidirectional = request.bidirectional,
        max_paths = ?request.max_paths,
        "handling search request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        return ApiResponse::Error(*problem);
    }
    let lib_request = match request.to_search_request() {
        Ok(lib_request) => lib_request,
        Err(e) => return ApiResponse::Error(from_lib_error(&e, request_id.as_str())),
    };

    let graph = state.graph();
    if let Err(e) = graph.resolve(&lib_request.target) {
        warn!(request_id = %request_id, "{e}");
    }

    let joined =
        tokio::task::spawn_blocking(move || search(graph.as_ref(), &lib_request)).await;
    let outcome = match joined {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!(request_id = %request_id, error = %e, "search rejected");
            return ApiResponse::Error(from_lib_error(&e, request_id.as_str()));
        }
        Err(e) => {
            error!(request_id = %request_id, error = %e, "search task failed");
            return ApiResponse::Error(ProblemDetails::internal_error(
                "search task failed",
                request_id.as_str(),
            ));
        }
    };

    let summary = SearchSummary::from_outcome(&outcome);
    info!(
        request_id = %request_id,
        found = summary.found,
        strategy = %summary.strategy,
        nodes_visited = summary.nodes_visited,
        elapsed_ms = summary.elapsed_ms,
        "search completed"
    );

    ApiResponse::Success(ServiceResponse::new(summary))
}

/// Handle POST /api/v1/search/batch requests.
async fn batch_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchSearchRequest>,
) -> ApiResponse<BatchResponse> {
    let request_id = extract_or_generate_request_id(&headers);

    info!(
        request_id = %request_id,
        targets = request.targets.len(),
        algorithm = ?request.algorithm,
        "handling batch search request"
    );

    if let Err(problem) = request.validate(request_id.as_str()) {
        return ApiResponse::Error(*problem);
    }
    let requests = match request.to_search_requests() {
        Ok(requests) => requests,
        Err(e) => return ApiResponse::Error(from_lib_error(&e, request_id.as_str())),
    };

    let jobs = run_batch(state.store(), state.pool_config(), requests).await;
    let results: Vec<BatchItem> = jobs
        .into_iter()
        .map(|job| BatchItem::from_job(job, &request.targets))
        .collect();
    let failed = results.iter().filter(|item| item.error.is_some()).count();

    info!(
        request_id = %request_id,
        jobs = results.len(),
        failed,
        "batch search completed"
    );

    ApiResponse::Success(ServiceResponse::new(BatchResponse { results, failed }))
}

/// Handle POST /api/v1/recipes: rebuild the graph and swap the snapshot.
async fn recipes_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(upload): Json<RecipeUpload>,
) -> ApiResponse<ReloadResponse> {
    let request_id = extract_or_generate_request_id(&headers);

    if let Err(problem) = upload.validate(request_id.as_str()) {
        return ApiResponse::Error(*problem);
    }

    let graph = upload.build_graph();
    if graph.is_empty() {
        return ApiResponse::Error(ProblemDetails::bad_request(
            "No usable recipes in the upload",
            request_id.as_str(),
        ));
    }

    let response = ReloadResponse {
        records: upload.0.len(),
        elements: graph.element_count(),
        recipes: graph.recipe_count(),
    };
    state.replace_graph(graph);

    info!(
        request_id = %request_id,
        records = response.records,
        elements = response.elements,
        recipes = response.recipes,
        "recipe dataset replaced"
    );

    ApiResponse::Success(ServiceResponse::new(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alchemy_service_shared::test_utils::{fixture_elements, test_state};
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server() -> TestServer {
        TestServer::new(build_router(test_state())).unwrap()
    }

    #[tokio::test]
    async fn search_returns_single_path() {
        let response = server()
            .post("/api/v1/search")
            .json(&json!({ "target": "Life" }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["found"], true);
        assert_eq!(body["strategy"], "bfs");
        assert_eq!(body["content_type"], "application/json");
        let steps = body["steps"].as_array().unwrap();
        assert_eq!(steps.last().unwrap(), "energy + mud = life");
        assert!(body.get("paths").is_none());
    }

    #[tokio::test]
    async fn search_enumerates_paths() {
        let response = server()
            .post("/api/v1/search")
            .json(&json!({ "target": fixture_elements::LIFE, "algorithm": "dfs", "max_paths": 5 }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["strategy"], "multi-dfs");
        assert_eq!(body["paths"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bidirectional_dfs_is_reported() {
        let response = server()
            .post("/api/v1/search")
            .json(&json!({ "target": fixture_elements::HOUSE, "algorithm": "dfs", "bidirectional": true }))
            .await;
        let body: Value = response.json();
        assert_eq!(body["found"], true);
        assert_eq!(body["strategy"], "bidirectional-dfs");
    }

    #[tokio::test]
    async fn uncraftable_target_is_not_an_error() {
        let response = server()
            .post("/api/v1/search")
            .json(&json!({ "target": fixture_elements::GHOST }))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["found"], false);
    }

    #[tokio::test]
    async fn invalid_search_is_a_problem_document() {
        let response = server()
            .post("/api/v1/search")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-bad"),
            )
            .json(&json!({ "target": "life", "algorithm": "astar" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body: Value = response.json();
        assert_eq!(body["type"], "/problems/invalid-request");
        assert_eq!(body["instance"], "req-bad");
    }

    #[tokio::test]
    async fn batch_keeps_job_order_and_reports_failures() {
        let response = server()
            .post("/api/v1/search/batch")
            .json(&json!({ "targets": ["house", "", "life", "paradox"] }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        let results = body["results"].as_array().unwrap();
        let ids: Vec<u64> = results.iter().map(|r| r["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(body["failed"], 1);
        assert!(results[1]["error"].as_str().unwrap().contains("target"));
        assert_eq!(results[2]["result"]["found"], true);
        assert_eq!(results[3]["result"]["found"], false);
    }

    #[tokio::test]
    async fn empty_batch_is_rejected() {
        let response = server()
            .post("/api/v1/search/batch")
            .json(&json!({ "targets": [] }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn recipe_upload_replaces_graph() {
        let server = server();
        let response = server
            .post("/api/v1/recipes")
            .json(&json!([
                { "Element": "Steam", "Ingredient1": "Fire", "Ingredient2": "Water", "Type": 1 },
                { "Element": "Cloud", "Ingredient1": "Steam", "Ingredient2": "Air", "Type": 2 }
            ]))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["recipes"], 2);

        let cloud = server
            .post("/api/v1/search")
            .json(&json!({ "target": "cloud" }))
            .await;
        assert_eq!(cloud.json::<Value>()["found"], true);

        let life = server
            .post("/api/v1/search")
            .json(&json!({ "target": "life" }))
            .await;
        assert_eq!(life.json::<Value>()["found"], false);
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let response = server().post("/api/v1/recipes").json(&json!([])).await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_probes() {
        let server = server();
        server.get("/health/live").await.assert_status_ok();

        let ready = server.get("/health/ready").await;
        ready.assert_status_ok();
        assert!(ready.json::<Value>()["recipes_loaded"].as_u64().unwrap() > 0);
    }
}
