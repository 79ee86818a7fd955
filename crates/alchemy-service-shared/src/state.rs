//! Application state for HTTP microservices.
//!
//! Handlers share one [`GraphStore`]: searches read an `Arc` snapshot while a
//! recipe upload swaps in a freshly built graph.

use std::path::Path;
use std::sync::Arc;

use alchemy_lib::{load_graph, Error as LibError, GraphStore, PoolConfig, RecipeGraph};

/// Error during application state initialization.
#[derive(Debug)]
pub enum AppStateError {
    /// Failed to read or parse the recipe dataset.
    GraphLoad(LibError),

    /// Dataset file not found.
    DatasetNotFound(String),
}

impl std::fmt::Display for AppStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GraphLoad(e) => write!(f, "failed to load recipe graph: {}", e),
            Self::DatasetNotFound(path) => write!(f, "dataset not found: {}", path),
        }
    }
}

impl std::error::Error for AppStateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::GraphLoad(e) => Some(e),
            Self::DatasetNotFound(_) => None,
        }
    }
}

impl From<LibError> for AppStateError {
    fn from(err: LibError) -> Self {
        Self::GraphLoad(err)
    }
}

/// Shared application state for all axum handlers.
///
/// This struct is cheaply cloneable (using `Arc` internally) and should be
/// shared via axum's `State` extractor.
///
/// # Example
///
/// ```ignore
/// use axum::{Router, routing::post, extract::State};
/// use alchemy_service_shared::AppState;
///
/// async fn handler(State(state): State<AppState>) {
///     let graph = state.graph();
///     // ... search the snapshot
/// }
///
/// let state = AppState::load("path/to/recipes.json").unwrap();
/// let app = Router::new()
///     .route("/api/v1/search", post(handler))
///     .with_state(state);
/// ```
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<GraphStore>,
    pool: PoolConfig,
}

impl AppState {
    /// Load application state from a recipe dataset file.
    ///
    /// Pool sizing is read from `ALCHEMY_WORKERS` / `ALCHEMY_QUEUE_CAPACITY`.
    pub fn load(dataset_path: impl AsRef<Path>) -> Result<Self, AppStateError> {
        let dataset_path = dataset_path.as_ref();

        if !dataset_path.exists() {
            return Err(AppStateError::DatasetNotFound(
                dataset_path.display().to_string(),
            ));
        }

        tracing::info!(path = %dataset_path.display(), "loading recipe dataset");
        let graph = load_graph(dataset_path)?;
        tracing::info!(
            elements = graph.element_count(),
            recipes = graph.recipe_count(),
            "recipe graph built"
        );

        Ok(Self::from_graph(graph, PoolConfig::from_env()))
    }

    /// Create application state from an already built graph.
    pub fn from_graph(graph: RecipeGraph, pool: PoolConfig) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: Arc::new(GraphStore::new(graph)),
                pool,
            }),
        }
    }

    /// The snapshot new searches should read.
    pub fn graph(&self) -> Arc<RecipeGraph> {
        self.inner.store.snapshot()
    }

    /// The store itself, for handing to a worker pool.
    pub fn store(&self) -> Arc<GraphStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn pool_config(&self) -> PoolConfig {
        self.inner.pool
    }

    /// Swap in a new graph. Searches already running keep their snapshot.
    pub fn replace_graph(&self, graph: RecipeGraph) -> Arc<RecipeGraph> {
        self.inner.store.replace(graph)
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let graph = self.graph();
        f.debug_struct("AppState")
            .field("element_count", &graph.element_count())
            .field("recipe_count", &graph.recipe_count())
            .field("workers", &self.inner.pool.workers)
            .finish()
    }
}
