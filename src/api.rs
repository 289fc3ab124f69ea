use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::engine::EngineHandle;
use crate::query::PreferenceVector;
use crate::ranker::{RankedResult, ScoreBreakdown};

const DEFAULT_EXPLAIN_TOP: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    pub debug_routes: bool,
}

impl AppState {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            debug_routes: false,
        }
    }

    pub fn with_debug_routes(mut self, on: bool) -> Self {
        self.debug_routes = on;
        self
    }
}

pub fn router(state: AppState) -> Router {
    let mut r = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/query", get(query));

    if state.debug_routes {
        r = r
            .route("/debug/vector", get(debug_vector))
            .route("/debug/explain", get(debug_explain));
    }

    r.layer(CorsLayer::very_permissive()).with_state(state)
}

#[derive(Deserialize)]
struct QueryParams {
    #[serde(default)]
    query: String,
}

#[derive(Deserialize)]
struct ExplainParams {
    #[serde(default)]
    query: String,
    #[serde(default)]
    top: Option<usize>,
}

async fn query(
    State(state): State<AppState>,
    Query(q): Query<QueryParams>,
) -> Json<Vec<RankedResult>> {
    Json(state.engine.rank(&q.query))
}

async fn debug_vector(
    State(state): State<AppState>,
    Query(q): Query<QueryParams>,
) -> Json<PreferenceVector> {
    Json(state.engine.parse(&q.query))
}

#[derive(Serialize)]
struct ExplainOut {
    vector: PreferenceVector,
    results: Vec<ScoreBreakdown>,
}

async fn debug_explain(
    State(state): State<AppState>,
    Query(q): Query<ExplainParams>,
) -> Json<ExplainOut> {
    let top = q.top.unwrap_or(DEFAULT_EXPLAIN_TOP);
    let (vector, results) = state.engine.explain(&q.query, top);
    Json(ExplainOut { vector, results })
}
