// src/lib.rs
// Public library surface for the service binary, the demo bin and integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod lexicon;
pub mod metrics;
pub mod normalize;
pub mod query;
pub mod ranker;
pub mod tokenizer;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::catalog::{load_catalog_file, load_catalog_str, Attribute, StockRecord};
pub use crate::engine::{EngineHandle, RankingEngine};
pub use crate::lexicon::Lexicon;
pub use crate::normalize::{normalize, NormalizedStockRecord};
pub use crate::query::{parse_query, PreferenceVector, QueryParser};
pub use crate::ranker::{rank, RankedResult};
pub use crate::tokenizer::tokenize;

use tracing::{info, warn};

use crate::config::AppConfig;
use crate::engine::start_hot_reload_thread;
use shuttle_axum::axum::Router;

/// Build the full application router from resolved config.
/// A missing or unreadable catalog starts the service with an empty catalog.
pub fn build_app(cfg: &AppConfig, metrics: Option<&crate::metrics::Metrics>) -> Router {
    let catalog = match load_catalog_file(&cfg.catalog_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "starting with an empty catalog");
            Vec::new()
        }
    };
    info!(records = catalog.len(), "ranking engine ready");

    let handle = EngineHandle::new(RankingEngine::with_catalog(catalog)).with_dev_log(cfg.dev_log);

    if cfg.hot_reload {
        start_hot_reload_thread(
            handle.clone(),
            cfg.catalog_path.clone(),
            cfg.hot_reload_poll(),
        );
    }

    let state = api::AppState::new(handle).with_debug_routes(cfg.debug_routes);
    let app = router(state);

    match metrics {
        Some(m) if cfg.debug_routes => app.merge(m.router()),
        _ => app,
    }
}
