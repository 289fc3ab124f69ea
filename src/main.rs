//! ESG Stock Ranker: binary entrypoint.
//! Loads config and catalog, builds the ranking engine, and serves the Axum router.

use esg_stock_ranker::config::AppConfig;
use esg_stock_ranker::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact tracing logs; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("esg=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = AppConfig::load()?;

    let metrics = if cfg.debug_routes {
        match Metrics::init() {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!(error = %e, "metrics disabled");
                None
            }
        }
    } else {
        None
    };

    let router = esg_stock_ranker::build_app(&cfg, metrics.as_ref());
    Ok(router.into())
}
