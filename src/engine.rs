//! # Ranking Engine
//! Holds the lexicon-backed parser, the raw catalog and its cached normalized
//! copy. Normalization happens once per catalog load, never per query.
//!
//! `EngineHandle` shares one engine across request handlers:
//! - queries take a read lock,
//! - reloads build a complete new engine first, then swap it in under a short
//!   write lock (single writer, copy-on-write),
//! - an optional polling thread reloads the catalog file when its mtime changes.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use metrics::{counter, histogram};
use tracing::{info, warn};

use crate::catalog::{load_catalog_file, StockRecord};
use crate::lexicon::Lexicon;
use crate::normalize::{normalize, NormalizedStockRecord};
use crate::query::{PreferenceVector, QueryParser};
use crate::ranker::{explain, rank_normalized, score_record, RankedResult, ScoreBreakdown};

/// Immutable ranking state for one catalog snapshot.
#[derive(Debug, Clone)]
pub struct RankingEngine {
    parser: QueryParser,
    catalog: Vec<StockRecord>,
    normalized: Vec<NormalizedStockRecord>,
}

impl RankingEngine {
    pub fn new(lexicon: Arc<Lexicon>, catalog: Vec<StockRecord>) -> Self {
        let normalized = normalize(&catalog);
        Self {
            parser: QueryParser::new(lexicon),
            catalog,
            normalized,
        }
    }

    /// Engine over the built-in lexicon.
    pub fn with_catalog(catalog: Vec<StockRecord>) -> Self {
        Self::new(Lexicon::shared(), catalog)
    }

    pub fn parse(&self, query: &str) -> PreferenceVector {
        self.parser.parse_query(query)
    }

    pub fn rank(&self, query: &str) -> Vec<RankedResult> {
        let vector = self.parse(query);
        rank_normalized(&vector, &self.normalized)
    }

    /// Parsed vector plus score breakdowns for the best `top` matches.
    pub fn explain(&self, query: &str, top: usize) -> (PreferenceVector, Vec<ScoreBreakdown>) {
        let vector = self.parse(query);
        let mut scored: Vec<(&NormalizedStockRecord, f64)> = self
            .normalized
            .iter()
            .map(|n| (n, score_record(&vector, n)))
            .filter(|(_, s)| *s > 0.0)
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        let breakdowns = scored
            .into_iter()
            .take(top)
            .map(|(n, _)| explain(&vector, n))
            .collect();
        (vector, breakdowns)
    }

    pub fn catalog(&self) -> &[StockRecord] {
        &self.catalog
    }

    pub fn normalized(&self) -> &[NormalizedStockRecord] {
        &self.normalized
    }

    /// New engine sharing this one's lexicon, over a different catalog.
    pub fn rebuilt_with(&self, catalog: Vec<StockRecord>) -> Self {
        Self {
            parser: self.parser.clone(),
            normalized: normalize(&catalog),
            catalog,
        }
    }
}

// Dev logging never records raw query text, only a short digest.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Thread-safe, cloneable access to the current engine.
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<RwLock<RankingEngine>>,
    dev_log: bool,
}

impl EngineHandle {
    pub fn new(engine: RankingEngine) -> Self {
        Self {
            inner: Arc::new(RwLock::new(engine)),
            dev_log: false,
        }
    }

    pub fn with_dev_log(mut self, on: bool) -> Self {
        self.dev_log = on;
        self
    }

    /// Rank the current catalog. A poisoned lock yields no results.
    pub fn rank(&self, query: &str) -> Vec<RankedResult> {
        let Ok(eng) = self.inner.read() else {
            warn!(target: "esg::engine", "engine lock poisoned, returning no results");
            return Vec::new();
        };
        let vector = eng.parse(query);
        let results = rank_normalized(&vector, eng.normalized());
        drop(eng);

        counter!("esg_queries_total").increment(1);
        histogram!("esg_query_results").record(results.len() as f64);

        if self.dev_log {
            let keys: Vec<&str> = vector.weights().map(|(k, _)| k).collect();
            info!(
                target: "esg::engine",
                id = %anon_hash(query),
                keys = ?keys,
                sectors = ?vector.specified_sectors(),
                matched = results.len(),
                "query ranked"
            );
        }
        results
    }

    pub fn parse(&self, query: &str) -> PreferenceVector {
        match self.inner.read() {
            Ok(eng) => eng.parse(query),
            Err(_) => PreferenceVector::new(),
        }
    }

    pub fn explain(&self, query: &str, top: usize) -> (PreferenceVector, Vec<ScoreBreakdown>) {
        match self.inner.read() {
            Ok(eng) => eng.explain(query, top),
            Err(_) => (PreferenceVector::new(), Vec::new()),
        }
    }

    pub fn catalog_len(&self) -> usize {
        self.inner.read().map(|e| e.catalog().len()).unwrap_or(0)
    }

    /// Swap in a new catalog. Normalization runs before the write lock is taken.
    pub fn replace_catalog(&self, catalog: Vec<StockRecord>) -> anyhow::Result<()> {
        let fresh = {
            let current = self
                .inner
                .read()
                .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
            current.rebuilt_with(catalog)
        };
        let records = fresh.catalog().len();
        let mut guard = self
            .inner
            .write()
            .map_err(|_| anyhow::anyhow!("engine lock poisoned"))?;
        *guard = fresh;
        drop(guard);

        counter!("esg_catalog_reloads_total").increment(1);
        info!(target: "esg::engine", records, "catalog swapped in");
        Ok(())
    }

    /// Load a catalog file and swap it in. Returns the new record count.
    pub fn reload_from(&self, path: &Path) -> anyhow::Result<usize> {
        let catalog = load_catalog_file(path)?;
        let n = catalog.len();
        self.replace_catalog(catalog)?;
        Ok(n)
    }
}

/// Poll `path` every `poll` and reload the catalog when its mtime moves forward.
pub fn start_hot_reload_thread(handle: EngineHandle, path: PathBuf, poll: Duration) {
    thread::spawn(move || {
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            match std::fs::metadata(&path).and_then(|m| m.modified()) {
                Ok(mtime) => {
                    let changed = match last_mtime {
                        None => {
                            last_mtime = Some(mtime);
                            false
                        }
                        Some(prev) => mtime > prev,
                    };
                    if changed {
                        if let Err(e) = handle.reload_from(&path) {
                            warn!(target: "esg::engine", error = %e, "hot reload failed");
                        }
                        last_mtime = Some(mtime);
                    }
                }
                Err(_) => {
                    // File missing or unreadable; keep trying.
                }
            }
            thread::sleep(poll);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Attribute;

    fn catalog() -> Vec<StockRecord> {
        vec![
            StockRecord::new("GRN", "Green Power")
                .with_sector("Utilities")
                .with(Attribute::EnvironmentScore, 9.0)
                .with(Attribute::OverallRisk, 10.0),
            StockRecord::new("OIL", "Oil Corp")
                .with_sector("Energy")
                .with(Attribute::EnvironmentScore, 1.0)
                .with(Attribute::OverallRisk, 40.0),
        ]
    }

    #[test]
    fn engine_ranks_against_cached_normalization() {
        let eng = RankingEngine::with_catalog(catalog());
        assert_eq!(eng.normalized().len(), 2);
        let out = eng.rank("green stocks");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].symbol, "GRN");
    }

    #[test]
    fn handle_swaps_catalog() {
        let h = EngineHandle::new(RankingEngine::with_catalog(catalog()));
        assert_eq!(h.catalog_len(), 2);
        h.replace_catalog(Vec::new()).unwrap();
        assert_eq!(h.catalog_len(), 0);
        assert!(h.rank("green").is_empty());
    }

    #[test]
    fn explain_matches_ranked_order() {
        let eng = RankingEngine::with_catalog(catalog());
        let (vector, rows) = eng.explain("high environmental", 5);
        assert_eq!(vector.get("environmentScore"), Some(1.0));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol, "GRN");
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("low risk");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("low risk"));
        assert_ne!(a, anon_hash("high risk"));
    }
}
