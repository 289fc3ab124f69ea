//! # Scorer / Ranker
//! Pure scoring of normalized records against a `PreferenceVector`.
//!
//! score = Σ(weight · value) / Σ|weight| over vector keys the record actually has.
//! Keys missing from a record are skipped in both sums. A sector filter, when
//! present, zeroes every record outside the named sectors. Only scores > 0 survive,
//! sorted descending with catalog order kept for ties.

use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

use crate::catalog::{Attribute, StockRecord};
use crate::normalize::{normalize, NormalizedStockRecord};
use crate::query::{PreferenceVector, QueryParser};

/// Sector label reported when a record has none.
pub const UNKNOWN_SECTOR: &str = "Unknown";

/// One row of the ranked output. ESG figures are raw catalog values, not normalized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub symbol: String,
    pub name: String,
    pub score: f64,
    pub sector: String,
    #[serde(rename = "environmentScore")]
    pub environment_score: f64,
    #[serde(rename = "socialScore")]
    pub social_score: f64,
    #[serde(rename = "governanceScore")]
    pub governance_score: f64,
    #[serde(rename = "totalEsg")]
    pub total_esg: f64,
    #[serde(rename = "overallRisk")]
    pub overall_risk: i64,
}

impl RankedResult {
    fn from_record(raw: &StockRecord, score: f64) -> Self {
        Self {
            symbol: raw.symbol.clone(),
            name: raw.full_name.clone(),
            score,
            sector: raw
                .sector
                .clone()
                .unwrap_or_else(|| UNKNOWN_SECTOR.to_string()),
            environment_score: raw.value_or_zero(Attribute::EnvironmentScore),
            social_score: raw.value_or_zero(Attribute::SocialScore),
            governance_score: raw.value_or_zero(Attribute::GovernanceScore),
            total_esg: raw.value_or_zero(Attribute::TotalEsg),
            // truncation toward zero
            overall_risk: raw.value_or_zero(Attribute::OverallRisk) as i64,
        }
    }
}

/// True when the vector carries no sector filter or the record's sector is named by it.
pub fn passes_sector_filter(vector: &PreferenceVector, record: &NormalizedStockRecord) -> bool {
    match vector.specified_sectors() {
        None => true,
        Some(sectors) => {
            let label = record.sector().unwrap_or_default().to_lowercase();
            sectors.iter().any(|s| *s == label)
        }
    }
}

/// (attribute, weight, normalized value) for every weighted key present in the record.
fn weighted_terms<'a>(
    vector: &'a PreferenceVector,
    record: &'a NormalizedStockRecord,
) -> impl Iterator<Item = (Attribute, f64, f64)> + 'a {
    vector.weights().filter_map(move |(key, weight)| {
        if weight == 0.0 {
            return None;
        }
        let attr = Attribute::from_key(key)?;
        record.get(attr).map(|value| (attr, weight, value))
    })
}

/// Weighted match score of one record; 0.0 when filtered out or nothing applies.
pub fn score_record(vector: &PreferenceVector, record: &NormalizedStockRecord) -> f64 {
    if !passes_sector_filter(vector, record) {
        return 0.0;
    }

    let mut score = 0.0;
    let mut total_weight = 0.0;
    for (_, weight, value) in weighted_terms(vector, record) {
        score += weight * value;
        total_weight += weight.abs();
    }

    if total_weight > 0.0 {
        score / total_weight
    } else {
        0.0
    }
}

/// Score every record, keep those above zero, sort descending (stable).
pub fn rank_normalized(
    vector: &PreferenceVector,
    catalog: &[NormalizedStockRecord],
) -> Vec<RankedResult> {
    let mut results: Vec<RankedResult> = catalog
        .iter()
        .filter_map(|rec| {
            let score = score_record(vector, rec);
            (score > 0.0).then(|| RankedResult::from_record(rec.source(), score))
        })
        .collect();

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    debug!(
        target: "esg::ranker",
        candidates = catalog.len(),
        matched = results.len(),
        "ranked catalog"
    );
    results
}

/// One-shot ranking: parse, normalize and score. Prefer `RankingEngine` when
/// serving repeated queries so normalization is cached.
pub fn rank(parser: &QueryParser, catalog: &[StockRecord], query: &str) -> Vec<RankedResult> {
    let vector = parser.parse_query(query);
    rank_normalized(&vector, &normalize(catalog))
}

/* ----------------------------
Explanations
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

/// A single field's share of a record's score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub field: &'static str,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
    pub direction: Direction,
}

/// Per-field breakdown whose contributions sum to `score`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub symbol: String,
    pub score: f64,
    pub total_weight: f64,
    pub sector_filtered: bool,
    pub contributions: Vec<Contribution>,
}

pub fn explain(vector: &PreferenceVector, record: &NormalizedStockRecord) -> ScoreBreakdown {
    if !passes_sector_filter(vector, record) {
        return ScoreBreakdown {
            symbol: record.symbol().to_string(),
            score: 0.0,
            total_weight: 0.0,
            sector_filtered: true,
            contributions: Vec::new(),
        };
    }

    let terms: Vec<_> = weighted_terms(vector, record).collect();
    let total_weight: f64 = terms.iter().map(|(_, w, _)| w.abs()).sum();

    let contributions: Vec<Contribution> = terms
        .into_iter()
        .map(|(attr, weight, value)| Contribution {
            field: attr.key(),
            value,
            weight,
            contribution: if total_weight > 0.0 {
                weight * value / total_weight
            } else {
                0.0
            },
            direction: if weight > 0.0 {
                Direction::HigherIsBetter
            } else {
                Direction::LowerIsBetter
            },
        })
        .collect();

    ScoreBreakdown {
        symbol: record.symbol().to_string(),
        score: contributions.iter().map(|c| c.contribution).sum(),
        total_weight,
        sector_filtered: false,
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_query;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn utility(risk: f64, env: f64) -> NormalizedStockRecord {
        NormalizedStockRecord::from_normalized(
            StockRecord::new("UTL", "Utility Co")
                .with_sector("Utilities")
                .with(Attribute::OverallRisk, 27.9)
                .with(Attribute::EnvironmentScore, 11.0),
            [
                (Attribute::OverallRisk, risk),
                (Attribute::EnvironmentScore, env),
            ],
        )
    }

    #[test]
    fn weighted_average_over_present_keys() {
        let v = parse_query("Find stocks with low risk and high environmental scores");
        let s = score_record(&v, &utility(0.3, 0.8));
        assert!(close(s, 0.25));
    }

    #[test]
    fn absent_keys_are_skipped_not_zeroed() {
        let v = parse_query("green and strong community");
        let rec = NormalizedStockRecord::from_normalized(
            StockRecord::new("A", "A"),
            [(Attribute::EnvironmentScore, 0.6)],
        );
        // socialScore missing: only environmentScore counts
        assert!(close(score_record(&v, &rec), 0.6));
    }

    #[test]
    fn sector_filter_excludes_other_sectors() {
        let v = parse_query("energy green");
        assert_eq!(score_record(&v, &utility(0.3, 0.8)), 0.0);
        let v = parse_query("utilities green");
        assert!(close(score_record(&v, &utility(0.3, 0.8)), 0.8));
    }

    #[test]
    fn results_raw_fields_and_threshold() {
        let catalog = vec![utility(0.3, 0.8), utility(0.9, 0.1)];
        let v = parse_query("low risk and high environmental");
        let out = rank_normalized(&v, &catalog);
        // second record: (-0.9 + 0.1)/2 < 0 → dropped
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].overall_risk, 27);
        assert_eq!(out[0].environment_score, 11.0);
        assert_eq!(out[0].sector, "Utilities");
        assert_eq!(out[0].social_score, 0.0);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let mk = |sym: &str| {
            NormalizedStockRecord::from_normalized(
                StockRecord::new(sym, sym),
                [(Attribute::TotalEsg, 0.5)],
            )
        };
        let catalog = vec![mk("X"), mk("Y"), mk("Z")];
        let out = rank_normalized(&parse_query("sustainability"), &catalog);
        let syms: Vec<_> = out.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(syms, vec!["X", "Y", "Z"]);
    }

    #[test]
    fn missing_sector_reports_unknown() {
        let rec = NormalizedStockRecord::from_normalized(
            StockRecord::new("A", "Alpha"),
            [(Attribute::Percentile, 0.4)],
        );
        let out = rank_normalized(&parse_query("percentile"), &[rec]);
        assert_eq!(out[0].sector, UNKNOWN_SECTOR);
    }

    #[test]
    fn explain_contributions_sum_to_score() {
        let v = parse_query("very low risk and high environmental");
        let rec = utility(0.3, 0.8);
        let b = explain(&v, &rec);
        assert!(close(b.score, score_record(&v, &rec)));
        assert!(close(b.total_weight, 2.5));
        let risk = b
            .contributions
            .iter()
            .find(|c| c.field == "overallRisk")
            .unwrap();
        assert_eq!(risk.direction, Direction::LowerIsBetter);
    }

    #[test]
    fn explain_reports_sector_filtering() {
        let b = explain(&parse_query("energy"), &utility(0.3, 0.8));
        assert!(b.sector_filtered);
        assert!(b.contributions.is_empty());
    }
}
