//! # Catalog
//!
//! Stock records and the best-effort JSON catalog loader.
//!
//! - `StockRecord` keeps every numeric attribute as `Option<f64>` so "absent"
//!   stays distinct from "zero" all the way to scoring.
//! - Numeric fields accept JSON numbers or numeric strings; anything else is absent.
//! - The loader repairs common breakage (missing brackets, trailing commas)
//!   and falls back to object-by-object recovery. Only I/O failures are errors.

use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// The nine numeric attributes that participate in normalization and scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    EnvironmentScore,
    SocialScore,
    GovernanceScore,
    TotalEsg,
    HighestControversy,
    OverallRisk,
    Beta,
    MarketCap,
    Percentile,
}

impl Attribute {
    pub const ALL: [Attribute; 9] = [
        Attribute::EnvironmentScore,
        Attribute::SocialScore,
        Attribute::GovernanceScore,
        Attribute::TotalEsg,
        Attribute::HighestControversy,
        Attribute::OverallRisk,
        Attribute::Beta,
        Attribute::MarketCap,
        Attribute::Percentile,
    ];

    /// Catalog/JSON key, also used as the preference-vector key.
    pub fn key(self) -> &'static str {
        match self {
            Attribute::EnvironmentScore => "environmentScore",
            Attribute::SocialScore => "socialScore",
            Attribute::GovernanceScore => "governanceScore",
            Attribute::TotalEsg => "totalEsg",
            Attribute::HighestControversy => "highestControversy",
            Attribute::OverallRisk => "overallRisk",
            Attribute::Beta => "beta",
            Attribute::MarketCap => "marketCap",
            Attribute::Percentile => "percentile",
        }
    }

    /// Position in `Attribute::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_key(key: &str) -> Option<Attribute> {
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Risk-like attributes are inverted during normalization.
    pub fn lower_is_better(self) -> bool {
        matches!(
            self,
            Attribute::HighestControversy | Attribute::OverallRisk | Attribute::Beta
        )
    }
}

/// One catalog entry as loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Full Name")]
    pub full_name: String,
    #[serde(
        rename = "GICS Sector",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub sector: Option<String>,

    #[serde(rename = "environmentScore", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub environment_score: Option<f64>,
    #[serde(rename = "socialScore", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub social_score: Option<f64>,
    #[serde(rename = "governanceScore", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub governance_score: Option<f64>,
    #[serde(rename = "totalEsg", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub total_esg: Option<f64>,
    #[serde(rename = "highestControversy", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub highest_controversy: Option<f64>,
    #[serde(rename = "overallRisk", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub overall_risk: Option<f64>,
    #[serde(rename = "beta", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub beta: Option<f64>,
    #[serde(rename = "marketCap", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(rename = "percentile", default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub percentile: Option<f64>,
}

impl StockRecord {
    /// Record with identity only; all attributes absent.
    pub fn new(symbol: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            full_name: full_name.into(),
            sector: None,
            environment_score: None,
            social_score: None,
            governance_score: None,
            total_esg: None,
            highest_controversy: None,
            overall_risk: None,
            beta: None,
            market_cap: None,
            percentile: None,
        }
    }

    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    pub fn with(mut self, attr: Attribute, value: f64) -> Self {
        self.set(attr, Some(value));
        self
    }

    pub fn get(&self, attr: Attribute) -> Option<f64> {
        match attr {
            Attribute::EnvironmentScore => self.environment_score,
            Attribute::SocialScore => self.social_score,
            Attribute::GovernanceScore => self.governance_score,
            Attribute::TotalEsg => self.total_esg,
            Attribute::HighestControversy => self.highest_controversy,
            Attribute::OverallRisk => self.overall_risk,
            Attribute::Beta => self.beta,
            Attribute::MarketCap => self.market_cap,
            Attribute::Percentile => self.percentile,
        }
    }

    pub fn set(&mut self, attr: Attribute, value: Option<f64>) {
        let slot = match attr {
            Attribute::EnvironmentScore => &mut self.environment_score,
            Attribute::SocialScore => &mut self.social_score,
            Attribute::GovernanceScore => &mut self.governance_score,
            Attribute::TotalEsg => &mut self.total_esg,
            Attribute::HighestControversy => &mut self.highest_controversy,
            Attribute::OverallRisk => &mut self.overall_risk,
            Attribute::Beta => &mut self.beta,
            Attribute::MarketCap => &mut self.market_cap,
            Attribute::Percentile => &mut self.percentile,
        };
        *slot = value;
    }

    /// Attribute value for display/extraction: absent reads as 0.0.
    pub fn value_or_zero(&self, attr: Attribute) -> f64 {
        self.get(attr).unwrap_or(0.0)
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<f64>, D::Error> {
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::Number(n) => n.as_f64().filter(|x| x.is_finite()),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        _ => None,
    })
}

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let v = serde_json::Value::deserialize(de)?;
    Ok(match v {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

/* ----------------------------
Loader
---------------------------- */

static TRAILING_COMMA_OBJ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\}").expect("trailing comma regex"));
static TRAILING_COMMA_ARR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*\]").expect("trailing comma regex"));
static OBJECT_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\},\s*\{").expect("object separator regex"));

/// Read and parse a catalog file. Only I/O errors are reported; bad content
/// degrades to a partial or empty catalog.
pub fn load_catalog_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<StockRecord>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading catalog from {}", path.display()))?;
    let records = load_catalog_str(&text);
    info!(
        target: "esg::catalog",
        path = %path.display(),
        records = records.len(),
        "catalog loaded"
    );
    Ok(records)
}

/// Parse catalog JSON text, repairing it on a best-effort basis.
pub fn load_catalog_str(text: &str) -> Vec<StockRecord> {
    let mut cleaned = text.trim().to_string();
    if !cleaned.starts_with('[') {
        cleaned.insert(0, '[');
    }
    if !cleaned.ends_with(']') {
        cleaned.push(']');
    }
    let cleaned = TRAILING_COMMA_OBJ.replace_all(&cleaned, "}");
    let mut cleaned = TRAILING_COMMA_ARR.replace_all(&cleaned, "]").into_owned();

    match serde_json::from_str::<Vec<serde_json::Value>>(&cleaned) {
        Ok(values) => return records_from_values(values),
        Err(e) => warn!(target: "esg::catalog", error = %e, "catalog JSON invalid, repairing"),
    }

    // A stray comma after the closing bracket.
    if let (Some(comma), Some(bracket)) = (cleaned.rfind(','), cleaned.rfind(']')) {
        if comma > bracket {
            cleaned.remove(comma);
        }
    }

    match serde_json::from_str::<Vec<serde_json::Value>>(&cleaned) {
        Ok(values) => return records_from_values(values),
        Err(e) => warn!(
            target: "esg::catalog",
            error = %e,
            "catalog still invalid after cleanup, parsing objects individually"
        ),
    }

    recover_objects(&cleaned)
}

fn recover_objects(cleaned: &str) -> Vec<StockRecord> {
    let inner = cleaned.trim_matches(|c| c == '[' || c == ']');
    let parts: Vec<&str> = OBJECT_SEPARATOR.split(inner).collect();
    let total = parts.len();

    let mut out = Vec::new();
    for (i, part) in parts.into_iter().enumerate() {
        let mut obj = part.trim().to_string();
        if !obj.starts_with('{') {
            obj.insert(0, '{');
        }
        if !obj.ends_with('}') {
            obj.push('}');
        }
        match serde_json::from_str::<StockRecord>(&obj) {
            Ok(rec) => out.push(rec),
            Err(e) => warn!(target: "esg::catalog", object = i + 1, error = %e, "dropping unparseable object"),
        }
    }

    if out.is_empty() {
        warn!(target: "esg::catalog", "no objects recovered, catalog is empty");
    } else {
        info!(target: "esg::catalog", recovered = out.len(), total, "partial catalog recovered");
    }
    out
}

fn records_from_values(values: Vec<serde_json::Value>) -> Vec<StockRecord> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(i, v)| match serde_json::from_value::<StockRecord>(v) {
            Ok(rec) => Some(rec),
            Err(e) => {
                warn!(target: "esg::catalog", index = i, error = %e, "dropping malformed record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_fields_accept_numbers_and_strings() {
        let recs = load_catalog_str(
            r#"[{"Symbol":"A","Full Name":"Alpha","environmentScore":"3.5","beta":1.2,"overallRisk":null}]"#,
        );
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].environment_score, Some(3.5));
        assert_eq!(recs[0].beta, Some(1.2));
        assert_eq!(recs[0].overall_risk, None);
        assert_eq!(recs[0].social_score, None);
    }

    #[test]
    fn missing_brackets_and_trailing_commas_are_repaired() {
        let recs = load_catalog_str(
            r#"{"Symbol":"A","Full Name":"Alpha",}, {"Symbol":"B","Full Name":"Beta","GICS Sector":"Energy"},"#,
        );
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].sector.as_deref(), Some("Energy"));
    }

    #[test]
    fn records_without_identity_are_dropped() {
        let recs = load_catalog_str(r#"[{"Symbol":"A"}, {"Symbol":"B","Full Name":"Bravo"}, 7]"#);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].symbol, "B");
    }

    #[test]
    fn object_by_object_recovery() {
        let recs = load_catalog_str(
            r#"[{"Symbol":"A","Full Name":"Alpha"}, {"Symbol":"B","Full Name": oops}, {"Symbol":"C","Full Name":"Charlie"}]"#,
        );
        let syms: Vec<_> = recs.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(syms, vec!["A", "C"]);
    }

    #[test]
    fn garbage_yields_empty_catalog() {
        assert!(load_catalog_str("not json at all").is_empty());
        assert!(load_catalog_str("").is_empty());
    }

    #[test]
    fn attribute_keys_round_trip() {
        for a in Attribute::ALL {
            assert_eq!(Attribute::from_key(a.key()), Some(a));
        }
        assert!(Attribute::from_key("GICS Sector").is_none());
    }
}
