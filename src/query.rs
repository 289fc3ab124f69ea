//! # Query Parser
//! Turns free-text preference queries into a signed-weight `PreferenceVector`
//! plus an optional sector filter, driven entirely by the `Lexicon`.
//!
//! Per field mention, the 4 tokens before it are scanned:
//! - every intensifier multiplies the magnitude (compounding),
//! - the closest modifier decides the sign, else the category default,
//! - a pending negation flips the sign once and is then consumed.
//!
//! A later mention of the same field overwrites the earlier weight.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::Arc;
use tracing::debug;

use crate::lexicon::{Category, Lexicon};
use crate::tokenizer::tokenize;

/// Tokens inspected before a field mention.
pub const WINDOW_SIZE: usize = 4;

/// Reserved key under which the sector filter is serialized.
pub const SPECIFIED_SECTORS_KEY: &str = "specified_sectors";

/// Attribute-key → signed weight, plus an optional hard sector filter.
/// Keys keep first-insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceVector {
    weights: Vec<(String, f64)>,
    specified_sectors: Option<Vec<String>>,
}

impl PreferenceVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the weight for `key`.
    pub fn set(&mut self, key: &str, weight: f64) {
        match self.weights.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = weight,
            None => self.weights.push((key.to_string(), weight)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.weights
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, w)| *w)
    }

    pub fn weights(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.weights.iter().map(|(k, w)| (k.as_str(), *w))
    }

    pub fn specified_sectors(&self) -> Option<&[String]> {
        self.specified_sectors.as_deref()
    }

    /// Empty lists are not stored: a present filter always names at least one sector.
    pub fn set_specified_sectors(&mut self, sectors: Vec<String>) {
        self.specified_sectors = if sectors.is_empty() {
            None
        } else {
            Some(sectors)
        };
    }

    /// No weights and no sector filter.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty() && self.specified_sectors.is_none()
    }

    pub fn len(&self) -> usize {
        self.weights.len() + usize::from(self.specified_sectors.is_some())
    }
}

impl Serialize for PreferenceVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, w) in &self.weights {
            map.serialize_entry(k, w)?;
        }
        if let Some(sectors) = &self.specified_sectors {
            map.serialize_entry(SPECIFIED_SECTORS_KEY, sectors)?;
        }
        map.end()
    }
}

/// Stateless parser over a shared lexicon.
#[derive(Debug, Clone)]
pub struct QueryParser {
    lexicon: Arc<Lexicon>,
}

impl QueryParser {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Parse a query into a preference vector. Never fails; unknown words are ignored.
    pub fn parse_query(&self, text: &str) -> PreferenceVector {
        let tokens = tokenize(text);
        let lx = &*self.lexicon;
        let mut vector = PreferenceVector::new();

        // Sector names act as a filter, collected in order of appearance.
        let sectors: Vec<String> = tokens
            .iter()
            .filter(|t| lx.is_sector(t))
            .cloned()
            .collect();

        let mut negation_active = false;

        for (i, token) in tokens.iter().enumerate() {
            let token = token.as_str();

            if lx.is_negation(token) {
                negation_active = true;
                continue;
            }

            if lx.is_stopword(token) && !lx.is_intensifier(token) {
                continue;
            }

            let Some(field) = lx.field_for(token) else {
                continue;
            };

            // Sector words carry no numeric attribute but still take up a pending negation.
            if field.category == Category::Sector {
                negation_active = false;
                continue;
            }

            let window = &tokens[i.saturating_sub(WINDOW_SIZE)..i];
            let mut intensifier_value = 1.0;
            let mut modifier_value: Option<f64> = None;
            for prev in window {
                if let Some(m) = lx.intensifier(prev) {
                    intensifier_value *= m;
                }
                if let Some(sign) = lx.modifier(prev) {
                    modifier_value = Some(sign);
                }
            }

            let mut modifier_value =
                modifier_value.unwrap_or_else(|| field.category.default_direction());

            if negation_active {
                modifier_value = -modifier_value;
                negation_active = false;
            }

            vector.set(field.canonical_key(), modifier_value * intensifier_value);
        }

        vector.set_specified_sectors(sectors);

        debug!(
            target: "esg::query",
            tokens = tokens.len(),
            keys = vector.len(),
            "parsed query"
        );
        vector
    }
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(Lexicon::shared())
    }
}

/// Convenience wrapper over the shared built-in lexicon.
pub fn parse_query(text: &str) -> PreferenceVector {
    QueryParser::default().parse_query(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn defaults_by_category() {
        let v = parse_query("environmental risk percentile");
        assert_eq!(v.get("environmentScore"), Some(1.0));
        assert_eq!(v.get("overallRisk"), Some(-1.0));
        assert_eq!(v.get("percentile"), Some(1.0));
    }

    #[test]
    fn closest_modifier_wins() {
        let v = parse_query("low high risk");
        assert_eq!(v.get("overallRisk"), Some(1.0));
        let v = parse_query("high low risk");
        assert_eq!(v.get("overallRisk"), Some(-1.0));
    }

    #[test]
    fn modifier_outside_window_is_ignored() {
        // "high" sits 5 tokens before "risk"
        let v = parse_query("high one two three four risk");
        assert_eq!(v.get("overallRisk"), Some(-1.0));
    }

    #[test]
    fn intensifier_outside_window_is_ignored() {
        let v = parse_query("very one two three four risk");
        assert_eq!(v.get("overallRisk"), Some(-1.0));
    }

    #[test]
    fn negation_is_consumed_once() {
        let v = parse_query("not green carbon");
        // both map to environmentScore; the later mention overwrites
        assert_eq!(v.get("environmentScore"), Some(1.0));
        let v = parse_query("not green");
        assert_eq!(v.get("environmentScore"), Some(-1.0));
    }

    #[test]
    fn negation_survives_unmatched_tokens() {
        let v = parse_query("never mind the board");
        assert_eq!(v.get("governanceScore"), Some(-1.0));
    }

    #[test]
    fn intensifiers_compound() {
        let v = parse_query("very extremely high risk");
        assert!(close(v.get("overallRisk").unwrap(), 1.0 * 1.5 * 2.0));
        let v = parse_query("a bit environmental");
        assert!(close(v.get("environmentScore").unwrap(), 0.6));
    }

    #[test]
    fn sector_filter_in_order_with_duplicates() {
        let v = parse_query("energy or utilities, energy again");
        assert_eq!(
            v.specified_sectors().unwrap(),
            &["energy".to_string(), "utilities".to_string(), "energy".to_string()]
        );
    }

    #[test]
    fn sector_category_words_add_no_weight() {
        let v = parse_query("not industry green");
        assert!(v.get("GICS Sector").is_none());
        // "industry" takes the negation, so "green" keeps its default sign
        assert_eq!(v.get("environmentScore"), Some(1.0));
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn empty_query_is_empty_vector() {
        assert!(parse_query("").is_empty());
        assert!(parse_query("show me the stocks").is_empty());
    }

    #[test]
    fn serializes_as_flat_map() {
        let v = parse_query("low risk utilities");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["overallRisk"], serde_json::json!(-1.0));
        assert_eq!(json["specified_sectors"], serde_json::json!(["utilities"]));
    }
}
