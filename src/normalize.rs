//! # Normalizer
//! Rescales the nine numeric attributes to [0,1] relative to the whole catalog.
//!
//! - Range per attribute is (min, max) over all records, absent values counted as 0.0.
//! - Lower-is-better attributes are inverted: max → 0, min → 1.
//! - A degenerate range (min == max) maps every present value to 0.5.
//! - Absent attributes stay absent in the normalized copy.
//!
//! The raw record travels alongside the normalized values so result rows can
//! show original figures.

use crate::catalog::{Attribute, StockRecord};

/// A catalog record paired with its normalized attribute values in [0,1].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedStockRecord {
    source: StockRecord,
    values: [Option<f64>; 9],
}

impl NormalizedStockRecord {
    /// Build from already-normalized values (fixtures, precomputed snapshots).
    pub fn from_normalized(
        source: StockRecord,
        values: impl IntoIterator<Item = (Attribute, f64)>,
    ) -> Self {
        let mut out = Self {
            source,
            values: [None; 9],
        };
        for (attr, v) in values {
            out.values[attr.index()] = Some(v);
        }
        out
    }

    /// The raw record the values were derived from.
    pub fn source(&self) -> &StockRecord {
        &self.source
    }

    /// Normalized value; `None` when the raw record lacks the attribute.
    pub fn get(&self, attr: Attribute) -> Option<f64> {
        self.values[attr.index()]
    }

    pub fn symbol(&self) -> &str {
        &self.source.symbol
    }

    pub fn sector(&self) -> Option<&str> {
        self.source.sector.as_deref()
    }
}

/// Observed (min, max) for one attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    /// Used when the catalog is empty.
    pub const UNIT: Range = Range { min: 0.0, max: 1.0 };

    fn rescale(self, value: f64, invert: bool) -> f64 {
        if self.max > self.min {
            let span = self.max - self.min;
            if invert {
                (self.max - value) / span
            } else {
                (value - self.min) / span
            }
        } else {
            0.5
        }
    }
}

/// Per-attribute ranges across the catalog, in `Attribute::ALL` order.
pub fn attribute_ranges(catalog: &[StockRecord]) -> [Range; 9] {
    Attribute::ALL.map(|attr| {
        catalog
            .iter()
            .map(|r| r.value_or_zero(attr))
            .fold(None, |acc: Option<Range>, v| {
                Some(match acc {
                    None => Range { min: v, max: v },
                    Some(r) => Range {
                        min: r.min.min(v),
                        max: r.max.max(v),
                    },
                })
            })
            .unwrap_or(Range::UNIT)
    })
}

/// Produce the normalized catalog. Input records are not modified.
pub fn normalize(catalog: &[StockRecord]) -> Vec<NormalizedStockRecord> {
    let ranges = attribute_ranges(catalog);

    catalog
        .iter()
        .map(|stock| NormalizedStockRecord {
            source: stock.clone(),
            values: Attribute::ALL.map(|attr| {
                stock
                    .get(attr)
                    .map(|v| ranges[attr.index()].rescale(v, attr.lower_is_better()))
            }),
        })
        .collect()
}
