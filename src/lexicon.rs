//! # Lexicon
//!
//! Compiled-in vocabulary that drives query interpretation:
//! - ten ordered field categories, each with its synonym list
//!   (the first synonym is the canonical attribute key),
//! - directional modifiers ("high"/"low" families),
//! - intensifiers with multiplicative strength,
//! - negation words, sector names and a stopword set.
//!
//! A `Lexicon` is built once (see [`Lexicon::shared`]) and handed to the
//! tokenizer/parser by reference or `Arc`. It is never mutated afterwards.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// One of the ten field categories a query word can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Environmental,
    Social,
    Governance,
    Esg,
    Risk,
    Controversy,
    MarketCap,
    Beta,
    Percentile,
    Sector,
}

impl Category {
    /// Lexicon category name (also matchable as a query token).
    pub fn name(self) -> &'static str {
        match self {
            Category::Environmental => "environmental",
            Category::Social => "social",
            Category::Governance => "governance",
            Category::Esg => "esg",
            Category::Risk => "risk",
            Category::Controversy => "controversy",
            Category::MarketCap => "market cap",
            Category::Beta => "beta",
            Category::Percentile => "percentile",
            Category::Sector => "sector",
        }
    }

    /// Sign used when no modifier word precedes a field mention.
    /// ESG dimensions prefer higher values, risk-like fields prefer lower.
    pub fn default_direction(self) -> f64 {
        match self {
            Category::Environmental | Category::Social | Category::Governance | Category::Esg => {
                1.0
            }
            Category::Risk | Category::Controversy | Category::Beta => -1.0,
            _ => 1.0,
        }
    }
}

/// A category together with its synonyms, in declaration order.
#[derive(Debug, Clone)]
pub struct FieldMapping {
    pub category: Category,
    pub synonyms: Vec<String>,
}

impl FieldMapping {
    /// Canonical attribute key: the first synonym.
    pub fn canonical_key(&self) -> &str {
        self.synonyms.first().map(String::as_str).unwrap_or_default()
    }

    fn matches(&self, token: &str) -> bool {
        token == self.category.name() || self.synonyms.iter().any(|s| s == token)
    }
}

const FIELD_TABLE: &[(Category, &[&str])] = &[
    (
        Category::Environmental,
        &[
            "environmentScore",
            "environment",
            "eco",
            "green",
            "sustainable",
            "carbon",
            "climate",
        ],
    ),
    (
        Category::Social,
        &[
            "socialScore",
            "society",
            "community",
            "people",
            "ethical",
            "human rights",
            "social responsibility",
        ],
    ),
    (
        Category::Governance,
        &[
            "governanceScore",
            "management",
            "leadership",
            "board",
            "transparency",
            "corporate governance",
        ],
    ),
    (
        Category::Esg,
        &[
            "totalEsg",
            "sustainability",
            "responsible",
            "ethical investing",
            "sustainable investing",
        ],
    ),
    (
        Category::Risk,
        &[
            "overallRisk",
            "risky",
            "danger",
            "safe",
            "safety",
            "volatility",
            "stability",
        ],
    ),
    (
        Category::Controversy,
        &[
            "highestControversy",
            "controversial",
            "scandal",
            "dispute",
            "issue",
            "problems",
        ],
    ),
    (
        Category::MarketCap,
        &[
            "marketCap",
            "size",
            "capitalization",
            "market value",
            "company size",
            "large cap",
            "small cap",
        ],
    ),
    (
        Category::Beta,
        &[
            "beta",
            "volatility",
            "stable",
            "stability",
            "market risk",
            "market sensitivity",
        ],
    ),
    (
        Category::Percentile,
        &[
            "percentile",
            "rank",
            "standing",
            "position",
            "rating",
            "relative performance",
        ],
    ),
    (
        Category::Sector,
        &["GICS Sector", "industry", "field", "domain", "market segment"],
    ),
];

const HIGH_MODIFIERS: &[&str] = &[
    "high",
    "good",
    "strong",
    "great",
    "impressive",
    "positive",
    "large",
    "big",
    "higher",
    "better",
];

const LOW_MODIFIERS: &[&str] = &[
    "low", "bad", "weak", "poor", "negative", "minimal", "small", "lower", "worse",
];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.5),
    ("extremely", 2.0),
    ("highly", 1.7),
    ("incredibly", 1.8),
    ("somewhat", 0.7),
    ("slightly", 0.5),
    ("a bit", 0.6),
    ("a lot", 1.6),
    ("tremendously", 1.9),
    ("exceptionally", 1.8),
    ("moderately", 0.8),
];

const NEGATIONS: &[&str] = &["not", "no", "never", "neither", "nor", "barely", "hardly"];

const SECTORS: &[&str] = &[
    "information technology",
    "health care",
    "financials",
    "consumer discretionary",
    "communication services",
    "industrials",
    "consumer staples",
    "energy",
    "utilities",
    "real estate",
    "materials",
];

const STOPWORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "because", "as", "what", "when", "where", "how",
    "all", "any", "both", "each", "few", "more", "most", "some", "such", "than", "too", "with",
    "for", "to", "in", "on", "by", "at", "that", "this", "these", "those", "i", "me", "my",
    "myself", "we", "our", "ours", "ourselves", "you", "your", "yours", "yourself", "yourselves",
    "he", "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "they",
    "them", "their", "theirs", "themselves", "which", "who", "whom", "whose", "want", "looking",
    "need", "show", "find", "get", "have", "stocks", "companies", "stock", "company", "invest",
    "investment", "investing",
];

/// Two-word phrases the tokenizer keeps together as single tokens.
pub const JOINED_PHRASES: &[&str] = &["a bit", "a lot"];

static SHARED: Lazy<Arc<Lexicon>> = Lazy::new(|| Arc::new(Lexicon::builtin()));

/// Immutable query vocabulary.
#[derive(Debug, Clone)]
pub struct Lexicon {
    fields: Vec<FieldMapping>,
    modifiers: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
    sectors: Vec<String>,
    stopwords: HashSet<String>,
}

impl Lexicon {
    /// Build the compiled-in vocabulary.
    pub fn builtin() -> Self {
        let fields = FIELD_TABLE
            .iter()
            .map(|(category, synonyms)| FieldMapping {
                category: *category,
                synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            })
            .collect();

        let mut modifiers = HashMap::new();
        for w in HIGH_MODIFIERS {
            modifiers.insert(w.to_string(), 1.0);
        }
        for w in LOW_MODIFIERS {
            modifiers.insert(w.to_string(), -1.0);
        }

        Self {
            fields,
            modifiers,
            intensifiers: INTENSIFIERS
                .iter()
                .map(|(w, m)| (w.to_string(), *m))
                .collect(),
            negations: NEGATIONS.iter().map(|s| s.to_string()).collect(),
            sectors: SECTORS.iter().map(|s| s.to_string()).collect(),
            stopwords: STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Process-wide shared instance of the built-in lexicon.
    pub fn shared() -> Arc<Lexicon> {
        SHARED.clone()
    }

    /// First category (in declaration order) whose name or synonyms equal `token`.
    pub fn field_for(&self, token: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.matches(token))
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    /// +1.0 for "high"-family words, -1.0 for "low"-family words.
    pub fn modifier(&self, token: &str) -> Option<f64> {
        self.modifiers.get(token).copied()
    }

    pub fn intensifier(&self, token: &str) -> Option<f64> {
        self.intensifiers.get(token).copied()
    }

    pub fn is_intensifier(&self, token: &str) -> bool {
        self.intensifiers.contains_key(token)
    }

    pub fn is_negation(&self, token: &str) -> bool {
        self.negations.contains(token)
    }

    pub fn is_sector(&self, token: &str) -> bool {
        self.sectors.iter().any(|s| s == token)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::builtin()
    }
}
