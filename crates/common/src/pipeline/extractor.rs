//! Term extraction - maps free text to openFDA search clauses
//!
//! Matching is deterministic: case-insensitive substring containment
//! against a fixed, ordered lexicon. No entity guessing happens for text
//! outside the lexicon.

use serde::Serialize;
use std::fmt;

/// Result-count limit sent with every search
pub const DEFAULT_LIMIT: u32 = 50;

/// One filter fragment in openFDA query syntax.
///
/// Clauses only come from `'static` strings, so user text can never end up
/// inside a constructed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchClause(&'static str);

impl SearchClause {
    pub const fn from_static(clause: &'static str) -> Self {
        Self(clause)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SearchClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Phrase to clause dispatch table, in declaration order.
///
/// Phrases are lowercase; reactions come before product filters.
pub const LEXICON: &[(&str, SearchClause)] = &[
    ("nausea", SearchClause::from_static(r#"reactions:"NAUSEA""#)),
    ("vomiting", SearchClause::from_static(r#"reactions:"VOMITING""#)),
    ("diarrhea", SearchClause::from_static(r#"reactions:"DIARRHEA""#)),
    ("headache", SearchClause::from_static(r#"reactions:"HEADACHE""#)),
    // MedDRA term for fever
    ("fever", SearchClause::from_static(r#"reactions:"PYREXIA""#)),
    ("rash", SearchClause::from_static(r#"reactions:"RASH""#)),
    ("corn chips", SearchClause::from_static(r#"products.name_brand:"CORN+CHIPS""#)),
    ("snack food", SearchClause::from_static(r#"products.industry_name:"Snack+Food+Item""#)),
];

/// Search clauses and limit extracted from one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub clauses: Vec<SearchClause>,
    pub limit: u32,
}

/// Extract search clauses from a natural-language query. Never fails.
pub fn extract_terms(query: &str) -> ExtractionResult {
    let query = query.to_lowercase();

    let clauses = LEXICON
        .iter()
        .filter(|(phrase, _)| query.contains(phrase))
        .map(|(_, clause)| *clause)
        .collect();

    ExtractionResult {
        clauses,
        limit: DEFAULT_LIMIT,
    }
}
