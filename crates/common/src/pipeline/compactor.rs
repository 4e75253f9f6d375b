//! Report compaction - bounded, schema-stable projection of openFDA results
//!
//! The raw document is untrusted: any field may be absent or of the wrong
//! type. Compaction never fails; missing scalars become `null` and missing
//! lists become empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One product attached to a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactProduct {
    pub name_brand: Option<String>,
    pub industry_name: Option<String>,
    pub role: Option<String>,
}

/// Reduced report. Always serializes the same five keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactReport {
    pub report_number: Option<String>,
    pub date_created: Option<String>,
    pub reactions: Vec<String>,
    pub outcomes: Vec<String>,
    pub products: Vec<CompactProduct>,
}

/// Compacted result set embedded in the generation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Full match count reported upstream
    pub total: u64,
    /// Reports actually present in this response
    pub sampled: usize,
    pub reports: Vec<CompactReport>,
}

impl Summary {
    pub fn new(total: u64, reports: Vec<CompactReport>) -> Self {
        Self {
            total,
            sampled: reports.len(),
            reports,
        }
    }

    /// The "no data" summary
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }
}

/// Borrowed view over one element of the openFDA `results` array
#[derive(Debug, Clone, Copy)]
pub struct RawReport<'a>(&'a Value);

impl<'a> RawReport<'a> {
    pub fn new(value: &'a Value) -> Self {
        Self(value)
    }

    pub fn report_number(&self) -> Option<String> {
        string_field(self.0, "report_number")
    }

    pub fn date_created(&self) -> Option<String> {
        string_field(self.0, "date_created")
    }

    pub fn reactions(&self) -> Vec<String> {
        string_list(self.0, "reactions")
    }

    pub fn outcomes(&self) -> Vec<String> {
        string_list(self.0, "outcomes")
    }

    pub fn products(&self) -> impl Iterator<Item = &'a Value> {
        self.0
            .get("products")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
    }

    pub fn compact(&self) -> CompactReport {
        CompactReport {
            report_number: self.report_number(),
            date_created: self.date_created(),
            reactions: self.reactions(),
            outcomes: self.outcomes(),
            products: self
                .products()
                .map(|p| CompactProduct {
                    name_brand: string_field(p, "name_brand"),
                    industry_name: string_field(p, "industry_name"),
                    role: string_field(p, "role"),
                })
                .collect(),
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Compact an openFDA document (or its absence) into a `Summary`
pub fn compact(document: Option<&Value>) -> Summary {
    let Some(results) = document
        .and_then(|doc| doc.get("results"))
        .and_then(Value::as_array)
    else {
        return Summary::empty();
    };

    let total = document
        .and_then(|doc| doc.pointer("/meta/results/total"))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let reports = results.iter().map(|r| RawReport::new(r).compact()).collect();

    Summary::new(total, reports)
}
