//! Adverse-event query pipeline
//!
//! Extractor → query builder → fetcher → compactor → synthesizer. Each
//! stage only sees the previous stage's output; nothing is shared between
//! requests.

pub mod compactor;
pub mod extractor;
pub mod fetcher;
pub mod query_builder;
pub mod synthesizer;

pub use compactor::{compact, CompactProduct, CompactReport, RawReport, Summary};
pub use extractor::{extract_terms, ExtractionResult, SearchClause, LEXICON};
pub use fetcher::{FetchOutcome, OpenFdaClient, ReportSource};
pub use query_builder::{build_query, request_url};
pub use synthesizer::{short_summary, Synthesizer};

use crate::metrics::QueryMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Message returned when openFDA cannot be reached
pub const UNAVAILABLE_MESSAGE: &str = "openFDA unavailable or error occurred.";

/// Citation type for openFDA sources
pub const OPENFDA_CITATION: &str = "openfda";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerMeta {
    pub query_used: String,
    pub total_reports: u64,
    pub sampled: usize,
}

/// Synthesized answer with provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub short_summary: String,
    pub citations: Vec<Citation>,
    pub meta: AnswerMeta,
}

/// Result of one query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Ok(Answer),
    Error(String),
}

/// End-to-end query pipeline
pub struct QueryPipeline {
    reports: Arc<dyn ReportSource>,
    synthesizer: Synthesizer,
    endpoint: String,
}

impl QueryPipeline {
    /// `endpoint` is the reporting API URL cited in answers
    pub fn new(reports: Arc<dyn ReportSource>, synthesizer: Synthesizer, endpoint: impl Into<String>) -> Self {
        Self {
            reports,
            synthesizer,
            endpoint: endpoint.into(),
        }
    }

    pub fn llm_configured(&self) -> bool {
        self.synthesizer.is_configured()
    }

    /// Answer one natural-language question
    pub async fn run(&self, query: &str) -> QueryOutcome {
        let metrics = QueryMetrics::start();

        let extraction = extract_terms(query);
        let fda_query = build_query(&extraction.clauses, extraction.limit);
        tracing::debug!(
            clauses = extraction.clauses.len(),
            fda_query = %fda_query,
            "Extracted search terms"
        );

        let Some(document) = self.reports.fetch(&fda_query).await.into_document() else {
            metrics.finish("error");
            return QueryOutcome::Error(UNAVAILABLE_MESSAGE.to_string());
        };

        let summary = compact(Some(&document));
        let text = self.synthesizer.synthesize(query, &fda_query, &summary).await;

        tracing::info!(
            fda_query = %fda_query,
            total = summary.total,
            sampled = summary.sampled,
            "Query answered"
        );
        metrics.finish("ok");

        QueryOutcome::Ok(Answer {
            short_summary: short_summary(&text),
            answer: text,
            citations: vec![Citation {
                kind: OPENFDA_CITATION.to_string(),
                url: request_url(&self.endpoint, &fda_query),
            }],
            meta: AnswerMeta {
                query_used: fda_query,
                total_reports: summary.total,
                sampled: summary.sampled,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockGenerator;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    const ENDPOINT: &str = "https://api.fda.gov/food/event.json";

    /// Returns a canned outcome and records the query strings it saw
    struct StubSource {
        outcome: FetchOutcome,
        queries: Mutex<Vec<String>>,
    }

    impl StubSource {
        fn new(outcome: FetchOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ReportSource for StubSource {
        async fn fetch(&self, query: &str) -> FetchOutcome {
            self.queries.lock().unwrap().push(query.to_string());
            self.outcome.clone()
        }
    }

    fn one_report_document() -> Value {
        json!({
            "meta": {"results": {"total": 100}},
            "results": [{
                "report_number": "123",
                "reactions": ["NAUSEA"],
                "products": [{"name_brand": "TEST CHIPS", "industry_name": "Snack", "role": "Suspect"}]
            }]
        })
    }

    fn pipeline(source: Arc<StubSource>, text: Option<&str>) -> QueryPipeline {
        let generator = text.map(|t| Arc::new(MockGenerator::new(t)) as Arc<dyn crate::llm::TextGenerator>);
        QueryPipeline::new(source, Synthesizer::new(generator), ENDPOINT)
    }

    #[tokio::test]
    async fn test_unmatched_query_still_fetches() {
        let source = StubSource::new(FetchOutcome::Found(one_report_document()));
        let pipeline = pipeline(source.clone(), Some("This is a test response. It mentions FDA data."));

        let QueryOutcome::Ok(answer) = pipeline.run("test chips").await else {
            panic!("expected an answer");
        };

        assert_eq!(source.queries.lock().unwrap().as_slice(), [String::new()]);
        assert_eq!(answer.meta.query_used, "");
        assert_eq!(answer.meta.total_reports, 100);
        assert_eq!(answer.meta.sampled, 1);
        assert_eq!(answer.citations, vec![Citation {
            kind: "openfda".to_string(),
            url: ENDPOINT.to_string(),
        }]);
    }

    #[tokio::test]
    async fn test_matched_query_string() {
        let source = StubSource::new(FetchOutcome::Empty);
        let pipeline = pipeline(source.clone(), None);

        let QueryOutcome::Ok(answer) = pipeline.run("nausea from corn chips").await else {
            panic!("expected an answer");
        };

        let expected = r#"search=reactions:"NAUSEA"+AND+products.name_brand:"CORN+CHIPS"&limit=50"#;
        assert_eq!(source.queries.lock().unwrap().as_slice(), [expected.to_string()]);
        assert_eq!(answer.meta.query_used, expected);
        assert_eq!(answer.citations[0].url, format!("{}?{}", ENDPOINT, expected));
        assert_eq!(answer.meta.total_reports, 0);
        assert_eq!(answer.meta.sampled, 0);
    }

    #[tokio::test]
    async fn test_unavailable_is_error() {
        let source = StubSource::new(FetchOutcome::Unavailable("HTTP 503".to_string()));
        let pipeline = pipeline(source, Some("never used"));

        assert_eq!(
            pipeline.run("unknown food").await,
            QueryOutcome::Error("openFDA unavailable or error occurred.".to_string())
        );
    }

    #[tokio::test]
    async fn test_short_summary_from_answer() {
        let source = StubSource::new(FetchOutcome::Found(one_report_document()));
        let pipeline = pipeline(source, Some("This is a test response. It mentions FDA data."));

        let QueryOutcome::Ok(answer) = pipeline.run("test chips").await else {
            panic!("expected an answer");
        };
        assert_eq!(answer.answer, "This is a test response. It mentions FDA data.");
        assert_eq!(answer.short_summary, "This is a test response.");
    }

    #[tokio::test]
    async fn test_sentinel_answer_without_credential() {
        let source = StubSource::new(FetchOutcome::Found(one_report_document()));
        let pipeline = pipeline(source, None);
        assert!(!pipeline.llm_configured());

        let QueryOutcome::Ok(answer) = pipeline.run("rash").await else {
            panic!("expected an answer");
        };
        assert_eq!(answer.answer, "OpenAI API key not configured. Cannot generate response.");
        assert_eq!(answer.short_summary, "OpenAI API key not configured.");
    }

    #[test]
    fn test_answer_serialization() {
        let answer = Answer {
            answer: "a".into(),
            short_summary: "a.".into(),
            citations: vec![Citation { kind: "openfda".into(), url: ENDPOINT.into() }],
            meta: AnswerMeta { query_used: "".into(), total_reports: 2, sampled: 1 },
        };

        assert_eq!(serde_json::to_value(&answer).unwrap(), json!({
            "answer": "a",
            "short_summary": "a.",
            "citations": [{"type": "openfda", "url": ENDPOINT}],
            "meta": {"query_used": "", "total_reports": 2, "sampled": 1}
        }));
    }
}
