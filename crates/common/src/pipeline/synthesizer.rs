//! Answer synthesis - turns compacted reports into a cautious written answer
//!
//! Synthesis never fails. A missing credential yields a fixed sentinel and
//! any generation failure is returned as the answer text itself.

use super::compactor::Summary;
use crate::llm::TextGenerator;
use crate::metrics;
use serde::Serialize;
use std::sync::Arc;

/// Fixed system instruction for the generation service
pub const SYSTEM_PROMPT: &str = "\
You summarize openFDA Food Adverse Event data.
Provide factual, cautious, FDA-backed insights.
Never give medical advice. Avoid claims of causality.
Explain data limitations clearly.

Input will be a JSON object containing:
- user_query: The original question from the user.
- fda_query: The query string used to fetch data from openFDA.
- fda_summary: A summarized version of the FDA data.

Output should be a natural language response.
";

/// Answer text used when no generation credential is configured
pub const MISSING_CREDENTIAL_ANSWER: &str =
    "OpenAI API key not configured. Cannot generate response.";

/// Short summary used when the answer text is empty
pub const NO_SUMMARY: &str = "No summary available.";

#[derive(Serialize)]
struct GenerationPayload<'a> {
    user_query: &'a str,
    fda_query: &'a str,
    fda_summary: &'a Summary,
}

/// Produces answer text from a query and its compacted reports
pub struct Synthesizer {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl Synthesizer {
    /// `None` means generation is not configured
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self { generator }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Generate the answer text. Never fails.
    pub async fn synthesize(&self, user_query: &str, fda_query: &str, summary: &Summary) -> String {
        let Some(generator) = &self.generator else {
            metrics::record_llm("unconfigured");
            return MISSING_CREDENTIAL_ANSWER.to_string();
        };

        let payload = GenerationPayload {
            user_query,
            fda_query,
            fda_summary: summary,
        };

        let result = match serde_json::to_string_pretty(&payload) {
            Ok(user_content) => generator.generate(SYSTEM_PROMPT, &user_content).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(text) => {
                metrics::record_llm("success");
                text
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    model = generator.model_name(),
                    "LLM generation failed"
                );
                metrics::record_llm("error");
                format!("Error generating response from LLM: {}", e)
            }
        }
    }
}

/// First sentence of the answer: text before the first `.`, plus the `.`.
///
/// Naive on purpose; abbreviations and decimals cut the sentence short.
pub fn short_summary(text: &str) -> String {
    if text.is_empty() {
        return NO_SUMMARY.to_string();
    }

    let first = text.split('.').next().unwrap_or_default();
    format!("{}.", first)
}
