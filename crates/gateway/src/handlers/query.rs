//! Adverse-event query handler

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use foodevents_common::{
    errors::{AppError, Result},
    pipeline::Answer,
    QueryOutcome,
};

/// Natural-language question about food adverse events
#[derive(Debug, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(max = 2000))]
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QueryResponse {
    pub status: QueryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<QueryOutcome> for QueryResponse {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Ok(answer) => Self {
                status: QueryStatus::Ok,
                data: Some(answer),
                message: None,
            },
            QueryOutcome::Error(message) => Self {
                status: QueryStatus::Error,
                data: None,
                message: Some(message),
            },
        }
    }
}

/// Answer a question from openFDA food adverse-event reports.
///
/// Upstream failures are reported in the body with `status: "error"`, not
/// through the HTTP status.
pub async fn query_food_events(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("query".to_string()),
    })?;

    let outcome = state.pipeline.run(&request.query).await;

    if let QueryOutcome::Error(message) = &outcome {
        tracing::warn!(query = %request.query, message = %message, "Query failed");
    }

    Ok(Json(outcome.into()))
}
