use super::AppState;
use crate::application::pipeline::{SubmitOutcome, SubmitRequest};
use crate::domain::submission::{Submission, SubmissionStatus};
use crate::error::SubmissionError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bounded count for the listing endpoint.
const LIST_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBody {
    pub email: String,
    pub amount: Decimal,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckDuplicateBody {
    pub email: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub id: Uuid,
    pub status: SubmissionStatus,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<Submission> for SubmitResponse {
    fn from(submission: Submission) -> Self {
        Self {
            id: submission.id,
            status: submission.status,
            email: submission.email.as_str().to_string(),
            amount: submission.amount.value(),
            submitted_at: submission.submitted_at,
            processed_at: submission.processed_at,
            message: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedResponse {
    pub id: Uuid,
    pub status: SubmissionStatus,
    pub retry_count: u32,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateResponse {
    pub is_duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub id: Uuid,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub status: SubmissionStatus,
    pub retry_count: u32,
    pub submitted_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub total: usize,
    pub submissions: Vec<SubmissionSummary>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

pub async fn submit(State(state): State<AppState>, Json(body): Json<SubmitBody>) -> Response {
    let request = SubmitRequest {
        email: body.email,
        amount: body.amount,
        idempotency_key: body.idempotency_key,
    };

    match state.pipeline.submit(request).await {
        Ok(SubmitOutcome::Completed(submission)) => {
            (StatusCode::OK, Json(SubmitResponse::from(submission))).into_response()
        }
        Ok(SubmitOutcome::Replayed(submission)) => {
            let mut response = SubmitResponse::from(submission);
            response.message = Some("Submission already processed".to_string());
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn check_duplicate(
    State(state): State<AppState>,
    Json(body): Json<CheckDuplicateBody>,
) -> Response {
    match state.pipeline.check_duplicate(&body.email, body.amount).await {
        Ok(check) => {
            let response = DuplicateResponse {
                is_duplicate: check.is_duplicate,
                existing_id: check.existing.as_ref().map(|s| s.id),
                message: check
                    .is_duplicate
                    .then(|| "Duplicate submission detected".to_string()),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn list_submissions(State(state): State<AppState>) -> Response {
    match state.pipeline.recent_submissions(LIST_LIMIT).await {
        Ok(submissions) => {
            let submissions: Vec<SubmissionSummary> = submissions
                .into_iter()
                .map(|s| SubmissionSummary {
                    id: s.id,
                    email: s.email.as_str().to_string(),
                    amount: s.amount.value(),
                    status: s.status,
                    retry_count: s.retry_count,
                    submitted_at: s.submitted_at,
                    processed_at: s.processed_at,
                })
                .collect();
            let response = ListResponse {
                total: submissions.len(),
                submissions,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

fn error_response(err: SubmissionError) -> Response {
    match err {
        SubmissionError::Validation(message) => {
            (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message })).into_response()
        }
        SubmissionError::Duplicate { existing } => (
            StatusCode::CONFLICT,
            Json(DuplicateResponse {
                is_duplicate: true,
                existing_id: Some(existing.id),
                message: Some("Duplicate submission detected".to_string()),
            }),
        )
            .into_response(),
        SubmissionError::DownstreamExhausted { submission } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(FailedResponse {
                id: submission.id,
                status: submission.status,
                retry_count: submission.retry_count,
                error: submission
                    .error_message
                    .unwrap_or_else(|| "max retries reached".to_string()),
            }),
        )
            .into_response(),
        SubmissionError::Store(err) => {
            tracing::error!(error = %err, "store failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Error processing submission".to_string(),
                }),
            )
                .into_response()
        }
    }
}
