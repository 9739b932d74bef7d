use crate::error::SubmissionError;
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email pattern compiles");
}

/// A normalized email address: trimmed, lower-cased and shape-checked.
///
/// Normalization happens at parse time so every comparison in the system
/// (duplicate detection in particular) operates on the canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(raw: &str) -> Result<Self, SubmissionError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(SubmissionError::Validation("Email is required".to_string()));
        }
        if !EMAIL_PATTERN.is_match(&normalized) {
            return Err(SubmissionError::Validation(
                "Invalid email format".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A positive monetary amount.
///
/// Wrapper around `rust_decimal::Decimal` enforcing the `> 0` rule at
/// construction so the rest of the system never sees an invalid amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, SubmissionError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(SubmissionError::Validation(
                "Amount must be a positive number".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = SubmissionError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Success,
    Failed,
}

impl SubmissionStatus {
    /// Terminal statuses are immutable; the store rejects any further patch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// A single client submission and its processing outcome.
///
/// Created by the pipeline once validation and both guard checks pass;
/// mutated only through [`crate::domain::ports::SubmissionStore::update`].
/// Status moves `pending -> success` or `pending -> failed` and never leaves
/// a terminal state.
#[derive(Debug, PartialEq, Clone)]
pub struct Submission {
    /// Store-assigned identifier, immutable.
    pub id: Uuid,
    pub email: EmailAddress,
    pub amount: Amount,
    /// Caller-supplied token; unique across all submissions when present.
    pub idempotency_key: Option<String>,
    pub status: SubmissionStatus,
    /// Retryable failures observed before the terminal state was reached.
    pub retry_count: u32,
    /// Set only on terminal `failed`.
    pub error_message: Option<String>,
    pub submitted_at: DateTime<Utc>,
    /// Set exactly when status becomes `success`.
    pub processed_at: Option<DateTime<Utc>>,
}
