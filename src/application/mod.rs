//! Application layer containing the core business logic orchestration.
//!
//! This module defines the `SubmissionPipeline`, the primary entry point for
//! processing submissions, plus the two guard components it consults before
//! creating any record.

pub mod duplicate;
pub mod idempotency;
pub mod pipeline;
