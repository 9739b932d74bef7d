mod common;

use common::{build_pipeline, request, ScriptedProcessor};
use formgate::domain::ports::Outcome;
use formgate::domain::submission::SubmissionStatus;
use formgate::error::SubmissionError;
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_second_submission_with_same_content_is_rejected() {
    let processor = ScriptedProcessor::default();
    let (pipeline, _store) = build_pipeline(processor.clone());

    let first = pipeline
        .submit(request("a@b.com", dec!(20), None))
        .await
        .unwrap();
    let first_id = first.submission().id;

    let err = pipeline
        .submit(request("a@b.com", dec!(20), None))
        .await
        .unwrap_err();
    match err {
        SubmissionError::Duplicate { existing } => assert_eq!(existing.id, first_id),
        other => panic!("expected duplicate rejection, got {other:?}"),
    }

    // No new record, no extra downstream call.
    assert_eq!(pipeline.recent_submissions(10).await.unwrap().len(), 1);
    assert_eq!(processor.calls(), 1);
}

#[tokio::test]
async fn test_normalized_email_matches_duplicate() {
    let processor = ScriptedProcessor::default();
    let (pipeline, _store) = build_pipeline(processor);

    pipeline
        .submit(request("a@b.com", dec!(20), None))
        .await
        .unwrap();

    let err = pipeline
        .submit(request("  A@B.COM ", dec!(20), None))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Duplicate { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_failed_submission_does_not_block_resubmission() {
    // Three failures exhaust the first attempt; the same content may then be
    // submitted again because only successes count as duplicates.
    let processor = ScriptedProcessor::new([
        Ok(Outcome::RetryableFailure),
        Ok(Outcome::RetryableFailure),
        Ok(Outcome::RetryableFailure),
        Ok(Outcome::Success),
    ]);
    let (pipeline, _store) = build_pipeline(processor);

    let err = pipeline
        .submit(request("a@b.com", dec!(20), None))
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::DownstreamExhausted { .. }));

    let retried = pipeline
        .submit(request("a@b.com", dec!(20), None))
        .await
        .unwrap();
    assert_eq!(retried.submission().status, SubmissionStatus::Success);
    assert_eq!(pipeline.recent_submissions(10).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_check_duplicate_is_idempotent() {
    let processor = ScriptedProcessor::default();
    let (pipeline, _store) = build_pipeline(processor);

    // Repeated checks with no prior success always say no.
    for _ in 0..3 {
        let check = pipeline.check_duplicate("a@b.com", dec!(20)).await.unwrap();
        assert!(!check.is_duplicate);
        assert!(check.existing.is_none());
    }

    let submitted = pipeline
        .submit(request("a@b.com", dec!(20), None))
        .await
        .unwrap();
    let id = submitted.submission().id;

    for _ in 0..3 {
        let check = pipeline.check_duplicate("a@b.com", dec!(20)).await.unwrap();
        assert!(check.is_duplicate);
        assert_eq!(check.existing.as_ref().unwrap().id, id);
    }
}
