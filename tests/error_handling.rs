//! 错误处理集成测试
//!
//! 测试单个分片失败、后台任务 panic 和直接翻译失败时的行为

use std::sync::Arc;
use std::time::Duration;

use parallel_reader::realtime::{Outbound, ServerEvent};
use parallel_reader::translation::{JobStatus, SubmitOutcome, TranslationError};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{failing_at, HtmlTestHelper, PanickingTranslator, TestEnvironment};

#[tokio::test(start_paused = true)]
async fn test_failed_chunk_gets_a_placeholder_and_the_job_completes() {
    let translator = Arc::new(failing_at(
        1,
        TranslationError::NetworkError("upstream down".to_string()),
    ));
    let env = TestEnvironment::new(translator.clone());
    let document = HtmlTestHelper::document(25, 1000);

    let SubmitOutcome::Job { translation_id, .. } =
        env.orchestrator.submit(&document, None).await.unwrap()
    else {
        panic!("expected a background job");
    };

    let snapshot = env
        .wait_for_status(&translation_id, JobStatus::Completed)
        .await;

    assert_eq!(translator.calls(), 3);
    assert!(snapshot.error.is_none());

    let failed = snapshot.chunk_text(1).unwrap();
    assert!(failed.starts_with("<div class=\"translation-error\">"));
    assert!(failed.contains("Translation error in part 2"));
    assert!(failed.contains("upstream down"));

    let first = snapshot.chunk_text(0).unwrap();
    let last = snapshot.chunk_text(2).unwrap();
    assert!(first.starts_with("<p>lorem"));
    assert!(last.starts_with("<p>lorem"));

    let text = snapshot.translated_text.as_deref().unwrap();
    assert!(text.starts_with(first));
    assert!(text.contains("translation-error"));
    assert!(text.ends_with(last));
}

#[tokio::test(start_paused = true)]
async fn test_panic_in_the_loop_marks_the_job_as_failed() {
    let env = TestEnvironment::new(Arc::new(PanickingTranslator::at(1)));
    let (client_id, mut events) = env.notifier.register();
    let document = HtmlTestHelper::document(25, 1000);

    let SubmitOutcome::Job { translation_id, .. } = env
        .orchestrator
        .submit(&document, Some(client_id))
        .await
        .unwrap()
    else {
        panic!("expected a background job");
    };

    let snapshot = env
        .wait_for_status(&translation_id, JobStatus::Error)
        .await;
    assert!(snapshot.error.as_deref().unwrap().contains("kaput"));
    assert!(snapshot.translated_text.is_none());
    assert_eq!(snapshot.progress.completed, 1);

    tokio::time::sleep(Duration::from_millis(1)).await;
    let mut error_event = None;
    while let Ok(message) = events.try_recv() {
        if let Outbound::Event(ServerEvent::Error(event)) = message {
            error_event = Some(event);
        }
    }
    let event = error_event.expect("error event pushed");
    assert_eq!(event.translation_id.as_deref(), Some(translation_id.as_str()));
    assert_eq!(event.code, "TRANSLATION_FAILED");
    assert!(event.message.contains("kaput"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_job_is_also_removed_after_retention() {
    let env = TestEnvironment::new(Arc::new(PanickingTranslator::at(0)));
    let document = HtmlTestHelper::document(25, 1000);

    let SubmitOutcome::Job { translation_id, .. } =
        env.orchestrator.submit(&document, None).await.unwrap()
    else {
        panic!("expected a background job");
    };

    env.wait_for_status(&translation_id, JobStatus::Error)
        .await;
    tokio::time::sleep(Duration::from_secs(31 * 60)).await;

    assert!(matches!(
        env.orchestrator.status(&translation_id),
        Err(TranslationError::JobNotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_direct_translation_error_is_returned_to_the_caller() {
    let env = TestEnvironment::new(Arc::new(failing_at(
        0,
        TranslationError::RateLimitExceeded,
    )));

    let result = env
        .orchestrator
        .submit(&HtmlTestHelper::paragraph(200), None)
        .await;

    assert_eq!(result, Err(TranslationError::RateLimitExceeded));
    assert!(env.store.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_unknown_translation_id() {
    let env = TestEnvironment::new(Arc::new(failing_at(
        0,
        TranslationError::RateLimitExceeded,
    )));

    assert!(matches!(
        env.orchestrator.status("translation-0-deadbeef"),
        Err(TranslationError::JobNotFound(_))
    ));
}
