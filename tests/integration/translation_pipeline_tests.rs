/*!
 * End-to-end tests for the catalog translation pipeline
 */

use std::sync::Arc;
use std::time::Duration;

use locsync::app_config::{ProviderConfig, TranslationProvider};
use locsync::errors::{ProviderError, TranslationError};
use locsync::providers::mock::MockProvider;
use locsync::translation::{
    LogSeverity, ProgressEvent, SchedulerConfig, StringCatalog, TranslationJob, TranslationPipeline,
    UnitStatus,
};

use crate::common::{self, locales};

const GREETING: &str = "Hello %@, you have %d messages";

fn greeting_catalog() -> StringCatalog {
    let mut catalog = StringCatalog::new("en");
    catalog.insert_source("greeting", GREETING);
    catalog
}

fn numbered_catalog(count: usize) -> StringCatalog {
    let mut catalog = StringCatalog::new("en");
    for i in 0..count {
        catalog.insert_source(format!("key{:02}", i), format!("Text {:02}", i));
    }
    catalog
}

fn job(targets: &[&str], scheduler: SchedulerConfig) -> TranslationJob {
    TranslationJob::new(
        locales(targets),
        ProviderConfig::new(TranslationProvider::OpenAI).with_api_key("test-key"),
    )
    .with_scheduler_config(scheduler)
}

fn no_delay(batch_size: usize, concurrency: usize) -> SchedulerConfig {
    SchedulerConfig::new(batch_size, concurrency, Duration::ZERO)
}

#[tokio::test]
async fn test_valid_batch_reply_should_translate_every_locale() {
    common::init_logger();
    let provider = MockProvider::working().with_responder(|_, _| {
        Ok(r#"{"0": {"fr": "Bonjour %@, vous avez %d messages", "es": "Hola %@, tienes %d mensajes"}}"#.to_string())
    });
    let pipeline = TranslationPipeline::new(Arc::new(provider.clone()));

    let report = pipeline
        .translate_with_report(&greeting_catalog(), &job(&["fr", "es"], no_delay(5, 10)), |_| {})
        .await
        .unwrap();

    let entry = &report.document.strings["greeting"];
    assert_eq!(entry.localizations["fr"].value(), Some("Bonjour %@, vous avez %d messages"));
    assert_eq!(entry.localizations["es"].value(), Some("Hola %@, tienes %d mensajes"));
    assert_eq!(report.outcomes[0].status(), UnitStatus::Translated);
    assert_eq!(provider.request_count(), 1);
    assert!(provider.calls()[0].user_message.contains("(preserve: %@, %d)"));
}

#[tokio::test]
async fn test_dropped_placeholder_should_reject_only_that_locale() {
    let provider = MockProvider::working().with_responder(|_, _| {
        Ok(r#"{"0": {"fr": "Bonjour %@, vous avez des messages", "es": "Hola %@, tienes %d mensajes"}}"#.to_string())
    });
    let pipeline = TranslationPipeline::new(Arc::new(provider));
    let mut events: Vec<ProgressEvent> = Vec::new();

    let report = pipeline
        .translate_with_report(&greeting_catalog(), &job(&["fr", "es"], no_delay(5, 10)), |e| events.push(e))
        .await
        .unwrap();

    let outcome = &report.outcomes[0];
    assert_eq!(outcome.status(), UnitStatus::Partial);
    assert_eq!(outcome.rejected.len(), 1);
    assert_eq!(outcome.rejected[0].0, "fr");
    assert!(matches!(
        outcome.rejected[0].1.as_ref(),
        TranslationError::PlaceholderViolation { locale, .. } if locale == "fr"
    ));

    let errors: Vec<&ProgressEvent> = events.iter().filter(|e| e.severity == LogSeverity::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Rejected fr translation"));

    let entry = &report.document.strings["greeting"];
    assert!(!entry.has_locale("fr"));
    assert_eq!(entry.localizations["es"].value(), Some("Hola %@, tienes %d mensajes"));
    assert_eq!(report.partial_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_waves_should_pause_once_between_dispatches() {
    let provider = MockProvider::working().with_delay(Duration::from_millis(100));
    let pipeline = TranslationPipeline::new(Arc::new(provider.clone()));
    let scheduler = SchedulerConfig::new(5, 2, Duration::from_millis(50));

    let report = pipeline
        .translate_with_report(&numbered_catalog(12), &job(&["fr"], scheduler), |_| {})
        .await
        .unwrap();

    assert_eq!(report.stats.batches, 3);
    assert_eq!(report.stats.waves, 2);
    assert_eq!(report.stats.pauses, 1);
    assert_eq!(report.translated_count(), 12);
    assert_eq!(provider.max_in_flight(), 2);

    let mut calls = provider.calls();
    calls.sort_by_key(|c| c.started_at);
    assert_eq!(calls.len(), 3);

    // The first two batches run together, the third waits for both plus the pause
    assert_eq!(calls[0].started_at, calls[1].started_at);
    assert!(calls[2].user_message.contains("\"Text 10\""));
    assert!(calls[2].user_message.contains("\"Text 11\""));
    let wave_end = calls[0].finished_at.max(calls[1].finished_at);
    assert!(calls[2].started_at >= wave_end + Duration::from_millis(50));
}

#[tokio::test]
async fn test_fenced_replies_should_parse_like_plain_ones() {
    let fenced = MockProvider::fenced();
    let plain = MockProvider::working();
    let catalog = numbered_catalog(3);
    let job = job(&["fr", "ja"], no_delay(5, 10));

    let from_fenced = TranslationPipeline::new(Arc::new(fenced))
        .translate(&catalog, &job, |_| {})
        .await
        .unwrap();
    let from_plain = TranslationPipeline::new(Arc::new(plain))
        .translate(&catalog, &job, |_| {})
        .await
        .unwrap();

    assert_eq!(from_fenced, from_plain);
    assert_eq!(from_fenced.strings["key01"].localizations["ja"].value(), Some("[ja] Text 01"));
}

#[tokio::test]
async fn test_second_run_should_make_no_calls_and_change_nothing() {
    let provider = MockProvider::working();
    let pipeline = TranslationPipeline::new(Arc::new(provider.clone()));
    let job = job(&["fr", "es", "de"], no_delay(2, 2));

    let first = pipeline.translate(&numbered_catalog(5), &job, |_| {}).await.unwrap();
    let calls_after_first = provider.request_count();
    let mut events = Vec::new();
    let second = pipeline.translate(&first, &job, |e| events.push(e)).await.unwrap();

    assert_eq!(calls_after_first, 3);
    assert_eq!(provider.request_count(), calls_after_first);
    assert_eq!(second, first);
    assert_eq!(
        events,
        vec![ProgressEvent::new(0, 0, "", "All strings are already translated", LogSeverity::Info)]
    );
}

#[tokio::test]
async fn test_concurrency_should_never_exceed_limit() {
    let provider = MockProvider::working().with_delay(Duration::from_millis(5));
    let pipeline = TranslationPipeline::new(Arc::new(provider.clone()));

    let report = pipeline
        .translate_with_report(&numbered_catalog(20), &job(&["fr"], no_delay(1, 3)), |_| {})
        .await
        .unwrap();

    assert_eq!(provider.request_count(), 20);
    assert_eq!(provider.max_in_flight(), 3);
    assert_eq!(report.stats.waves, 7);
    assert_eq!(report.translated_count(), 20);
}

#[tokio::test]
async fn test_failing_batch_should_not_affect_other_batches() {
    let provider = MockProvider::working().with_responder(|prompt, _| {
        if prompt.user_message.contains("Text 02") {
            Err(ProviderError::ApiError {
                status_code: 500,
                message: "upstream exploded".to_string(),
            })
        } else {
            Ok(MockProvider::working_reply(prompt))
        }
    });
    let pipeline = TranslationPipeline::new(Arc::new(provider));
    let mut events = Vec::new();

    let report = pipeline
        .translate_with_report(&numbered_catalog(4), &job(&["fr"], no_delay(1, 4)), |e| events.push(e))
        .await
        .unwrap();

    assert_eq!(report.translated_count(), 3);
    assert_eq!(report.untouched_count(), 1);
    assert!(!report.document.strings["key02"].has_locale("fr"));
    assert!(report.document.strings["key03"].has_locale("fr"));
    assert!(matches!(
        report.outcomes[2].error.as_deref(),
        Some(TranslationError::Provider(ProviderError::ApiError { status_code: 500, .. }))
    ));
    assert!(
        events
            .iter()
            .any(|e| e.severity == LogSeverity::Error && e.message.contains("upstream exploded"))
    );
}

#[tokio::test]
async fn test_malformed_reply_should_leave_catalog_unchanged() {
    let input = numbered_catalog(3);
    let pipeline = TranslationPipeline::new(Arc::new(MockProvider::malformed()));

    let report = pipeline
        .translate_with_report(&input, &job(&["fr"], no_delay(5, 1)), |_| {})
        .await
        .unwrap();

    assert_eq!(report.document, input);
    assert_eq!(report.untouched_count(), 3);
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| matches!(o.error.as_deref(), Some(TranslationError::MalformedResponse(_))))
    );
}

#[tokio::test]
async fn test_progress_should_be_monotonic_and_complete() {
    let provider = MockProvider::intermittent(2).with_delay(Duration::from_millis(3));
    let pipeline = TranslationPipeline::new(Arc::new(provider));
    let mut events = Vec::new();

    pipeline
        .translate(&numbered_catalog(9), &job(&["fr", "de"], no_delay(2, 3)), |e| events.push(e))
        .await
        .unwrap();

    assert!(events.windows(2).all(|w| w[0].current <= w[1].current));
    assert!(events.iter().all(|e| e.total == 9));
    assert_eq!(events.first().map(|e| e.current), Some(0));
    assert_eq!(events.last().map(|e| e.current), Some(9));
    assert!(events.iter().any(|e| e.severity == LogSeverity::Error));
    assert!(events.iter().any(|e| e.severity == LogSeverity::Success));
}

#[tokio::test]
async fn test_cancelled_run_should_make_no_calls() {
    let provider = MockProvider::working();
    let pipeline = TranslationPipeline::new(Arc::new(provider.clone()));
    pipeline.cancellation().cancel();
    let input = numbered_catalog(4);

    let report = pipeline
        .translate_with_report(&input, &job(&["fr"], no_delay(2, 1)), |_| {})
        .await
        .unwrap();

    assert_eq!(provider.request_count(), 0);
    assert_eq!(report.document, input);
    assert!(
        report
            .outcomes
            .iter()
            .all(|o| matches!(o.error.as_deref(), Some(TranslationError::Cancelled)))
    );
}

#[tokio::test]
async fn test_existing_translations_should_be_preserved() {
    let input: StringCatalog =
        StringCatalog::from_json(&common::sample_catalog_json(&[("title", "Settings"), ("cta", "Start")])).unwrap();
    let provider = MockProvider::working();
    let pipeline = TranslationPipeline::new(Arc::new(provider.clone()));

    let output = pipeline
        .translate(&input, &job(&["de", "fr"], no_delay(5, 1)), |_| {})
        .await
        .unwrap();

    assert_eq!(output.strings["title"].localizations["de"].value(), Some("DE Settings"));
    assert_eq!(output.strings["title"].localizations["fr"].value(), Some("[fr] Settings"));
    assert_eq!(output.extra["generator"], "test-suite");
    assert!(provider.calls()[0].user_message.contains("texts to: fr (French)\n"));
}
