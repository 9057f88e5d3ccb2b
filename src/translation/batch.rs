/*!
 * Batch translation scheduling.
 *
 * Units are grouped into batches of `batch_size`, and batches are dispatched
 * in waves of at most `concurrency` concurrent provider calls. A wave always
 * completes before the next one starts, with a short fixed pause in between.
 * Errors are contained per batch (or per locale for placeholder violations),
 * and results are reduced back in original unit order so progress reporting
 * stays monotonic.
 */

use futures::future::join_all;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::ProviderConfig;
use crate::errors::TranslationError;
use crate::providers::{Provider, RequestOptions};

use super::placeholders;
use super::prompts::{PromptBuilder, PromptItem};
use super::response::{self, LocaleTranslations};

/// Default number of units per provider call
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Default number of provider calls per wave
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default pause between waves
pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_millis(50);

/// Maximum length of the item label shown in progress events
const LABEL_MAX_CHARS: usize = 40;

/// Scheduler tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Units per provider call
    pub batch_size: usize,
    /// Provider calls in flight at once
    pub concurrency: usize,
    /// Pause between waves
    pub wave_delay: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY, DEFAULT_WAVE_DELAY)
    }
}

impl SchedulerConfig {
    /// Create a scheduler config; zero sizes are clamped to 1
    pub fn new(batch_size: usize, concurrency: usize, wave_delay: Duration) -> Self {
        Self {
            batch_size: batch_size.max(1),
            concurrency: concurrency.max(1),
            wave_delay,
        }
    }
}

/// One source string and the locales it still lacks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableUnit {
    /// Catalog key
    pub key: String,
    /// Text in the source locale
    pub source_text: String,
    /// Requested locales with no existing translation
    pub missing_locales: Vec<String>,
}

impl TranslatableUnit {
    /// Create a new unit
    pub fn new(key: impl Into<String>, source_text: impl Into<String>, missing_locales: Vec<String>) -> Self {
        Self {
            key: key.into(),
            source_text: source_text.into(),
            missing_locales,
        }
    }
}

/// Raw per-unit output of one batch call
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Catalog key
    pub key: String,
    /// Text in the source locale
    pub source_text: String,
    /// Translations returned for this unit, keyed by locale
    pub translations: LocaleTranslations,
    /// Failure shared by the whole batch, or this unit's missing index
    pub error: Option<Arc<TranslationError>>,
    /// Locales the unit lacked when the run started
    pub missing_locales: Vec<String>,
}

impl BatchResult {
    fn failed(unit: &TranslatableUnit, error: Arc<TranslationError>) -> Self {
        Self {
            key: unit.key.clone(),
            source_text: unit.source_text.clone(),
            translations: LocaleTranslations::new(),
            error: Some(error),
            missing_locales: unit.missing_locales.clone(),
        }
    }
}

/// Severity of a progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Success,
    Error,
}

/// Progress notification sent to the caller's sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    /// Units processed so far
    pub current: usize,
    /// Units in the run
    pub total: usize,
    /// Short label of the unit being reported
    pub current_item: String,
    /// Human-readable description
    pub message: String,
    /// Event severity
    pub severity: LogSeverity,
}

impl ProgressEvent {
    /// Create a new progress event
    pub fn new(
        current: usize,
        total: usize,
        current_item: impl Into<String>,
        message: impl Into<String>,
        severity: LogSeverity,
    ) -> Self {
        Self {
            current,
            total,
            current_item: current_item.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Reduced status of one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStatus {
    /// Every missing locale was filled
    Translated,
    /// Some missing locales were filled
    Partial,
    /// Nothing was filled
    Untouched,
}

/// Reduced per-unit result
#[derive(Debug, Clone)]
pub struct UnitOutcome {
    /// Catalog key
    pub key: String,
    /// Text in the source locale
    pub source_text: String,
    /// Locales the unit lacked when the run started
    pub missing_locales: Vec<String>,
    /// Translations that passed validation
    pub accepted: LocaleTranslations,
    /// Locales dropped because their translation broke a placeholder
    pub rejected: Vec<(String, Arc<TranslationError>)>,
    /// Failure that prevented any locale from being filled
    pub error: Option<Arc<TranslationError>>,
}

impl UnitOutcome {
    /// Derived status
    pub fn status(&self) -> UnitStatus {
        if self.accepted.is_empty() {
            UnitStatus::Untouched
        } else if self.missing_locales.iter().all(|l| self.accepted.contains_key(l)) {
            UnitStatus::Translated
        } else {
            UnitStatus::Partial
        }
    }
}

/// Cooperative cancellation, honoured at wave boundaries only
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Create an unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; waves already in flight still complete
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counters describing how a run was dispatched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Provider calls made
    pub batches: usize,
    /// Waves dispatched
    pub waves: usize,
    /// Pauses taken between waves
    pub pauses: usize,
}

/// Everything a scheduler run produced
#[derive(Debug, Clone, Default)]
pub struct ScheduleReport {
    /// One outcome per input unit, in input order
    pub outcomes: Vec<UnitOutcome>,
    /// Dispatch counters
    pub stats: RunStats,
}

/// A unit paired with the placeholder tokens scanned from its source text
struct PreparedUnit<'a> {
    unit: &'a TranslatableUnit,
    placeholders: Vec<String>,
}

/// Wave-based batch dispatcher
#[derive(Debug, Clone)]
pub struct BatchScheduler {
    provider: Arc<dyn Provider>,
    provider_config: ProviderConfig,
    options: RequestOptions,
    prompts: PromptBuilder,
    config: SchedulerConfig,
    cancellation: CancellationFlag,
}

impl BatchScheduler {
    /// Create a scheduler for one provider configuration
    pub fn new(provider: Arc<dyn Provider>, provider_config: ProviderConfig, config: SchedulerConfig) -> Self {
        Self {
            provider,
            provider_config,
            options: RequestOptions::default(),
            prompts: PromptBuilder::default(),
            config,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Override generation options
    pub fn with_request_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the prompt builder, e.g. for a non-English source locale
    pub fn with_prompt_builder(mut self, prompts: PromptBuilder) -> Self {
        self.prompts = prompts;
        self
    }

    /// Observe an external cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Scheduler tuning in use
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Translate every unit and report progress through `progress`
    ///
    /// Never fails: provider, parse and placeholder errors are recorded on
    /// the affected outcomes. `target_locales` fixes the order in which
    /// locales are requested.
    pub async fn run<F>(
        &self,
        units: &[TranslatableUnit],
        target_locales: &[String],
        protected_words: &[String],
        progress: &mut F,
    ) -> ScheduleReport
    where
        F: FnMut(ProgressEvent),
    {
        let total = units.len();
        let prepared: Vec<PreparedUnit<'_>> = units
            .iter()
            .map(|unit| PreparedUnit {
                unit,
                placeholders: placeholders::scan(&unit.source_text),
            })
            .collect();
        let batches: Vec<&[PreparedUnit<'_>]> = prepared.chunks(self.config.batch_size).collect();
        let waves: Vec<&[&[PreparedUnit<'_>]]> = batches.chunks(self.config.concurrency).collect();

        debug!(
            "Scheduling {} units in {} batches over {} waves (batch size {}, concurrency {})",
            total,
            batches.len(),
            waves.len(),
            self.config.batch_size,
            self.config.concurrency
        );

        let mut report = ScheduleReport {
            outcomes: Vec::with_capacity(total),
            stats: RunStats::default(),
        };
        let mut current = 0;

        for (wave_index, wave) in waves.iter().enumerate() {
            if wave_index > 0 && !self.cancellation.is_cancelled() {
                tokio::time::sleep(self.config.wave_delay).await;
                report.stats.pauses += 1;
            }

            if self.cancellation.is_cancelled() {
                debug!("Cancellation requested, skipping {} remaining waves", waves.len() - wave_index);
                let cancelled = Arc::new(TranslationError::Cancelled);
                for prepared in waves[wave_index..].iter().flat_map(|wave| wave.iter()).flat_map(|batch| batch.iter()) {
                    let result = BatchResult::failed(prepared.unit, Arc::clone(&cancelled));
                    current += 1;
                    report.outcomes.push(reduce(result, &prepared.placeholders, current, total, progress));
                }
                break;
            }

            debug!("Dispatching wave {} with {} batches", wave_index + 1, wave.len());
            let wave_results = join_all(
                wave.iter()
                    .map(|batch| self.run_batch(batch, target_locales, protected_words)),
            )
            .await;
            report.stats.waves += 1;
            report.stats.batches += wave.len();

            for (batch, results) in wave.iter().zip(wave_results) {
                for (prepared, result) in batch.iter().zip(results) {
                    current += 1;
                    report.outcomes.push(reduce(result, &prepared.placeholders, current, total, progress));
                }
            }
        }

        report
    }

    /// Build the prompt, call the provider and split the reply per unit
    async fn run_batch(
        &self,
        batch: &[PreparedUnit<'_>],
        target_locales: &[String],
        protected_words: &[String],
    ) -> Vec<BatchResult> {
        let locales = requested_locales(batch, target_locales);
        let items: Vec<PromptItem<'_>> = batch
            .iter()
            .map(|p| PromptItem {
                text: &p.unit.source_text,
                placeholders: &p.placeholders,
            })
            .collect();
        let prompt = self.prompts.build_batch(&items, &locales, protected_words);

        let parsed = match self
            .provider
            .send(&prompt, &self.provider_config, &self.options)
            .await
        {
            Ok(raw) => response::parse_batch(&raw, batch.len()),
            Err(e) => Err(TranslationError::from(e)),
        };

        match parsed {
            Ok(mut parsed) => batch
                .iter()
                .enumerate()
                .map(|(index, prepared)| {
                    if parsed.is_missing(index) {
                        return BatchResult::failed(
                            prepared.unit,
                            Arc::new(TranslationError::MissingFromResponse { index }),
                        );
                    }
                    BatchResult {
                        key: prepared.unit.key.clone(),
                        source_text: prepared.unit.source_text.clone(),
                        translations: std::mem::take(&mut parsed.entries[index]),
                        error: None,
                        missing_locales: prepared.unit.missing_locales.clone(),
                    }
                })
                .collect(),
            Err(e) => {
                warn!(
                    "{} batch of {} items failed: {}",
                    self.provider.name(),
                    batch.len(),
                    e
                );
                let error = Arc::new(e);
                batch
                    .iter()
                    .map(|prepared| BatchResult::failed(prepared.unit, Arc::clone(&error)))
                    .collect()
            }
        }
    }
}

/// Target locales in caller order that at least one unit of the batch lacks,
/// followed by any other missing locale in first-seen order
fn requested_locales(batch: &[PreparedUnit<'_>], target_locales: &[String]) -> Vec<String> {
    let lacks = |locale: &String| batch.iter().any(|p| p.unit.missing_locales.contains(locale));
    let mut locales: Vec<String> = target_locales.iter().filter(|l| lacks(l)).cloned().collect();
    for prepared in batch {
        for locale in &prepared.unit.missing_locales {
            if !locales.contains(locale) {
                locales.push(locale.clone());
            }
        }
    }
    locales
}

/// Validate one raw result into an outcome, emitting its progress events
fn reduce<F>(
    result: BatchResult,
    source_tokens: &[String],
    current: usize,
    total: usize,
    progress: &mut F,
) -> UnitOutcome
where
    F: FnMut(ProgressEvent),
{
    let label = item_label(&result.source_text);
    let mut outcome = UnitOutcome {
        key: result.key,
        source_text: result.source_text,
        missing_locales: result.missing_locales,
        accepted: LocaleTranslations::new(),
        rejected: Vec::new(),
        error: None,
    };

    if let Some(error) = result.error {
        progress(ProgressEvent::new(
            current,
            total,
            label.as_str(),
            format!("Failed to translate \"{}\": {}", label, error),
            LogSeverity::Error,
        ));
        outcome.error = Some(error);
        return outcome;
    }

    let mut translations = result.translations;
    for locale in &outcome.missing_locales {
        let Some(text) = translations.remove(locale).filter(|t| !t.trim().is_empty()) else {
            continue;
        };

        if placeholders::placeholders_match(source_tokens, &text) {
            outcome.accepted.insert(locale.clone(), text);
        } else {
            let violation = TranslationError::PlaceholderViolation {
                locale: locale.clone(),
                expected: source_tokens.to_vec(),
                found: placeholders::scan(&text),
            };
            progress(ProgressEvent::new(
                current,
                total,
                label.as_str(),
                format!("Rejected {} translation of \"{}\": {}", locale, label, violation),
                LogSeverity::Error,
            ));
            outcome.rejected.push((locale.clone(), Arc::new(violation)));
        }
    }

    let filled = outcome.accepted.len();
    let requested = outcome.missing_locales.len();
    let (severity, message) = if filled > 0 {
        (
            LogSeverity::Success,
            format!("Translated \"{}\" into {}/{} locales", label, filled, requested),
        )
    } else {
        (
            LogSeverity::Error,
            format!("No usable translation for \"{}\" (0/{} locales)", label, requested),
        )
    };
    progress(ProgressEvent::new(current, total, label, message, severity));

    outcome
}

/// Source text shortened for display
fn item_label(text: &str) -> String {
    if text.chars().count() > LABEL_MAX_CHARS {
        let head: String = text.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}
