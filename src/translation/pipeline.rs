/*!
 * Catalog translation pipeline.
 *
 * Finds every key that lacks one of the requested locales, hands the work
 * to the `BatchScheduler`, and writes accepted translations into a fresh
 * copy of the input catalog. The caller's catalog is never mutated.
 */

use log::{debug, info};
use std::sync::Arc;

use crate::app_config::{Config, ProviderConfig};
use crate::errors::{DocumentError, TranslationError};
use crate::language_utils;
use crate::providers::{Provider, RequestOptions};

use super::batch::{
    BatchScheduler, CancellationFlag, LogSeverity, ProgressEvent, RunStats, SchedulerConfig,
    TranslatableUnit, UnitOutcome, UnitStatus,
};
use super::document::{Localization, StringCatalog, TranslationState};
use super::prompts::PromptBuilder;

/// What to translate and how
#[derive(Debug, Clone)]
pub struct TranslationJob {
    /// Locales to fill, in request order
    pub target_locales: Vec<String>,
    /// Provider account passed unchanged to the adapter
    pub provider_config: ProviderConfig,
    /// Words echoed verbatim in every locale
    pub protected_words: Vec<String>,
    /// Batch size, concurrency and pacing
    pub scheduler: SchedulerConfig,
    /// Generation options
    pub options: RequestOptions,
}

impl TranslationJob {
    /// Create a job with default scheduling
    pub fn new(target_locales: Vec<String>, provider_config: ProviderConfig) -> Self {
        Self {
            target_locales,
            provider_config,
            protected_words: Vec::new(),
            scheduler: SchedulerConfig::default(),
            options: RequestOptions::default(),
        }
    }

    /// Build a job from application config, using the active provider
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_locales: config.target_languages.clone(),
            provider_config: config.translation.active_provider_config(),
            protected_words: config.protected_words.clone(),
            scheduler: config.translation.common.scheduler_config(),
            options: config.translation.common.request_options(),
        }
    }

    /// Set protected words
    pub fn with_protected_words(mut self, protected_words: Vec<String>) -> Self {
        self.protected_words = protected_words;
        self
    }

    /// Set scheduler tuning
    pub fn with_scheduler_config(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Set generation options
    pub fn with_request_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of a pipeline run
#[derive(Debug, Clone)]
pub struct TranslationReport {
    /// Updated copy of the input catalog
    pub document: StringCatalog,
    /// One outcome per unit, in key order
    pub outcomes: Vec<UnitOutcome>,
    /// Dispatch counters
    pub stats: RunStats,
}

impl TranslationReport {
    fn unchanged(document: StringCatalog) -> Self {
        Self {
            document,
            outcomes: Vec::new(),
            stats: RunStats::default(),
        }
    }

    fn count(&self, status: UnitStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status() == status).count()
    }

    /// Units with every missing locale filled
    pub fn translated_count(&self) -> usize {
        self.count(UnitStatus::Translated)
    }

    /// Units with some missing locales filled
    pub fn partial_count(&self) -> usize {
        self.count(UnitStatus::Partial)
    }

    /// Units left untouched
    pub fn untouched_count(&self) -> usize {
        self.count(UnitStatus::Untouched)
    }

    /// Locale values written into the document
    pub fn locales_filled(&self) -> usize {
        self.outcomes.iter().map(|o| o.accepted.len()).sum()
    }

    /// Whether the run produced no work at all
    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Drives a provider over a whole catalog
#[derive(Debug, Clone)]
pub struct TranslationPipeline {
    provider: Arc<dyn Provider>,
    cancellation: CancellationFlag,
}

impl TranslationPipeline {
    /// Create a pipeline for a provider adapter
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Observe an external cancellation flag
    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Flag that stops the run at the next wave boundary
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Translate `document` and return the updated copy
    pub async fn translate<F>(
        &self,
        document: &StringCatalog,
        job: &TranslationJob,
        progress: F,
    ) -> Result<StringCatalog, TranslationError>
    where
        F: FnMut(ProgressEvent),
    {
        Ok(self.translate_with_report(document, job, progress).await?.document)
    }

    /// Translate `document` and return the copy with per-unit outcomes
    pub async fn translate_with_report<F>(
        &self,
        document: &StringCatalog,
        job: &TranslationJob,
        mut progress: F,
    ) -> Result<TranslationReport, TranslationError>
    where
        F: FnMut(ProgressEvent),
    {
        let target_locales = effective_targets(&document.source_language, &job.target_locales);
        let units = collect_units(document, &target_locales)?;
        let mut output = document.clone();

        if units.is_empty() {
            info!("Nothing to translate for {} locales", target_locales.len());
            progress(ProgressEvent::new(
                0,
                0,
                "",
                "All strings are already translated",
                LogSeverity::Info,
            ));
            return Ok(TranslationReport::unchanged(output));
        }

        let total = units.len();
        info!(
            "Translating {} strings into {} locales with {}",
            total,
            target_locales.len(),
            self.provider.name()
        );
        progress(ProgressEvent::new(
            0,
            total,
            "",
            format!(
                "Translating {} strings into {} locales",
                total,
                target_locales.len()
            ),
            LogSeverity::Info,
        ));

        let scheduler = BatchScheduler::new(
            Arc::clone(&self.provider),
            job.provider_config.clone(),
            job.scheduler,
        )
        .with_request_options(job.options.clone())
        .with_prompt_builder(PromptBuilder::new(&document.source_language))
        .with_cancellation(self.cancellation.clone());

        let schedule = scheduler
            .run(&units, &target_locales, &job.protected_words, &mut progress)
            .await;

        for outcome in &schedule.outcomes {
            apply_outcome(&mut output, outcome);
        }

        let report = TranslationReport {
            document: output,
            outcomes: schedule.outcomes,
            stats: schedule.stats,
        };

        let summary = format!(
            "Finished: {} translated, {} partial, {} failed ({} values written)",
            report.translated_count(),
            report.partial_count(),
            report.untouched_count(),
            report.locales_filled()
        );
        info!("{}", summary);
        progress(ProgressEvent::new(total, total, "", summary, LogSeverity::Info));

        Ok(report)
    }
}

/// Requested locales minus blanks, duplicates and the source locale
pub fn effective_targets(source_locale: &str, target_locales: &[String]) -> Vec<String> {
    let mut targets: Vec<String> = Vec::with_capacity(target_locales.len());
    for locale in target_locales.iter().map(|l| l.trim()) {
        if locale.is_empty() || language_utils::locale_codes_match(locale, source_locale) {
            continue;
        }
        if !targets.iter().any(|t| t == locale) {
            targets.push(locale.to_string());
        }
    }
    targets
}

/// Build the translation work for `document`, in key order
///
/// Skips keys marked `shouldTranslate: false` and keys whose source text is
/// blank. A unit's missing locales keep the order of `target_locales`.
pub fn collect_units(
    document: &StringCatalog,
    target_locales: &[String],
) -> Result<Vec<TranslatableUnit>, TranslationError> {
    let source_locale = document.source_language.trim();
    if source_locale.is_empty() {
        return Err(DocumentError::MissingSourceLanguage.into());
    }

    let mut units = Vec::new();
    for (key, entry) in &document.strings {
        if !entry.is_translatable() {
            debug!("Skipping {:?}: marked as not translatable", key);
            continue;
        }

        let source_text = entry.source_text(key, source_locale);
        if source_text.trim().is_empty() {
            continue;
        }

        let missing: Vec<String> = target_locales
            .iter()
            .filter(|locale| !entry.has_locale(locale))
            .cloned()
            .collect();
        if !missing.is_empty() {
            units.push(TranslatableUnit::new(key.as_str(), source_text, missing));
        }
    }

    Ok(units)
}

/// Write accepted locales for one unit; existing localizations are kept
fn apply_outcome(document: &mut StringCatalog, outcome: &UnitOutcome) {
    if outcome.accepted.is_empty() {
        return;
    }
    let source_locale = document.source_language.clone();
    let Some(entry) = document.strings.get_mut(&outcome.key) else {
        return;
    };

    for (locale, text) in &outcome.accepted {
        entry
            .localizations
            .entry(locale.clone())
            .or_insert_with(|| Localization::with_value(text.as_str(), TranslationState::Translated));
    }
    entry
        .localizations
        .entry(source_locale)
        .or_insert_with(|| Localization::with_value(outcome.source_text.as_str(), TranslationState::Translated));
}
