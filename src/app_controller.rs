use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::providers::Provider;
use crate::translation::response::LocaleTranslations;
use crate::translation::{
    CancellationFlag, LogSeverity, ProgressEvent, StringCatalog, TranslationReport, TranslationService,
};

// @module: Application controller for catalog translation

/// Counters accumulated over one or more catalog files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files translated (or checked, in dry-run mode)
    pub files_processed: usize,
    /// Files that could not be read, translated or written
    pub files_failed: usize,
    /// Keys with every missing locale filled
    pub units_translated: usize,
    /// Keys with some missing locales filled
    pub units_partial: usize,
    /// Keys left untouched by errors
    pub units_failed: usize,
    /// Locale values written
    pub values_written: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: &TranslationReport) {
        self.files_processed += 1;
        self.units_translated += report.translated_count();
        self.units_partial += report.partial_count();
        self.units_failed += report.untouched_count();
        self.values_written += report.locales_filled();
    }

    fn merge(&mut self, other: RunSummary) {
        self.files_processed += other.files_processed;
        self.files_failed += other.files_failed;
        self.units_translated += other.units_translated;
        self.units_partial += other.units_partial;
        self.units_failed += other.units_failed;
        self.values_written += other.values_written;
    }
}

/// Main application controller for catalog translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Adapter used instead of the configured one (tests, embedding)
    provider_override: Option<Arc<dyn Provider>>,
    // @field: Stops runs at the next wave boundary
    cancellation: CancellationFlag,
    // @field: Draw progress bars
    show_progress: bool,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Ok(Self::with_config(Config::default())?.with_progress(false))
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            provider_override: None,
            cancellation: CancellationFlag::new(),
            show_progress: true,
        })
    }

    /// Use `provider` instead of building one from configuration
    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider_override = Some(provider);
        self
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Flag that stops running translations at the next wave boundary
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_languages.is_empty()
    }

    fn service(&self) -> Result<TranslationService> {
        match &self.provider_override {
            Some(provider) => Ok(TranslationService::new(
                Arc::clone(provider),
                self.config.translation.active_provider_config(),
            )
            .with_request_options(self.config.translation.common.request_options())
            .with_source_locale(&self.config.source_language)
            .with_protected_words(self.config.protected_words.clone())),
            None => {
                self.config.validate()?;
                TranslationService::from_config(&self.config)
            }
        }
    }

    /// Check the configured provider with a tiny request
    pub async fn test_connection(&self) -> Result<()> {
        let service = self.service()?;
        service
            .test_connection()
            .await
            .with_context(|| format!("Connection test failed for {}", service.provider().name()))?;
        info!("Connection to {} successful", service.provider().name());
        Ok(())
    }

    /// Translate one text into the configured target locales
    pub async fn translate_text(&self, text: &str) -> Result<LocaleTranslations> {
        let service = self.service()?;
        Ok(service.translate_text(text, &self.config.target_languages).await?)
    }

    /// Send a free-form prompt to the configured provider
    pub async fn complete_prompt(&self, system_message: &str, user_message: &str) -> Result<String> {
        let service = self.service()?;
        Ok(service.complete_prompt(system_message, user_message).await?)
    }

    /// Translate one catalog file
    ///
    /// Writes to `output_dir` when given, otherwise in place. In dry-run mode
    /// nothing is written.
    pub async fn run(&self, input_file: PathBuf, output_dir: Option<PathBuf>, dry_run: bool) -> Result<RunSummary> {
        if !input_file.is_file() {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let service = self.service()?;
        let multi_progress = MultiProgress::new();

        let mut summary = RunSummary::default();
        let report = self
            .run_with_progress(&service, &input_file, output_dir.as_deref(), &multi_progress, dry_run)
            .await?;
        summary.absorb(&report);
        Ok(summary)
    }

    /// Translate every catalog found below `input_dir`
    ///
    /// A failing file is logged and counted; the remaining files still run.
    pub async fn run_folder(&self, input_dir: PathBuf, output_dir: Option<PathBuf>, dry_run: bool) -> Result<RunSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }
        let catalogs = FileManager::find_catalogs(&input_dir)?;
        if catalogs.is_empty() {
            return Err(anyhow!("No string catalogs found in directory: {:?}", input_dir));
        }

        let service = self.service()?;
        let multi_progress = MultiProgress::new();
        let folder_pb = self.progress_bar(&multi_progress, catalogs.len(), "files");
        folder_pb.set_message("Processing files");

        let mut summary = RunSummary::default();
        for catalog in &catalogs {
            if self.cancellation.is_cancelled() {
                warn!("Cancelled, {} files not processed", catalogs.len() - summary.files_processed - summary.files_failed);
                break;
            }

            let file_name = catalog
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            // Keep the folder layout when writing somewhere else
            let target_dir = output_dir.as_ref().map(|out| {
                catalog
                    .parent()
                    .and_then(|parent| parent.strip_prefix(&input_dir).ok())
                    .map(|relative| out.join(relative))
                    .unwrap_or_else(|| out.clone())
            });

            match self
                .run_with_progress(&service, catalog, target_dir.as_deref(), &multi_progress, dry_run)
                .await
            {
                Ok(report) => summary.absorb(&report),
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    summary.files_failed += 1;
                }
            }
            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} processed, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.files_processed,
            summary.files_failed
        );

        Ok(summary)
    }

    /// Translate several catalog files and merge their summaries
    pub async fn run_files(&self, files: &[PathBuf], output_dir: Option<PathBuf>, dry_run: bool) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for file in files {
            match self.run(file.clone(), output_dir.clone(), dry_run).await {
                Ok(file_summary) => summary.merge(file_summary),
                Err(e) => {
                    error!("Error processing file {:?}: {:#}", file, e);
                    summary.files_failed += 1;
                }
            }
        }
        Ok(summary)
    }

    async fn run_with_progress(
        &self,
        service: &TranslationService,
        input_file: &Path,
        output_dir: Option<&Path>,
        multi_progress: &MultiProgress,
        dry_run: bool,
    ) -> Result<TranslationReport> {
        let start_time = Instant::now();
        let catalog: StringCatalog = FileManager::read_catalog(input_file)?;
        debug!(
            "Loaded {:?}: {} keys, source language {}",
            input_file,
            catalog.strings.len(),
            catalog.source_language
        );

        info!(
            "{} - {}: {:?}",
            service.provider().name(),
            service.provider_config().model,
            input_file
        );

        let progress_bar = self.progress_bar(multi_progress, 0, "strings");
        progress_bar.set_message("Translating");
        let pb = progress_bar.clone();
        let sink = move |event: ProgressEvent| {
            if event.total > 0 {
                pb.set_length(event.total as u64);
                pb.set_position(event.current as u64);
            }
            pb.set_message(event.current_item.clone());
            match event.severity {
                LogSeverity::Error => pb.suspend(|| warn!("{}", event.message)),
                LogSeverity::Success => debug!("{}", event.message),
                LogSeverity::Info => pb.suspend(|| info!("{}", event.message)),
            }
        };

        let job = service.job(
            self.config.target_languages.clone(),
            self.config.translation.common.scheduler_config(),
        );
        let report = service
            .pipeline()
            .with_cancellation(self.cancellation.clone())
            .translate_with_report(&catalog, &job, sink)
            .await
            .with_context(|| format!("Failed to translate {:?}", input_file))?;
        progress_bar.finish_and_clear();

        if report.is_noop() {
            info!("{:?} is already fully translated", input_file);
        } else if dry_run {
            info!(
                "Dry run: {} values would be written to {:?}",
                report.locales_filled(),
                FileManager::output_path(input_file, output_dir)
            );
        } else {
            let output_path = FileManager::output_path(input_file, output_dir);
            FileManager::write_catalog(&output_path, &report.document)?;
            info!(
                "Wrote {} values to {:?} in {}",
                report.locales_filled(),
                output_path,
                Self::format_duration(start_time.elapsed())
            );
        }

        Ok(report)
    }

    fn progress_bar(&self, multi_progress: &MultiProgress, length: usize, unit: &str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let progress_bar = multi_progress.add(ProgressBar::new(length as u64));
        let style = ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    /// Format a duration in a human-readable way
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let minutes = total_seconds / 60;
        let seconds = total_seconds % 60;
        if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
