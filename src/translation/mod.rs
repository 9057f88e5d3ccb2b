/*!
 * Catalog translation using AI providers.
 *
 * This module contains the translation core, split into several submodules:
 *
 * - `placeholders`: Format specifier scanning
 * - `prompts`: Prompt builders for single-text and batch requests
 * - `response`: Parsing of provider replies
 * - `batch`: Wave-based batch scheduling with failure isolation
 * - `pipeline`: Missing-work discovery and catalog updates
 * - `document`: String catalog model
 * - `core`: Translation service for one-shot requests
 */

// Re-export main types for easier usage
pub use self::batch::{
    BatchScheduler, CancellationFlag, LogSeverity, ProgressEvent, SchedulerConfig, TranslatableUnit,
    UnitOutcome, UnitStatus,
};
pub use self::core::TranslationService;
pub use self::document::{Localization, StringCatalog, StringEntry, StringUnit, TranslationState};
pub use self::pipeline::{TranslationJob, TranslationPipeline, TranslationReport};
pub use self::prompts::{Prompt, PromptBuilder};

// Submodules
pub mod batch;
pub mod core;
pub mod document;
pub mod pipeline;
pub mod placeholders;
pub mod prompts;
pub mod response;
