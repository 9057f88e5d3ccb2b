/*!
 * # locsync - localized string catalogs kept in sync with AI
 *
 * A Rust library for filling missing locales in Xcode string catalogs
 * (`.xcstrings`) using large-language-model providers.
 *
 * ## Features
 *
 * - Translate catalogs using various AI providers:
 *   - OpenAI chat completions
 *   - Azure OpenAI deployments
 *   - AWS Bedrock Converse
 *   - GitHub Models
 *   - Anthropic Messages
 * - Batch many strings into one call and run a bounded number of calls at once
 * - Preserve printf-style format specifiers (`%@`, `%d`, `%1$@`) verbatim
 * - Contain provider failures to the batch or locale they affect
 * - Keep existing translations and unknown catalog fields untouched
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation core:
 *   - `translation::placeholders`: Format specifier scanning
 *   - `translation::prompts`: Prompt builders
 *   - `translation::response`: Reply parsing
 *   - `translation::batch`: Wave-based batch scheduling
 *   - `translation::pipeline`: Catalog translation pipeline
 *   - `translation::document`: String catalog model
 *   - `translation::core`: One-shot translation service
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Locale names and validation
 * - `providers`: Client implementations for the supported LLM backends
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, DocumentError, ProviderError, TranslationError};
pub use translation::{
    ProgressEvent, StringCatalog, TranslationJob, TranslationPipeline, TranslationReport,
    TranslationService,
};
