/*!
 * Document model for localized string catalogs.
 *
 * The pipeline reads source text and existing locales from a
 * `StringCatalog` and writes accepted translations into a copy of it.
 */

pub mod model;

pub use model::{Localization, StringCatalog, StringEntry, StringUnit, TranslationState};
