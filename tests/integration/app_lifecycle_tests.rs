/*!
 * Full app lifecycle tests: controller, files on disk and a scripted provider
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use locsync::app_controller::{Controller, RunSummary};
use locsync::file_utils::FileManager;
use locsync::providers::mock::MockProvider;

use crate::common;

fn controller(provider: &MockProvider, targets: &[&str]) -> Result<Controller> {
    Ok(Controller::with_config(common::test_config(targets))?
        .with_provider(Arc::new(provider.clone()))
        .with_progress(false))
}

#[tokio::test]
async fn test_run_should_translate_catalog_in_place() -> Result<()> {
    common::init_logger();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_catalog(temp_dir.path(), "Localizable.xcstrings")?;
    let provider = MockProvider::working();

    let summary = controller(&provider, &["fr", "es"])?.run(path.clone(), None, false).await?;

    assert_eq!(
        summary,
        RunSummary {
            files_processed: 1,
            files_failed: 0,
            units_translated: 3,
            units_partial: 0,
            units_failed: 0,
            values_written: 6,
        }
    );
    let catalog = FileManager::read_catalog(&path)?;
    assert_eq!(
        catalog.strings["greeting"].localizations["es"].value(),
        Some("[es] Hello %@, you have %d messages")
    );
    assert_eq!(catalog.strings["greeting"].localizations["de"].value(), Some("DE Hello %@, you have %d messages"));
    assert_eq!(catalog.extra["generator"], "test-suite");
    Ok(())
}

#[tokio::test]
async fn test_dry_run_should_not_touch_the_file() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_catalog(temp_dir.path(), "Localizable.xcstrings")?;
    let before = fs::read_to_string(&path)?;
    let provider = MockProvider::working();

    let summary = controller(&provider, &["ja"])?.run(path.clone(), None, true).await?;

    assert_eq!(summary.values_written, 3);
    assert_eq!(provider.request_count(), 1);
    assert_eq!(fs::read_to_string(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn test_run_with_output_dir_should_leave_input_untouched() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_catalog(temp_dir.path(), "Localizable.xcstrings")?;
    let before = fs::read_to_string(&path)?;
    let out_dir = temp_dir.path().join("translated");

    controller(&MockProvider::working(), &["it"])?
        .run(path.clone(), Some(out_dir.clone()), false)
        .await?;

    let written = FileManager::read_catalog(out_dir.join("Localizable.xcstrings"))?;
    assert_eq!(written.locale_coverage("it"), 3);
    assert_eq!(fs::read_to_string(&path)?, before);
    Ok(())
}

#[tokio::test]
async fn test_run_folder_should_continue_after_a_broken_file() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("App");
    common::create_test_catalog(&input, "Main/Localizable.xcstrings")?;
    common::create_test_file(&input, "Widgets/Broken.xcstrings", "{ this is not json")?;
    let out_dir = temp_dir.path().join("out");

    let summary = controller(&MockProvider::working(), &["fr"])?
        .run_folder(input.clone(), Some(out_dir.clone()), false)
        .await?;

    assert_eq!(summary.files_processed, 1);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.units_translated, 3);
    assert!(FileManager::file_exists(out_dir.join("Main/Localizable.xcstrings")));
    assert!(!FileManager::file_exists(out_dir.join("Widgets/Broken.xcstrings")));
    Ok(())
}

#[tokio::test]
async fn test_run_folder_should_report_partial_failures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_catalog(temp_dir.path(), "Localizable.xcstrings")?;
    let provider = MockProvider::working().with_responder(|prompt, _| {
        if prompt.user_message.contains("Settings") {
            Err(locsync::ProviderError::RateLimitExceeded("slow down".to_string()))
        } else {
            Ok(MockProvider::working_reply(prompt))
        }
    });
    let mut config = common::test_config(&["fr"]);
    config.translation.common.batch_size = 1;
    let controller = Controller::with_config(config)?
        .with_provider(Arc::new(provider))
        .with_progress(false);

    let summary = controller.run_folder(temp_dir.path().to_path_buf(), None, false).await?;

    assert_eq!(summary.units_translated, 2);
    assert_eq!(summary.units_failed, 1);
    let catalog = FileManager::read_catalog(temp_dir.path().join("Localizable.xcstrings"))?;
    assert!(!catalog.strings["settings.title"].has_locale("fr"));
    assert!(catalog.strings["onboarding.cta"].has_locale("fr"));
    Ok(())
}

#[tokio::test]
async fn test_run_should_fail_for_missing_inputs() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller(&MockProvider::working(), &["fr"])?;

    assert!(controller.run(temp_dir.path().join("nope.xcstrings"), None, false).await.is_err());
    assert!(controller.run_folder(temp_dir.path().to_path_buf(), None, false).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_one_shot_operations_should_use_injected_provider() -> Result<()> {
    let provider = MockProvider::working();
    let controller = controller(&provider, &["fr", "de"])?;

    controller.test_connection().await?;
    let translations = controller.translate_text("Hello %@").await?;
    let reply = controller.complete_prompt("Be brief", "Describe the app").await?;

    assert_eq!(translations["de"], "[de] Hello %@");
    assert_eq!(reply, "[mock] Describe the app");
    assert_eq!(provider.request_count(), 3);
    Ok(())
}

#[tokio::test]
async fn test_unconfigured_provider_should_fail_before_any_request() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let error = controller.test_connection().await.unwrap_err();
    assert!(error.to_string().contains("API key is required"));
    Ok(())
}
