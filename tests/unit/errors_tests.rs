/*!
 * Tests for error types and conversions
 */

use locsync::errors::{AppError, DocumentError, ProviderError, TranslationError};

#[test]
fn test_from_status_should_classify_auth_and_rate_limits() {
    assert!(matches!(
        ProviderError::from_status(401, "bad key"),
        ProviderError::AuthenticationError(m) if m == "bad key"
    ));
    assert!(matches!(ProviderError::from_status(403, "x"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "x"), ProviderError::RateLimitExceeded(_)));
    assert_eq!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError {
            status_code: 500,
            message: "boom".to_string()
        }
    );
}

#[test]
fn test_placeholder_violation_should_list_tokens() {
    let error = TranslationError::PlaceholderViolation {
        locale: "fr".to_string(),
        expected: vec!["%@".to_string(), "%d".to_string()],
        found: vec!["%@".to_string()],
    };
    assert_eq!(
        error.to_string(),
        "Placeholder mismatch for fr: expected [%@, %d], found [%@]"
    );
}

#[test]
fn test_errors_should_convert_into_wrappers() {
    let provider_error = ProviderError::ConnectionError("refused".to_string());
    let translation_error: TranslationError = provider_error.clone().into();
    assert!(matches!(translation_error, TranslationError::Provider(ref e) if *e == provider_error));

    let app_error: AppError = translation_error.into();
    assert!(app_error.to_string().contains("refused"));

    let document_error: TranslationError = DocumentError::MissingSourceLanguage.into();
    assert_eq!(document_error.to_string(), "Document error: String catalog has no source language");
}

#[test]
fn test_missing_from_response_should_name_index() {
    let error = TranslationError::MissingFromResponse { index: 3 };
    assert_eq!(error.to_string(), "No translation returned for item 3");
}
