use super::*;
use strum::IntoEnumIterator;

#[test]
fn test_status_code_values() {
    assert_eq!(StatusCode::Success as i32, 00_000);
    assert_eq!(StatusCode::Unknown as i32, 01_000);
    assert_eq!(StatusCode::InvalidArguments as i32, 02_000);
    assert_eq!(StatusCode::IoError as i32, 03_000);
    assert_eq!(StatusCode::AuthorizationDenied as i32, 05_000);
    assert_eq!(StatusCode::SandboxViolation as i32, 06_000);
    assert_eq!(StatusCode::ProviderError as i32, 11_000);
    assert_eq!(StatusCode::RateLimited as i32, 12_000);
}

#[test]
fn test_is_success() {
    assert!(StatusCode::is_success(0));
    assert!(!StatusCode::is_success(01_000));
}

#[test]
fn test_is_retryable() {
    assert!(StatusCode::RateLimited.is_retryable());
    assert!(StatusCode::Timeout.is_retryable());
    assert!(StatusCode::ContextOverflow.is_retryable());
    assert!(!StatusCode::InvalidArguments.is_retryable());
    assert!(!StatusCode::AuthenticationFailed.is_retryable());
    assert!(!StatusCode::ReadRequired.is_retryable());
}

#[test]
fn test_should_log_error() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::Internal.should_log_error());
    assert!(!StatusCode::InvalidArguments.should_log_error());
}

#[test]
fn test_display() {
    assert_eq!(format!("{}", StatusCode::Success), "Success");
    assert_eq!(format!("{}", StatusCode::ReadRequired), "ReadRequired");
}

#[test]
fn test_name() {
    assert_eq!(StatusCode::Success.name(), "Success");
    assert_eq!(StatusCode::Conflict.name(), "Conflict");
}

#[test]
fn test_category() {
    assert_eq!(StatusCode::Success.category(), StatusCategory::Success);
    assert_eq!(StatusCode::Unknown.category(), StatusCategory::Common);
    assert_eq!(
        StatusCode::InvalidArguments.category(),
        StatusCategory::Input
    );
    assert_eq!(StatusCode::IoError.category(), StatusCategory::IO);
    assert_eq!(
        StatusCode::ReadRequired.category(),
        StatusCategory::Safety
    );
    assert_eq!(
        StatusCode::SandboxViolation.category(),
        StatusCategory::Sandbox
    );
    assert_eq!(
        StatusCode::ProviderError.category(),
        StatusCategory::Provider
    );
    assert_eq!(StatusCode::RateLimited.category(), StatusCategory::Resource);
}

#[test]
fn test_metadata_consistency() {
    for code in StatusCode::iter() {
        let meta = code.meta();
        let value = code as i32;

        match meta.category {
            StatusCategory::Success => assert_eq!(value, 0),
            StatusCategory::Common => assert!((01_000..02_000).contains(&value)),
            StatusCategory::Input => assert!((02_000..03_000).contains(&value)),
            StatusCategory::IO => assert!((03_000..04_000).contains(&value)),
            StatusCategory::Safety => assert!((05_000..06_000).contains(&value)),
            StatusCategory::Sandbox => assert!((06_000..07_000).contains(&value)),
            StatusCategory::Provider => assert!((11_000..12_000).contains(&value)),
            StatusCategory::Resource => assert!((12_000..13_000).contains(&value)),
        }
    }
}

#[test]
fn test_retryable_rules() {
    assert!(StatusCode::RateLimited.is_retryable());
    assert!(StatusCode::Timeout.is_retryable());
    assert!(StatusCode::NetworkError.is_retryable());
    assert!(StatusCode::ServiceUnavailable.is_retryable());
    assert!(StatusCode::StreamError.is_retryable());

    assert!(!StatusCode::AuthenticationFailed.is_retryable());
    assert!(!StatusCode::PermissionDenied.is_retryable());
    assert!(!StatusCode::InvalidArguments.is_retryable());
    assert!(!StatusCode::Conflict.is_retryable());
}

#[test]
fn test_log_error_rules() {
    assert!(StatusCode::Unknown.should_log_error());
    assert!(StatusCode::Internal.should_log_error());
    assert!(StatusCode::ProviderError.should_log_error());

    assert!(!StatusCode::InvalidArguments.should_log_error());
    assert!(!StatusCode::AuthenticationFailed.should_log_error());
}
