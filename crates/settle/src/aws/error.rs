//! AWS error classification and handling
//!
//! Provides typed errors for AWS SDK operations using the `.code()` method
//! instead of string matching on Debug format.

use aws_sdk_memorydb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// AWS error categories for retry and not-found handling
#[derive(Debug, Clone, Error)]
pub enum AwsError {
    /// The service reported that the resource does not exist
    #[error("{code}: {message}")]
    NotFound { code: String, message: String },

    /// Rate limit exceeded (retryable)
    #[error("Rate limit exceeded ({code})")]
    Throttled { code: String },

    /// The request never got a response: timeout, connection reset, DNS (retryable)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The service failed on its side: an internal error or unavailable (retryable)
    #[error("Service unavailable ({code}): {message}")]
    ServiceFault { code: String, message: String },

    /// The service is busy with a conflicting change (retryable)
    #[error("Conflicting operation in progress: {message}")]
    Conflict { message: String },

    /// Rejected before any request was sent
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Generic AWS SDK error with code and message
    #[error("AWS error: {message}")]
    Sdk {
        code: Option<String>,
        message: String,
    },
}

impl AwsError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AwsError::NotFound { .. })
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AwsError::Throttled { .. }
                | AwsError::Transport { .. }
                | AwsError::ServiceFault { .. }
                | AwsError::Conflict { .. }
        )
    }

    /// The AWS error code, when the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::NotFound { code, .. }
            | AwsError::Throttled { code }
            | AwsError::ServiceFault { code, .. } => Some(code),
            AwsError::Sdk { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Build an input validation error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AwsError::InvalidInput {
            message: message.into(),
        }
    }

    /// Get a user-friendly suggestion for resolving this error, if available.
    pub fn suggestion(&self) -> Option<String> {
        self.code().and_then(suggestion_for_code)
    }
}

/// Known AWS error codes for "not found" conditions
const NOT_FOUND_CODES: &[&str] = &[
    // MemoryDB
    "ACLNotFoundFault",
    "ClusterNotFoundFault",
    "ParameterGroupNotFoundFault",
    "SnapshotNotFoundFault",
    "SubnetGroupNotFoundFault",
    "UserNotFoundFault",
    // Global Accelerator
    "AcceleratorNotFoundException",
    "EndpointGroupNotFoundException",
    "ListenerNotFoundException",
    // Generic
    "ResourceNotFoundException",
];

/// Known AWS error codes for throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "RequestLimitExceeded",
    "TooManyRequestsException",
];

/// Known AWS error codes for server-side faults
const SERVICE_FAULT_CODES: &[&str] = &[
    "InternalFailure",
    "InternalServerError",
    "InternalServerException",
    "InternalServiceErrorException",
    "ServiceUnavailable",
    "ServiceUnavailableException",
];

/// Known AWS error codes for a resource busy with another change
const CONFLICT_CODES: &[&str] = &[
    "InvalidACLStateFault",
    "InvalidClusterStateFault",
    "InvalidSnapshotStateFault",
    "InvalidUserStateFault",
    "TransactionInProgressException",
];

/// Classify an AWS SDK error using the error code.
pub fn classify_aws_error(code: Option<&str>, message: Option<&str>) -> AwsError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => AwsError::NotFound {
            code: c.to_string(),
            message,
        },
        Some(c) if THROTTLING_CODES.contains(&c) => AwsError::Throttled {
            code: c.to_string(),
        },
        Some(c) if SERVICE_FAULT_CODES.contains(&c) => AwsError::ServiceFault {
            code: c.to_string(),
            message,
        },
        Some(c) if CONFLICT_CODES.contains(&c) => AwsError::Conflict { message },
        _ => AwsError::Sdk {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify a raw SDK error.
///
/// Requests that never produced a service response (timeouts, dispatch
/// failures) are transport errors. Everything else is classified from the
/// error metadata the service returned. `SdkError` and
/// `ProvideErrorMetadata` are the same smithy types in every service crate,
/// so this works for MemoryDB, Global Accelerator and X-Ray alike.
pub fn classify_sdk_error<E, R>(err: &SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => AwsError::Transport {
            message: DisplayErrorContext(err).to_string(),
        },
        _ => {
            let meta = ProvideErrorMetadata::meta(err);
            match meta.message() {
                Some(message) => classify_aws_error(meta.code(), Some(message)),
                None => {
                    let context = DisplayErrorContext(err).to_string();
                    classify_aws_error(meta.code(), Some(&context))
                }
            }
        }
    }
}

/// Treat "not found" as success.
///
/// Used by delete paths, where a resource that is already gone is the
/// desired outcome.
pub fn ignore_not_found(result: Result<(), AwsError>) -> Result<(), AwsError> {
    match result {
        Err(e) if e.is_not_found() => Ok(()),
        other => other,
    }
}

/// Error code to user-friendly suggestion mapping
const SUGGESTIONS: &[(&str, &str)] = &[
    (
        "AccessDeniedException",
        "Check the IAM permissions of the credentials in use.",
    ),
    (
        "InvalidClusterStateFault",
        "The cluster is busy with another change. Wait for it to become available and retry.",
    ),
    (
        "SnapshotQuotaExceededFault",
        "Delete unused snapshots or request a quota increase via AWS Service Quotas console.",
    ),
    (
        "LimitExceededException",
        "Request a service limit increase via AWS Service Quotas console.",
    ),
    (
        "AcceleratorNotDisabledException",
        "Disable the accelerator and wait for it to be DEPLOYED before deleting it.",
    ),
    (
        "AssociatedListenerFoundException",
        "Delete the accelerator's listeners before deleting it.",
    ),
    (
        "Throttling",
        "AWS API rate limit hit. The operation will be retried automatically.",
    ),
    (
        "ThrottlingException",
        "AWS API rate limit hit. The operation will be retried automatically.",
    ),
];

/// Get a user-friendly suggestion for a known error code.
fn suggestion_for_code(code: &str) -> Option<String> {
    SUGGESTIONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, s)| (*s).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_codes() {
        for code in NOT_FOUND_CODES {
            let err = classify_aws_error(Some(code), Some("some message"));
            assert!(err.is_not_found(), "Expected NotFound for code: {code}");
            assert!(!err.is_retryable());
            assert_eq!(err.code(), Some(*code));
        }
    }

    #[test]
    fn throttling_codes() {
        for code in THROTTLING_CODES {
            let err = classify_aws_error(Some(code), Some("msg"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
            assert!(matches!(err, AwsError::Throttled { .. }));
        }
    }

    #[test]
    fn service_fault_codes_are_retryable() {
        for code in SERVICE_FAULT_CODES {
            let err = classify_aws_error(Some(code), Some("internal error"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
            assert!(matches!(err, AwsError::ServiceFault { .. }));
            assert_eq!(err.code(), Some(*code));
        }
    }

    #[test]
    fn conflict_codes_are_retryable() {
        for code in CONFLICT_CODES {
            let err = classify_aws_error(Some(code), Some("busy"));
            assert!(err.is_retryable(), "Expected retryable for code: {code}");
        }
    }

    #[test]
    fn unknown_and_missing_codes() {
        let err = classify_aws_error(Some("SomeNewError"), Some("details"));
        assert!(matches!(err, AwsError::Sdk { .. }));
        assert!(!err.is_retryable());

        let err2 = classify_aws_error(None, Some("something failed"));
        assert!(matches!(err2, AwsError::Sdk { code: None, .. }));
        assert_eq!(err2.to_string(), "AWS error: something failed");
    }

    #[test]
    fn ignore_not_found_only_swallows_not_found() {
        let gone = classify_aws_error(Some("SnapshotNotFoundFault"), Some("gone"));
        assert!(ignore_not_found(Err(gone)).is_ok());

        let throttled = classify_aws_error(Some("Throttling"), None);
        assert!(ignore_not_found(Err(throttled)).is_err());
        assert!(ignore_not_found(Ok(())).is_ok());
    }

    #[test]
    fn suggestions_for_known_codes() {
        for (code, _) in SUGGESTIONS {
            assert!(
                suggestion_for_code(code).is_some(),
                "No suggestion for code: {code}"
            );
        }
        assert!(suggestion_for_code("SomeUnknownCode").is_none());

        let err = classify_aws_error(Some("LimitExceededException"), Some("too many"));
        assert!(err.suggestion().is_some());
        assert!(AwsError::invalid_input("empty").suggestion().is_none());
    }
}
