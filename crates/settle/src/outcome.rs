//! Poll outcomes and the "not found" sentinel
//!
//! Every status check ends in exactly one [`PollOutcome`]. The variant, not a
//! combination of empty values, decides what the waiter does next.

use crate::aws::AwsError;
use std::fmt;
use thiserror::Error;

/// Message used when a call succeeded but returned no payload
pub const EMPTY_RESULT: &str = "Empty result";

/// Synthetic state reported in diagnostics when a resource is absent
pub const ABSENT: &str = "absent";

/// The resource does not currently exist.
///
/// Carries the service error and the request that produced it, so callers
/// can tell "absent" apart from a transport or permission failure and still
/// report what was asked.
#[derive(Debug, Clone, Default)]
pub struct NotFoundError {
    /// Overrides the generated message when set
    pub message: Option<String>,
    /// The service error that reported the absence
    pub last_error: Option<AwsError>,
    /// Description of the request that was sent
    pub last_request: Option<String>,
}

impl NotFoundError {
    /// The service answered "no such resource"
    pub fn from_service(err: AwsError, request: impl Into<String>) -> Self {
        Self {
            message: None,
            last_error: Some(err),
            last_request: Some(request.into()),
        }
    }

    /// The call succeeded but the payload was missing
    pub fn empty_result(request: impl Into<String>) -> Self {
        Self {
            message: Some(EMPTY_RESULT.to_string()),
            last_error: None,
            last_request: Some(request.into()),
        }
    }

    /// True when the service returned nothing rather than an explicit not-found
    pub fn is_empty_result(&self) -> bool {
        self.message.as_deref() == Some(EMPTY_RESULT) && self.last_error.is_none()
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return f.write_str(message);
        }
        f.write_str("couldn't find resource")?;
        if let Some(err) = &self.last_error {
            write!(f, ": {err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for NotFoundError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_error
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Failure of a single lookup
#[derive(Debug, Clone, Error)]
pub enum FindError {
    /// The resource is absent
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// Any other service or transport failure, unchanged
    #[error(transparent)]
    Service(#[from] AwsError),
}

impl FindError {
    /// Check if the resource is absent
    pub fn is_not_found(&self) -> bool {
        match self {
            FindError::NotFound(_) => true,
            FindError::Service(e) => e.is_not_found(),
        }
    }

    /// Check if retrying the lookup may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, FindError::Service(e) if e.is_retryable())
    }
}

/// Result of one status check
#[derive(Debug)]
pub enum PollOutcome<S, G> {
    /// The resource exists and reports `signal`
    Found { snapshot: S, signal: G },
    /// The resource does not exist
    NotFound(NotFoundError),
    /// The check failed for a reason worth retrying
    Transient(AwsError),
    /// The check failed for good
    Fatal(AwsError),
}

impl<S, G> PollOutcome<S, G> {
    /// A found resource
    pub fn found(snapshot: S, signal: G) -> Self {
        PollOutcome::Found { snapshot, signal }
    }

    /// Classify a finder result, projecting the status out of a found snapshot.
    pub fn from_find<X>(result: Result<S, FindError>, extract: X) -> Self
    where
        X: FnOnce(&S) -> G,
    {
        match result {
            Ok(snapshot) => {
                let signal = extract(&snapshot);
                PollOutcome::Found { snapshot, signal }
            }
            Err(FindError::NotFound(e)) => PollOutcome::NotFound(e),
            Err(FindError::Service(e)) if e.is_not_found() => {
                PollOutcome::NotFound(NotFoundError {
                    message: None,
                    last_error: Some(e),
                    last_request: None,
                })
            }
            Err(FindError::Service(e)) if e.is_retryable() => PollOutcome::Transient(e),
            Err(FindError::Service(e)) => PollOutcome::Fatal(e),
        }
    }

    /// The reported signal, if the resource was found
    pub fn signal(&self) -> Option<&G> {
        match self {
            PollOutcome::Found { signal, .. } => Some(signal),
            _ => None,
        }
    }
}
