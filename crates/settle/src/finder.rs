//! Finder contract: one lookup, classified
//!
//! A finder issues a single describe call and never retries. Service
//! "no such resource" answers and empty payloads both become
//! [`NotFoundError`]; every other error passes through unchanged.

use crate::aws::AwsError;
use crate::outcome::{FindError, NotFoundError};
use std::future::Future;

/// Look up the current state of one external resource by identifier.
pub trait Finder: Send + Sync {
    /// The describe payload for one resource
    type Snapshot: Send;

    /// Fetch the resource identified by `id`
    fn find(&self, id: &str) -> impl Future<Output = Result<Self::Snapshot, FindError>> + Send;
}

/// A [`Finder`] backed by a closure.
///
/// The closure receives an owned identifier so the returned future does not
/// borrow from the caller.
pub struct FnFinder<F> {
    lookup: F,
}

impl<F> FnFinder<F> {
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }
}

impl<F, Fut, S> Finder for FnFinder<F>
where
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S, FindError>> + Send,
    S: Send,
{
    type Snapshot = S;

    fn find(&self, id: &str) -> impl Future<Output = Result<S, FindError>> + Send {
        (self.lookup)(id.to_string())
    }
}

/// Reject empty identifiers before any request is made.
pub fn require_id(id: &str) -> Result<(), FindError> {
    if id.trim().is_empty() {
        return Err(AwsError::invalid_input("resource identifier cannot be empty").into());
    }
    Ok(())
}

/// Normalise a raw describe result into a finder result.
///
/// * `Ok(Some(_))` is the resource.
/// * `Ok(None)` means the service returned success with nothing in it.
/// * A service not-found error keeps the original error and request.
/// * Anything else propagates unchanged.
pub fn normalize_lookup<T>(
    result: Result<Option<T>, AwsError>,
    request: impl Into<String>,
) -> Result<T, FindError> {
    match result {
        Ok(Some(found)) => Ok(found),
        Ok(None) => Err(NotFoundError::empty_result(request).into()),
        Err(e) if e.is_not_found() => Err(NotFoundError::from_service(e, request).into()),
        Err(e) => Err(FindError::Service(e)),
    }
}
