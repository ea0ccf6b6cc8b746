//! AWS service adapters
//!
//! One module per service, each with the same layout:
//! - `types`: domain snapshots converted from SDK responses
//! - `operations`: a mockable trait over the service calls, implemented by the SDK client wrapper
//! - `finder`: lookups that normalise "not found"
//! - `status`: pure status extractors
//! - `wait`: waiters built on [`crate::wait::Waiter`]
//!
//! plus the resource lifecycle operations that tie them together.

pub mod context;
pub mod error;
pub mod globalaccelerator;
pub mod memorydb;
pub mod xray;

pub use context::AwsContext;
pub use error::{AwsError, classify_aws_error, classify_sdk_error, ignore_not_found};
