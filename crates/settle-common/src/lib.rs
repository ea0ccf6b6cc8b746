//! settle-common - Shared types for settle
//!
//! This crate holds the vocabulary every settle component agrees on,
//! without any AWS SDK dependencies to keep it lightweight.
//!
//! ## Modules
//!
//! - [`defaults`]: Default wait timeouts and polling parameters
//! - [`resource_kind`]: The resource types settle knows how to reconcile
//! - [`status`]: Typed status signals, one closed set per resource domain

pub mod defaults;
pub mod resource_kind;
pub mod status;

// Re-export commonly used types
pub use resource_kind::ResourceKind;
pub use status::Signal;
