//! settle - poll-until-stable reconciliation of asynchronous AWS resources
//!
//! Creating, modifying or deleting a MemoryDB snapshot, a Global Accelerator
//! accelerator or an X-Ray encryption configuration returns immediately while
//! the change completes in the background. This crate repeatedly observes
//! such a resource until it reaches a desired state, fails, vanishes, or a
//! deadline passes.
//!
//! ## Modules
//!
//! - [`outcome`]: the four-way result of one status check
//! - [`finder`]: single lookups with "not found" normalisation
//! - [`wait`]: the waiter state machine
//! - [`aws`]: service adapters, waiters and lifecycle operations
//! - [`config`]: timeout overrides loaded from JSON

pub mod aws;
pub mod config;
pub mod finder;
pub mod outcome;
pub mod wait;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use finder::{FnFinder, Finder};
pub use outcome::{FindError, NotFoundError, PollOutcome};
pub use wait::{NotFoundPolicy, Settled, WaitConfig, WaitError, WaitOptions, WaitState, Waiter};
