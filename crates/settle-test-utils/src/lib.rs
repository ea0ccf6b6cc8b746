//! Shared test utilities for settle
//!
//! Integration tests under `crates/settle/tests/` talk to real AWS and are
//! `#[ignore]`d by default. These helpers pick the region and give every
//! test resource a unique, service-legal name.
//!
//! ## Modules
//!
//! - [`aws`]: region detection, unique names and fixture discovery

pub mod aws;

pub use aws::{get_test_region, memorydb_test_cluster, test_resource_name, test_run_id};
