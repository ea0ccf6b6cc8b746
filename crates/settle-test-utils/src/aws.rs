//! AWS test utilities
//!
//! Provides region detection, unique run IDs and the pre-provisioned
//! fixtures some integration tests need.

use chrono::Utc;

/// Environment variable naming an existing MemoryDB cluster to snapshot
pub const MEMORYDB_CLUSTER_ENV: &str = "SETTLE_TEST_MEMORYDB_CLUSTER";

/// Get the AWS region for tests.
///
/// Checks environment variables in order:
/// 1. AWS_REGION
/// 2. AWS_DEFAULT_REGION
/// 3. Falls back to us-east-1
///
/// # Example
///
/// ```
/// use settle_test_utils::aws::get_test_region;
///
/// let region = get_test_region();
/// assert!(!region.is_empty());
/// ```
pub fn get_test_region() -> String {
    std::env::var("AWS_REGION")
        .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
        .unwrap_or_else(|_| "us-east-1".to_string())
}

/// Generate a unique run ID for test resources.
///
/// Format: `test-{timestamp_ms}-{suffix}`, where the suffix is the tail of a
/// UUIDv7 so tests started in the same millisecond still differ.
///
/// # Example
///
/// ```
/// use settle_test_utils::aws::test_run_id;
///
/// let run_id = test_run_id();
/// assert!(run_id.starts_with("test-"));
/// ```
pub fn test_run_id() -> String {
    let ts = Utc::now().timestamp_millis();
    let uuid = uuid::Uuid::now_v7().simple().to_string();
    format!("test-{ts}-{}", &uuid[uuid.len() - 8..])
}

/// A unique resource name, e.g. `settle-snapshot-test-1700000000000-1a2b3c4d`.
///
/// Lowercase letters, digits and hyphens only, which MemoryDB and Global
/// Accelerator both accept.
pub fn test_resource_name(kind: &str) -> String {
    format!("settle-{kind}-{}", test_run_id())
}

/// The MemoryDB cluster snapshot tests may use, if one is configured.
///
/// Creating a cluster takes far too long for a test, so snapshot tests run
/// against an existing one and skip when none is set.
pub fn memorydb_test_cluster() -> Option<String> {
    std::env::var(MEMORYDB_CLUSTER_ENV)
        .ok()
        .filter(|name| !name.trim().is_empty())
}
