//! Default wait parameters
//!
//! Timeouts are per resource operation. The values match what operators of
//! these services expect: MemoryDB cluster-level changes can take hours,
//! while ACLs and users settle within minutes.

use crate::ResourceKind;
use std::time::Duration;

const fn minutes(m: u64) -> Duration {
    Duration::from_secs(m * 60)
}

pub const ACL_ACTIVE_TIMEOUT: Duration = minutes(5);
pub const ACL_DELETED_TIMEOUT: Duration = minutes(5);

pub const CLUSTER_AVAILABLE_TIMEOUT: Duration = minutes(120);
pub const CLUSTER_DELETED_TIMEOUT: Duration = minutes(120);
pub const CLUSTER_PARAMETER_GROUP_IN_SYNC_TIMEOUT: Duration = minutes(60);
pub const CLUSTER_SECURITY_GROUPS_ACTIVE_TIMEOUT: Duration = minutes(10);

pub const SNAPSHOT_AVAILABLE_TIMEOUT: Duration = minutes(120);
pub const SNAPSHOT_DELETED_TIMEOUT: Duration = minutes(120);

pub const USER_ACTIVE_TIMEOUT: Duration = minutes(5);
pub const USER_DELETED_TIMEOUT: Duration = minutes(5);

/// Accelerators must be `DEPLOYED` before they can be deleted; disabling one
/// or removing its listeners can take a long time to propagate.
pub const ACCELERATOR_DEPLOYED_TIMEOUT: Duration = minutes(60);
pub const ENDPOINT_GROUP_TIMEOUT: Duration = minutes(30);

pub const ENCRYPTION_CONFIG_AVAILABLE_TIMEOUT: Duration = minutes(15);

/// Delay between two status checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Lower bound for the delay between two status checks
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Delay before the first status check
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::ZERO;

/// Consecutive "not found" answers tolerated while waiting for a resource to appear
pub const DEFAULT_NOT_FOUND_CHECKS: u32 = 20;

/// Default timeout for the primary wait of a resource kind
///
/// Used when configuration does not override it. Deletion waits use the
/// dedicated constants above.
pub fn default_timeout(kind: ResourceKind) -> Duration {
    match kind {
        ResourceKind::MemorydbAcl => ACL_ACTIVE_TIMEOUT,
        ResourceKind::MemorydbCluster => CLUSTER_AVAILABLE_TIMEOUT,
        ResourceKind::MemorydbSnapshot => SNAPSHOT_AVAILABLE_TIMEOUT,
        ResourceKind::MemorydbUser => USER_ACTIVE_TIMEOUT,
        ResourceKind::GlobalacceleratorAccelerator => ACCELERATOR_DEPLOYED_TIMEOUT,
        ResourceKind::GlobalacceleratorEndpointGroup => ENDPOINT_GROUP_TIMEOUT,
        ResourceKind::XrayEncryptionConfig => ENCRYPTION_CONFIG_AVAILABLE_TIMEOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_waits_outlast_user_waits() {
        assert!(CLUSTER_AVAILABLE_TIMEOUT > USER_ACTIVE_TIMEOUT);
        assert_eq!(CLUSTER_AVAILABLE_TIMEOUT, Duration::from_secs(7200));
    }

    #[test]
    fn test_every_kind_has_a_timeout() {
        for kind in ResourceKind::ALL {
            assert!(default_timeout(kind) > DEFAULT_POLL_INTERVAL, "{kind}");
        }
    }
}
