//! MemoryDB waiters
//!
//! Available/active waiters fail fast if the resource starts deleting.
//! Deleted waiters succeed once the finder reports the resource absent.

use super::finder::{find_acl_by_name, find_cluster_by_name, find_snapshot_by_name, find_user_by_name};
use super::operations::MemoryDbOperations;
use super::status::{
    status_acl, status_cluster, status_cluster_parameter_group, status_cluster_security_groups,
    status_snapshot, status_user,
};
use super::types::{Acl, Cluster, Snapshot, User};
use crate::finder::FnFinder;
use crate::wait::{Settled, WaitConfig, WaitError, WaitOptions, wait_for_state};
use settle_common::ResourceKind;
use settle_common::defaults::{
    ACL_ACTIVE_TIMEOUT, ACL_DELETED_TIMEOUT, CLUSTER_AVAILABLE_TIMEOUT, CLUSTER_DELETED_TIMEOUT,
    CLUSTER_PARAMETER_GROUP_IN_SYNC_TIMEOUT, CLUSTER_SECURITY_GROUPS_ACTIVE_TIMEOUT,
    SNAPSHOT_AVAILABLE_TIMEOUT, SNAPSHOT_DELETED_TIMEOUT, USER_ACTIVE_TIMEOUT,
    USER_DELETED_TIMEOUT,
};
use settle_common::status::memorydb::{
    AclStatus, ClusterParameterGroupStatus, ClusterSecurityGroupStatus, ClusterStatus,
    SnapshotStatus, UserStatus,
};

pub async fn wait_acl_active<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Acl>, WaitError> {
    let config = WaitConfig::until([AclStatus::Active], ACL_ACTIVE_TIMEOUT)
        .with_pending([AclStatus::Creating, AclStatus::Modifying])
        .with_failure([AclStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbAcl.describe(name), config);
    let finder = FnFinder::new(move |name: String| async move { find_acl_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_acl, &waiter).await
}

pub async fn wait_acl_deleted<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Acl>, WaitError> {
    let config = WaitConfig::until_absent(ACL_DELETED_TIMEOUT).with_pending([AclStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbAcl.describe(name), config);
    let finder = FnFinder::new(move |name: String| async move { find_acl_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_acl, &waiter).await
}

pub async fn wait_cluster_available<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Cluster>, WaitError> {
    let config = WaitConfig::until([ClusterStatus::Available], CLUSTER_AVAILABLE_TIMEOUT)
        .with_pending([ClusterStatus::Creating, ClusterStatus::Updating])
        .with_failure([ClusterStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbCluster.describe(name), config);
    let finder =
        FnFinder::new(move |name: String| async move { find_cluster_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_cluster, &waiter).await
}

pub async fn wait_cluster_deleted<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Cluster>, WaitError> {
    let config = WaitConfig::until_absent(CLUSTER_DELETED_TIMEOUT)
        .with_pending([ClusterStatus::Available, ClusterStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbCluster.describe(name), config);
    let finder =
        FnFinder::new(move |name: String| async move { find_cluster_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_cluster, &waiter).await
}

pub async fn wait_cluster_parameter_group_in_sync<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Cluster>, WaitError> {
    let config = WaitConfig::until(
        [ClusterParameterGroupStatus::InSync],
        CLUSTER_PARAMETER_GROUP_IN_SYNC_TIMEOUT,
    )
    .with_pending([ClusterParameterGroupStatus::Applying]);
    let waiter = options.waiter(ResourceKind::MemorydbCluster.describe(name), config);
    let finder =
        FnFinder::new(move |name: String| async move { find_cluster_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_cluster_parameter_group, &waiter).await
}

pub async fn wait_cluster_security_groups_active<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Cluster>, WaitError> {
    let config = WaitConfig::until(
        [ClusterSecurityGroupStatus::Active],
        CLUSTER_SECURITY_GROUPS_ACTIVE_TIMEOUT,
    )
    .with_pending([ClusterSecurityGroupStatus::Modifying]);
    let waiter = options.waiter(ResourceKind::MemorydbCluster.describe(name), config);
    let finder =
        FnFinder::new(move |name: String| async move { find_cluster_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_cluster_security_groups, &waiter).await
}

pub async fn wait_snapshot_available<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Snapshot>, WaitError> {
    let config = WaitConfig::until([SnapshotStatus::Available], SNAPSHOT_AVAILABLE_TIMEOUT)
        .with_pending([SnapshotStatus::Creating])
        .with_failure([SnapshotStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbSnapshot.describe(name), config);
    let finder =
        FnFinder::new(move |name: String| async move { find_snapshot_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_snapshot, &waiter).await
}

pub async fn wait_snapshot_deleted<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<Snapshot>, WaitError> {
    let config = WaitConfig::until_absent(SNAPSHOT_DELETED_TIMEOUT)
        .with_pending([SnapshotStatus::Available, SnapshotStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbSnapshot.describe(name), config);
    let finder =
        FnFinder::new(move |name: String| async move { find_snapshot_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_snapshot, &waiter).await
}

pub async fn wait_user_active<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<User>, WaitError> {
    let config = WaitConfig::until([UserStatus::Active], USER_ACTIVE_TIMEOUT)
        .with_pending([UserStatus::Modifying])
        .with_failure([UserStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbUser.describe(name), config);
    let finder = FnFinder::new(move |name: String| async move { find_user_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_user, &waiter).await
}

pub async fn wait_user_deleted<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<Settled<User>, WaitError> {
    let config = WaitConfig::until_absent(USER_DELETED_TIMEOUT).with_pending([UserStatus::Deleting]);
    let waiter = options.waiter(ResourceKind::MemorydbUser.describe(name), config);
    let finder = FnFinder::new(move |name: String| async move { find_user_by_name(ops, &name).await });

    wait_for_state(&finder, name, status_user, &waiter).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockMemoryDb, cluster_fixture, snapshot_fixture};
    use crate::wait::WaitState;
    use std::time::Duration;

    fn fast() -> WaitOptions {
        WaitOptions::default().with_poll_interval(Duration::from_secs(5))
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_available_after_creating() {
        let mock = MockMemoryDb::default();
        mock.script_snapshot(
            "nightly",
            [
                Some(snapshot_fixture("nightly", "creating")),
                Some(snapshot_fixture("nightly", "creating")),
                Some(snapshot_fixture("nightly", "available")),
            ],
        );

        let settled = wait_snapshot_available(&mock, "nightly", &fast()).await.unwrap();

        assert_eq!(settled.ticks, 3);
        assert_eq!(
            settled.snapshot.unwrap().status.as_deref(),
            Some("available")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_deleted_when_gone() {
        let mock = MockMemoryDb::default();
        mock.script_snapshot(
            "nightly",
            [
                Some(snapshot_fixture("nightly", "deleting")),
                Some(snapshot_fixture("nightly", "deleting")),
                None,
            ],
        );

        let settled = wait_snapshot_deleted(&mock, "nightly", &fast()).await.unwrap();

        assert!(settled.is_absent());
        assert_eq!(settled.ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cluster_deleting_while_waiting_for_available_fails() {
        let mock = MockMemoryDb::default();
        mock.script_cluster(
            "c",
            [
                Some(cluster_fixture("c", "creating")),
                Some(cluster_fixture("c", "deleting")),
            ],
        );

        let err = wait_cluster_available(&mock, "c", &fast()).await.unwrap_err();

        assert_eq!(err.state(), WaitState::Failure);
        assert!(err.to_string().contains("MemoryDB Cluster (c)"));
        assert_eq!(mock.describe_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_security_groups_wait_uses_aggregate() {
        let mock = MockMemoryDb::default();
        let mut modifying = cluster_fixture("c", "available");
        modifying.security_groups = vec![
            crate::aws::memorydb::SecurityGroupMembership {
                security_group_id: "sg-1".to_string(),
                status: Some("active".to_string()),
            },
            crate::aws::memorydb::SecurityGroupMembership {
                security_group_id: "sg-2".to_string(),
                status: Some("adding".to_string()),
            },
        ];
        let mut active = modifying.clone();
        active.security_groups[1].status = Some("active".to_string());
        mock.script_cluster("c", [Some(modifying), Some(active)]);

        let settled = wait_cluster_security_groups_active(&mock, "c", &fast())
            .await
            .unwrap();

        assert_eq!(settled.ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_wait_times_out_with_configured_timeout() {
        let mock = MockMemoryDb::default();
        mock.put_user(crate::testing::user_fixture("alice", "modifying"));

        let options = fast().with_timeout(Duration::from_secs(30));
        let err = wait_user_active(&mock, "alice", &options).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("last state: 'modifying'"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acl_vanishing_while_waiting_for_active_is_fatal() {
        let mock = MockMemoryDb::default();

        let err = wait_acl_active(&mock, "open-access", &fast()).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(mock.describe_calls(), 1);
    }
}
