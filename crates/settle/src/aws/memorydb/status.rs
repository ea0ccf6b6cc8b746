//! MemoryDB status extractors
//!
//! Pure projections from a snapshot to a signal. A missing status field
//! becomes an empty `Unknown` signal, which waiters treat as pending.

use super::types::{Acl, Cluster, Snapshot, User};
use settle_common::status::memorydb::{
    AclStatus, ClusterParameterGroupStatus, ClusterSecurityGroupStatus, ClusterShardStatus,
    ClusterStatus, SnapshotStatus, SnsTopicStatus, UserStatus,
};

fn raw(status: &Option<String>) -> &str {
    status.as_deref().unwrap_or_default()
}

pub fn status_acl(acl: &Acl) -> AclStatus {
    AclStatus::parse_lossy(raw(&acl.status))
}

pub fn status_cluster(cluster: &Cluster) -> ClusterStatus {
    ClusterStatus::parse_lossy(raw(&cluster.status))
}

pub fn status_cluster_parameter_group(cluster: &Cluster) -> ClusterParameterGroupStatus {
    ClusterParameterGroupStatus::parse_lossy(raw(&cluster.parameter_group_status))
}

/// Aggregate status of every security group attached to the cluster.
///
/// While any membership is not `active` (being added or removed), the
/// cluster reports `modifying`. A cluster without security groups is `active`.
pub fn status_cluster_security_groups(cluster: &Cluster) -> ClusterSecurityGroupStatus {
    let settled = cluster
        .security_groups
        .iter()
        .all(|sg| {
            ClusterSecurityGroupStatus::parse_lossy(raw(&sg.status))
                == ClusterSecurityGroupStatus::Active
        });

    if settled {
        ClusterSecurityGroupStatus::Active
    } else {
        ClusterSecurityGroupStatus::Modifying
    }
}

/// Aggregate status of the cluster's shards: `available` once every shard
/// is, otherwise the first shard status that is not.
pub fn status_cluster_shards(cluster: &Cluster) -> ClusterShardStatus {
    cluster
        .shards
        .iter()
        .map(|shard| ClusterShardStatus::parse_lossy(raw(&shard.status)))
        .find(|status| *status != ClusterShardStatus::Available)
        .unwrap_or(ClusterShardStatus::Available)
}

pub fn status_cluster_sns_topic(cluster: &Cluster) -> SnsTopicStatus {
    SnsTopicStatus::parse_lossy(raw(&cluster.sns_topic_status))
}

pub fn status_snapshot(snapshot: &Snapshot) -> SnapshotStatus {
    SnapshotStatus::parse_lossy(raw(&snapshot.status))
}

pub fn status_user(user: &User) -> UserStatus {
    UserStatus::parse_lossy(raw(&user.status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::memorydb::{SecurityGroupMembership, Shard};
    use crate::testing::cluster_fixture;
    use proptest::prelude::*;

    fn with_security_groups(statuses: &[&str]) -> Cluster {
        let mut cluster = cluster_fixture("c", "available");
        cluster.security_groups = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| SecurityGroupMembership {
                security_group_id: format!("sg-{i}"),
                status: Some(status.to_string()),
            })
            .collect();
        cluster
    }

    #[test]
    fn test_security_groups_all_active() {
        let cluster = with_security_groups(&["active", "active"]);
        assert_eq!(
            status_cluster_security_groups(&cluster),
            ClusterSecurityGroupStatus::Active
        );
    }

    #[test]
    fn test_one_group_in_flight_means_modifying() {
        // No member reports "modifying" itself; the aggregate still must.
        let cluster = with_security_groups(&["active", "adding"]);
        assert_eq!(
            status_cluster_security_groups(&cluster),
            ClusterSecurityGroupStatus::Modifying
        );
    }

    #[test]
    fn test_no_security_groups_is_active() {
        let cluster = with_security_groups(&[]);
        assert_eq!(
            status_cluster_security_groups(&cluster),
            ClusterSecurityGroupStatus::Active
        );
    }

    #[test]
    fn test_missing_member_status_is_not_settled() {
        let mut cluster = with_security_groups(&["active"]);
        cluster.security_groups[0].status = None;
        assert_eq!(
            status_cluster_security_groups(&cluster),
            ClusterSecurityGroupStatus::Modifying
        );
    }

    #[test]
    fn test_shards_report_first_unsettled() {
        let mut cluster = cluster_fixture("c", "updating");
        cluster.shards = vec![
            Shard {
                name: "0001".to_string(),
                status: Some("available".to_string()),
                number_of_nodes: Some(2),
            },
            Shard {
                name: "0002".to_string(),
                status: Some("resharding".to_string()),
                number_of_nodes: Some(2),
            },
        ];
        assert_eq!(
            status_cluster_shards(&cluster),
            ClusterShardStatus::Unknown("resharding".to_string())
        );
    }

    #[test]
    fn test_scalar_extractors() {
        let mut cluster = cluster_fixture("c", "creating");
        cluster.parameter_group_status = Some("in-sync".to_string());
        cluster.sns_topic_status = Some("ACTIVE".to_string());

        assert_eq!(status_cluster(&cluster), ClusterStatus::Creating);
        assert_eq!(
            status_cluster_parameter_group(&cluster),
            ClusterParameterGroupStatus::InSync
        );
        assert_eq!(status_cluster_sns_topic(&cluster), SnsTopicStatus::Active);

        cluster.status = None;
        assert!(matches!(status_cluster(&cluster), ClusterStatus::Unknown(ref s) if s.is_empty()));
    }

    proptest! {
        #[test]
        fn prop_aggregate_active_iff_all_active(
            statuses in prop::collection::vec(
                prop_oneof![
                    Just("active"),
                    Just("modifying"),
                    Just("adding"),
                    Just("removing"),
                ],
                0..8,
            )
        ) {
            let cluster = with_security_groups(&statuses);
            let all_active = statuses.iter().all(|s| *s == "active");
            let aggregate = status_cluster_security_groups(&cluster);
            prop_assert_eq!(aggregate == ClusterSecurityGroupStatus::Active, all_active);
        }
    }
}
