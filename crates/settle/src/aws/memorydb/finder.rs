//! MemoryDB lookups by name

use super::operations::MemoryDbOperations;
use super::types::{Acl, Cluster, Snapshot, User};
use crate::finder::{normalize_lookup, require_id};
use crate::outcome::FindError;

pub async fn find_acl_by_name<O: MemoryDbOperations>(ops: &O, name: &str) -> Result<Acl, FindError> {
    require_id(name)?;
    normalize_lookup(
        ops.describe_acl(name).await,
        format!("DescribeACLs(acl_name={name})"),
    )
}

pub async fn find_cluster_by_name<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
) -> Result<Cluster, FindError> {
    require_id(name)?;
    normalize_lookup(
        ops.describe_cluster(name).await,
        format!("DescribeClusters(cluster_name={name}, show_shard_details=true)"),
    )
}

pub async fn find_snapshot_by_name<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
) -> Result<Snapshot, FindError> {
    require_id(name)?;
    normalize_lookup(
        ops.describe_snapshot(name).await,
        format!("DescribeSnapshots(snapshot_name={name}, show_detail=true)"),
    )
}

pub async fn find_user_by_name<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
) -> Result<User, FindError> {
    require_id(name)?;
    normalize_lookup(
        ops.describe_user(name).await,
        format!("DescribeUsers(user_name={name})"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::classify_aws_error;
    use crate::testing::{MockMemoryDb, snapshot_fixture};

    #[tokio::test]
    async fn test_found_snapshot() {
        let mock = MockMemoryDb::default();
        mock.put_snapshot(snapshot_fixture("nightly", "available"));

        let snapshot = find_snapshot_by_name(&mock, "nightly").await.unwrap();
        assert_eq!(snapshot.name, "nightly");
        assert_eq!(snapshot.cluster_name(), Some("cluster-1"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_empty_result() {
        let mock = MockMemoryDb::default();

        let err = find_snapshot_by_name(&mock, "missing-1").await.unwrap_err();
        match err {
            FindError::NotFound(nf) => {
                assert_eq!(nf.to_string(), "Empty result");
                assert!(nf.last_request.unwrap().contains("missing-1"));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_service_not_found_is_normalised() {
        let mock = MockMemoryDb::default();
        mock.fail_next(classify_aws_error(
            Some("ClusterNotFoundFault"),
            Some("Cluster c not found"),
        ));

        let err = find_cluster_by_name(&mock, "c").await.unwrap_err();
        match err {
            FindError::NotFound(nf) => {
                assert_eq!(
                    nf.last_error.and_then(|e| e.code().map(str::to_string)).as_deref(),
                    Some("ClusterNotFoundFault")
                );
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let mock = MockMemoryDb::default();
        mock.fail_next(classify_aws_error(Some("ThrottlingException"), None));

        let err = find_user_by_name(&mock, "alice").await.unwrap_err();
        assert!(err.is_transient());
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_blank_name_makes_no_call() {
        let mock = MockMemoryDb::default();

        let err = find_acl_by_name(&mock, "").await.unwrap_err();
        assert!(matches!(err, FindError::Service(_)));
        assert_eq!(mock.describe_calls(), 0);
    }
}
