//! MemoryDB snapshot lifecycle

use super::finder::find_snapshot_by_name;
use super::operations::MemoryDbOperations;
use super::types::{CreateSnapshotInput, Snapshot};
use super::wait::{wait_snapshot_available, wait_snapshot_deleted};
use crate::wait::WaitOptions;
use anyhow::{Context, Result};
use settle_common::ResourceKind;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Prefix used when neither a name nor a prefix is given
const DEFAULT_NAME_PREFIX: &str = "settle-";

/// Desired snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotSpec {
    pub cluster_name: String,
    /// Exact name; wins over `name_prefix`
    pub name: Option<String>,
    /// Generate a unique name starting with this prefix
    pub name_prefix: Option<String>,
    pub kms_key_id: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// Resolve the snapshot name: the explicit name, or a prefix followed by a
/// unique, time-ordered suffix.
pub fn snapshot_name(name: Option<&str>, name_prefix: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{}{}",
            name_prefix.unwrap_or(DEFAULT_NAME_PREFIX),
            uuid::Uuid::now_v7().simple()
        ),
    }
}

fn label(name: &str) -> String {
    ResourceKind::MemorydbSnapshot.describe(name)
}

/// Create a snapshot, wait for it to become available, and read it back.
pub async fn create_snapshot<O: MemoryDbOperations>(
    ops: &O,
    spec: &SnapshotSpec,
    options: &WaitOptions,
) -> Result<Snapshot> {
    let name = snapshot_name(spec.name.as_deref(), spec.name_prefix.as_deref());

    let mut input = CreateSnapshotInput::new(&spec.cluster_name, &name);
    input.kms_key_id = spec.kms_key_id.clone();
    input.tags = spec.tags.clone();

    ops.create_snapshot(input)
        .await
        .with_context(|| format!("error creating {}", label(&name)))?;

    info!(snapshot = %name, cluster = %spec.cluster_name, "Snapshot requested, waiting for it to become available");

    wait_snapshot_available(ops, &name, options)
        .await
        .with_context(|| format!("error waiting for {} to be created", label(&name)))?;

    read_snapshot(ops, &name)
        .await?
        .with_context(|| format!("{} disappeared after creation", label(&name)))
}

/// Read a snapshot; `None` when it no longer exists.
pub async fn read_snapshot<O: MemoryDbOperations>(ops: &O, name: &str) -> Result<Option<Snapshot>> {
    match find_snapshot_by_name(ops, name).await {
        Ok(snapshot) => Ok(Some(snapshot)),
        Err(e) if e.is_not_found() => {
            warn!(snapshot = %name, "{} not found, removing from state", label(name));
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("error reading {}", label(name))),
    }
}

/// Delete a snapshot and wait until it is gone.
///
/// A snapshot that does not exist counts as deleted.
pub async fn delete_snapshot<O: MemoryDbOperations>(
    ops: &O,
    name: &str,
    options: &WaitOptions,
) -> Result<()> {
    match ops.delete_snapshot(name).await {
        Err(e) if e.is_not_found() => {
            debug!(snapshot = %name, "Snapshot already deleted");
            return Ok(());
        }
        result => result.with_context(|| format!("error deleting {}", label(name)))?,
    }

    wait_snapshot_deleted(ops, name, options)
        .await
        .with_context(|| format!("error waiting for {} to be deleted", label(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockMemoryDb, snapshot_fixture};

    fn spec(name: &str) -> SnapshotSpec {
        SnapshotSpec {
            cluster_name: "cluster-1".to_string(),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_snapshot_name_resolution() {
        assert_eq!(snapshot_name(Some("nightly"), Some("ignored-")), "nightly");

        let generated = snapshot_name(None, Some("tf-"));
        assert!(generated.starts_with("tf-"));
        assert_eq!(generated.len(), "tf-".len() + 32);
        assert_ne!(generated, snapshot_name(None, Some("tf-")));

        assert!(snapshot_name(Some(""), None).starts_with(DEFAULT_NAME_PREFIX));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_waits_then_reads_back() {
        let mock = MockMemoryDb::default();

        let mut spec = spec("nightly");
        spec.tags.insert("team".to_string(), "storage".to_string());
        let snapshot = create_snapshot(&mock, &spec, &WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(snapshot.status.as_deref(), Some("available"));
        assert_eq!(snapshot.cluster_name(), Some("cluster-1"));
        let created = mock.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].tags.get("team").map(String::as_str), Some("storage"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_failure_names_the_snapshot() {
        let mock = MockMemoryDb::default();
        mock.fail_next(crate::aws::classify_aws_error(
            Some("SnapshotQuotaExceededFault"),
            Some("quota"),
        ));

        let err = create_snapshot(&mock, &spec("nightly"), &WaitOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "error creating MemoryDB Snapshot (nightly)");
    }

    #[tokio::test]
    async fn test_read_of_missing_snapshot_is_none() {
        let mock = MockMemoryDb::default();
        assert!(read_snapshot(&mock, "gone").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_waits_until_gone() {
        let mock = MockMemoryDb::default();
        mock.put_snapshot(snapshot_fixture("nightly", "available"));

        delete_snapshot(&mock, "nightly", &WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(mock.deleted(), vec!["nightly".to_string()]);
        assert!(read_snapshot(&mock, "nightly").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_of_missing_snapshot_skips_wait() {
        let mock = MockMemoryDb::default();

        delete_snapshot(&mock, "gone", &WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(mock.describe_calls(), 0);
    }
}
