//! MemoryDB: ACLs, clusters, snapshots and users

mod finder;
mod operations;
pub mod snapshot;
pub mod status;
mod types;
mod wait;

pub use finder::{find_acl_by_name, find_cluster_by_name, find_snapshot_by_name, find_user_by_name};
pub use operations::MemoryDbOperations;
pub use types::{
    Acl, Cluster, ClusterConfiguration, CreateSnapshotInput, SecurityGroupMembership, Shard,
    Snapshot, User,
};
pub use wait::{
    wait_acl_active, wait_acl_deleted, wait_cluster_available, wait_cluster_deleted,
    wait_cluster_parameter_group_in_sync, wait_cluster_security_groups_active,
    wait_snapshot_available, wait_snapshot_deleted, wait_user_active, wait_user_deleted,
};

use crate::aws::context::AwsContext;
use crate::aws::error::{AwsError, classify_sdk_error};
use aws_sdk_memorydb::{Client, types::Tag};
use tracing::{debug, info};

/// MemoryDB client wrapper
#[derive(Clone)]
pub struct MemoryDbClient {
    pub(crate) client: Client,
}

impl MemoryDbClient {
    /// Create a MemoryDB client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.memorydb_client(),
        }
    }

    pub async fn describe_acl(&self, name: &str) -> Result<Option<Acl>, AwsError> {
        let output = self
            .client
            .describe_acls()
            .acl_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.acls().first().map(Acl::from))
    }

    pub async fn describe_cluster(&self, name: &str) -> Result<Option<Cluster>, AwsError> {
        let output = self
            .client
            .describe_clusters()
            .cluster_name(name)
            .show_shard_details(true)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.clusters().first().map(Cluster::from))
    }

    pub async fn describe_snapshot(&self, name: &str) -> Result<Option<Snapshot>, AwsError> {
        let output = self
            .client
            .describe_snapshots()
            .snapshot_name(name)
            .show_detail(true)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.snapshots().first().map(Snapshot::from))
    }

    pub async fn describe_user(&self, name: &str) -> Result<Option<User>, AwsError> {
        let output = self
            .client
            .describe_users()
            .user_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.users().first().map(User::from))
    }

    pub async fn create_snapshot(&self, input: CreateSnapshotInput) -> Result<Snapshot, AwsError> {
        let tags: Vec<Tag> = input
            .tags
            .iter()
            .map(|(k, v)| Tag::builder().key(k).value(v).build())
            .collect();

        info!(
            cluster = %input.cluster_name,
            snapshot = %input.snapshot_name,
            "Creating MemoryDB snapshot"
        );

        let output = self
            .client
            .create_snapshot()
            .cluster_name(&input.cluster_name)
            .snapshot_name(&input.snapshot_name)
            .set_kms_key_id(input.kms_key_id.clone())
            .set_tags((!tags.is_empty()).then_some(tags))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        output
            .snapshot()
            .map(Snapshot::from)
            .ok_or_else(|| AwsError::Sdk {
                code: None,
                message: format!(
                    "CreateSnapshot returned no snapshot for {}",
                    input.snapshot_name
                ),
            })
    }

    pub async fn delete_snapshot(&self, name: &str) -> Result<(), AwsError> {
        info!(snapshot = %name, "Deleting MemoryDB snapshot");

        self.client
            .delete_snapshot()
            .snapshot_name(name)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        debug!(snapshot = %name, "Delete request accepted");
        Ok(())
    }
}
