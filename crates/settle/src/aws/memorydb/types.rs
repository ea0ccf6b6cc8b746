//! MemoryDB resource snapshots
//!
//! Owned copies of the describe payloads. Status fields keep the raw wire
//! value; the extractors in [`super::status`] turn them into signals.

use aws_sdk_memorydb::types as sdk;
use serde::Serialize;
use std::collections::BTreeMap;

/// MemoryDB access control list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Acl {
    pub name: String,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub user_names: Vec<String>,
    pub clusters: Vec<String>,
    pub minimum_engine_version: Option<String>,
}

impl From<&sdk::Acl> for Acl {
    fn from(acl: &sdk::Acl) -> Self {
        Self {
            name: acl.name().unwrap_or_default().to_string(),
            arn: acl.arn().map(str::to_string),
            status: acl.status().map(str::to_string),
            user_names: acl.user_names().to_vec(),
            clusters: acl.clusters().to_vec(),
            minimum_engine_version: acl.minimum_engine_version().map(str::to_string),
        }
    }
}

/// One security group attached to a cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityGroupMembership {
    pub security_group_id: String,
    pub status: Option<String>,
}

/// One shard of a cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shard {
    pub name: String,
    pub status: Option<String>,
    pub number_of_nodes: Option<i32>,
}

/// MemoryDB cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    pub name: String,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub node_type: Option<String>,
    pub engine_version: Option<String>,
    pub acl_name: Option<String>,
    pub number_of_shards: Option<i32>,
    pub parameter_group_name: Option<String>,
    pub parameter_group_status: Option<String>,
    pub security_groups: Vec<SecurityGroupMembership>,
    pub shards: Vec<Shard>,
    pub sns_topic_arn: Option<String>,
    pub sns_topic_status: Option<String>,
}

impl From<&sdk::Cluster> for Cluster {
    fn from(cluster: &sdk::Cluster) -> Self {
        Self {
            name: cluster.name().unwrap_or_default().to_string(),
            arn: cluster.arn().map(str::to_string),
            status: cluster.status().map(str::to_string),
            node_type: cluster.node_type().map(str::to_string),
            engine_version: cluster.engine_version().map(str::to_string),
            acl_name: cluster.acl_name().map(str::to_string),
            number_of_shards: cluster.number_of_shards(),
            parameter_group_name: cluster.parameter_group_name().map(str::to_string),
            parameter_group_status: cluster.parameter_group_status().map(str::to_string),
            security_groups: cluster
                .security_groups()
                .iter()
                .map(|sg| SecurityGroupMembership {
                    security_group_id: sg.security_group_id().unwrap_or_default().to_string(),
                    status: sg.status().map(str::to_string),
                })
                .collect(),
            shards: cluster
                .shards()
                .iter()
                .map(|shard| Shard {
                    name: shard.name().unwrap_or_default().to_string(),
                    status: shard.status().map(str::to_string),
                    number_of_nodes: shard.number_of_nodes(),
                })
                .collect(),
            sns_topic_arn: cluster.sns_topic_arn().map(str::to_string),
            sns_topic_status: cluster.sns_topic_status().map(str::to_string),
        }
    }
}

/// The configuration of the cluster a snapshot was taken from
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterConfiguration {
    pub name: Option<String>,
    pub description: Option<String>,
    pub node_type: Option<String>,
    pub engine_version: Option<String>,
    pub maintenance_window: Option<String>,
    pub num_shards: Option<i32>,
    pub parameter_group_name: Option<String>,
    pub port: Option<i32>,
    pub snapshot_retention_limit: Option<i32>,
    pub snapshot_window: Option<String>,
    pub subnet_group_name: Option<String>,
    pub topic_arn: Option<String>,
    pub vpc_id: Option<String>,
}

impl From<&sdk::ClusterConfiguration> for ClusterConfiguration {
    fn from(c: &sdk::ClusterConfiguration) -> Self {
        Self {
            name: c.name().map(str::to_string),
            description: c.description().map(str::to_string),
            node_type: c.node_type().map(str::to_string),
            engine_version: c.engine_version().map(str::to_string),
            maintenance_window: c.maintenance_window().map(str::to_string),
            num_shards: c.num_shards(),
            parameter_group_name: c.parameter_group_name().map(str::to_string),
            port: c.port(),
            snapshot_retention_limit: c.snapshot_retention_limit(),
            snapshot_window: c.snapshot_window().map(str::to_string),
            subnet_group_name: c.subnet_group_name().map(str::to_string),
            topic_arn: c.topic_arn().map(str::to_string),
            vpc_id: c.vpc_id().map(str::to_string),
        }
    }
}

/// MemoryDB snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub arn: Option<String>,
    pub status: Option<String>,
    /// `manual` or `automated`
    pub source: Option<String>,
    pub kms_key_id: Option<String>,
    pub cluster_configuration: Option<ClusterConfiguration>,
}

impl Snapshot {
    /// Name of the cluster the snapshot was taken from
    pub fn cluster_name(&self) -> Option<&str> {
        self.cluster_configuration
            .as_ref()
            .and_then(|c| c.name.as_deref())
    }
}

impl From<&sdk::Snapshot> for Snapshot {
    fn from(snapshot: &sdk::Snapshot) -> Self {
        Self {
            name: snapshot.name().unwrap_or_default().to_string(),
            arn: snapshot.arn().map(str::to_string),
            status: snapshot.status().map(str::to_string),
            source: snapshot.source().map(str::to_string),
            kms_key_id: snapshot.kms_key_id().map(str::to_string),
            cluster_configuration: snapshot
                .cluster_configuration()
                .map(ClusterConfiguration::from),
        }
    }
}

/// MemoryDB user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub name: String,
    pub arn: Option<String>,
    pub status: Option<String>,
    pub access_string: Option<String>,
    pub acl_names: Vec<String>,
    pub minimum_engine_version: Option<String>,
}

impl From<&sdk::User> for User {
    fn from(user: &sdk::User) -> Self {
        Self {
            name: user.name().unwrap_or_default().to_string(),
            arn: user.arn().map(str::to_string),
            status: user.status().map(str::to_string),
            access_string: user.access_string().map(str::to_string),
            acl_names: user.acl_names().to_vec(),
            minimum_engine_version: user.minimum_engine_version().map(str::to_string),
        }
    }
}

/// Parameters for CreateSnapshot
#[derive(Debug, Clone, PartialEq)]
pub struct CreateSnapshotInput {
    pub cluster_name: String,
    pub snapshot_name: String,
    pub kms_key_id: Option<String>,
    pub tags: BTreeMap<String, String>,
}

impl CreateSnapshotInput {
    pub fn new(cluster_name: impl Into<String>, snapshot_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            snapshot_name: snapshot_name.into(),
            kms_key_id: None,
            tags: BTreeMap::new(),
        }
    }

    /// Encrypt the snapshot with a customer managed key
    pub fn with_kms_key(mut self, kms_key_id: impl Into<String>) -> Self {
        self.kms_key_id = Some(kms_key_id.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}
