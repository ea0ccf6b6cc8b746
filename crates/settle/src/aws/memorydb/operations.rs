//! MemoryDB operations trait for testing

use super::MemoryDbClient;
use super::types::{Acl, Cluster, CreateSnapshotInput, Snapshot, User};
use crate::aws::error::AwsError;
use std::future::Future;

/// Trait for MemoryDB operations that can be mocked in tests.
///
/// Describe calls return `Ok(None)` when the service answers successfully
/// with an empty list, and a classified error otherwise.
pub trait MemoryDbOperations: Send + Sync {
    fn describe_acl(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Acl>, AwsError>> + Send;

    fn describe_cluster(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Cluster>, AwsError>> + Send;

    fn describe_snapshot(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<Snapshot>, AwsError>> + Send;

    fn describe_user(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Option<User>, AwsError>> + Send;

    /// Start a snapshot; returns the snapshot as first reported (usually `creating`)
    fn create_snapshot(
        &self,
        input: CreateSnapshotInput,
    ) -> impl Future<Output = Result<Snapshot, AwsError>> + Send;

    /// Start deleting a snapshot
    fn delete_snapshot(&self, name: &str) -> impl Future<Output = Result<(), AwsError>> + Send;
}

impl MemoryDbOperations for MemoryDbClient {
    async fn describe_acl(&self, name: &str) -> Result<Option<Acl>, AwsError> {
        MemoryDbClient::describe_acl(self, name).await
    }

    async fn describe_cluster(&self, name: &str) -> Result<Option<Cluster>, AwsError> {
        MemoryDbClient::describe_cluster(self, name).await
    }

    async fn describe_snapshot(&self, name: &str) -> Result<Option<Snapshot>, AwsError> {
        MemoryDbClient::describe_snapshot(self, name).await
    }

    async fn describe_user(&self, name: &str) -> Result<Option<User>, AwsError> {
        MemoryDbClient::describe_user(self, name).await
    }

    async fn create_snapshot(&self, input: CreateSnapshotInput) -> Result<Snapshot, AwsError> {
        MemoryDbClient::create_snapshot(self, input).await
    }

    async fn delete_snapshot(&self, name: &str) -> Result<(), AwsError> {
        MemoryDbClient::delete_snapshot(self, name).await
    }
}
