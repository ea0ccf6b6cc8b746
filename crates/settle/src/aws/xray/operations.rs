//! X-Ray operations trait for testing

use super::XRayClient;
use super::types::{EncryptionConfig, EncryptionType};
use crate::aws::error::AwsError;
use std::future::Future;

/// Trait for X-Ray operations that can be mocked in tests.
pub trait XRayOperations: Send + Sync {
    fn get_encryption_config(
        &self,
    ) -> impl Future<Output = Result<Option<EncryptionConfig>, AwsError>> + Send;

    fn put_encryption_config(
        &self,
        encryption_type: EncryptionType,
        key_id: Option<&str>,
    ) -> impl Future<Output = Result<Option<EncryptionConfig>, AwsError>> + Send;
}

impl XRayOperations for XRayClient {
    async fn get_encryption_config(&self) -> Result<Option<EncryptionConfig>, AwsError> {
        XRayClient::get_encryption_config(self).await
    }

    async fn put_encryption_config(
        &self,
        encryption_type: EncryptionType,
        key_id: Option<&str>,
    ) -> Result<Option<EncryptionConfig>, AwsError> {
        XRayClient::put_encryption_config(self, encryption_type, key_id).await
    }
}
