//! X-Ray encryption configuration lookup

use super::operations::XRayOperations;
use super::types::EncryptionConfig;
use crate::finder::normalize_lookup;
use crate::outcome::FindError;

/// Fetch the region's encryption configuration. An empty response is
/// reported as not found with "Empty result".
pub async fn find_encryption_config<O: XRayOperations>(ops: &O) -> Result<EncryptionConfig, FindError> {
    normalize_lookup(ops.get_encryption_config().await, "GetEncryptionConfig()")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockXRay;

    #[tokio::test]
    async fn test_empty_response_is_not_found() {
        let mock = MockXRay::default();
        mock.set_empty();

        let err = find_encryption_config(&mock).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Empty result");
    }

    #[tokio::test]
    async fn test_default_config() {
        let mock = MockXRay::default();

        let config = find_encryption_config(&mock).await.unwrap();
        assert_eq!(config.status.as_deref(), Some("ACTIVE"));
    }
}
