//! Shared AWS configuration context
//!
//! Provides `AwsContext` for loading AWS SDK configuration once and
//! creating every service client from the same config.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Global Accelerator is a global service whose control plane is only
/// reachable in this region.
pub const GLOBAL_ACCELERATOR_REGION: &str = "us-west-2";

/// Shared AWS configuration context for creating service clients.
///
/// Clients built from one context share credentials and HTTP connections,
/// so concurrent waiters can each hold their own client cheaply.
///
/// # Example
/// ```ignore
/// let aws = AwsContext::new("us-east-1", None).await;
///
/// let memorydb = MemoryDbClient::from_context(&aws);
/// let xray = XRayClient::from_context(&aws);
/// ```
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
    profile: Option<String>,
}

impl AwsContext {
    /// Load AWS configuration for the specified region and optional named profile.
    ///
    /// Credentials come from the environment, config files, or IAM roles.
    pub async fn new(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
            profile: profile.map(str::to_string),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Get the named profile, if one was requested.
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Create a MemoryDB client from this context.
    pub fn memorydb_client(&self) -> aws_sdk_memorydb::Client {
        aws_sdk_memorydb::Client::new(self.sdk_config())
    }

    /// Create a Global Accelerator client, pinned to its control plane region.
    pub fn globalaccelerator_client(&self) -> aws_sdk_globalaccelerator::Client {
        let conf = aws_sdk_globalaccelerator::config::Builder::from(self.sdk_config())
            .region(Region::new(GLOBAL_ACCELERATOR_REGION))
            .build();
        aws_sdk_globalaccelerator::Client::from_conf(conf)
    }

    /// Create an X-Ray client from this context.
    pub fn xray_client(&self) -> aws_sdk_xray::Client {
        aws_sdk_xray::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These load real credentials, so they only run on demand

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_context_creation() {
        let ctx = AwsContext::new("us-east-2", None).await;
        assert_eq!(ctx.region(), "us-east-2");
        assert!(ctx.profile().is_none());
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials"]
    async fn test_globalaccelerator_client_uses_control_plane_region() {
        let ctx = AwsContext::new("eu-west-1", None).await;
        let client = ctx.globalaccelerator_client();
        assert_eq!(
            client.config().region().map(|r| r.as_ref()),
            Some(GLOBAL_ACCELERATOR_REGION)
        );
    }
}
