//! X-Ray encryption configuration
//!
//! There is exactly one configuration per region, so the region is its
//! identifier. Deleting it is a no-op.

mod finder;
mod operations;
mod types;

pub use finder::find_encryption_config;
pub use operations::XRayOperations;
pub use types::{EncryptionConfig, EncryptionType};

use crate::aws::context::AwsContext;
use crate::aws::error::{AwsError, classify_sdk_error};
use crate::finder::FnFinder;
use crate::wait::{Settled, WaitConfig, WaitError, WaitOptions, wait_for_state};
use anyhow::{Context, Result};
use aws_sdk_xray::Client;
use settle_common::ResourceKind;
use settle_common::defaults::ENCRYPTION_CONFIG_AVAILABLE_TIMEOUT;
use settle_common::status::xray::EncryptionStatus;
use tracing::info;

/// X-Ray client wrapper
#[derive(Clone)]
pub struct XRayClient {
    pub(crate) client: Client,
}

impl XRayClient {
    /// Create an X-Ray client from a pre-loaded AWS context
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.xray_client(),
        }
    }

    pub async fn get_encryption_config(&self) -> Result<Option<EncryptionConfig>, AwsError> {
        let output = self
            .client
            .get_encryption_config()
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.encryption_config().map(EncryptionConfig::from))
    }

    pub async fn put_encryption_config(
        &self,
        encryption_type: EncryptionType,
        key_id: Option<&str>,
    ) -> Result<Option<EncryptionConfig>, AwsError> {
        let output = self
            .client
            .put_encryption_config()
            .r#type(encryption_type.into())
            .set_key_id(key_id.map(str::to_string))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(output.encryption_config().map(EncryptionConfig::from))
    }
}

pub fn status_encryption_config(config: &EncryptionConfig) -> EncryptionStatus {
    EncryptionStatus::parse_lossy(config.status.as_deref().unwrap_or_default())
}

/// Wait for the region's encryption configuration to finish updating.
pub async fn wait_encryption_config_available<O: XRayOperations>(
    ops: &O,
    region: &str,
    options: &WaitOptions,
) -> Result<Settled<EncryptionConfig>, WaitError> {
    let config = WaitConfig::until([EncryptionStatus::Active], ENCRYPTION_CONFIG_AVAILABLE_TIMEOUT)
        .with_pending([EncryptionStatus::Updating]);
    let waiter = options.waiter(ResourceKind::XrayEncryptionConfig.describe(region), config);
    let finder = FnFinder::new(move |_region: String| async move { find_encryption_config(ops).await });

    wait_for_state(&finder, region, status_encryption_config, &waiter).await
}

/// Apply an encryption configuration and wait for it to become active.
///
/// A key is only meaningful for [`EncryptionType::Kms`].
pub async fn put_encryption_config<O: XRayOperations>(
    ops: &O,
    region: &str,
    encryption_type: EncryptionType,
    key_id: Option<&str>,
    options: &WaitOptions,
) -> Result<EncryptionConfig> {
    let label = ResourceKind::XrayEncryptionConfig.describe(region);

    if encryption_type == EncryptionType::None && key_id.is_some() {
        return Err(AwsError::invalid_input("key_id requires encryption type KMS"))
            .with_context(|| format!("error creating {label}"));
    }

    info!(region = %region, encryption_type = %encryption_type, "Putting X-Ray encryption config");

    ops.put_encryption_config(encryption_type, key_id)
        .await
        .with_context(|| format!("error creating {label}"))?;

    wait_encryption_config_available(ops, region, options)
        .await
        .with_context(|| format!("error waiting for {label} to be available"))?;

    read_encryption_config(ops, region).await
}

/// Read the region's encryption configuration.
pub async fn read_encryption_config<O: XRayOperations>(
    ops: &O,
    region: &str,
) -> Result<EncryptionConfig> {
    find_encryption_config(ops)
        .await
        .with_context(|| format!("error reading {}", ResourceKind::XrayEncryptionConfig.describe(region)))
}
