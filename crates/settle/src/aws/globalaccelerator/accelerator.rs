//! Accelerator lifecycle
//!
//! Every mutation is followed by a wait for `DEPLOYED`; Global Accelerator
//! rejects most calls while a previous change is still propagating.

use super::finder::{find_accelerator_attributes_by_arn, find_accelerator_by_arn};
use super::operations::GlobalAcceleratorOperations;
use super::types::{Accelerator, AcceleratorAttributes, CreateAcceleratorInput, UpdateAcceleratorInput};
use super::wait::wait_accelerator_deployed;
use crate::wait::WaitOptions;
use anyhow::{Context, Result};
use settle_common::ResourceKind;
use tracing::{debug, info, warn};

fn label(arn: &str) -> String {
    ResourceKind::GlobalacceleratorAccelerator.describe(arn)
}

/// Create an accelerator, wait for it to deploy, apply attributes, and read it back.
pub async fn create_accelerator<O: GlobalAcceleratorOperations>(
    ops: &O,
    input: &CreateAcceleratorInput,
    options: &WaitOptions,
) -> Result<Accelerator> {
    let created = ops
        .create_accelerator(input)
        .await
        .with_context(|| format!("error creating Global Accelerator accelerator ({})", input.name))?;
    let arn = created.arn.clone();

    info!(arn = %arn, name = %input.name, "Accelerator created, waiting for deployment");

    wait_accelerator_deployed(ops, &arn, options)
        .await
        .with_context(|| format!("error waiting for {} to be deployed", label(&arn)))?;

    if let Some(attributes) = &input.attributes {
        update_attributes(ops, &arn, attributes, options).await?;
    }

    read_accelerator(ops, &arn)
        .await?
        .with_context(|| format!("{} disappeared after creation", label(&arn)))
}

/// Read an accelerator; `None` when it no longer exists.
pub async fn read_accelerator<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
) -> Result<Option<Accelerator>> {
    match find_accelerator_by_arn(ops, arn).await {
        Ok(accelerator) => Ok(Some(accelerator)),
        Err(e) if e.is_not_found() => {
            warn!(arn = %arn, "{} not found, removing from state", label(arn));
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("error reading {}", label(arn))),
    }
}

/// Read the flow log attributes of an accelerator.
pub async fn read_accelerator_attributes<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
) -> Result<AcceleratorAttributes> {
    find_accelerator_attributes_by_arn(ops, arn)
        .await
        .with_context(|| format!("error reading {} attributes", label(arn)))
}

/// Update name, address type or enablement, and optionally the attributes.
pub async fn update_accelerator<O: GlobalAcceleratorOperations>(
    ops: &O,
    input: &UpdateAcceleratorInput,
    attributes: Option<&AcceleratorAttributes>,
    options: &WaitOptions,
) -> Result<Accelerator> {
    ops.update_accelerator(input)
        .await
        .with_context(|| format!("error updating {}", label(&input.arn)))?;

    wait_accelerator_deployed(ops, &input.arn, options)
        .await
        .with_context(|| format!("error waiting for {} to be deployed", label(&input.arn)))?;

    if let Some(attributes) = attributes {
        update_attributes(ops, &input.arn, attributes, options).await?;
    }

    read_accelerator(ops, &input.arn)
        .await?
        .with_context(|| format!("{} disappeared during update", label(&input.arn)))
}

async fn update_attributes<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
    attributes: &AcceleratorAttributes,
    options: &WaitOptions,
) -> Result<()> {
    ops.update_accelerator_attributes(arn, attributes)
        .await
        .with_context(|| format!("error updating {} attributes", label(arn)))?;

    wait_accelerator_deployed(ops, arn, options)
        .await
        .with_context(|| format!("error waiting for {} to be deployed", label(arn)))?;
    Ok(())
}

/// Disable the accelerator if needed, wait for it to deploy, then delete it.
///
/// An accelerator that is already gone counts as deleted.
pub async fn delete_accelerator<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
    options: &WaitOptions,
) -> Result<()> {
    let Some(accelerator) = read_accelerator(ops, arn).await? else {
        return Ok(());
    };

    if accelerator.enabled {
        info!(arn = %arn, "Disabling accelerator before deletion");
        let mut disable = UpdateAcceleratorInput::from_current(&accelerator);
        disable.enabled = false;

        match ops.update_accelerator(&disable).await {
            Err(e) if e.is_not_found() => return Ok(()),
            result => {
                result.with_context(|| format!("error disabling {}", label(arn)))?;
            }
        }
    }

    wait_accelerator_deployed(ops, arn, options)
        .await
        .with_context(|| format!("error waiting for {} to be deployed", label(arn)))?;

    match ops.delete_accelerator(arn).await {
        Err(e) if e.is_not_found() => {
            debug!(arn = %arn, "Accelerator already deleted");
            Ok(())
        }
        result => result.with_context(|| format!("error deleting {}", label(arn))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGlobalAccelerator;

    #[tokio::test(start_paused = true)]
    async fn test_create_applies_attributes_after_deploy() {
        let mock = MockGlobalAccelerator::default();
        let attributes = AcceleratorAttributes {
            flow_logs_enabled: true,
            flow_logs_s3_bucket: Some("logs".to_string()),
            flow_logs_s3_prefix: Some("ga/".to_string()),
        };
        let input = CreateAcceleratorInput::new("edge").with_attributes(attributes.clone());

        let accelerator = create_accelerator(&mock, &input, &WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(accelerator.name, "edge");
        assert_eq!(accelerator.status.as_deref(), Some("DEPLOYED"));
        assert_eq!(
            read_accelerator_attributes(&mock, &accelerator.arn).await.unwrap(),
            attributes
        );
        assert_eq!(
            mock.calls(),
            vec!["create", "update_attributes"],
            "mutations in order"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_waits_for_deploy() {
        let mock = MockGlobalAccelerator::default();
        let created = create_accelerator(&mock, &CreateAcceleratorInput::new("edge"), &WaitOptions::default())
            .await
            .unwrap();

        let mut update = UpdateAcceleratorInput::from_current(&created);
        update.name = "edge-renamed".to_string();
        let updated = update_accelerator(&mock, &update, None, &WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(updated.name, "edge-renamed");
        assert_eq!(updated.status.as_deref(), Some("DEPLOYED"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_disables_first() {
        let mock = MockGlobalAccelerator::default();
        let created = create_accelerator(&mock, &CreateAcceleratorInput::new("edge"), &WaitOptions::default())
            .await
            .unwrap();

        delete_accelerator(&mock, &created.arn, &WaitOptions::default())
            .await
            .unwrap();

        assert_eq!(mock.calls(), vec!["create", "update", "delete"]);
        assert!(read_accelerator(&mock, &created.arn).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_of_missing_accelerator_succeeds() {
        let mock = MockGlobalAccelerator::default();

        delete_accelerator(&mock, "arn:missing", &WaitOptions::default())
            .await
            .unwrap();

        assert!(mock.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_create_error_carries_context() {
        let mock = MockGlobalAccelerator::default();
        mock.fail_next(crate::aws::classify_aws_error(
            Some("LimitExceededException"),
            Some("too many accelerators"),
        ));

        let err = create_accelerator(&mock, &CreateAcceleratorInput::new("edge"), &WaitOptions::default())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").starts_with("error creating Global Accelerator accelerator (edge)"));
    }
}
