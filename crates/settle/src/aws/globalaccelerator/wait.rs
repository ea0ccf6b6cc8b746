//! Accelerator deployment waiter

use super::finder::find_accelerator_by_arn;
use super::operations::GlobalAcceleratorOperations;
use super::types::Accelerator;
use crate::finder::FnFinder;
use crate::wait::{Settled, WaitConfig, WaitError, WaitOptions, wait_for_state};
use settle_common::ResourceKind;
use settle_common::defaults::ACCELERATOR_DEPLOYED_TIMEOUT;
use settle_common::status::globalaccelerator::AcceleratorStatus;

pub fn status_accelerator(accelerator: &Accelerator) -> AcceleratorStatus {
    AcceleratorStatus::parse_lossy(accelerator.status.as_deref().unwrap_or_default())
}

/// Wait until every change to the accelerator has propagated.
pub async fn wait_accelerator_deployed<O: GlobalAcceleratorOperations>(
    ops: &O,
    arn: &str,
    options: &WaitOptions,
) -> Result<Settled<Accelerator>, WaitError> {
    let config = WaitConfig::until([AcceleratorStatus::Deployed], ACCELERATOR_DEPLOYED_TIMEOUT)
        .with_pending([AcceleratorStatus::InProgress]);
    let waiter = options.waiter(ResourceKind::GlobalacceleratorAccelerator.describe(arn), config);
    let finder =
        FnFinder::new(move |arn: String| async move { find_accelerator_by_arn(ops, &arn).await });

    wait_for_state(&finder, arn, status_accelerator, &waiter).await
}
