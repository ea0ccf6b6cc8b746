//! Sweeper for leftover accelerators
//!
//! Deletes every accelerator (optionally only those whose name starts with a
//! prefix) together with its listeners and endpoint groups. Accelerators are
//! swept concurrently, each with its own waiter. Failures are collected and
//! reported together; one stuck accelerator never stops the others.

use super::operations::GlobalAcceleratorOperations;
use super::types::{Accelerator, UpdateAcceleratorInput};
use super::wait::wait_accelerator_deployed;
use crate::aws::error::AwsError;
use crate::wait::{WaitError, WaitOptions};
use futures::stream::{self, StreamExt};
use settle_common::ResourceKind;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of accelerators swept at once
pub const DEFAULT_SWEEP_CONCURRENCY: usize = 4;

/// Sweep configuration
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Only sweep accelerators whose name starts with this prefix
    pub name_prefix: Option<String>,
    /// List what would be deleted without deleting anything
    pub dry_run: bool,
    /// Accelerators swept concurrently
    pub concurrency: usize,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            name_prefix: None,
            dry_run: true,
            concurrency: DEFAULT_SWEEP_CONCURRENCY,
        }
    }
}

impl SweepConfig {
    fn matches(&self, accelerator: &Accelerator) -> bool {
        self.name_prefix
            .as_deref()
            .is_none_or(|prefix| accelerator.name.starts_with(prefix))
    }
}

/// One failed sweep step
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("error listing Global Accelerator accelerators: {0}")]
    List(#[source] AwsError),

    #[error("error {action} {resource}: {source}")]
    Service {
        resource: String,
        action: &'static str,
        #[source]
        source: AwsError,
    },

    #[error(transparent)]
    Wait(#[from] WaitError),
}

/// Report of a sweep
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Accelerators matching the filter
    pub found: usize,
    pub deleted: usize,
    /// Matched but left alone because of a dry run
    pub skipped: usize,
    pub listeners_deleted: usize,
    pub endpoint_groups_deleted: usize,
    pub errors: Vec<SweepError>,
}

impl SweepReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} found, {} deleted, {} skipped, {} errors",
            self.found,
            self.deleted,
            self.skipped,
            self.errors.len()
        )?;
        for err in &self.errors {
            write!(f, "\n  - {err}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SweptOne {
    /// The accelerator itself is gone
    deleted: bool,
    listeners: usize,
    endpoint_groups: usize,
    errors: Vec<SweepError>,
}

/// Sweep accelerators.
///
/// Listing failures end the sweep early and are reported like any other
/// error; accelerators already listed are still swept.
pub async fn sweep_accelerators<O: GlobalAcceleratorOperations>(
    ops: &O,
    config: &SweepConfig,
    options: &WaitOptions,
) -> SweepReport {
    let mut report = SweepReport::default();
    let mut targets = Vec::new();
    let mut next_token = None;

    loop {
        match ops.list_accelerators(next_token.take()).await {
            Ok(page) => {
                targets.extend(page.items.into_iter().filter(|a| config.matches(a)));
                match page.next_token {
                    Some(token) => next_token = Some(token),
                    None => break,
                }
            }
            Err(e) => {
                report.errors.push(SweepError::List(e));
                break;
            }
        }
    }

    report.found = targets.len();
    info!(found = report.found, dry_run = config.dry_run, "Sweeping accelerators");

    if config.dry_run {
        for accelerator in &targets {
            info!(arn = %accelerator.arn, name = %accelerator.name, "Would delete accelerator");
        }
        report.skipped = targets.len();
        return report;
    }

    let results: Vec<SweptOne> = stream::iter(targets.iter())
        .map(|accelerator| sweep_one(ops, accelerator, options))
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    for swept in results {
        if swept.deleted {
            report.deleted += 1;
        }
        report.listeners_deleted += swept.listeners;
        report.endpoint_groups_deleted += swept.endpoint_groups;
        for e in swept.errors {
            warn!(error = %e, "Failed to sweep accelerator");
            report.errors.push(e);
        }
    }

    report
}

fn service_error<'a>(
    resource: &'a str,
    action: &'static str,
) -> impl FnOnce(AwsError) -> SweepError + 'a {
    move |source| SweepError::Service {
        resource: resource.to_string(),
        action,
        source,
    }
}

/// Sweep one accelerator, collecting every failure.
///
/// A failed child is skipped and the rest are still attempted. The
/// accelerator is only disabled and deleted once no child is left.
async fn sweep_one<O: GlobalAcceleratorOperations>(
    ops: &O,
    accelerator: &Accelerator,
    options: &WaitOptions,
) -> SweptOne {
    let arn = accelerator.arn.as_str();
    let label = ResourceKind::GlobalacceleratorAccelerator.describe(arn);
    let mut swept = SweptOne::default();

    let listeners = match ops.list_listeners(arn).await {
        Ok(listeners) => listeners,
        Err(e) => {
            swept.errors.push(service_error(&label, "listing listeners of")(e));
            return swept;
        }
    };

    for listener in &listeners {
        let groups = match ops.list_endpoint_groups(listener).await {
            Ok(groups) => groups,
            Err(e) => {
                swept
                    .errors
                    .push(service_error(listener, "listing endpoint groups of")(e));
                continue;
            }
        };

        let mut groups_left = 0;
        for group in &groups {
            match ignore_gone(ops.delete_endpoint_group(&group.arn).await) {
                Ok(()) => swept.endpoint_groups += 1,
                Err(e) => {
                    swept.errors.push(service_error(&group.arn, "deleting")(e));
                    groups_left += 1;
                }
            }
        }
        if groups_left > 0 {
            continue;
        }

        match ignore_gone(ops.delete_listener(listener).await) {
            Ok(()) => swept.listeners += 1,
            Err(e) => swept.errors.push(service_error(listener, "deleting")(e)),
        }
    }

    if !swept.errors.is_empty() {
        warn!(arn = %arn, errors = swept.errors.len(), "Children left, not deleting accelerator");
        return swept;
    }

    if accelerator.enabled {
        let mut disable = UpdateAcceleratorInput::from_current(accelerator);
        disable.enabled = false;
        if let Err(e) = ops.update_accelerator(&disable).await {
            if e.is_not_found() {
                swept.deleted = true;
            } else {
                swept.errors.push(service_error(&label, "disabling")(e));
            }
            return swept;
        }
    }

    if let Err(e) = wait_accelerator_deployed(ops, arn, options).await {
        swept.errors.push(e.into());
        return swept;
    }

    match ignore_gone(ops.delete_accelerator(arn).await) {
        Ok(()) => {
            swept.deleted = true;
            debug!(arn = %arn, listeners = swept.listeners, "Accelerator swept");
        }
        Err(e) => swept.errors.push(service_error(&label, "deleting")(e)),
    }

    swept
}

fn ignore_gone(result: Result<(), AwsError>) -> Result<(), AwsError> {
    crate::aws::ignore_not_found(result)
}
