//! Global Accelerator status values

use super::status_signal;

status_signal! {
    /// Deployment status of an accelerator
    ///
    /// Most changes (listeners, disabling, attribute updates) move an
    /// accelerator back to `IN_PROGRESS` until they propagate.
    AcceleratorStatus {
        Deployed => "DEPLOYED",
        InProgress => "IN_PROGRESS",
    }
}
