//! Poll-until-stable waiting with deadline and cancellation support.
//!
//! A [`Waiter`] drives one resource from `Pending` to a terminal state:
//! `Target` (success), `Failure`, `TimedOut` or `Cancelled`. Each tick asks
//! a refresh function for a [`PollOutcome`] and decides from the variant
//! alone. Ticks are strictly sequential; the only suspension points are the
//! in-flight check and the inter-tick sleep, and both race against the
//! deadline and the cancellation token.
//!
//! All timing uses `tokio::time`, so tests run the state machine against a
//! paused clock instead of real sleeps.

use crate::aws::AwsError;
use crate::finder::Finder;
use crate::outcome::{ABSENT, NotFoundError, PollOutcome};
use backon::{BackoffBuilder, ConstantBackoff, ConstantBuilder};
use settle_common::Signal;
use settle_common::defaults::{
    DEFAULT_INITIAL_DELAY, DEFAULT_MIN_INTERVAL, DEFAULT_NOT_FOUND_CHECKS, DEFAULT_POLL_INTERVAL,
};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Jitter adds at most `poll_interval / JITTER_DIVISOR` to each delay
const JITTER_DIVISOR: u32 = 4;

/// What a "not found" answer means for this wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundPolicy {
    /// The resource is expected to appear; keep polling (bounded by
    /// [`WaitConfig::not_found_checks`] consecutive absences)
    Pending,
    /// Absence is the goal, e.g. waiting for a deletion to finish
    Target,
    /// The resource vanished when it should not have
    Unexpected,
}

/// Terminal and non-terminal states of a wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitState {
    Pending,
    Target,
    Failure,
    TimedOut,
    Cancelled,
}

/// Parameters of one wait. Built per operation invocation, never shared.
#[derive(Debug, Clone)]
pub struct WaitConfig<G> {
    /// Signals that count as success
    pub target: Vec<G>,
    /// Signals that are expected while the change is in progress
    pub pending: Vec<G>,
    /// Signals that are permanent failures
    pub failure: Vec<G>,
    /// Meaning of a "not found" answer
    pub not_found: NotFoundPolicy,
    /// Maximum total time to wait
    pub timeout: Duration,
    /// Delay before the first check
    pub initial_delay: Duration,
    /// Delay between checks
    pub poll_interval: Duration,
    /// Lower bound for the delay between checks
    pub min_interval: Duration,
    /// Add randomness to the delay between checks
    pub jitter: bool,
    /// Consecutive absences tolerated under [`NotFoundPolicy::Pending`]
    pub not_found_checks: u32,
    /// Consecutive target observations required before success
    pub continuous_target_occurrence: u32,
}

impl<G: Signal> WaitConfig<G> {
    /// Wait for one of `target` to be reported
    pub fn until(target: impl IntoIterator<Item = G>, timeout: Duration) -> Self {
        Self {
            target: target.into_iter().collect(),
            pending: Vec::new(),
            failure: Vec::new(),
            not_found: NotFoundPolicy::Unexpected,
            timeout,
            initial_delay: DEFAULT_INITIAL_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
            min_interval: DEFAULT_MIN_INTERVAL,
            jitter: true,
            not_found_checks: DEFAULT_NOT_FOUND_CHECKS,
            continuous_target_occurrence: 1,
        }
    }

    /// Wait for the resource to disappear
    pub fn until_absent(timeout: Duration) -> Self {
        Self::until([], timeout).with_not_found(NotFoundPolicy::Target)
    }

    pub fn with_pending(mut self, pending: impl IntoIterator<Item = G>) -> Self {
        self.pending = pending.into_iter().collect();
        self
    }

    pub fn with_failure(mut self, failure: impl IntoIterator<Item = G>) -> Self {
        self.failure = failure.into_iter().collect();
        self
    }

    pub fn with_not_found(mut self, policy: NotFoundPolicy) -> Self {
        self.not_found = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn with_not_found_checks(mut self, checks: u32) -> Self {
        self.not_found_checks = checks;
        self
    }

    pub fn with_continuous_target_occurrence(mut self, occurrences: u32) -> Self {
        self.continuous_target_occurrence = occurrences.max(1);
        self
    }

    /// Human readable description of what counts as success
    pub fn expected(&self) -> String {
        let mut expected: Vec<&str> = self.target.iter().map(|s| s.as_str()).collect();
        if self.not_found == NotFoundPolicy::Target {
            expected.push(ABSENT);
        }
        expected.join(", ")
    }
}

/// Errors that end a wait
#[derive(Debug, Error)]
pub enum WaitError {
    /// A permanent failure status was reported
    #[error("unexpected state '{state}' for {resource}, wanted '{expected}'")]
    UnexpectedState {
        resource: String,
        state: String,
        expected: String,
    },

    /// The resource disappeared when it was expected to exist
    #[error("{resource} disappeared while waiting: {source}")]
    Vanished {
        resource: String,
        #[source]
        source: NotFoundError,
    },

    /// The resource never appeared
    #[error("{resource} still not found after {checks} checks: {source}")]
    NotFoundExhausted {
        resource: String,
        checks: u32,
        #[source]
        source: NotFoundError,
    },

    /// A status check failed for a non-retryable reason
    #[error("error describing {resource}: {source}")]
    Service {
        resource: String,
        #[source]
        source: AwsError,
    },

    /// The deadline passed before a terminal state was reached
    #[error(
        "timeout while waiting for {resource} to become '{expected}' (last state: '{}', timeout: {timeout:?}){}",
        .last_state.as_deref().unwrap_or("unknown"),
        last_error_suffix(.last_error)
    )]
    Timeout {
        resource: String,
        expected: String,
        timeout: Duration,
        last_state: Option<String>,
        last_error: Option<String>,
        ticks: u32,
    },

    /// The wait was cancelled from outside
    #[error("wait for {resource} cancelled")]
    Cancelled { resource: String },
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(", last error: {e}"))
        .unwrap_or_default()
}

impl WaitError {
    /// The terminal state this error represents
    pub fn state(&self) -> WaitState {
        match self {
            WaitError::Timeout { .. } => WaitState::TimedOut,
            WaitError::Cancelled { .. } => WaitState::Cancelled,
            _ => WaitState::Failure,
        }
    }

    /// Check if the deadline passed
    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout { .. })
    }

    /// Check if the wait ended because the resource is absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            WaitError::Vanished { .. } | WaitError::NotFoundExhausted { .. }
        )
    }
}

/// Successful end of a wait
#[derive(Debug)]
pub struct Settled<S> {
    /// The final snapshot; `None` when absence was the target
    pub snapshot: Option<S>,
    /// Number of status checks performed
    pub ticks: u32,
    /// Time spent waiting
    pub elapsed: Duration,
}

impl<S> Settled<S> {
    /// Always [`WaitState::Target`]; present for symmetry with [`WaitError::state`]
    pub fn state(&self) -> WaitState {
        WaitState::Target
    }

    pub fn is_absent(&self) -> bool {
        self.snapshot.is_none()
    }

    pub fn into_snapshot(self) -> Option<S> {
        self.snapshot
    }
}

/// Per-call overrides for the waiters of the service adapters.
///
/// Each adapter waiter builds its own [`WaitConfig`] with the resource's
/// default timeout; anything set here replaces the corresponding default.
#[derive(Debug, Clone, Default)]
pub struct WaitOptions {
    pub timeout: Option<Duration>,
    pub poll_interval: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Build a waiter from `config` with these overrides applied
    pub fn waiter<G: Signal>(
        &self,
        resource: impl Into<String>,
        mut config: WaitConfig<G>,
    ) -> Waiter<G> {
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(interval) = self.poll_interval {
            config.poll_interval = interval;
        }
        let waiter = Waiter::new(resource, config);
        match &self.cancel {
            Some(token) => waiter.with_cancellation(token.clone()),
            None => waiter,
        }
    }
}

/// Counters carried between ticks
#[derive(Debug, Default)]
struct Progress {
    ticks: u32,
    not_found_streak: u32,
    target_streak: u32,
    last_state: Option<String>,
    last_error: Option<String>,
}

/// Decision taken after one tick
enum Step<S> {
    Continue,
    Settle(Option<S>),
}

/// Drives one resource to a terminal state.
#[derive(Debug, Clone)]
pub struct Waiter<G> {
    resource: String,
    config: WaitConfig<G>,
    cancel: Option<CancellationToken>,
}

impl<G: Signal> Waiter<G> {
    /// Create a waiter; `resource` labels logs and errors
    pub fn new(resource: impl Into<String>, config: WaitConfig<G>) -> Self {
        Self {
            resource: resource.into(),
            config,
            cancel: None,
        }
    }

    /// Abort the wait promptly when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &WaitConfig<G> {
        &self.config
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Poll `refresh` until a terminal state is reached.
    ///
    /// # Returns
    /// * `Ok(Settled)` - A target signal was observed (or absence, when that is the target)
    /// * `Err(WaitError)` - Failure status, unexpected absence, fatal check error,
    ///   timeout or cancellation
    pub async fn wait<S, F, Fut>(&self, mut refresh: F) -> Result<Settled<S>, WaitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = PollOutcome<S, G>>,
    {
        let start = Instant::now();
        let deadline = start + self.config.timeout;
        let mut jitter = self.jitter();
        let mut progress = Progress::default();

        if !self.config.initial_delay.is_zero() {
            self.pause(self.config.initial_delay, deadline, &progress)
                .await?;
        }

        loop {
            if Instant::now() >= deadline {
                return Err(self.timed_out(&progress));
            }

            progress.ticks += 1;

            let outcome = tokio::select! {
                biased;
                _ = cancelled(self.cancel.as_ref()) => {
                    return Err(self.cancelled_error(&progress));
                }
                _ = tokio::time::sleep_until(deadline) => {
                    return Err(self.timed_out(&progress));
                }
                outcome = refresh() => outcome,
            };

            if let Step::Settle(snapshot) = self.evaluate(outcome, &mut progress)? {
                let elapsed = start.elapsed();
                info!(
                    resource = %self.resource,
                    ticks = progress.ticks,
                    elapsed_ms = elapsed.as_millis() as u64,
                    state = progress.last_state.as_deref().unwrap_or(ABSENT),
                    "Reached target state"
                );
                return Ok(Settled {
                    snapshot,
                    ticks: progress.ticks,
                    elapsed,
                });
            }

            let delay = self.next_delay(jitter.as_mut());
            self.pause(delay, deadline, &progress).await?;
        }
    }

    /// Classify one outcome. Failures are returned as errors.
    fn evaluate<S>(
        &self,
        outcome: PollOutcome<S, G>,
        progress: &mut Progress,
    ) -> Result<Step<S>, WaitError> {
        match outcome {
            PollOutcome::Found { snapshot, signal } => {
                progress.not_found_streak = 0;
                progress.last_state = Some(signal.to_string());

                if self.config.target.contains(&signal) {
                    progress.target_streak += 1;
                    if progress.target_streak >= self.config.continuous_target_occurrence {
                        return Ok(Step::Settle(Some(snapshot)));
                    }
                    debug!(
                        resource = %self.resource,
                        state = %signal,
                        seen = progress.target_streak,
                        required = self.config.continuous_target_occurrence,
                        "Target state observed, waiting for it to hold"
                    );
                    return Ok(Step::Continue);
                }
                progress.target_streak = 0;

                if self.config.failure.contains(&signal) {
                    warn!(resource = %self.resource, state = %signal, "Resource entered a failure state");
                    return Err(WaitError::UnexpectedState {
                        resource: self.resource.clone(),
                        state: signal.to_string(),
                        expected: self.config.expected(),
                    });
                }

                let known = self.config.pending.contains(&signal) && !signal.is_unknown();
                debug!(
                    resource = %self.resource,
                    tick = progress.ticks,
                    state = %signal,
                    unknown = !known,
                    "Resource not settled, retrying"
                );
                Ok(Step::Continue)
            }
            PollOutcome::NotFound(err) => {
                progress.last_state = Some(ABSENT.to_string());
                match self.config.not_found {
                    NotFoundPolicy::Target => {
                        progress.target_streak += 1;
                        if progress.target_streak >= self.config.continuous_target_occurrence {
                            return Ok(Step::Settle(None));
                        }
                        Ok(Step::Continue)
                    }
                    NotFoundPolicy::Pending => {
                        progress.target_streak = 0;
                        progress.not_found_streak += 1;
                        if progress.not_found_streak > self.config.not_found_checks {
                            return Err(WaitError::NotFoundExhausted {
                                resource: self.resource.clone(),
                                checks: progress.not_found_streak,
                                source: err,
                            });
                        }
                        debug!(
                            resource = %self.resource,
                            tick = progress.ticks,
                            absences = progress.not_found_streak,
                            "Resource not found yet, retrying"
                        );
                        Ok(Step::Continue)
                    }
                    NotFoundPolicy::Unexpected => Err(WaitError::Vanished {
                        resource: self.resource.clone(),
                        source: err,
                    }),
                }
            }
            PollOutcome::Transient(err) => {
                warn!(
                    resource = %self.resource,
                    tick = progress.ticks,
                    error = %err,
                    "Status check failed, retrying"
                );
                progress.last_error = Some(err.to_string());
                Ok(Step::Continue)
            }
            PollOutcome::Fatal(err) => Err(WaitError::Service {
                resource: self.resource.clone(),
                source: err,
            }),
        }
    }

    /// Sleep for `delay`, never past `deadline`, waking early on cancellation.
    async fn pause(
        &self,
        delay: Duration,
        deadline: Instant,
        progress: &Progress,
    ) -> Result<(), WaitError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(self.timed_out(progress));
        }
        let delay = delay.min(remaining);

        debug!(
            resource = %self.resource,
            delay_ms = delay.as_millis() as u64,
            "Sleeping before next check"
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = cancelled(self.cancel.as_ref()) => Err(self.cancelled_error(progress)),
        }
    }

    /// Source of random extra delay, `None` when jitter is off
    fn jitter(&self) -> Option<ConstantBackoff> {
        self.config.jitter.then(|| {
            ConstantBuilder::default()
                .with_delay(self.config.poll_interval / JITTER_DIVISOR)
                .with_jitter()
                .with_max_times(usize::MAX)
                .build()
        })
    }

    /// `poll_interval` plus up to a quarter of it, floored at `min_interval`
    fn next_delay(&self, jitter: Option<&mut ConstantBackoff>) -> Duration {
        let spread = self.config.poll_interval / JITTER_DIVISOR;
        // backon yields the spread plus a random fraction of it
        let extra = jitter
            .and_then(|j| j.next())
            .map(|d| d.saturating_sub(spread))
            .unwrap_or_default();
        (self.config.poll_interval + extra).max(self.config.min_interval)
    }

    fn timed_out(&self, progress: &Progress) -> WaitError {
        warn!(
            resource = %self.resource,
            timeout_secs = self.config.timeout.as_secs(),
            ticks = progress.ticks,
            "Timed out waiting for resource"
        );
        WaitError::Timeout {
            resource: self.resource.clone(),
            expected: self.config.expected(),
            timeout: self.config.timeout,
            last_state: progress.last_state.clone(),
            last_error: progress.last_error.clone(),
            ticks: progress.ticks,
        }
    }

    fn cancelled_error(&self, progress: &Progress) -> WaitError {
        info!(resource = %self.resource, ticks = progress.ticks, "Wait cancelled");
        WaitError::Cancelled {
            resource: self.resource.clone(),
        }
    }
}

/// Resolves when `token` is cancelled; never resolves without a token.
async fn cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

/// Wait for the resource behind `finder` to reach a state, projecting each
/// found snapshot through `extract`.
///
/// # Example
/// ```ignore
/// let settled = wait_for_state(
///     &snapshot_finder,
///     "nightly",
///     status_snapshot,
///     &Waiter::new("MemoryDB Snapshot (nightly)", config),
/// )
/// .await?;
/// ```
pub async fn wait_for_state<Fd, G, X>(
    finder: &Fd,
    id: &str,
    extract: X,
    waiter: &Waiter<G>,
) -> Result<Settled<Fd::Snapshot>, WaitError>
where
    Fd: Finder,
    G: Signal,
    X: Fn(&Fd::Snapshot) -> G,
{
    let extract = &extract;
    waiter
        .wait(move || async move { PollOutcome::from_find(finder.find(id).await, extract) })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::classify_aws_error;
    use crate::testing::ScriptedFinder;
    use proptest::prelude::*;
    use settle_common::status::memorydb::{ClusterStatus, SnapshotStatus};

    const INTERVAL: Duration = Duration::from_secs(5);

    fn found(status: &str) -> PollOutcome<String, SnapshotStatus> {
        PollOutcome::found(status.to_string(), SnapshotStatus::parse_lossy(status))
    }

    fn absent() -> PollOutcome<String, SnapshotStatus> {
        PollOutcome::NotFound(NotFoundError::empty_result("DescribeSnapshots"))
    }

    fn available_config(timeout: Duration) -> WaitConfig<SnapshotStatus> {
        WaitConfig::until([SnapshotStatus::Available], timeout)
            .with_pending([SnapshotStatus::Creating])
            .with_poll_interval(INTERVAL)
            .without_jitter()
    }

    #[tokio::test(start_paused = true)]
    async fn test_reaches_target_after_three_ticks() {
        let script = ScriptedFinder::new([found("creating"), found("creating"), found("available")]);
        let waiter = Waiter::new("MemoryDB Snapshot (s)", available_config(Duration::from_secs(60)));

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(settled.ticks, 3);
        assert_eq!(script.calls(), 3);
        assert_eq!(settled.state(), WaitState::Target);
        assert_eq!(settled.snapshot.as_deref(), Some("available"));
        assert_eq!(settled.elapsed, INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_target() {
        let script = ScriptedFinder::new([found("available"), found("creating")]);
        let waiter = Waiter::new("s", available_config(Duration::from_secs(60)));

        waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(script.calls(), 1);
        assert_eq!(script.remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_state_is_fatal_without_retry() {
        let script = ScriptedFinder::new([
            PollOutcome::found("c".to_string(), ClusterStatus::Creating),
            PollOutcome::found("c".to_string(), ClusterStatus::Deleting),
            PollOutcome::found("c".to_string(), ClusterStatus::Available),
        ]);
        let config = WaitConfig::until([ClusterStatus::Available], Duration::from_secs(60))
            .with_pending([ClusterStatus::Creating])
            .with_failure([ClusterStatus::Deleting])
            .without_jitter();
        let waiter = Waiter::new("MemoryDB Cluster (c)", config);

        let err = waiter.wait(|| script.next()).await.unwrap_err();

        assert_eq!(script.calls(), 2);
        assert_eq!(err.state(), WaitState::Failure);
        assert_eq!(
            err.to_string(),
            "unexpected state 'deleting' for MemoryDB Cluster (c), wanted 'available'"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_deletion_completes_on_not_found() {
        let script = ScriptedFinder::new([found("deleting"), found("deleting"), absent()]);
        let config = WaitConfig::until_absent(Duration::from_secs(60))
            .with_pending([SnapshotStatus::Deleting])
            .with_poll_interval(INTERVAL)
            .without_jitter();
        let waiter = Waiter::new("s", config);

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert!(settled.is_absent());
        assert_eq!(settled.ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unexpected_not_found_is_fatal() {
        let script = ScriptedFinder::new([found("creating"), absent()]);
        let waiter = Waiter::new("s", available_config(Duration::from_secs(60)));

        let err = waiter.wait(|| script.next()).await.unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, WaitError::Vanished { .. }));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_not_found_keeps_polling_until_created() {
        let script = ScriptedFinder::new([absent(), absent(), found("creating"), found("available")]);
        let config = available_config(Duration::from_secs(60)).with_not_found(NotFoundPolicy::Pending);
        let waiter = Waiter::new("s", config);

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(settled.ticks, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_not_found_is_bounded() {
        let script = ScriptedFinder::repeating(absent);
        let config = available_config(Duration::from_secs(3600))
            .with_not_found(NotFoundPolicy::Pending)
            .with_not_found_checks(3);
        let waiter = Waiter::new("s", config);

        let err = waiter.wait(|| script.next()).await.unwrap_err();

        assert!(matches!(err, WaitError::NotFoundExhausted { checks: 4, .. }));
        assert_eq!(script.calls(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let throttled = || {
            PollOutcome::Transient(classify_aws_error(Some("ThrottlingException"), Some("slow down")))
        };
        let script = ScriptedFinder::new([throttled(), throttled(), found("available")]);
        let waiter = Waiter::new("s", available_config(Duration::from_secs(60)));

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(settled.ticks, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_stops_immediately() {
        let denied = classify_aws_error(Some("AccessDeniedException"), Some("denied"));
        let script = ScriptedFinder::new([found("creating"), PollOutcome::Fatal(denied)]);
        let waiter = Waiter::new("s", available_config(Duration::from_secs(60)));

        let err = waiter.wait(|| script.next()).await.unwrap_err();

        assert!(matches!(err, WaitError::Service { .. }));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reports_last_state_and_bounds_elapsed() {
        let timeout = Duration::from_secs(62);
        let script = ScriptedFinder::repeating(|| found("creating"));
        let waiter = Waiter::new("MemoryDB Snapshot (s)", available_config(timeout));

        let start = Instant::now();
        let err = waiter.wait(|| script.next()).await.unwrap_err();
        let elapsed = start.elapsed();

        assert!(elapsed >= timeout, "{elapsed:?}");
        assert!(elapsed < timeout + INTERVAL, "{elapsed:?}");
        assert_eq!(err.state(), WaitState::TimedOut);
        match &err {
            WaitError::Timeout {
                last_state, ticks, ..
            } => {
                assert_eq!(last_state.as_deref(), Some("creating"));
                // Ticks at 0, 5, ..., 60
                assert_eq!(*ticks, 13);
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(err.to_string().contains("last state: 'creating'"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_persistent_transient_error() {
        let script = ScriptedFinder::repeating(|| {
            PollOutcome::<String, SnapshotStatus>::Transient(classify_aws_error(
                Some("Throttling"),
                Some("rate exceeded"),
            ))
        });
        let waiter = Waiter::new("s", available_config(Duration::from_secs(20)));

        let err = waiter.wait(|| script.next()).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("last error: Rate limit exceeded (Throttling)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_signal_keeps_waiting() {
        let script = ScriptedFinder::repeating(|| found("copying"));
        let waiter = Waiter::new("s", available_config(Duration::from_secs(30)));

        let err = waiter.wait(|| script.next()).await.unwrap_err();

        assert!(err.is_timeout());
        assert!(script.calls() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_continuous_target_occurrence() {
        let script = ScriptedFinder::new([
            found("available"),
            found("creating"),
            found("available"),
            found("available"),
        ]);
        let config = available_config(Duration::from_secs(60)).with_continuous_target_occurrence(2);
        let waiter = Waiter::new("s", config);

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(settled.ticks, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay_is_honoured() {
        let script = ScriptedFinder::new([found("available")]);
        let config = available_config(Duration::from_secs(60)).with_initial_delay(Duration::from_secs(10));
        let waiter = Waiter::new("s", config);

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(settled.elapsed, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_min_interval_floors_the_delay() {
        let script = ScriptedFinder::new([found("creating"), found("available")]);
        let config = available_config(Duration::from_secs(60))
            .with_poll_interval(Duration::from_millis(10))
            .with_min_interval(Duration::from_secs(2));
        let waiter = Waiter::new("s", config);

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert_eq!(settled.elapsed, Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_jitter_stays_light() {
        let script = ScriptedFinder::new([found("creating"), found("available")]);
        let config = WaitConfig::until([SnapshotStatus::Available], Duration::from_secs(60))
            .with_pending([SnapshotStatus::Creating])
            .with_poll_interval(Duration::from_secs(4));
        let waiter = Waiter::new("s", config);

        let settled = waiter.wait(|| script.next()).await.unwrap();

        assert!(settled.elapsed >= Duration::from_secs(4), "{:?}", settled.elapsed);
        assert!(settled.elapsed < Duration::from_secs(5), "{:?}", settled.elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_sleep() {
        let token = CancellationToken::new();
        let script = ScriptedFinder::repeating(|| found("creating"));
        let waiter = Waiter::new("s", available_config(Duration::from_secs(3600)))
            .with_cancellation(token.clone());

        let canceller = {
            let token = token.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(7)).await;
                token.cancel();
            })
        };

        let start = Instant::now();
        let err = waiter.wait(|| script.next()).await.unwrap_err();
        canceller.await.unwrap();

        assert_eq!(err.state(), WaitState::Cancelled);
        assert_eq!(start.elapsed(), Duration::from_secs(7));
        assert_eq!(script.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_is_abandoned_at_deadline() {
        let waiter = Waiter::new("s", available_config(Duration::from_secs(30)));

        let start = Instant::now();
        let err = waiter
            .wait(|| async {
                tokio::time::sleep(Duration::from_secs(600)).await;
                found("available")
            })
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_state_with_finder() {
        use crate::finder::FnFinder;
        use std::sync::atomic::{AtomicU32, Ordering};

        let calls = AtomicU32::new(0);
        let finder = FnFinder::new(|id: String| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let status = if n < 2 { "creating" } else { "available" };
                Ok::<_, crate::outcome::FindError>((id, status.to_string()))
            }
        });
        let waiter = Waiter::new("s", available_config(Duration::from_secs(60)));

        let settled = wait_for_state(
            &finder,
            "nightly",
            |(_, status): &(String, String)| SnapshotStatus::parse_lossy(status.as_str()),
            &waiter,
        )
        .await
        .unwrap();

        let (id, status) = settled.snapshot.unwrap();
        assert_eq!(id, "nightly");
        assert_eq!(status, "available");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_wait_options_override_defaults() {
        let token = CancellationToken::new();
        let options = WaitOptions::default()
            .with_timeout(Duration::from_secs(90))
            .with_poll_interval(Duration::from_secs(2))
            .with_cancellation(token);

        let waiter = options.waiter("s", available_config(Duration::from_secs(7200)));
        assert_eq!(waiter.config().timeout, Duration::from_secs(90));
        assert_eq!(waiter.config().poll_interval, Duration::from_secs(2));
        assert!(waiter.cancel.is_some());

        let untouched = WaitOptions::default().waiter("s", available_config(Duration::from_secs(7200)));
        assert_eq!(untouched.config().timeout, Duration::from_secs(7200));
        assert_eq!(untouched.resource(), "s");
    }

    #[test]
    fn test_expected_description() {
        let config = WaitConfig::<SnapshotStatus>::until_absent(Duration::from_secs(1));
        assert_eq!(config.expected(), "absent");
        assert_eq!(available_config(Duration::from_secs(1)).expected(), "available");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_unknown_signals_never_terminate(raw in "[a-z]{3,10}") {
            prop_assume!(!["available", "creating", "deleting"].contains(&raw.as_str()));
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();
            let err = rt.block_on(async {
                let status = raw.clone();
                let script = ScriptedFinder::repeating(move || found(&status));
                let waiter = Waiter::new("s", available_config(Duration::from_secs(20)));
                waiter.wait(|| script.next()).await.unwrap_err()
            });
            prop_assert!(err.is_timeout());
        }
    }
}
