//! Bounded status polling with cancellation support
//!
//! The control plane is eventually consistent: freshly created resources can
//! be briefly invisible, and deleted resources linger before disappearing.
//! `wait_for_status` is the single convergence primitive both the lifecycle
//! orchestrator and the cleanup sweep use, with fixed-interval polling and a
//! wall-clock budget.

use crate::error::{ControlPlaneError, WaitError};
use crate::status::ResourceStatus;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Poll interval and wall-clock budget for one wait.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    /// Fixed delay between status probes
    pub poll_interval: Duration,
    /// Maximum total time to wait before giving up
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(300),
        }
    }
}

impl WaitConfig {
    /// Stack deletion fans out to many child resources, so it gets a much
    /// longer budget than resource-level waits (30s delay, 60 attempts).
    pub fn stack_deletion() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// One observation of a remote resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The resource exists and reports this status
    Status(ResourceStatus),
    /// The control plane has no record of the resource
    Missing,
}

/// How a `Probe::Missing` observation is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingIs {
    /// Activation waits: the resource may not have propagated yet, retry
    Transient,
    /// Deletion waits: disappearance is the success condition
    Success,
}

/// Poll `fetch` until it reports `success`, the `failure` status, a timeout,
/// or cancellation.
///
/// An explicit `failure` status aborts immediately with no further polling.
/// Probe errors are not retried; the wait surfaces them as-is.
pub async fn wait_for_status<F, Fut>(
    config: &WaitConfig,
    cancel: Option<&CancellationToken>,
    missing: MissingIs,
    success: ResourceStatus,
    failure: ResourceStatus,
    fetch: F,
    resource: &str,
) -> Result<(), WaitError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Probe, ControlPlaneError>>,
{
    // tokio's Instant, so paused-clock tests see the same time the sleeps do
    let start = tokio::time::Instant::now();
    let mut probes = 0u32;

    loop {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(WaitError::Cancelled {
                    resource: resource.to_string(),
                });
            }
        }

        if start.elapsed() >= config.timeout {
            return Err(WaitError::Timeout {
                resource: resource.to_string(),
                waited: start.elapsed(),
                probes,
            });
        }

        probes += 1;
        match fetch().await? {
            Probe::Status(status) if status == success => {
                debug!(resource = %resource, probes, "Reached target status");
                return Ok(());
            }
            Probe::Status(status) if status == failure => {
                return Err(WaitError::StatusFailed {
                    resource: resource.to_string(),
                    status,
                    expected: success,
                });
            }
            Probe::Status(status) => {
                debug!(resource = %resource, status = %status, "Still converging");
            }
            Probe::Missing => match missing {
                MissingIs::Success => {
                    debug!(resource = %resource, probes, "Confirmed absent");
                    return Ok(());
                }
                MissingIs::Transient => {
                    debug!(resource = %resource, "Not visible yet, retrying");
                }
            },
        }

        tokio::select! {
            _ = tokio::time::sleep(config.poll_interval) => {}
            _ = async {
                match cancel {
                    Some(token) => token.cancelled().await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                return Err(WaitError::Cancelled {
                    resource: resource.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn scripted(probes: Vec<Probe>) -> Mutex<VecDeque<Probe>> {
        Mutex::new(probes.into())
    }

    /// Pop the next scripted probe, repeating the last one once exhausted.
    fn next(script: &Mutex<VecDeque<Probe>>) -> Probe {
        let mut queue = script.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            *queue.front().expect("script must not be empty")
        }
    }

    fn fast() -> WaitConfig {
        WaitConfig {
            poll_interval: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn converges_after_retries() {
        let script = scripted(vec![
            Probe::Status(ResourceStatus::Creating),
            Probe::Status(ResourceStatus::Creating),
            Probe::Status(ResourceStatus::Active),
        ]);

        let result = wait_for_status(
            &fast(),
            None,
            MissingIs::Transient,
            ResourceStatus::Active,
            ResourceStatus::Failed,
            || async { Ok(next(&script)) },
            "gateway gw-1",
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn failure_status_aborts_without_further_polling() {
        let probes_taken = Mutex::new(0u32);
        let script = scripted(vec![
            Probe::Status(ResourceStatus::Creating),
            Probe::Status(ResourceStatus::Failed),
            Probe::Status(ResourceStatus::Active),
        ]);

        let result = wait_for_status(
            &fast(),
            None,
            MissingIs::Transient,
            ResourceStatus::Active,
            ResourceStatus::Failed,
            || async {
                *probes_taken.lock().unwrap() += 1;
                Ok(next(&script))
            },
            "gateway gw-1",
        )
        .await;

        assert!(matches!(result, Err(WaitError::StatusFailed { .. })));
        assert_eq!(*probes_taken.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn missing_is_transient_during_activation() {
        let script = scripted(vec![
            Probe::Missing,
            Probe::Missing,
            Probe::Status(ResourceStatus::Creating),
            Probe::Status(ResourceStatus::Active),
        ]);

        let result = wait_for_status(
            &fast(),
            None,
            MissingIs::Transient,
            ResourceStatus::Active,
            ResourceStatus::Failed,
            || async { Ok(next(&script)) },
            "gateway gw-1",
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_is_success_during_deletion() {
        let script = scripted(vec![
            Probe::Status(ResourceStatus::Deleting),
            Probe::Missing,
        ]);

        let result = wait_for_status(
            &fast(),
            None,
            MissingIs::Success,
            ResourceStatus::Deleted,
            ResourceStatus::Failed,
            || async { Ok(next(&script)) },
            "gateway gw-1",
        )
        .await;

        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_after_budget_with_expected_probe_count() {
        let config = WaitConfig {
            poll_interval: Duration::from_secs(10),
            timeout: Duration::from_secs(300),
        };
        let script = scripted(vec![Probe::Status(ResourceStatus::Creating)]);

        let result = wait_for_status(
            &config,
            None,
            MissingIs::Transient,
            ResourceStatus::Active,
            ResourceStatus::Failed,
            || async { Ok(next(&script)) },
            "gateway gw-1",
        )
        .await;

        match result {
            Err(WaitError::Timeout { probes, .. }) => {
                // ceil(300 / 10) = 30, allow one either way for clock skew
                assert!((29..=31).contains(&probes), "probes = {probes}");
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn pre_cancelled_token_aborts_before_first_probe() {
        let token = CancellationToken::new();
        token.cancel();
        let probes_taken = Mutex::new(0u32);

        let result = wait_for_status(
            &fast(),
            Some(&token),
            MissingIs::Transient,
            ResourceStatus::Active,
            ResourceStatus::Failed,
            || async {
                *probes_taken.lock().unwrap() += 1;
                Ok(Probe::Status(ResourceStatus::Creating))
            },
            "gateway gw-1",
        )
        .await;

        assert!(matches!(result, Err(WaitError::Cancelled { .. })));
        assert_eq!(*probes_taken.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn probe_error_is_not_retried() {
        let probes_taken = Mutex::new(0u32);

        let result = wait_for_status(
            &fast(),
            None,
            MissingIs::Transient,
            ResourceStatus::Active,
            ResourceStatus::Failed,
            || async {
                *probes_taken.lock().unwrap() += 1;
                Err(ControlPlaneError::from(anyhow::anyhow!("throttled")))
            },
            "gateway gw-1",
        )
        .await;

        assert!(matches!(result, Err(WaitError::Probe(_))));
        assert_eq!(*probes_taken.lock().unwrap(), 1);
    }
}
