//! Typed errors for lifecycle orchestration and polling
//!
//! Lifecycle operations propagate these to the immediate caller; cleanup
//! sweeps degrade them into report records instead (see `cleanup`).

use crate::status::ResourceStatus;
use std::time::Duration;
use thiserror::Error;

/// Error from a single control-plane request.
#[derive(Debug, Error)]
pub enum ControlPlaneError {
    /// The resource does not exist on the remote side. Whether this is
    /// fatal, transient, or success depends entirely on the caller's phase
    /// (creating vs. deleting), so it stays a distinct variant.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("control plane request failed: {0}")]
    Api(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ControlPlaneError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ControlPlaneError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ControlPlaneError::NotFound { .. })
    }
}

impl From<anyhow::Error> for ControlPlaneError {
    fn from(err: anyhow::Error) -> Self {
        ControlPlaneError::Api(err.into())
    }
}

/// Outcome of a bounded status wait.
#[derive(Debug, Error)]
pub enum WaitError {
    /// The remote reported the explicit failure status. Polling stops
    /// immediately; the status is never retried.
    #[error("{resource} reported {status} while waiting for {expected}")]
    StatusFailed {
        resource: String,
        status: ResourceStatus,
        expected: ResourceStatus,
    },

    #[error("timed out waiting for {resource} after {waited:?} ({probes} probes)")]
    Timeout {
        resource: String,
        waited: Duration,
        probes: u32,
    },

    #[error("wait for {resource} cancelled")]
    Cancelled { resource: String },

    #[error(transparent)]
    Probe(#[from] ControlPlaneError),
}

/// Errors surfaced by single-resource lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The control plane reported an explicit failure status during
    /// provisioning. Not retried.
    #[error("{kind} '{id}' failed to provision (status {status})")]
    Provisioning {
        kind: &'static str,
        id: String,
        status: ResourceStatus,
    },

    /// The poll budget ran out before the resource converged. The caller
    /// may re-invoke; no automatic retry happens here.
    #[error("{kind} '{id}' did not converge within {waited:?}")]
    Timeout {
        kind: &'static str,
        id: String,
        waited: Duration,
    },

    /// A referenced artifact (the backing Lambda function) does not exist.
    #[error("lambda function '{function}' does not exist")]
    DependencyNotFound { function: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),
}

impl LifecycleError {
    /// Promote a wait failure into the lifecycle taxonomy for the resource
    /// the wait was tracking.
    pub(crate) fn from_wait(kind: &'static str, id: &str, err: WaitError) -> Self {
        match err {
            WaitError::StatusFailed { status, .. } => LifecycleError::Provisioning {
                kind,
                id: id.to_string(),
                status,
            },
            WaitError::Timeout { waited, .. } => LifecycleError::Timeout {
                kind,
                id: id.to_string(),
                waited,
            },
            WaitError::Cancelled { .. } => LifecycleError::Cancelled,
            WaitError::Probe(e) => LifecycleError::ControlPlane(e),
        }
    }
}
