//! Best-effort cleanup sweep across gateways, bucket data, and the stack
//!
//! Two-phase fail-soft design: discover candidates by heuristic, then delete
//! in dependency order (targets -> gateways -> data -> template stack).
//! Every attempted deletion produces exactly one report record; a broken
//! resource never blocks cleanup of the rest.

use crate::control_plane::{FunctionStore, GatewayApi, ObjectStore, StackApi};
use crate::error::WaitError;
use crate::matcher::{KeywordMatcher, ResourceMatcher};
use crate::orchestrator::GatewayOrchestrator;
use crate::status::ResourceStatus;
use crate::wait::{wait_for_status, MissingIs, Probe, WaitConfig};
use serde::Serialize;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Object keys the deployed MCP tools write under.
pub const DATA_PREFIX: &str = "mcp-data/";

/// Per-resource outcome of one sweep attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepStatus {
    Deleted,
    Cleaned,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayOutcome {
    pub gateway_id: String,
    pub gateway_name: String,
    pub status: SweepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BucketOutcome {
    pub bucket_name: String,
    pub objects_deleted: usize,
    pub status: SweepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Terminal state of the template-stack teardown step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StackSweepStatus {
    Deleted,
    NotFound,
    Skipped,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct StackOutcome {
    pub stack_name: String,
    pub status: StackSweepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Accumulated results of one sweep. Never partially discarded: records are
/// appended as attempts happen, and sweep-level failures land in `errors`.
#[derive(Debug, Default, Serialize)]
pub struct CleanupReport {
    pub gateways: Vec<GatewayOutcome>,
    pub buckets: Vec<BucketOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackOutcome>,
    pub errors: Vec<String>,
}

/// Gate in front of each destructive step.
pub trait ConfirmPolicy: Send + Sync {
    fn approve(&self, question: &str) -> bool;
}

/// `--force`: approve everything without asking.
pub struct ForceApprove;

impl ConfirmPolicy for ForceApprove {
    fn approve(&self, _question: &str) -> bool {
        true
    }
}

/// Ask on stderr, read y/N from stdin. Declining skips only the one step.
pub struct InteractivePrompt;

impl ConfirmPolicy for InteractivePrompt {
    fn approve(&self, question: &str) -> bool {
        eprint!("{question} (y/N): ");
        let _ = std::io::stderr().flush();
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Sweeps gateways, bucket data, and the template stack, in that order.
pub struct ResourceCleanup<C, S, K> {
    gateways: GatewayOrchestrator<C>,
    store: S,
    stacks: K,
    stack_name: String,
    gateway_matcher: Box<dyn ResourceMatcher>,
    bucket_matcher: Box<dyn ResourceMatcher>,
    confirm: Box<dyn ConfirmPolicy>,
    cancel: Option<CancellationToken>,
}

impl<C, S, K> ResourceCleanup<C, S, K>
where
    C: GatewayApi + FunctionStore,
    S: ObjectStore,
    K: StackApi,
{
    pub fn new(
        gateways: GatewayOrchestrator<C>,
        store: S,
        stacks: K,
        stack_name: impl Into<String>,
        confirm: Box<dyn ConfirmPolicy>,
    ) -> Self {
        Self {
            gateways,
            store,
            stacks,
            stack_name: stack_name.into(),
            gateway_matcher: Box::new(KeywordMatcher::gateway_defaults()),
            bucket_matcher: Box::new(KeywordMatcher::bucket_defaults()),
            confirm,
            cancel: None,
        }
    }

    pub fn with_gateway_matcher(mut self, matcher: Box<dyn ResourceMatcher>) -> Self {
        self.gateway_matcher = matcher;
        self
    }

    pub fn with_bucket_matcher(mut self, matcher: Box<dyn ResourceMatcher>) -> Self {
        self.bucket_matcher = matcher;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Sweep only the gateways.
    pub async fn cleanup_gateways(&self) -> CleanupReport {
        let mut report = CleanupReport::default();
        self.sweep_gateways(&mut report).await;
        report
    }

    /// Full sweep: gateways, then bucket data, then (confirmation-gated)
    /// the template stack. The stack goes last because everything else must
    /// be gone first to avoid dangling references.
    pub async fn cleanup_all(&self) -> CleanupReport {
        let mut report = CleanupReport::default();

        info!("Cleaning up gateways");
        self.sweep_gateways(&mut report).await;

        info!("Cleaning up bucket data");
        self.sweep_bucket_data(&mut report).await;

        if self.confirm.approve("Delete CloudFormation stack?") {
            info!(stack = %self.stack_name, "Deleting template stack");
            report.stack = Some(self.teardown_stack().await);
        } else {
            report.stack = Some(StackOutcome {
                stack_name: self.stack_name.clone(),
                status: StackSweepStatus::Skipped,
                detail: Some("declined by operator".to_string()),
            });
        }

        report
    }

    /// Delete every gateway whose name the matcher claims, recording one
    /// outcome per attempt. Non-matching gateways are never inspected.
    async fn sweep_gateways(&self, report: &mut CleanupReport) {
        let gateways = match self.gateways.list_gateways().await {
            Ok(gateways) => gateways,
            Err(e) => {
                error!(error = %e, "Failed to list gateways");
                report.errors.push(format!("failed to list gateways: {e}"));
                return;
            }
        };

        for gateway in gateways {
            if !self.gateway_matcher.is_managed(&gateway.name) {
                continue;
            }

            let question = format!(
                "Delete gateway {} ({})?",
                gateway.name, gateway.gateway_id
            );
            if !self.confirm.approve(&question) {
                report.gateways.push(GatewayOutcome {
                    gateway_id: gateway.gateway_id,
                    gateway_name: gateway.name,
                    status: SweepStatus::Skipped,
                    error: None,
                });
                continue;
            }

            match self.gateways.delete_gateway(&gateway.gateway_id).await {
                Ok(()) => {
                    report.gateways.push(GatewayOutcome {
                        gateway_id: gateway.gateway_id,
                        gateway_name: gateway.name,
                        status: SweepStatus::Deleted,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(gateway_id = %gateway.gateway_id, error = %e, "Failed to delete gateway");
                    report.gateways.push(GatewayOutcome {
                        gateway_id: gateway.gateway_id,
                        gateway_name: gateway.name,
                        status: SweepStatus::Error,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
    }

    /// Batch-delete objects under [`DATA_PREFIX`] in every candidate
    /// bucket. Candidates match by name or by actually holding data under
    /// the prefix; a bucket that vanished mid-sweep is benign.
    async fn sweep_bucket_data(&self, report: &mut CleanupReport) {
        let buckets = match self.store.list_buckets().await {
            Ok(buckets) => buckets,
            Err(e) => {
                error!(error = %e, "Failed to list buckets");
                report.errors.push(format!("failed to list buckets: {e}"));
                return;
            }
        };

        for bucket in buckets {
            let candidate = self.bucket_matcher.is_managed(&bucket)
                || self
                    .store
                    .has_keys(&bucket, DATA_PREFIX)
                    .await
                    .unwrap_or(false);
            if !candidate {
                continue;
            }

            let keys = match self.store.list_keys(&bucket, DATA_PREFIX).await {
                Ok(keys) => keys,
                Err(e) if e.is_not_found() => {
                    debug!(bucket = %bucket, "Bucket already gone");
                    continue;
                }
                Err(e) => {
                    warn!(bucket = %bucket, error = %e, "Failed to list bucket data");
                    report.buckets.push(BucketOutcome {
                        bucket_name: bucket,
                        objects_deleted: 0,
                        status: SweepStatus::Error,
                        error: Some(e.to_string()),
                    });
                    continue;
                }
            };

            if keys.is_empty() {
                continue;
            }

            info!(bucket = %bucket, count = keys.len(), "Deleting data objects");
            match self.store.delete_keys(&bucket, &keys).await {
                Ok(()) => {
                    report.buckets.push(BucketOutcome {
                        bucket_name: bucket,
                        objects_deleted: keys.len(),
                        status: SweepStatus::Cleaned,
                        error: None,
                    });
                }
                Err(e) if e.is_not_found() => {
                    debug!(bucket = %bucket, "Bucket vanished during cleanup");
                }
                Err(e) => {
                    warn!(bucket = %bucket, error = %e, "Failed to delete bucket data");
                    report.buckets.push(BucketOutcome {
                        bucket_name: bucket,
                        objects_deleted: 0,
                        status: SweepStatus::Error,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
    }

    /// Delete the template stack and poll until the control plane confirms
    /// completion. Failures are recorded, not propagated; already-deleted
    /// resources stay deleted.
    async fn teardown_stack(&self) -> StackOutcome {
        let outcome = |status, detail: Option<String>| StackOutcome {
            stack_name: self.stack_name.clone(),
            status,
            detail,
        };

        match self.stacks.describe_stack(&self.stack_name).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return outcome(
                    StackSweepStatus::NotFound,
                    Some("stack does not exist".to_string()),
                );
            }
            Err(e) => {
                error!(stack = %self.stack_name, error = %e, "Failed to describe stack");
                return outcome(StackSweepStatus::Error, Some(e.to_string()));
            }
        }

        if let Err(e) = self.stacks.delete_stack(&self.stack_name).await {
            error!(stack = %self.stack_name, error = %e, "Failed to delete stack");
            return outcome(StackSweepStatus::Error, Some(e.to_string()));
        }

        info!(stack = %self.stack_name, "Waiting for stack deletion to complete");
        let wait = WaitConfig::stack_deletion();
        let result = wait_for_status(
            &wait,
            self.cancel.as_ref(),
            MissingIs::Success,
            ResourceStatus::Deleted,
            ResourceStatus::Failed,
            || async {
                Ok(match self.stacks.describe_stack(&self.stack_name).await? {
                    Some(stack) => Probe::Status(stack_deletion_status(&stack.status)),
                    None => Probe::Missing,
                })
            },
            &format!("stack {}", self.stack_name),
        )
        .await;

        match result {
            Ok(()) => outcome(
                StackSweepStatus::Deleted,
                Some("stack deleted successfully".to_string()),
            ),
            Err(e @ WaitError::StatusFailed { .. }) | Err(e @ WaitError::Timeout { .. }) => {
                error!(stack = %self.stack_name, error = %e, "Stack deletion did not complete");
                outcome(StackSweepStatus::Error, Some(e.to_string()))
            }
            Err(e) => outcome(StackSweepStatus::Error, Some(e.to_string())),
        }
    }
}

/// Collapse raw stack statuses onto the deletion lifecycle.
fn stack_deletion_status(raw: &str) -> ResourceStatus {
    match raw {
        "DELETE_COMPLETE" => ResourceStatus::Deleted,
        "DELETE_FAILED" => ResourceStatus::Failed,
        // Anything else is still winding down child resources.
        _ => ResourceStatus::Deleting,
    }
}
