//! Gateway lifecycle orchestration
//!
//! Sequences the create/wait/delete/wait state machine for a gateway and its
//! lambda targets:
//!
//! ```text
//! absent --create--> creating --[poll]--> active
//! creating --[poll FAILED]--> failed (terminal)
//! creating --[poll timeout]--> timeout (terminal)
//! active --create target--> target:creating --[poll]--> target:active
//! any state --delete--> deleting --[poll]--> deleted
//! ```
//!
//! A gateway delete is never issued while any of its targets still exist;
//! each target's disappearance is confirmed before the parent delete.

use crate::aws::account::AccountId;
use crate::config::GatewayConfig;
use crate::control_plane::{
    FunctionStore, GatewayApi, GatewayAuthorizer, GatewayRecord, GatewaySpec, GatewaySummary,
    TargetSpec,
};
use crate::error::{ControlPlaneError, LifecycleError};
use crate::status::ResourceStatus;
use crate::wait::{wait_for_status, MissingIs, Probe, WaitConfig};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// IAM role the gateway assumes to invoke its targets. Provisioned by the
/// template stack; referenced here by convention.
const GATEWAY_ROLE_NAME: &str = "BedrockAgentCoreGatewayRole";

/// Identifier view of a provisioned gateway, returned once it is active.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayHandle {
    pub gateway_id: String,
    pub gateway_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,
    pub status: ResourceStatus,
}

/// Identifier view of a provisioned gateway target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetHandle {
    pub target_id: String,
    pub target_arn: String,
    pub gateway_id: String,
    pub status: ResourceStatus,
}

/// Drives gateway and target lifecycles against the control-plane facade.
pub struct GatewayOrchestrator<C> {
    control: C,
    account: AccountId,
    wait: WaitConfig,
    cancel: Option<CancellationToken>,
}

impl<C> GatewayOrchestrator<C>
where
    C: GatewayApi + FunctionStore,
{
    pub fn new(control: C, account: AccountId) -> Self {
        Self {
            control,
            account,
            wait: WaitConfig::default(),
            cancel: None,
        }
    }

    pub fn with_wait_config(mut self, wait: WaitConfig) -> Self {
        self.wait = wait;
        self
    }

    /// Wire a cancellation token through every poll wait so callers can
    /// abort long convergence loops.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Create a gateway and block until the control plane reports it active.
    ///
    /// The issuer/audience pair from `config` is embedded verbatim in the
    /// authorizer; the execution role is derived from the caller's account.
    pub async fn create_gateway(
        &self,
        config: &GatewayConfig,
    ) -> Result<GatewayHandle, LifecycleError> {
        let spec = GatewaySpec {
            name: config.gateway_name.clone(),
            description: config.description.clone(),
            authorizer: GatewayAuthorizer {
                issuer: format!(
                    "https://cognito-idp.{}.amazonaws.com/{}",
                    config.region, config.cognito_user_pool_id
                ),
                audience: vec![config.cognito_client_id.clone()],
            },
            role_arn: format!("arn:aws:iam::{}:role/{}", self.account, GATEWAY_ROLE_NAME),
        };

        info!(gateway_name = %spec.name, "Creating gateway");
        let created = self.control.create_gateway(&spec).await?;
        let gateway_id = created.gateway_id.clone();
        info!(gateway_id = %gateway_id, "Gateway created, waiting for ACTIVE");

        self.wait_gateway(&gateway_id, MissingIs::Transient, ResourceStatus::Active)
            .await
            .map_err(|e| LifecycleError::from_wait("gateway", &gateway_id, e))?;

        // Status is authoritative only on the remote side, so re-fetch
        // instead of patching the creation response.
        let record = self.fetch_gateway(&gateway_id).await?;
        info!(gateway_id = %gateway_id, "Gateway is active");

        Ok(GatewayHandle {
            gateway_id: record.gateway_id,
            gateway_arn: record.gateway_arn,
            gateway_url: record.gateway_url,
            status: record.status,
        })
    }

    /// Attach the configured lambda function as a target and block until it
    /// is active.
    ///
    /// The function must already be deployed; its absence is fatal for this
    /// operation.
    pub async fn add_lambda_target(
        &self,
        gateway_id: &str,
        config: &GatewayConfig,
    ) -> Result<TargetHandle, LifecycleError> {
        let function = self
            .control
            .get_function(&config.lambda_function_arn)
            .await?
            .ok_or_else(|| LifecycleError::DependencyNotFound {
                function: config.lambda_function_arn.clone(),
            })?;

        let spec = TargetSpec {
            name: format!("{}-lambda-target", config.gateway_name),
            function_arn: function.arn,
        };

        info!(gateway_id = %gateway_id, target_name = %spec.name, "Creating lambda target");
        let created = self.control.create_target(gateway_id, &spec).await?;
        let target_id = created.target_id.clone();
        info!(target_id = %target_id, "Target created, waiting for ACTIVE");

        self.wait_target(
            gateway_id,
            &target_id,
            MissingIs::Transient,
            ResourceStatus::Active,
        )
        .await
        .map_err(|e| LifecycleError::from_wait("target", &target_id, e))?;

        let record = self
            .control
            .get_target(gateway_id, &target_id)
            .await?
            .ok_or_else(|| ControlPlaneError::not_found("target", &target_id))?;
        info!(target_id = %target_id, "Target is active");

        Ok(TargetHandle {
            target_id: record.target_id,
            target_arn: record.target_arn,
            gateway_id: gateway_id.to_string(),
            status: record.status,
        })
    }

    /// Delete a gateway and all of its targets, children first.
    ///
    /// Each target delete is confirmed absent before the next step; only
    /// after the last target is gone is the gateway delete issued. Deleting
    /// an already-absent gateway is success.
    pub async fn delete_gateway(&self, gateway_id: &str) -> Result<(), LifecycleError> {
        info!(gateway_id = %gateway_id, "Deleting gateway");

        let targets = match self.control.list_targets(gateway_id).await {
            Ok(targets) => targets,
            Err(e) if e.is_not_found() => {
                info!(gateway_id = %gateway_id, "Gateway already absent");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        for target in targets {
            info!(target_id = %target.target_id, "Deleting target");
            match self.control.delete_target(gateway_id, &target.target_id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
            self.wait_target(
                gateway_id,
                &target.target_id,
                MissingIs::Success,
                ResourceStatus::Deleted,
            )
            .await
            .map_err(|e| LifecycleError::from_wait("target", &target.target_id, e))?;
            info!(target_id = %target.target_id, "Target deleted");
        }

        match self.control.delete_gateway(gateway_id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                info!(gateway_id = %gateway_id, "Gateway already absent");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        self.wait_gateway(gateway_id, MissingIs::Success, ResourceStatus::Deleted)
            .await
            .map_err(|e| LifecycleError::from_wait("gateway", gateway_id, e))?;

        info!(gateway_id = %gateway_id, "Gateway deleted");
        Ok(())
    }

    /// Current gateway record, or `None` if it does not exist. No waiting.
    pub async fn gateway_info(
        &self,
        gateway_id: &str,
    ) -> Result<Option<GatewayRecord>, LifecycleError> {
        Ok(self.control.get_gateway(gateway_id).await?)
    }

    /// All gateways visible to the caller. No waiting.
    pub async fn list_gateways(&self) -> Result<Vec<GatewaySummary>, LifecycleError> {
        Ok(self.control.list_gateways().await?)
    }

    async fn fetch_gateway(&self, gateway_id: &str) -> Result<GatewayRecord, LifecycleError> {
        Ok(self
            .control
            .get_gateway(gateway_id)
            .await?
            .ok_or_else(|| ControlPlaneError::not_found("gateway", gateway_id))?)
    }

    async fn wait_gateway(
        &self,
        gateway_id: &str,
        missing: MissingIs,
        success: ResourceStatus,
    ) -> Result<(), crate::error::WaitError> {
        wait_for_status(
            &self.wait,
            self.cancel.as_ref(),
            missing,
            success,
            ResourceStatus::Failed,
            || async {
                Ok(match self.control.get_gateway(gateway_id).await? {
                    Some(record) => Probe::Status(record.status),
                    None => Probe::Missing,
                })
            },
            &format!("gateway {gateway_id}"),
        )
        .await
    }

    async fn wait_target(
        &self,
        gateway_id: &str,
        target_id: &str,
        missing: MissingIs,
        success: ResourceStatus,
    ) -> Result<(), crate::error::WaitError> {
        wait_for_status(
            &self.wait,
            self.cancel.as_ref(),
            missing,
            success,
            ResourceStatus::Failed,
            || async {
                Ok(match self.control.get_target(gateway_id, target_id).await? {
                    Some(record) => Probe::Status(record.status),
                    None => Probe::Missing,
                })
            },
            &format!("target {target_id}"),
        )
        .await
    }
}
