//! Facade traits over the remote control plane
//!
//! The orchestrator and cleanup sweep only ever talk to these seams. The
//! `aws` module provides the real SDK-backed implementations; tests provide
//! in-memory doubles that script status transitions and record call order.

use crate::error::ControlPlaneError;
use crate::status::ResourceStatus;
use async_trait::async_trait;
use serde::Serialize;

/// JWT authorizer settings forwarded verbatim to the control plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayAuthorizer {
    /// Token issuer URL (identity-provider base URL + pool id)
    pub issuer: String,
    /// Accepted audience values (OAuth client ids)
    pub audience: Vec<String>,
}

/// Creation request for a gateway.
#[derive(Debug, Clone)]
pub struct GatewaySpec {
    pub name: String,
    pub description: String,
    pub authorizer: GatewayAuthorizer,
    pub role_arn: String,
}

/// Full view of a gateway as the control plane reports it.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRecord {
    pub gateway_id: String,
    pub gateway_arn: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,
    pub name: String,
    pub status: ResourceStatus,
}

/// Listing entry for a gateway.
#[derive(Debug, Clone, Serialize)]
pub struct GatewaySummary {
    pub gateway_id: String,
    pub name: String,
    pub status: ResourceStatus,
}

/// Creation request for a gateway target.
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub name: String,
    pub function_arn: String,
}

/// Full view of a gateway target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetRecord {
    pub target_id: String,
    pub target_arn: String,
    pub gateway_id: String,
    pub status: ResourceStatus,
}

/// Listing entry for a gateway target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetSummary {
    pub target_id: String,
    pub name: String,
    pub status: ResourceStatus,
}

/// A deployed compute function a target can bind to.
#[derive(Debug, Clone)]
pub struct FunctionDescription {
    pub arn: String,
    pub name: String,
}

/// Current state of an infrastructure template stack.
#[derive(Debug, Clone, Serialize)]
pub struct StackDescription {
    pub name: String,
    /// Raw stack status string (e.g. `CREATE_COMPLETE`, `DELETE_IN_PROGRESS`)
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Gateway and gateway-target operations.
///
/// `get_*` calls distinguish "not found" by returning `Ok(None)` so waits
/// can treat absence per-phase; mutating calls surface absence as
/// `ControlPlaneError::NotFound` and leave the interpretation to the caller.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    async fn create_gateway(&self, spec: &GatewaySpec) -> Result<GatewayRecord, ControlPlaneError>;

    async fn get_gateway(
        &self,
        gateway_id: &str,
    ) -> Result<Option<GatewayRecord>, ControlPlaneError>;

    async fn list_gateways(&self) -> Result<Vec<GatewaySummary>, ControlPlaneError>;

    async fn delete_gateway(&self, gateway_id: &str) -> Result<(), ControlPlaneError>;

    async fn create_target(
        &self,
        gateway_id: &str,
        spec: &TargetSpec,
    ) -> Result<TargetRecord, ControlPlaneError>;

    async fn get_target(
        &self,
        gateway_id: &str,
        target_id: &str,
    ) -> Result<Option<TargetRecord>, ControlPlaneError>;

    async fn list_targets(&self, gateway_id: &str)
        -> Result<Vec<TargetSummary>, ControlPlaneError>;

    async fn delete_target(
        &self,
        gateway_id: &str,
        target_id: &str,
    ) -> Result<(), ControlPlaneError>;
}

/// Lookup of pre-deployed compute functions.
#[async_trait]
pub trait FunctionStore: Send + Sync {
    /// Describe a function by name or ARN; `Ok(None)` if it does not exist.
    async fn get_function(
        &self,
        name_or_arn: &str,
    ) -> Result<Option<FunctionDescription>, ControlPlaneError>;
}

/// Bucket and object operations used by the cleanup sweep.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list_buckets(&self) -> Result<Vec<String>, ControlPlaneError>;

    /// All keys under `prefix` in `bucket`.
    async fn list_keys(&self, bucket: &str, prefix: &str)
        -> Result<Vec<String>, ControlPlaneError>;

    /// Cheap probe: does `bucket` hold at least one key under `prefix`?
    async fn has_keys(&self, bucket: &str, prefix: &str) -> Result<bool, ControlPlaneError>;

    async fn delete_keys(&self, bucket: &str, keys: &[String]) -> Result<(), ControlPlaneError>;
}

/// Infrastructure template-stack operations.
#[async_trait]
pub trait StackApi: Send + Sync {
    /// Describe a stack; `Ok(None)` if it does not exist.
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> Result<Option<StackDescription>, ControlPlaneError>;

    async fn delete_stack(&self, stack_name: &str) -> Result<(), ControlPlaneError>;
}
