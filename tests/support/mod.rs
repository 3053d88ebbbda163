//! In-memory control-plane doubles with scripted status transitions.
//!
//! Probe scripts are sticky: once a queue is down to its last entry, that
//! entry repeats forever, so waits converge deterministically.

#![allow(dead_code)]

use agentcore_gateway::control_plane::{
    FunctionDescription, FunctionStore, GatewayApi, GatewayRecord, GatewaySpec, GatewaySummary,
    ObjectStore, StackApi, StackDescription, TargetRecord, TargetSpec, TargetSummary,
};
use agentcore_gateway::error::ControlPlaneError;
use agentcore_gateway::status::ResourceStatus;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// One recorded control-plane invocation, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateGateway(String),
    GetGateway(String),
    ListGateways,
    DeleteGateway(String),
    CreateTarget { gateway_id: String, name: String },
    GetTarget(String),
    ListTargets(String),
    DeleteTarget(String),
    GetFunction(String),
}

/// `None` entries mean the control plane has no record of the resource.
type ProbeScript = VecDeque<Option<ResourceStatus>>;

fn pop_sticky(queue: &mut ProbeScript) -> Option<ResourceStatus> {
    if queue.len() > 1 {
        queue.pop_front().unwrap_or(None)
    } else {
        queue.front().copied().flatten()
    }
}

#[derive(Default)]
pub struct ControlPlaneState {
    pub calls: Vec<Call>,
    pub created_spec: Option<GatewaySpec>,
    pub gateway_probes: HashMap<String, ProbeScript>,
    pub target_probes: HashMap<String, ProbeScript>,
    pub gateways: Vec<GatewaySummary>,
    pub targets: Vec<TargetSummary>,
    /// Gateway ids the control plane reports as NotFound on mutation.
    pub absent_gateways: HashSet<String>,
    /// Gateway ids whose delete fails with a generic API error.
    pub failing_deletes: HashSet<String>,
    /// When set, `list_gateways` fails with a generic API error.
    pub fail_list: bool,
    pub function: Option<FunctionDescription>,
}

#[derive(Clone, Default)]
pub struct MockControlPlane {
    pub state: Arc<Mutex<ControlPlaneState>>,
}

impl MockControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn created_spec(&self) -> Option<GatewaySpec> {
        self.state.lock().unwrap().created_spec.clone()
    }

    /// Script the sequence of `get_gateway` observations for one gateway.
    pub fn script_gateway(&self, gateway_id: &str, probes: Vec<Option<ResourceStatus>>) {
        self.state
            .lock()
            .unwrap()
            .gateway_probes
            .insert(gateway_id.to_string(), probes.into());
    }

    /// Script the sequence of `get_target` observations for one target.
    pub fn script_target(&self, target_id: &str, probes: Vec<Option<ResourceStatus>>) {
        self.state
            .lock()
            .unwrap()
            .target_probes
            .insert(target_id.to_string(), probes.into());
    }

    pub fn add_gateway(&self, gateway_id: &str, name: &str, status: ResourceStatus) {
        self.state.lock().unwrap().gateways.push(GatewaySummary {
            gateway_id: gateway_id.to_string(),
            name: name.to_string(),
            status,
        });
    }

    pub fn add_target(&self, target_id: &str, name: &str) {
        self.state.lock().unwrap().targets.push(TargetSummary {
            target_id: target_id.to_string(),
            name: name.to_string(),
            status: ResourceStatus::Active,
        });
    }

    pub fn set_function(&self, arn: &str, name: &str) {
        self.state.lock().unwrap().function = Some(FunctionDescription {
            arn: arn.to_string(),
            name: name.to_string(),
        });
    }

    pub fn mark_absent(&self, gateway_id: &str) {
        self.state
            .lock()
            .unwrap()
            .absent_gateways
            .insert(gateway_id.to_string());
    }

    pub fn fail_delete(&self, gateway_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_deletes
            .insert(gateway_id.to_string());
    }
}

fn api_error(message: &str) -> ControlPlaneError {
    ControlPlaneError::from(anyhow::anyhow!("{message}"))
}

#[async_trait]
impl GatewayApi for MockControlPlane {
    async fn create_gateway(&self, spec: &GatewaySpec) -> Result<GatewayRecord, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateGateway(spec.name.clone()));
        state.created_spec = Some(spec.clone());
        Ok(GatewayRecord {
            gateway_id: "gw-1".to_string(),
            gateway_arn: "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/gw-1"
                .to_string(),
            gateway_url: None,
            name: spec.name.clone(),
            status: ResourceStatus::Creating,
        })
    }

    async fn get_gateway(
        &self,
        gateway_id: &str,
    ) -> Result<Option<GatewayRecord>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetGateway(gateway_id.to_string()));

        let status = match state.gateway_probes.get_mut(gateway_id) {
            Some(queue) => pop_sticky(queue),
            None => None,
        };
        let name = state
            .gateways
            .iter()
            .find(|g| g.gateway_id == gateway_id)
            .map(|g| g.name.clone())
            .unwrap_or_else(|| "mcp-demo-gateway".to_string());

        Ok(status.map(|status| GatewayRecord {
            gateway_id: gateway_id.to_string(),
            gateway_arn: format!(
                "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/{gateway_id}"
            ),
            gateway_url: Some(format!("https://{gateway_id}.gateway.example.com/mcp")),
            name,
            status,
        }))
    }

    async fn list_gateways(&self) -> Result<Vec<GatewaySummary>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListGateways);
        if state.fail_list {
            return Err(api_error("list gateways failed"));
        }
        Ok(state.gateways.clone())
    }

    async fn delete_gateway(&self, gateway_id: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteGateway(gateway_id.to_string()));

        if state.absent_gateways.contains(gateway_id) {
            return Err(ControlPlaneError::not_found("gateway", gateway_id));
        }
        if state.failing_deletes.contains(gateway_id) {
            return Err(api_error("internal control plane failure"));
        }
        Ok(())
    }

    async fn create_target(
        &self,
        gateway_id: &str,
        spec: &TargetSpec,
    ) -> Result<TargetRecord, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateTarget {
            gateway_id: gateway_id.to_string(),
            name: spec.name.clone(),
        });
        Ok(TargetRecord {
            target_id: "tgt-1".to_string(),
            target_arn: format!(
                "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/{gateway_id}/target/tgt-1"
            ),
            gateway_id: gateway_id.to_string(),
            status: ResourceStatus::Creating,
        })
    }

    async fn get_target(
        &self,
        gateway_id: &str,
        target_id: &str,
    ) -> Result<Option<TargetRecord>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetTarget(target_id.to_string()));

        let status = match state.target_probes.get_mut(target_id) {
            Some(queue) => pop_sticky(queue),
            None => None,
        };

        Ok(status.map(|status| TargetRecord {
            target_id: target_id.to_string(),
            target_arn: format!(
                "arn:aws:bedrock-agentcore:us-west-2:123456789012:gateway/{gateway_id}/target/{target_id}"
            ),
            gateway_id: gateway_id.to_string(),
            status,
        }))
    }

    async fn list_targets(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<TargetSummary>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListTargets(gateway_id.to_string()));

        if state.absent_gateways.contains(gateway_id) {
            return Err(ControlPlaneError::not_found("gateway", gateway_id));
        }
        Ok(state.targets.clone())
    }

    async fn delete_target(
        &self,
        _gateway_id: &str,
        target_id: &str,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteTarget(target_id.to_string()));
        state.targets.retain(|t| t.target_id != target_id);
        Ok(())
    }
}

#[async_trait]
impl FunctionStore for MockControlPlane {
    async fn get_function(
        &self,
        name_or_arn: &str,
    ) -> Result<Option<FunctionDescription>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::GetFunction(name_or_arn.to_string()));
        Ok(state.function.clone())
    }
}

#[derive(Default)]
pub struct ObjectStoreState {
    pub buckets: Vec<String>,
    /// Live keys per bucket; delete_keys removes from here.
    pub objects: HashMap<String, Vec<String>>,
    /// Buckets that vanish between listing and inspection.
    pub missing_buckets: HashSet<String>,
    pub failing_deletes: HashSet<String>,
}

#[derive(Clone, Default)]
pub struct MockObjectStore {
    pub state: Arc<Mutex<ObjectStoreState>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_bucket(&self, name: &str, keys: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.buckets.push(name.to_string());
        state
            .objects
            .insert(name.to_string(), keys.iter().map(|k| k.to_string()).collect());
    }

    pub fn mark_missing(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .missing_buckets
            .insert(name.to_string());
    }

    pub fn remaining_keys(&self, bucket: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(bucket)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn list_buckets(&self) -> Result<Vec<String>, ControlPlaneError> {
        Ok(self.state.lock().unwrap().buckets.clone())
    }

    async fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, ControlPlaneError> {
        let state = self.state.lock().unwrap();
        if state.missing_buckets.contains(bucket) {
            return Err(ControlPlaneError::not_found("bucket", bucket));
        }
        Ok(state
            .objects
            .get(bucket)
            .map(|keys| {
                keys.iter()
                    .filter(|k| k.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn has_keys(&self, bucket: &str, prefix: &str) -> Result<bool, ControlPlaneError> {
        let state = self.state.lock().unwrap();
        if state.missing_buckets.contains(bucket) {
            return Err(ControlPlaneError::not_found("bucket", bucket));
        }
        Ok(state
            .objects
            .get(bucket)
            .is_some_and(|keys| keys.iter().any(|k| k.starts_with(prefix))))
    }

    async fn delete_keys(&self, bucket: &str, keys: &[String]) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        if state.missing_buckets.contains(bucket) {
            return Err(ControlPlaneError::not_found("bucket", bucket));
        }
        if state.failing_deletes.contains(bucket) {
            return Err(api_error("delete objects failed"));
        }
        if let Some(live) = state.objects.get_mut(bucket) {
            live.retain(|k| !keys.contains(k));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct StackState {
    /// Scripted `describe_stack` observations, sticky on the last entry.
    pub describes: VecDeque<Option<StackDescription>>,
    pub describe_calls: u32,
    pub delete_calls: u32,
    pub fail_delete: bool,
}

#[derive(Clone, Default)]
pub struct MockStackApi {
    pub state: Arc<Mutex<StackState>>,
}

impl MockStackApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_describe(&self, observations: Vec<Option<StackDescription>>) {
        self.state.lock().unwrap().describes = observations.into();
    }

    pub fn delete_calls(&self) -> u32 {
        self.state.lock().unwrap().delete_calls
    }
}

/// Shorthand for a scripted stack observation.
pub fn stack(name: &str, status: &str) -> StackDescription {
    StackDescription {
        name: name.to_string(),
        status: status.to_string(),
        created_at: None,
    }
}

#[async_trait]
impl StackApi for MockStackApi {
    async fn describe_stack(
        &self,
        _stack_name: &str,
    ) -> Result<Option<StackDescription>, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.describe_calls += 1;
        let observation = if state.describes.len() > 1 {
            state.describes.pop_front().unwrap_or(None)
        } else {
            state.describes.front().cloned().unwrap_or(None)
        };
        Ok(observation)
    }

    async fn delete_stack(&self, _stack_name: &str) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        if state.fail_delete {
            return Err(api_error("stack delete failed"));
        }
        Ok(())
    }
}
