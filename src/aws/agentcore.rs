//! Bedrock AgentCore control-plane client
//!
//! Implements the gateway facade over `bedrock-agentcore-control` and the
//! compute-function lookup over Lambda. All status values are mapped
//! through [`ResourceStatus::from_remote`]; "not found" responses surface
//! as `Ok(None)` for reads and `ControlPlaneError::NotFound` for mutations.

use crate::aws::context::AwsContext;
use crate::aws::error::classify;
use crate::control_plane::{
    FunctionDescription, FunctionStore, GatewayApi, GatewayRecord, GatewaySpec, GatewaySummary,
    TargetRecord, TargetSpec, TargetSummary,
};
use crate::error::ControlPlaneError;
use crate::status::ResourceStatus;
use async_trait::async_trait;
use aws_sdk_bedrockagentcorecontrol::types::{
    AuthorizerConfiguration, AuthorizerType, CredentialProviderConfiguration,
    CredentialProviderType, CustomJwtAuthorizerConfiguration, GatewayProtocolType,
    McpLambdaTargetConfiguration, McpTargetConfiguration, SchemaDefinition, SchemaType,
    TargetConfiguration, ToolDefinition, ToolSchema,
};
use tracing::debug;

/// AgentCore control-plane client plus the Lambda lookup it depends on.
pub struct AgentCoreClient {
    client: aws_sdk_bedrockagentcorecontrol::Client,
    lambda: aws_sdk_lambda::Client,
}

impl AgentCoreClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.agentcore_client(),
            lambda: ctx.lambda_client(),
        }
    }
}

fn build_error(err: aws_sdk_bedrockagentcorecontrol::error::BuildError) -> ControlPlaneError {
    ControlPlaneError::Api(Box::new(err))
}

/// Tool schema exposed by the deployed MCP Lambda handler. The handler
/// registers a single no-argument `generate_uuid` tool.
fn uuid_tool() -> Result<ToolDefinition, ControlPlaneError> {
    let input_schema = SchemaDefinition::builder()
        .r#type(SchemaType::Object)
        .build()
        .map_err(build_error)?;

    ToolDefinition::builder()
        .name("generate_uuid")
        .description("Generate a random UUID for unique identifiers")
        .input_schema(input_schema)
        .build()
        .map_err(build_error)
}

#[async_trait]
impl GatewayApi for AgentCoreClient {
    async fn create_gateway(&self, spec: &GatewaySpec) -> Result<GatewayRecord, ControlPlaneError> {
        let authorizer = CustomJwtAuthorizerConfiguration::builder()
            .discovery_url(format!(
                "{}/.well-known/openid-configuration",
                spec.authorizer.issuer
            ))
            .set_allowed_audience(Some(spec.authorizer.audience.clone()))
            .build()
            .map_err(build_error)?;

        let out = self
            .client
            .create_gateway()
            .name(&spec.name)
            .description(&spec.description)
            .role_arn(&spec.role_arn)
            .protocol_type(GatewayProtocolType::Mcp)
            .authorizer_type(AuthorizerType::CustomJwt)
            .authorizer_configuration(AuthorizerConfiguration::CustomJwtAuthorizer(authorizer))
            .send()
            .await
            .map_err(|e| classify("gateway", &spec.name, e))?;

        Ok(GatewayRecord {
            gateway_id: out.gateway_id().to_string(),
            gateway_arn: out.gateway_arn().to_string(),
            gateway_url: out.gateway_url().map(str::to_string),
            name: out.name().to_string(),
            status: ResourceStatus::from_remote(out.status().as_str()),
        })
    }

    async fn get_gateway(
        &self,
        gateway_id: &str,
    ) -> Result<Option<GatewayRecord>, ControlPlaneError> {
        match self
            .client
            .get_gateway()
            .gateway_identifier(gateway_id)
            .send()
            .await
        {
            Ok(out) => Ok(Some(GatewayRecord {
                gateway_id: out.gateway_id().to_string(),
                gateway_arn: out.gateway_arn().to_string(),
                gateway_url: out.gateway_url().map(str::to_string),
                name: out.name().to_string(),
                status: ResourceStatus::from_remote(out.status().as_str()),
            })),
            Err(err) => {
                let classified = classify("gateway", gateway_id, err);
                if classified.is_not_found() {
                    Ok(None)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn list_gateways(&self) -> Result<Vec<GatewaySummary>, ControlPlaneError> {
        let mut gateways = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self.client.list_gateways();
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| classify("gateway", "list", e))?;

            for summary in response.items() {
                gateways.push(GatewaySummary {
                    gateway_id: summary.gateway_id().to_string(),
                    name: summary.name().to_string(),
                    status: ResourceStatus::from_remote(summary.status().as_str()),
                });
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(count = gateways.len(), "Listed gateways");
        Ok(gateways)
    }

    async fn delete_gateway(&self, gateway_id: &str) -> Result<(), ControlPlaneError> {
        self.client
            .delete_gateway()
            .gateway_identifier(gateway_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify("gateway", gateway_id, e))
    }

    async fn create_target(
        &self,
        gateway_id: &str,
        spec: &TargetSpec,
    ) -> Result<TargetRecord, ControlPlaneError> {
        let lambda_config = McpLambdaTargetConfiguration::builder()
            .lambda_arn(&spec.function_arn)
            .tool_schema(ToolSchema::InlinePayload(vec![uuid_tool()?]))
            .build()
            .map_err(build_error)?;

        let credentials = CredentialProviderConfiguration::builder()
            .credential_provider_type(CredentialProviderType::GatewayIamRole)
            .build()
            .map_err(build_error)?;

        let out = self
            .client
            .create_gateway_target()
            .gateway_identifier(gateway_id)
            .name(&spec.name)
            .target_configuration(TargetConfiguration::Mcp(McpTargetConfiguration::Lambda(
                lambda_config,
            )))
            .credential_provider_configurations(credentials)
            .send()
            .await
            .map_err(|e| classify("gateway", gateway_id, e))?;

        Ok(TargetRecord {
            target_id: out.target_id().to_string(),
            // The API reports no target ARN; compose the documented form.
            target_arn: format!("{}/target/{}", out.gateway_arn(), out.target_id()),
            gateway_id: gateway_id.to_string(),
            status: ResourceStatus::from_remote(out.status().as_str()),
        })
    }

    async fn get_target(
        &self,
        gateway_id: &str,
        target_id: &str,
    ) -> Result<Option<TargetRecord>, ControlPlaneError> {
        match self
            .client
            .get_gateway_target()
            .gateway_identifier(gateway_id)
            .target_id(target_id)
            .send()
            .await
        {
            Ok(out) => Ok(Some(TargetRecord {
                target_id: out.target_id().to_string(),
                target_arn: format!("{}/target/{}", out.gateway_arn(), out.target_id()),
                gateway_id: gateway_id.to_string(),
                status: ResourceStatus::from_remote(out.status().as_str()),
            })),
            Err(err) => {
                let classified = classify("target", target_id, err);
                if classified.is_not_found() {
                    Ok(None)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn list_targets(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<TargetSummary>, ControlPlaneError> {
        let mut targets = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .list_gateway_targets()
                .gateway_identifier(gateway_id);
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request
                .send()
                .await
                .map_err(|e| classify("gateway", gateway_id, e))?;

            for summary in response.items() {
                targets.push(TargetSummary {
                    target_id: summary.target_id().to_string(),
                    name: summary.name().to_string(),
                    status: ResourceStatus::from_remote(summary.status().as_str()),
                });
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        debug!(gateway_id = %gateway_id, count = targets.len(), "Listed targets");
        Ok(targets)
    }

    async fn delete_target(
        &self,
        gateway_id: &str,
        target_id: &str,
    ) -> Result<(), ControlPlaneError> {
        self.client
            .delete_gateway_target()
            .gateway_identifier(gateway_id)
            .target_id(target_id)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify("target", target_id, e))
    }
}

#[async_trait]
impl FunctionStore for AgentCoreClient {
    async fn get_function(
        &self,
        name_or_arn: &str,
    ) -> Result<Option<FunctionDescription>, ControlPlaneError> {
        match self
            .lambda
            .get_function()
            .function_name(name_or_arn)
            .send()
            .await
        {
            Ok(out) => {
                let config = out.configuration();
                Ok(Some(FunctionDescription {
                    arn: config
                        .and_then(|c| c.function_arn())
                        .unwrap_or(name_or_arn)
                        .to_string(),
                    name: config
                        .and_then(|c| c.function_name())
                        .unwrap_or_default()
                        .to_string(),
                }))
            }
            Err(err) => {
                let classified = classify("function", name_or_arn, err);
                if classified.is_not_found() {
                    Ok(None)
                } else {
                    Err(classified)
                }
            }
        }
    }
}
