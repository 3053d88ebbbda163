//! CloudFormation-backed template-stack operations

use crate::aws::context::AwsContext;
use crate::aws::error::classify;
use crate::control_plane::{StackApi, StackDescription};
use crate::error::ControlPlaneError;
use async_trait::async_trait;
use tracing::info;

pub struct CloudFormationClient {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationClient {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.cloudformation_client(),
        }
    }
}

#[async_trait]
impl StackApi for CloudFormationClient {
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> Result<Option<StackDescription>, ControlPlaneError> {
        match self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
        {
            Ok(out) => {
                let Some(stack) = out.stacks().first() else {
                    return Ok(None);
                };
                Ok(Some(StackDescription {
                    name: stack.stack_name().unwrap_or(stack_name).to_string(),
                    status: stack
                        .stack_status()
                        .map(|s| s.as_str().to_string())
                        .unwrap_or_default(),
                    created_at: stack.creation_time().map(|t| t.to_string()),
                }))
            }
            Err(err) => {
                let classified = classify("stack", stack_name, err);
                if classified.is_not_found() {
                    Ok(None)
                } else {
                    Err(classified)
                }
            }
        }
    }

    async fn delete_stack(&self, stack_name: &str) -> Result<(), ControlPlaneError> {
        info!(stack = %stack_name, "Issuing stack delete");
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify("stack", stack_name, e))
    }
}
