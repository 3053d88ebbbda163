//! agentcore-gateway: lifecycle orchestration for Bedrock AgentCore gateways
//!
//! Provisions a gateway with a Cognito JWT authorizer and a Lambda-backed
//! MCP target, polls the eventually-consistent control plane through state
//! transitions, and provides a best-effort cleanup sweep across gateways,
//! S3 data, and the backing CloudFormation stack.

pub mod aws;
pub mod cleanup;
pub mod config;
pub mod control_plane;
pub mod error;
pub mod inventory;
pub mod matcher;
pub mod orchestrator;
pub mod status;
pub mod wait;
