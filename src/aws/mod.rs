//! AWS-backed implementations of the control-plane facade
//!
//! - agentcore: gateway/target operations + Lambda function lookup
//! - s3: data-object cleanup
//! - cloudformation: template-stack teardown
//! - sts (account): caller identity for the execution role ARN

pub mod account;
pub mod agentcore;
pub mod cloudformation;
pub mod context;
pub mod error;
pub mod s3;

pub use account::{get_current_account_id, AccountId};
pub use agentcore::AgentCoreClient;
pub use cloudformation::CloudFormationClient;
pub use context::AwsContext;
pub use s3::S3Client;
