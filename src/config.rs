//! Gateway configuration loaded from a JSON file

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Immutable creation request for a gateway and its lambda target.
///
/// The issuer/audience pair must resolve to a valid token-verification
/// configuration on the remote side; it is forwarded as-is, never validated
/// locally.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub gateway_name: String,
    pub description: String,
    pub cognito_user_pool_id: String,
    pub cognito_client_id: String,
    pub cognito_domain: String,
    pub lambda_function_arn: String,
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-west-2".to_string()
}

impl GatewayConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
