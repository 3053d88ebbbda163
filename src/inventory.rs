//! Read-only inventory of managed resources
//!
//! Mirrors the cleanup sweep's discovery heuristics without mutating
//! anything, for status reporting ahead of (or instead of) a sweep.

use crate::cleanup::DATA_PREFIX;
use crate::control_plane::{GatewayApi, ObjectStore, StackApi, StackDescription};
use crate::matcher::ResourceMatcher;
use crate::status::ResourceStatus;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct GatewayInventoryEntry {
    pub id: String,
    pub name: String,
    pub status: ResourceStatus,
}

#[derive(Debug, Default, Serialize)]
pub struct ResourceInventory {
    pub gateways: Vec<GatewayInventoryEntry>,
    /// Buckets holding data under the managed prefix, or matching by name
    pub data_buckets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackDescription>,
}

/// Collect the current inventory. Read failures are logged and leave the
/// corresponding section empty rather than aborting the report.
pub async fn take_inventory<C, S, K>(
    control: &C,
    store: &S,
    stacks: &K,
    stack_name: &str,
    gateway_matcher: &dyn ResourceMatcher,
    bucket_matcher: &dyn ResourceMatcher,
) -> ResourceInventory
where
    C: GatewayApi,
    S: ObjectStore,
    K: StackApi,
{
    let mut inventory = ResourceInventory::default();

    match control.list_gateways().await {
        Ok(gateways) => {
            inventory.gateways = gateways
                .into_iter()
                .filter(|g| gateway_matcher.is_managed(&g.name))
                .map(|g| GatewayInventoryEntry {
                    id: g.gateway_id,
                    name: g.name,
                    status: g.status,
                })
                .collect();
        }
        Err(e) => warn!(error = %e, "Failed to list gateways"),
    }

    match store.list_buckets().await {
        Ok(buckets) => {
            for bucket in buckets {
                let candidate = bucket_matcher.is_managed(&bucket)
                    || store.has_keys(&bucket, DATA_PREFIX).await.unwrap_or(false);
                if candidate {
                    inventory.data_buckets.push(bucket);
                }
            }
        }
        Err(e) => warn!(error = %e, "Failed to list buckets"),
    }

    match stacks.describe_stack(stack_name).await {
        Ok(stack) => inventory.stack = stack,
        Err(e) => warn!(stack = %stack_name, error = %e, "Failed to describe stack"),
    }

    inventory
}
