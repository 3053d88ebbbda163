//! Lifecycle status shared by gateways and targets

use serde::Serialize;

/// Remote lifecycle status of a gateway or gateway target.
///
/// The control plane is the sole source of truth for this value; it is
/// re-fetched on every poll and never cached across operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    Creating,
    Active,
    Failed,
    Deleting,
    Deleted,
    NotFound,
}

impl ResourceStatus {
    /// Map a raw control-plane status string onto the lifecycle states the
    /// orchestrator cares about.
    ///
    /// Unknown in-between states (e.g. `UPDATING`) are treated as
    /// non-terminal so waits keep polling until the budget runs out.
    pub fn from_remote(raw: &str) -> Self {
        match raw {
            "ACTIVE" | "READY" => ResourceStatus::Active,
            "FAILED" | "UPDATE_UNSUCCESSFUL" => ResourceStatus::Failed,
            "DELETING" => ResourceStatus::Deleting,
            "DELETED" => ResourceStatus::Deleted,
            _ => ResourceStatus::Creating,
        }
    }

    /// Terminal states never transition further on their own.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResourceStatus::Active
                | ResourceStatus::Failed
                | ResourceStatus::Deleted
                | ResourceStatus::NotFound
        )
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceStatus::Creating => "CREATING",
            ResourceStatus::Active => "ACTIVE",
            ResourceStatus::Failed => "FAILED",
            ResourceStatus::Deleting => "DELETING",
            ResourceStatus::Deleted => "DELETED",
            ResourceStatus::NotFound => "NOT_FOUND",
        };
        f.write_str(s)
    }
}
