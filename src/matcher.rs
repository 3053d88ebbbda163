//! Heuristics for deciding whether a resource belongs to this deployment
//!
//! Discovery has no shared identity scheme across resource kinds, so the
//! sweep falls back to name matching. The predicate is a trait so it can be
//! swapped for tag-based identification without touching the sweep itself.

/// Decides whether a named remote resource is managed by this tool.
pub trait ResourceMatcher: Send + Sync {
    fn is_managed(&self, name: &str) -> bool;
}

/// Case-insensitive substring match against a fixed keyword set.
///
/// Known risk: substring matching over free-text names can catch unrelated
/// resources in a shared account. Kept as the default because the deployment
/// stack does not tag its resources.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Default heuristic for gateway names.
    pub fn gateway_defaults() -> Self {
        Self::new(["mcp", "bedrock"])
    }

    /// Default heuristic for bucket names.
    pub fn bucket_defaults() -> Self {
        Self::new(["mcp"])
    }
}

impl ResourceMatcher for KeywordMatcher {
    fn is_managed(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.keywords.iter().any(|k| name.contains(k))
    }
}
