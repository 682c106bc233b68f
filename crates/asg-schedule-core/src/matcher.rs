//! Name-prefix matching for managed autoscaling groups.

use tracing::info;

/// Decides whether a group is managed, based on the configured prefixes.
///
/// Prefixes are trimmed before comparison. Blank prefixes never match, so
/// an empty (or all-blank) prefix list manages nothing.
#[derive(Debug, Clone, Default)]
pub struct PrefixMatcher {
    prefixes: Vec<String>,
}

impl PrefixMatcher {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }

    /// First configured prefix that `name` starts with, in configured order.
    pub fn matching_prefix(&self, name: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .map(|p| p.trim())
            .find(|p| !p.is_empty() && name.starts_with(p))
    }

    /// Whether `name` starts with at least one configured prefix.
    pub fn matches(&self, name: &str) -> bool {
        match self.matching_prefix(name) {
            Some(prefix) => {
                info!(group = %name, %prefix, "group matched prefix");
                true
            }
            None => {
                info!(
                    group = %name,
                    prefixes = %self.prefixes.join(", "),
                    "group did not match any prefix"
                );
                false
            }
        }
    }

    /// True when no non-blank prefix is configured.
    pub fn is_empty(&self) -> bool {
        self.prefixes.iter().all(|p| p.trim().is_empty())
    }
}
