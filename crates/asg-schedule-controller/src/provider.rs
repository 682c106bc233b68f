//! The seam between the controller and a cloud provider.

use std::future::Future;

use asg_schedule_core::{AutoScalingGroup, CapacityState, TagAssignment};

use crate::error::ProviderResult;

/// One page of a group listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPage {
    pub groups: Vec<AutoScalingGroup>,
    /// Continuation token; `None` or an empty string ends the listing.
    pub next_token: Option<String>,
}

/// Autoscaling operations the controller needs from a provider.
///
/// Implementations perform exactly one remote call per method and do not
/// retry; timeouts are applied by the caller.
pub trait AutoScalingApi: Send + Sync {
    /// Fetch one page of groups, starting at `next_token`.
    fn describe_groups(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = ProviderResult<GroupPage>> + Send;

    /// Set desired/max/min capacity of the named group.
    fn update_capacity(
        &self,
        group: &str,
        capacity: CapacityState,
    ) -> impl Future<Output = ProviderResult<()>> + Send;

    /// Create or update a single tag on a group.
    fn put_tag(&self, tag: &TagAssignment) -> impl Future<Output = ProviderResult<()>> + Send;
}
