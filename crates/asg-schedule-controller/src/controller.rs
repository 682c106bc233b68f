//! Scale controller: orchestrates list → match → per-group mutation.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use asg_schedule_core::{AutoScalingGroup, CapacityState, PrefixMatcher, ScheduleConfig, tag};

use crate::error::{
    AggregatedError, ControllerError, ProviderError, ProviderResult, ResourceError, ScaleError,
};
use crate::provider::AutoScalingApi;

const DESCRIBE_GROUPS: &str = "DescribeAutoScalingGroups";
const UPDATE_GROUP: &str = "UpdateAutoScalingGroup";
const PUT_TAG: &str = "CreateOrUpdateTags";

/// The two operations a trigger can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleAction {
    Up,
    Down,
}

impl ScaleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScaleAction::Up => "scale-up",
            ScaleAction::Down => "scale-down",
        }
    }
}

impl fmt::Display for ScaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runs scale-down and scale-up passes against an [`AutoScalingApi`].
///
/// Groups are processed sequentially. Each provider call is bounded by
/// `call_timeout` on its own.
pub struct ScaleController<P> {
    api: P,
    matcher: PrefixMatcher,
    call_timeout: Duration,
}

impl<P: AutoScalingApi> ScaleController<P> {
    pub fn new(api: P, config: &ScheduleConfig) -> Self {
        Self::with_matcher(api, config.matcher(), config.call_timeout)
    }

    pub fn with_matcher(api: P, matcher: PrefixMatcher, call_timeout: Duration) -> Self {
        Self {
            api,
            matcher,
            call_timeout,
        }
    }

    /// Run the pass selected by `action`.
    pub async fn run(&self, action: ScaleAction) -> Result<(), ControllerError> {
        match action {
            ScaleAction::Up => self.scale_up().await,
            ScaleAction::Down => self.scale_down().await,
        }
    }

    /// Zero every managed group and record its prior capacity in the
    /// schedule tag.
    ///
    /// The tag is only written once zeroing succeeded; an existing tag is
    /// overwritten with the capacity seen in this pass's listing.
    pub async fn scale_down(&self) -> Result<(), ControllerError> {
        let groups = self.list_groups().await.map_err(ControllerError::List)?;
        let mut outcomes = Vec::with_capacity(groups.len());
        for group in &groups {
            outcomes.push((group.name.as_str(), self.scale_down_group(group).await));
        }
        finish(ScaleAction::Down, outcomes)
    }

    /// Restore every managed group to the capacity in its schedule tag.
    ///
    /// The tag is left in place; the next scale-down overwrites it.
    pub async fn scale_up(&self) -> Result<(), ControllerError> {
        let groups = self.list_groups().await.map_err(ControllerError::List)?;
        let mut outcomes = Vec::with_capacity(groups.len());
        for group in &groups {
            outcomes.push((group.name.as_str(), self.scale_up_group(group).await));
        }
        finish(ScaleAction::Up, outcomes)
    }

    /// List all groups, following continuation tokens, keeping only
    /// managed ones.
    pub async fn list_groups(&self) -> ProviderResult<Vec<AutoScalingGroup>> {
        let mut groups = Vec::new();
        let mut next_token = None;
        loop {
            let page = self
                .call(DESCRIBE_GROUPS, self.api.describe_groups(next_token.take()))
                .await?;
            groups.extend(
                page.groups
                    .into_iter()
                    .filter(|group| self.matcher.matches(&group.name)),
            );
            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => break,
            }
        }
        debug!(matched = groups.len(), "listed autoscaling groups");
        Ok(groups)
    }

    async fn scale_down_group(&self, group: &AutoScalingGroup) -> Result<(), ScaleError> {
        info!(
            group = %group.name,
            desired = group.capacity.desired,
            max = group.capacity.max,
            min = group.capacity.min,
            "scaling down"
        );
        self.call(UPDATE_GROUP, self.api.update_capacity(&group.name, CapacityState::ZERO))
            .await?;

        let assignment = tag::encode(&group.capacity, &group.name);
        info!(group = %group.name, key = %assignment.key, value = %assignment.value, "updating schedule tag");
        self.call(PUT_TAG, self.api.put_tag(&assignment)).await?;
        Ok(())
    }

    async fn scale_up_group(&self, group: &AutoScalingGroup) -> Result<(), ScaleError> {
        let capacity = tag::decode(&group.tags)?;

        info!(
            group = %group.name,
            desired = capacity.desired,
            max = capacity.max,
            min = capacity.min,
            "scaling up"
        );
        self.call(UPDATE_GROUP, self.api.update_capacity(&group.name, capacity))
            .await?;
        Ok(())
    }

    async fn call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = ProviderResult<T>>,
    ) -> ProviderResult<T> {
        tokio::time::timeout(self.call_timeout, fut)
            .await
            .map_err(|_| ProviderError::Timeout {
                operation,
                after: self.call_timeout,
            })?
    }
}

/// Log the pass summary and fold per-group failures into one error.
fn finish(
    action: ScaleAction,
    outcomes: Vec<(&str, Result<(), ScaleError>)>,
) -> Result<(), ControllerError> {
    let matched = outcomes.len();
    let mut errors = Vec::new();

    for (group, outcome) in outcomes {
        if let Err(source) = outcome {
            warn!(%group, %action, error = %source, "group failed");
            errors.push(ResourceError {
                group: group.to_string(),
                source,
            });
        }
    }

    info!(
        %action,
        matched,
        failed = errors.len(),
        "pass finished"
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AggregatedError(errors).into())
    }
}
