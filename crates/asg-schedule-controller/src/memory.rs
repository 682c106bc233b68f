//! In-memory autoscaling provider.
//!
//! Holds groups in a `BTreeMap` (listed in name order), applies capacity
//! updates and tag writes to them, and records every call. Failures and
//! latency can be injected per group or per call, which is what the
//! controller tests are built on.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use asg_schedule_core::{AutoScalingGroup, CapacityState, TagAssignment};

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{AutoScalingApi, GroupPage};

/// A provider call, as recorded by [`InMemoryAutoScaling`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    DescribeGroups { next_token: Option<String> },
    UpdateCapacity { group: String, capacity: CapacityState },
    PutTag(TagAssignment),
}

#[derive(Default)]
struct Inner {
    groups: BTreeMap<String, AutoScalingGroup>,
    page_size: Option<usize>,
    failing_updates: HashSet<String>,
    failing_tags: HashSet<String>,
    failing_listing: bool,
    latency: Option<Duration>,
    slow_updates: HashMap<String, Duration>,
    slow_tags: HashMap<String, Duration>,
    calls: Vec<ApiCall>,
}

/// Shared, cloneable in-memory provider.
#[derive(Clone, Default)]
pub struct InMemoryAutoScaling {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryAutoScaling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split listings into pages of `size` groups.
    pub fn with_page_size(self, size: usize) -> Self {
        self.lock().page_size = Some(size.max(1));
        self
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    /// Add or replace a group.
    pub fn insert(&self, group: AutoScalingGroup) {
        self.lock().groups.insert(group.name.clone(), group);
    }

    /// Current state of a group.
    pub fn group(&self, name: &str) -> Option<AutoScalingGroup> {
        self.lock().groups.get(name).cloned()
    }

    /// Make capacity updates for `name` fail.
    pub fn fail_updates_for(&self, name: &str) {
        self.lock().failing_updates.insert(name.to_string());
    }

    /// Make tag writes for `name` fail.
    pub fn fail_tags_for(&self, name: &str) {
        self.lock().failing_tags.insert(name.to_string());
    }

    /// Make every listing call fail.
    pub fn fail_listing(&self) {
        self.lock().failing_listing = true;
    }

    /// Delay capacity updates for `name` by `latency`.
    pub fn delay_updates_for(&self, name: &str, latency: Duration) {
        self.lock().slow_updates.insert(name.to_string(), latency);
    }

    /// Delay tag writes for `name` by `latency`.
    pub fn delay_tags_for(&self, name: &str, latency: Duration) {
        self.lock().slow_tags.insert(name.to_string(), latency);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|c| matches!(c, ApiCall::DescribeGroups { .. }))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    async fn delay_group(&self, slow: impl FnOnce(&Inner) -> Option<Duration>) {
        let latency = slow(&self.lock());
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn page(&self, next_token: Option<String>) -> ProviderResult<GroupPage> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::DescribeGroups {
            next_token: next_token.clone(),
        });
        if inner.failing_listing {
            return Err(ProviderError::Api {
                operation: "DescribeAutoScalingGroups",
                message: "injected listing failure".to_string(),
            });
        }

        let start = match next_token.as_deref() {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| ProviderError::Api {
                operation: "DescribeAutoScalingGroups",
                message: format!("invalid next token {token:?}"),
            })?,
        };
        let size = inner.page_size.unwrap_or(usize::MAX);
        let groups: Vec<_> = inner.groups.values().skip(start).take(size).cloned().collect();
        let end = start + groups.len();
        let next_token = (end < inner.groups.len()).then(|| end.to_string());

        Ok(GroupPage { groups, next_token })
    }

    fn apply_capacity(&self, group: &str, capacity: CapacityState) -> ProviderResult<()> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::UpdateCapacity {
            group: group.to_string(),
            capacity,
        });
        if inner.failing_updates.contains(group) {
            return Err(ProviderError::Api {
                operation: "UpdateAutoScalingGroup",
                message: format!("injected update failure for {group}"),
            });
        }
        let entry = inner
            .groups
            .get_mut(group)
            .ok_or_else(|| ProviderError::NotFound(group.to_string()))?;
        entry.capacity = capacity;
        Ok(())
    }

    fn apply_tag(&self, tag: &TagAssignment) -> ProviderResult<()> {
        let mut inner = self.lock();
        inner.calls.push(ApiCall::PutTag(tag.clone()));
        if inner.failing_tags.contains(&tag.resource_id) {
            return Err(ProviderError::Api {
                operation: "CreateOrUpdateTags",
                message: format!("injected tag failure for {}", tag.resource_id),
            });
        }
        let entry = inner
            .groups
            .get_mut(&tag.resource_id)
            .ok_or_else(|| ProviderError::NotFound(tag.resource_id.clone()))?;
        entry.tags.insert(tag.key.clone(), tag.value.clone());
        Ok(())
    }
}

impl AutoScalingApi for InMemoryAutoScaling {
    async fn describe_groups(&self, next_token: Option<String>) -> ProviderResult<GroupPage> {
        self.delay().await;
        self.page(next_token)
    }

    async fn update_capacity(&self, group: &str, capacity: CapacityState) -> ProviderResult<()> {
        self.delay().await;
        self.delay_group(|inner| inner.slow_updates.get(group).copied())
            .await;
        self.apply_capacity(group, capacity)
    }

    async fn put_tag(&self, tag: &TagAssignment) -> ProviderResult<()> {
        self.delay().await;
        self.delay_group(|inner| inner.slow_tags.get(&tag.resource_id).copied())
            .await;
        self.apply_tag(tag)
    }
}
