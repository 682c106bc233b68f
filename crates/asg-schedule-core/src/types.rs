//! Domain types for autoscaling groups and their schedule tag.

use std::collections::HashMap;

/// Tag key holding the encoded pre-scale-down capacity.
pub const SCHEDULE_TAG_KEY: &str = "asg-schedule";

/// Resource type the schedule tag is attached to.
pub const GROUP_RESOURCE_TYPE: &str = "auto-scaling-group";

/// Desired/max/min sizing of an autoscaling group at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapacityState {
    pub desired: i32,
    pub max: i32,
    pub min: i32,
}

impl CapacityState {
    /// A fully suspended group.
    pub const ZERO: CapacityState = CapacityState {
        desired: 0,
        max: 0,
        min: 0,
    };

    pub fn new(desired: i32, max: i32, min: i32) -> Self {
        Self { desired, max, min }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Tags attached to an autoscaling group (key → value, order irrelevant).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(HashMap<String, String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert or replace a tag, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Tags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Tags(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// One autoscaling group as reported by the provider's listing.
///
/// Built fresh on every listing and dropped after the pass that used it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoScalingGroup {
    /// Group name, unique per account and region.
    pub name: String,
    /// Opaque provider identifier (an ARN on AWS).
    pub arn: String,
    /// Capacity at listing time.
    pub capacity: CapacityState,
    pub tags: Tags,
}

/// A create-or-update tag request scoped to a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAssignment {
    pub key: String,
    pub value: String,
    /// Group name the tag is written to.
    pub resource_id: String,
    pub resource_type: String,
    /// Whether instances launched by the group inherit the tag.
    pub propagate_at_launch: bool,
}
