//! asg-schedule-aws: Amazon EC2 Auto Scaling provider.
//!
//! Implements [`AutoScalingApi`] with one SDK call per method:
//!
//! | Method | API |
//! |---|---|
//! | `describe_groups` | `DescribeAutoScalingGroups` |
//! | `update_capacity` | `UpdateAutoScalingGroup` |
//! | `put_tag` | `CreateOrUpdateTags` |
//!
//! Credentials and region come from the default provider chain (Lambda
//! execution role, environment, profile).

use aws_config::BehaviorVersion;
use aws_sdk_autoscaling::Client;
use aws_sdk_autoscaling::error::DisplayErrorContext;
use aws_sdk_autoscaling::types::{self, Tag, TagDescription};
use tracing::debug;

use asg_schedule_controller::{AutoScalingApi, GroupPage, ProviderError, ProviderResult};
use asg_schedule_core::{AutoScalingGroup, CapacityState, TagAssignment, Tags};

/// Auto Scaling client scoped to the region of the loaded AWS config.
#[derive(Clone, Debug)]
pub struct AwsAutoScaling {
    client: Client,
}

impl AwsAutoScaling {
    /// Load the default AWS configuration and build a client.
    pub async fn from_env() -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        debug!(region = ?config.region(), "loaded aws config");
        Self::new(Client::new(&config))
    }

    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AutoScalingApi for AwsAutoScaling {
    async fn describe_groups(&self, next_token: Option<String>) -> ProviderResult<GroupPage> {
        let out = self
            .client
            .describe_auto_scaling_groups()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| api_error("DescribeAutoScalingGroups", e))?;

        Ok(GroupPage {
            groups: out.auto_scaling_groups().iter().map(to_group).collect(),
            next_token: out.next_token().map(str::to_string),
        })
    }

    async fn update_capacity(&self, group: &str, capacity: CapacityState) -> ProviderResult<()> {
        self.client
            .update_auto_scaling_group()
            .auto_scaling_group_name(group)
            .desired_capacity(capacity.desired)
            .max_size(capacity.max)
            .min_size(capacity.min)
            .send()
            .await
            .map_err(|e| api_error("UpdateAutoScalingGroup", e))?;
        Ok(())
    }

    async fn put_tag(&self, tag: &TagAssignment) -> ProviderResult<()> {
        self.client
            .create_or_update_tags()
            .tags(to_sdk_tag(tag))
            .send()
            .await
            .map_err(|e| api_error("CreateOrUpdateTags", e))?;
        Ok(())
    }
}

fn api_error<E>(operation: &'static str, err: E) -> ProviderError
where
    E: std::error::Error,
{
    ProviderError::Api {
        operation,
        message: DisplayErrorContext(err).to_string(),
    }
}

/// Convert an SDK group description into the domain type.
fn to_group(group: &types::AutoScalingGroup) -> AutoScalingGroup {
    AutoScalingGroup {
        name: group.auto_scaling_group_name().unwrap_or_default().to_string(),
        arn: group.auto_scaling_group_arn().unwrap_or_default().to_string(),
        capacity: CapacityState {
            desired: group.desired_capacity().unwrap_or_default(),
            max: group.max_size().unwrap_or_default(),
            min: group.min_size().unwrap_or_default(),
        },
        tags: to_tags(group.tags()),
    }
}

fn to_tags(tags: &[TagDescription]) -> Tags {
    tags.iter()
        .map(|t| {
            (
                t.key().unwrap_or_default(),
                t.value().unwrap_or_default(),
            )
        })
        .collect()
}

fn to_sdk_tag(tag: &TagAssignment) -> Tag {
    Tag::builder()
        .key(&tag.key)
        .value(&tag.value)
        .resource_id(&tag.resource_id)
        .resource_type(&tag.resource_type)
        .propagate_at_launch(tag.propagate_at_launch)
        .build()
}
