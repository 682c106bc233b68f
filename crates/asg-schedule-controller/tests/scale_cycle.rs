//! Scale-down / scale-up cycle tests.
//!
//! Drives `ScaleController` against the in-memory provider and checks the
//! capacity and schedule tag of every group after each pass.

use std::time::Duration;

use asg_schedule_controller::*;
use asg_schedule_core::*;

fn group(name: &str, capacity: CapacityState) -> AutoScalingGroup {
    AutoScalingGroup {
        name: name.to_string(),
        arn: format!("arn:aws:autoscaling:eu-west-1:123456789012:autoScalingGroup:{name}"),
        capacity,
        tags: Tags::new(),
    }
}

fn tagged_group(name: &str, capacity: CapacityState, schedule: &str) -> AutoScalingGroup {
    let mut group = group(name, capacity);
    group.tags.insert(SCHEDULE_TAG_KEY, schedule);
    group
}

fn controller(api: &InMemoryAutoScaling) -> ScaleController<InMemoryAutoScaling> {
    let config = ScheduleConfig::new(Some("prod-,stage-"), 10).unwrap();
    ScaleController::new(api.clone(), &config)
}

fn aggregated(result: Result<(), ControllerError>) -> AggregatedError {
    match result {
        Err(ControllerError::Aggregated(err)) => err,
        other => panic!("expected aggregated error, got {other:?}"),
    }
}

#[tokio::test]
async fn scale_down_zeroes_and_tags_prior_capacity() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-worker-1", CapacityState::new(3, 6, 1)));

    controller(&api).scale_down().await.unwrap();

    let after = api.group("prod-worker-1").unwrap();
    assert_eq!(after.capacity, CapacityState::ZERO);
    assert_eq!(after.tags.get(SCHEDULE_TAG_KEY), Some("desired:3,max:6,min:1"));
}

#[tokio::test]
async fn scale_down_zeroes_before_tagging() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-worker-1", CapacityState::new(3, 6, 1)));

    controller(&api).scale_down().await.unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(calls[0], ApiCall::DescribeGroups { next_token: None }));
    assert_eq!(
        calls[1],
        ApiCall::UpdateCapacity {
            group: "prod-worker-1".to_string(),
            capacity: CapacityState::ZERO,
        }
    );
    match &calls[2] {
        ApiCall::PutTag(tag) => {
            assert_eq!(tag.resource_id, "prod-worker-1");
            assert_eq!(tag.resource_type, "auto-scaling-group");
            assert!(!tag.propagate_at_launch);
        }
        other => panic!("expected tag write, got {other:?}"),
    }
}

#[tokio::test]
async fn scale_up_restores_and_keeps_tag() {
    let api = InMemoryAutoScaling::new();
    api.insert(tagged_group(
        "prod-worker-1",
        CapacityState::ZERO,
        "desired:3,max:6,min:1",
    ));

    controller(&api).scale_up().await.unwrap();

    let after = api.group("prod-worker-1").unwrap();
    assert_eq!(after.capacity, CapacityState::new(3, 6, 1));
    assert_eq!(after.tags.get(SCHEDULE_TAG_KEY), Some("desired:3,max:6,min:1"));
    assert!(!api.calls().iter().any(|c| matches!(c, ApiCall::PutTag(_))));
}

#[tokio::test]
async fn full_cycle_restores_original_capacity() {
    let api = InMemoryAutoScaling::new().with_page_size(1);
    api.insert(group("prod-api", CapacityState::new(4, 10, 2)));
    api.insert(group("stage-api", CapacityState::new(1, 2, 1)));
    api.insert(group("dev-api", CapacityState::new(2, 2, 2)));

    let ctl = controller(&api);
    ctl.scale_down().await.unwrap();
    assert_eq!(api.group("prod-api").unwrap().capacity, CapacityState::ZERO);
    assert_eq!(api.group("stage-api").unwrap().capacity, CapacityState::ZERO);

    ctl.scale_up().await.unwrap();
    assert_eq!(api.group("prod-api").unwrap().capacity, CapacityState::new(4, 10, 2));
    assert_eq!(api.group("stage-api").unwrap().capacity, CapacityState::new(1, 2, 1));
}

#[tokio::test]
async fn unmanaged_groups_are_untouched() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("dev-worker-1", CapacityState::new(2, 4, 1)));

    let ctl = controller(&api);
    ctl.scale_down().await.unwrap();
    ctl.scale_up().await.unwrap();

    let after = api.group("dev-worker-1").unwrap();
    assert_eq!(after.capacity, CapacityState::new(2, 4, 1));
    assert!(after.tags.is_empty());
    assert!(api
        .calls()
        .iter()
        .all(|c| matches!(c, ApiCall::DescribeGroups { .. })));
}

#[tokio::test]
async fn no_matching_groups_is_success() {
    let api = InMemoryAutoScaling::new();
    let ctl = controller(&api);
    assert!(ctl.scale_down().await.is_ok());
    assert!(ctl.scale_up().await.is_ok());
}

#[tokio::test]
async fn scale_down_failure_is_isolated() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-a", CapacityState::new(2, 4, 1)));
    api.insert(group("prod-b", CapacityState::new(3, 6, 1)));
    api.fail_updates_for("prod-a");

    let err = aggregated(controller(&api).scale_down().await);

    assert_eq!(err.groups().collect::<Vec<_>>(), vec!["prod-a"]);
    assert!(err.to_string().starts_with("prod-a: UpdateAutoScalingGroup"));

    // Zeroing failed, so no tag is recorded for prod-a.
    let a = api.group("prod-a").unwrap();
    assert_eq!(a.capacity, CapacityState::new(2, 4, 1));
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), None);

    let b = api.group("prod-b").unwrap();
    assert_eq!(b.capacity, CapacityState::ZERO);
    assert_eq!(b.tags.get(SCHEDULE_TAG_KEY), Some("desired:3,max:6,min:1"));
}

#[tokio::test]
async fn tag_failure_leaves_group_partially_scaled_down() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-a", CapacityState::new(2, 4, 1)));
    api.fail_tags_for("prod-a");

    let err = aggregated(controller(&api).scale_down().await);
    assert_eq!(err.errors().len(), 1);
    assert!(matches!(
        err.errors()[0].source,
        ScaleError::Provider(ProviderError::Api { operation: "CreateOrUpdateTags", .. })
    ));

    let a = api.group("prod-a").unwrap();
    assert_eq!(a.capacity, CapacityState::ZERO);
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), None);
}

#[tokio::test]
async fn scale_up_failure_is_isolated() {
    let api = InMemoryAutoScaling::new();
    api.insert(tagged_group("prod-a", CapacityState::ZERO, "desired:2,max:4,min:1"));
    api.insert(tagged_group("prod-b", CapacityState::ZERO, "desired:3,max:6,min:1"));
    api.fail_updates_for("prod-b");

    let err = aggregated(controller(&api).scale_up().await);

    assert_eq!(err.groups().collect::<Vec<_>>(), vec!["prod-b"]);
    assert_eq!(api.group("prod-a").unwrap().capacity, CapacityState::new(2, 4, 1));
    assert_eq!(api.group("prod-b").unwrap().capacity, CapacityState::ZERO);
}

#[tokio::test]
async fn scale_up_reports_undecodable_tags() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-never-scaled", CapacityState::ZERO));
    api.insert(tagged_group("prod-corrupt", CapacityState::ZERO, "des:2,max:5,min:1"));
    api.insert(tagged_group("prod-ok", CapacityState::ZERO, "max:5, desired : 2,min:1"));

    let err = aggregated(controller(&api).scale_up().await);

    assert_eq!(
        err.groups().collect::<Vec<_>>(),
        vec!["prod-corrupt", "prod-never-scaled"]
    );
    assert!(matches!(
        err.errors()[0].source,
        ScaleError::Decode(DecodeError::UnknownField { .. })
    ));
    assert_eq!(
        err.errors()[1].source,
        ScaleError::Decode(DecodeError::TagMissing)
    );
    assert_eq!(api.group("prod-ok").unwrap().capacity, CapacityState::new(2, 5, 1));
}

#[tokio::test]
async fn scale_down_always_records_listed_capacity() {
    // A group an operator already set to zero is retagged with zero, so the
    // next scale-up keeps it at zero.
    let api = InMemoryAutoScaling::new();
    api.insert(tagged_group(
        "prod-a",
        CapacityState::ZERO,
        "desired:3,max:6,min:1",
    ));

    let ctl = controller(&api);
    ctl.scale_down().await.unwrap();

    let a = api.group("prod-a").unwrap();
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), Some("desired:0,max:0,min:0"));
    assert_eq!(api.calls().len(), 3);

    ctl.scale_up().await.unwrap();
    assert_eq!(api.group("prod-a").unwrap().capacity, CapacityState::ZERO);
}

#[tokio::test]
async fn repeated_scale_down_retags_with_zero() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-a", CapacityState::new(3, 6, 1)));

    let ctl = controller(&api);
    ctl.scale_down().await.unwrap();
    ctl.scale_down().await.unwrap();

    let a = api.group("prod-a").unwrap();
    assert_eq!(a.capacity, CapacityState::ZERO);
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), Some("desired:0,max:0,min:0"));
}

#[tokio::test]
async fn scale_down_overwrites_stale_tag() {
    let api = InMemoryAutoScaling::new();
    api.insert(tagged_group(
        "prod-a",
        CapacityState::new(5, 8, 2),
        "desired:3,max:6,min:1",
    ));

    controller(&api).scale_down().await.unwrap();

    let a = api.group("prod-a").unwrap();
    assert_eq!(a.capacity, CapacityState::ZERO);
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), Some("desired:5,max:8,min:2"));
}

#[tokio::test]
async fn zero_group_with_corrupt_tag_is_retagged() {
    let api = InMemoryAutoScaling::new();
    api.insert(tagged_group("prod-a", CapacityState::ZERO, "garbage"));

    controller(&api).scale_down().await.unwrap();

    let a = api.group("prod-a").unwrap();
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), Some("desired:0,max:0,min:0"));
}

#[tokio::test]
async fn listing_failure_aborts_pass() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-a", CapacityState::new(2, 4, 1)));
    api.fail_listing();

    let result = controller(&api).scale_down().await;

    assert!(matches!(result, Err(ControllerError::List(ProviderError::Api { .. }))));
    assert_eq!(api.group("prod-a").unwrap().capacity, CapacityState::new(2, 4, 1));
    assert_eq!(api.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_provider_calls_time_out() {
    let api = InMemoryAutoScaling::new().with_latency(Duration::from_secs(30));
    api.insert(group("prod-a", CapacityState::new(2, 4, 1)));

    let result = controller(&api).scale_down().await;

    assert_eq!(
        result,
        Err(ControllerError::List(ProviderError::Timeout {
            operation: "DescribeAutoScalingGroups",
            after: Duration::from_secs(10),
        }))
    );
}

#[tokio::test(start_paused = true)]
async fn slow_capacity_update_fails_only_that_group() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-a", CapacityState::new(2, 4, 1)));
    api.insert(group("prod-b", CapacityState::new(3, 6, 1)));
    api.delay_updates_for("prod-a", Duration::from_secs(30));

    let err = aggregated(controller(&api).scale_down().await);

    assert_eq!(err.groups().collect::<Vec<_>>(), vec!["prod-a"]);
    assert_eq!(
        err.errors()[0].source,
        ScaleError::Provider(ProviderError::Timeout {
            operation: "UpdateAutoScalingGroup",
            after: Duration::from_secs(10),
        })
    );

    let a = api.group("prod-a").unwrap();
    assert_eq!(a.capacity, CapacityState::new(2, 4, 1));
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), None);

    let b = api.group("prod-b").unwrap();
    assert_eq!(b.capacity, CapacityState::ZERO);
    assert_eq!(b.tags.get(SCHEDULE_TAG_KEY), Some("desired:3,max:6,min:1"));
}

#[tokio::test(start_paused = true)]
async fn slow_tag_write_times_out_on_its_own() {
    let api = InMemoryAutoScaling::new();
    api.insert(group("prod-a", CapacityState::new(2, 4, 1)));
    api.insert(group("prod-b", CapacityState::new(3, 6, 1)));
    api.delay_tags_for("prod-a", Duration::from_secs(30));

    let err = aggregated(controller(&api).scale_down().await);

    assert_eq!(err.groups().collect::<Vec<_>>(), vec!["prod-a"]);
    assert_eq!(
        err.errors()[0].source,
        ScaleError::Provider(ProviderError::Timeout {
            operation: "CreateOrUpdateTags",
            after: Duration::from_secs(10),
        })
    );

    // Zeroed but never tagged.
    let a = api.group("prod-a").unwrap();
    assert_eq!(a.capacity, CapacityState::ZERO);
    assert_eq!(a.tags.get(SCHEDULE_TAG_KEY), None);

    assert_eq!(
        api.group("prod-b").unwrap().tags.get(SCHEDULE_TAG_KEY),
        Some("desired:3,max:6,min:1")
    );
}

#[tokio::test(start_paused = true)]
async fn slow_restore_fails_only_that_group() {
    let api = InMemoryAutoScaling::new();
    api.insert(tagged_group("prod-a", CapacityState::ZERO, "desired:2,max:4,min:1"));
    api.insert(tagged_group("prod-b", CapacityState::ZERO, "desired:3,max:6,min:1"));
    api.delay_updates_for("prod-b", Duration::from_secs(30));

    let err = aggregated(controller(&api).scale_up().await);

    assert_eq!(err.groups().collect::<Vec<_>>(), vec!["prod-b"]);
    assert!(matches!(
        err.errors()[0].source,
        ScaleError::Provider(ProviderError::Timeout { operation: "UpdateAutoScalingGroup", .. })
    ));
    assert_eq!(api.group("prod-a").unwrap().capacity, CapacityState::new(2, 4, 1));
    assert_eq!(api.group("prod-b").unwrap().capacity, CapacityState::ZERO);
}
