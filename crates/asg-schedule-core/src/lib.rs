//! asg-schedule-core: shared building blocks for the ASG scheduler.
//!
//! An autoscaling group is "managed" when its name starts with one of the
//! configured prefixes. Scaling a managed group down records its prior
//! capacity in the `asg-schedule` tag on the group itself; scaling it back
//! up reads that tag. This crate owns everything that does not talk to a
//! cloud provider:
//!
//! - [`CapacityState`], [`AutoScalingGroup`], [`Tags`], [`TagAssignment`]
//! - the schedule tag codec ([`tag::encode`] / [`tag::decode`])
//! - the name-prefix matcher ([`PrefixMatcher`])
//! - validated operator configuration ([`ScheduleConfig`])
//!
//! # Tag format
//!
//! ```text
//! asg-schedule = "desired:3,max:6,min:1"
//! ```
//!
//! Encoding is canonical (fixed field order, no whitespace). Decoding
//! accepts any field order and whitespace around keys and values, but
//! every field must appear exactly once with an integer value.

pub mod config;
pub mod error;
pub mod matcher;
pub mod tag;
pub mod types;

pub use config::{LogFormat, ScheduleConfig};
pub use error::{ConfigError, DecodeError};
pub use matcher::PrefixMatcher;
pub use types::*;
