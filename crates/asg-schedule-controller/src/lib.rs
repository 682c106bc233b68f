//! asg-schedule-controller: the scale-down / scale-up passes.
//!
//! A pass lists every autoscaling group through an [`AutoScalingApi`],
//! keeps the groups whose names match a configured prefix, and then works
//! through them one at a time:
//!
//! ```text
//! scale-down:  update capacity → 0/0/0   then  write asg-schedule = prior capacity
//! scale-up:    decode asg-schedule       then  update capacity → decoded
//! ```
//!
//! Failures are isolated per group and reported together at the end of the
//! pass as an [`AggregatedError`]. A listing failure aborts the pass before
//! any group is touched.
//!
//! # Per-group lifecycle
//!
//! ```text
//! Running ──scale-down──▶ Suspended (prior capacity tagged) ──scale-up──▶ Running
//!    │
//!    └─ zeroing succeeded, tag write failed ─▶ PartiallyScaledDown
//! ```
//!
//! `PartiallyScaledDown` is not detected or repaired: the group stays at
//! zero with no (or a stale) restore tag until an operator intervenes.

pub mod controller;
pub mod error;
pub mod memory;
pub mod provider;

pub use controller::{ScaleAction, ScaleController};
pub use error::{AggregatedError, ControllerError, ProviderError, ProviderResult, ResourceError, ScaleError};
pub use memory::{ApiCall, InMemoryAutoScaling};
pub use provider::{AutoScalingApi, GroupPage};
