//! Schedule tag codec.
//!
//! Serializes a [`CapacityState`] into the `asg-schedule` tag value and
//! parses it back:
//!
//! ```text
//! encode: {desired: 2, max: 5, min: 1}  →  "desired:2,max:5,min:1"
//! decode: "max:5, desired : 2,min:1"    →  {desired: 2, max: 5, min: 1}
//! ```

use crate::error::DecodeError;
use crate::types::{CapacityState, GROUP_RESOURCE_TYPE, SCHEDULE_TAG_KEY, TagAssignment, Tags};

const DESIRED: &str = "desired";
const MAX: &str = "max";
const MIN: &str = "min";

/// Build the tag write that records `state` on the group `group_name`.
///
/// The tag is scoped to the group and is not propagated to instances.
pub fn encode(state: &CapacityState, group_name: &str) -> TagAssignment {
    TagAssignment {
        key: SCHEDULE_TAG_KEY.to_string(),
        value: encode_value(state),
        resource_id: group_name.to_string(),
        resource_type: GROUP_RESOURCE_TYPE.to_string(),
        propagate_at_launch: false,
    }
}

/// Canonical tag value: fixed field order, no whitespace.
pub fn encode_value(state: &CapacityState) -> String {
    format!(
        "{DESIRED}:{},{MAX}:{},{MIN}:{}",
        state.desired, state.max, state.min
    )
}

/// Look up the schedule tag in `tags` and decode it.
pub fn decode(tags: &Tags) -> Result<CapacityState, DecodeError> {
    let value = tags.get(SCHEDULE_TAG_KEY).ok_or(DecodeError::TagMissing)?;
    decode_value(value)
}

/// Decode a raw schedule tag value.
///
/// Segments are separated by `,` and each must be exactly one `key:value`
/// pair. Keys and values are trimmed; the value is parsed before the key is
/// checked, so `des:x` reports the bad number rather than the bad key.
pub fn decode_value(value: &str) -> Result<CapacityState, DecodeError> {
    let mut desired = None;
    let mut max = None;
    let mut min = None;

    for entry in value.split(',') {
        let mut parts = entry.split(':');
        let (key, raw) = match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(raw), None) => (key.trim(), raw.trim()),
            _ => {
                return Err(DecodeError::MalformedEntry {
                    value: value.to_string(),
                    entry: entry.to_string(),
                });
            }
        };

        let number = raw
            .parse::<i32>()
            .map_err(|source| DecodeError::InvalidNumber {
                value: value.to_string(),
                field: key.to_string(),
                raw: raw.to_string(),
                source,
            })?;

        let (field, slot) = match key {
            DESIRED => (DESIRED, &mut desired),
            MAX => (MAX, &mut max),
            MIN => (MIN, &mut min),
            _ => {
                return Err(DecodeError::UnknownField {
                    value: value.to_string(),
                    field: key.to_string(),
                });
            }
        };

        if slot.replace(number).is_some() {
            return Err(DecodeError::DuplicateField {
                value: value.to_string(),
                field,
            });
        }
    }

    let require = |slot: Option<i32>, field: &'static str| {
        slot.ok_or_else(|| DecodeError::MissingField {
            value: value.to_string(),
            field,
        })
    };

    Ok(CapacityState {
        desired: require(desired, DESIRED)?,
        max: require(max, MAX)?,
        min: require(min, MIN)?,
    })
}
