//! Trigger payload → scale action.
//!
//! The scheduler invokes the function with a JSON object whose `Payload`
//! field names the action:
//!
//! ```json
//! { "Payload": "scale-down" }
//! ```

use serde_json::Value;
use thiserror::Error;

use asg_schedule_controller::ScaleAction;

/// Field of the trigger payload carrying the action.
pub const ACTION_FIELD: &str = "Payload";

/// Invalid trigger payloads. Nothing is touched when dispatch fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("unrecognized {0} request action")]
    UnrecognizedAction(String),
}

/// Decode a trigger payload into the action it requests.
pub fn parse_request(payload: &Value) -> Result<ScaleAction, DispatchError> {
    let request = payload.as_object().ok_or_else(|| {
        DispatchError::MalformedRequest(format!(
            "expected a JSON object, got {} {payload}",
            json_kind(payload)
        ))
    })?;

    match request.get(ACTION_FIELD) {
        Some(Value::String(action)) => parse_action(action),
        Some(other) => Err(DispatchError::UnrecognizedAction(other.to_string())),
        None => Err(DispatchError::MalformedRequest(format!(
            "missing {ACTION_FIELD} field"
        ))),
    }
}

/// Parse an action name, ignoring surrounding whitespace.
pub fn parse_action(raw: &str) -> Result<ScaleAction, DispatchError> {
    match raw.trim() {
        "scale-up" => Ok(ScaleAction::Up),
        "scale-down" => Ok(ScaleAction::Down),
        other => Err(DispatchError::UnrecognizedAction(other.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_both_actions() {
        assert_eq!(
            parse_request(&json!({ "Payload": "scale-up" })),
            Ok(ScaleAction::Up)
        );
        assert_eq!(
            parse_request(&json!({ "Payload": "scale-down" })),
            Ok(ScaleAction::Down)
        );
    }

    #[test]
    fn trims_action() {
        assert_eq!(
            parse_request(&json!({ "Payload": "  scale-down\n" })),
            Ok(ScaleAction::Down)
        );
    }

    #[test]
    fn ignores_extra_fields() {
        let payload = json!({ "Payload": "scale-up", "source": "aws.scheduler" });
        assert_eq!(parse_request(&payload), Ok(ScaleAction::Up));
    }

    #[test]
    fn rejects_unknown_action() {
        assert_eq!(
            parse_request(&json!({ "Payload": "scale-sideways" })),
            Err(DispatchError::UnrecognizedAction("scale-sideways".to_string()))
        );
        assert_eq!(
            parse_action("Scale-Up"),
            Err(DispatchError::UnrecognizedAction("Scale-Up".to_string()))
        );
    }

    #[test]
    fn rejects_non_string_action() {
        assert_eq!(
            parse_request(&json!({ "Payload": 1 })),
            Err(DispatchError::UnrecognizedAction("1".to_string()))
        );
    }

    #[test]
    fn rejects_non_object_payload() {
        for payload in [json!("scale-up"), json!(["scale-up"]), json!(null)] {
            let err = parse_request(&payload).unwrap_err();
            assert!(matches!(err, DispatchError::MalformedRequest(_)), "{payload}");
        }
    }

    #[test]
    fn rejects_missing_action_field() {
        assert_eq!(
            parse_request(&json!({ "action": "scale-up" })),
            Err(DispatchError::MalformedRequest("missing Payload field".to_string()))
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            DispatchError::UnrecognizedAction("reboot".to_string()).to_string(),
            "unrecognized reboot request action"
        );
    }
}
