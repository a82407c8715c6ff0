//! RUN_COMMAND payload and reply conventions.

use serde_json::Value;
use wmipc_frame::render_payload;

use crate::error::{ClientError, Result};

/// Join a command with its arguments, separated by single spaces.
///
/// String arguments are inserted as-is; anything else as JSON text.
pub fn join_command(command: &str, args: &[Value]) -> Result<String> {
    let mut joined = command.to_string();
    for arg in args {
        let rendered = render_payload(arg)?;
        joined.push(' ');
        joined.push_str(&String::from_utf8_lossy(&rendered));
    }
    Ok(joined)
}

/// Turn an explicit `success: false` in a reply into [`ClientError::ApplicationFailure`].
///
/// i3 answers RUN_COMMAND with one outcome object per command, so arrays are
/// checked element by element; other replies carry a single object.
pub fn check_success(reply: Value) -> Result<Value> {
    let failure = match &reply {
        Value::Object(_) => failure_message(&reply),
        Value::Array(outcomes) => outcomes.iter().find_map(failure_message),
        _ => None,
    };

    match failure {
        Some(error) => Err(ClientError::ApplicationFailure { error, reply }),
        None => Ok(reply),
    }
}

fn failure_message(outcome: &Value) -> Option<String> {
    if outcome.get("success")? != &Value::Bool(false) {
        return None;
    }
    let error = outcome
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("command failed");
    Some(error.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn join_without_args_is_identity() {
        assert_eq!(join_command("workspace 2", &[]).unwrap(), "workspace 2");
    }

    #[test]
    fn join_stringifies_non_string_args() {
        let joined = join_command(
            "mark",
            &[json!("--add"), json!(3), json!({"a": 1}), json!(true)],
        )
        .unwrap();
        assert_eq!(joined, r#"mark --add 3 {"a":1} true"#);
    }

    #[test]
    fn success_true_passes_through() {
        let reply = json!([{"success": true}]);
        assert_eq!(check_success(reply.clone()).unwrap(), reply);
        assert!(check_success(json!({"success": true})).is_ok());
    }

    #[test]
    fn missing_success_field_is_not_a_failure() {
        assert!(check_success(json!({"human_readable": "4.23"})).is_ok());
        assert!(check_success(json!(["1", "2"])).is_ok());
    }

    #[test]
    fn success_false_object_is_application_failure() {
        let err = check_success(json!({"success": false, "error": "no such bar"})).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ApplicationFailure { ref error, .. } if error == "no such bar"
        ));
    }

    #[test]
    fn any_failed_outcome_in_array_fails() {
        let reply = json!([
            {"success": true},
            {"success": false, "parse_error": true, "error": "Expected one of these tokens"}
        ]);
        let err = check_success(reply).unwrap_err();
        match err {
            ClientError::ApplicationFailure { error, reply } => {
                assert_eq!(error, "Expected one of these tokens");
                assert_eq!(reply.as_array().map(Vec::len), Some(2));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn failure_without_error_text_gets_default() {
        let err = check_success(json!({"success": false})).unwrap_err();
        assert!(matches!(
            err,
            ClientError::ApplicationFailure { ref error, .. } if error == "command failed"
        ));
    }
}
