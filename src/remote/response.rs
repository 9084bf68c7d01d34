use serde_json::Value;

use crate::error::RemoteError;

use super::RemoteResponse;

const MESSAGE_KEYS: [&str; 4] = ["message", "error", "msg", "error_description"];

/// Turns a response into the JSON payload or an HTTP error.
pub(super) fn decode_response(
    function: &str,
    response: &RemoteResponse,
) -> Result<Value, RemoteError> {
    if !response.is_success() {
        return Err(RemoteError::Http {
            function: function.to_owned(),
            status: response.status,
            message: extract_error_message(response.status, &response.body),
        });
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(&response.body).map_err(|err| RemoteError::Decode {
        function: function.to_owned(),
        source: err,
    })
}

/// Best-effort message for an error response: a JSON message field, then
/// the raw body, then the status reason.
pub(crate) fn extract_error_message(status: u16, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<Value>(body)
        && let Some(message) = message_from_json(&value)
    {
        return message;
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_owned();
    }

    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .map_or_else(
            || format!("HTTP error {}", status),
            |reason| reason.to_owned(),
        )
}

fn message_from_json(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    for key in MESSAGE_KEYS {
        match object.get(key) {
            Some(Value::String(message)) if !message.trim().is_empty() => {
                return Some(message.trim().to_owned());
            }
            Some(nested @ Value::Object(_)) => {
                if let Some(message) = message_from_json(nested) {
                    return Some(message);
                }
            }
            Some(
                Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::String(_)
                | Value::Array(_),
            )
            | None => {}
        }
    }
    None
}
