//! Response classification for the remote API's envelope convention.
//!
//! The service wraps every structured reply in
//! `{result, item?, items?, errorMessage?, error?}` and signals application
//! errors with `result: false` even under HTTP 200, so transport success
//! must never be mistaken for semantic success. This module owns that
//! classification plus the error-message extraction priority.

use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::ApiError;

/// Decoded response body, shaped by the declared content type.
#[derive(Debug, Clone)]
pub enum ReplyBody {
    /// A declared-JSON payload, parsed.
    Json(Value),
    /// Any non-JSON payload, kept as raw text.
    Text(String),
    /// A 307 reply; the body is never read.
    Redirect,
}

/// Normalized output of a single dispatch: status, headers, decoded body.
///
/// Produced once per call; ownership moves to the caller.
#[derive(Debug)]
pub struct TransportReply {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body.
    pub body: ReplyBody,
    /// Endpoint path the reply came from, for error context.
    pub endpoint: String,
}

/// The remote API's standard response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Semantic success flag; `false` means failure even at HTTP 200.
    #[serde(default)]
    pub result: bool,
    /// Single-resource payload.
    pub item: Option<T>,
    /// Multi-resource payload.
    pub items: Option<Vec<T>>,
    /// Preferred error message field.
    #[serde(rename = "errorMessage")]
    pub error_message: Option<String>,
    /// Generic error field, consulted second.
    pub error: Option<String>,
}

/// Classifies a reply as API success or failure.
///
/// - A status outside 200..300 is a failure regardless of body shape.
/// - A 2xx JSON body carrying `result: false` is a semantic failure.
/// - Successful payloads pass through unmodified (text bodies as a JSON
///   string value).
///
/// # Errors
///
/// Returns [`ApiError::HttpStatus`] or [`ApiError::Api`] with the message
/// extracted per the priority described in [`extract_error_message`].
pub fn classify(reply: TransportReply) -> Result<Value, ApiError> {
    let payload = match &reply.body {
        ReplyBody::Json(value) => Some(value.clone()),
        ReplyBody::Text(_) | ReplyBody::Redirect => None,
    };

    if !reply.status.is_success() {
        let message = extract_error_message(reply.status, payload.as_ref());
        return Err(ApiError::http_status(
            reply.endpoint,
            reply.status.as_u16(),
            message,
            payload,
        ));
    }

    match reply.body {
        ReplyBody::Json(value) => {
            if value.get("result").and_then(Value::as_bool) == Some(false) {
                let message = extract_error_message(reply.status, Some(&value));
                return Err(ApiError::api(reply.endpoint, message, Some(value)));
            }
            Ok(value)
        }
        ReplyBody::Text(text) => Ok(Value::String(text)),
        ReplyBody::Redirect => Ok(Value::Null),
    }
}

/// Extracts a failure message from a payload, in priority order:
/// explicit `errorMessage`, then generic `error`, then a synthesized
/// `"HTTP <status>: <status text>"` line.
#[must_use]
pub fn extract_error_message(status: StatusCode, payload: Option<&Value>) -> String {
    if let Some(payload) = payload {
        if let Some(message) = payload.get("errorMessage").and_then(Value::as_str) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
        if let Some(message) = payload.get("error").and_then(Value::as_str) {
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }
    format!(
        "HTTP {}: {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("unknown status")
    )
}

/// Parses a classified payload into a typed envelope.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] when the payload does not match the
/// envelope shape.
pub fn parse_envelope<T: DeserializeOwned>(
    endpoint: &str,
    payload: Value,
) -> Result<Envelope<T>, ApiError> {
    serde_json::from_value(payload).map_err(|source| ApiError::decode(endpoint, source))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(status: StatusCode, body: ReplyBody) -> TransportReply {
        TransportReply {
            status,
            headers: HeaderMap::new(),
            body,
            endpoint: "/raindrop/1".to_string(),
        }
    }

    #[test]
    fn test_classify_passes_successful_payload_unmodified() {
        let payload = json!({"result": true, "item": {"_id": 1, "title": "t"}});
        let value = classify(reply(StatusCode::OK, ReplyBody::Json(payload.clone()))).unwrap();
        assert_eq!(value, payload);
    }

    #[test]
    fn test_classify_rejects_result_false_at_http_200() {
        let payload = json!({"result": false, "errorMessage": "no access", "item": {}});
        let error = classify(reply(StatusCode::OK, ReplyBody::Json(payload))).unwrap_err();
        match error {
            ApiError::Api { message, .. } => assert_eq!(message, "no access"),
            other => panic!("Expected Api error, got: {other:?}"),
        }
    }

    #[test]
    fn test_classify_rejects_result_false_regardless_of_other_fields() {
        // Even with an item present, result:false is a failure.
        let payload = json!({"result": false, "item": {"_id": 1}});
        let error = classify(reply(StatusCode::OK, ReplyBody::Json(payload))).unwrap_err();
        assert!(matches!(error, ApiError::Api { .. }));
    }

    #[test]
    fn test_classify_non_2xx_is_failure_even_with_result_true() {
        let payload = json!({"result": true});
        let error =
            classify(reply(StatusCode::BAD_GATEWAY, ReplyBody::Json(payload))).unwrap_err();
        match error {
            ApiError::HttpStatus { status, .. } => assert_eq!(status, 502),
            other => panic!("Expected HttpStatus error, got: {other:?}"),
        }
    }

    #[test]
    fn test_classify_text_body_is_not_a_decode_error() {
        let value = classify(reply(
            StatusCode::OK,
            ReplyBody::Text("<html>cached</html>".to_string()),
        ))
        .unwrap();
        assert_eq!(value, Value::String("<html>cached</html>".to_string()));
    }

    #[test]
    fn test_extract_error_message_prefers_error_message_field() {
        let payload = json!({"errorMessage": "specific", "error": "generic"});
        assert_eq!(
            extract_error_message(StatusCode::OK, Some(&payload)),
            "specific"
        );
    }

    #[test]
    fn test_extract_error_message_falls_back_to_error_field() {
        let payload = json!({"error": "generic"});
        assert_eq!(
            extract_error_message(StatusCode::FORBIDDEN, Some(&payload)),
            "generic"
        );
    }

    #[test]
    fn test_extract_error_message_synthesizes_status_line() {
        let payload = json!({"result": false});
        assert_eq!(
            extract_error_message(StatusCode::FORBIDDEN, Some(&payload)),
            "HTTP 403: Forbidden"
        );
        assert_eq!(
            extract_error_message(StatusCode::NOT_FOUND, None),
            "HTTP 404: Not Found"
        );
    }

    #[test]
    fn test_parse_envelope_typed_item() {
        #[derive(Debug, Deserialize)]
        struct Item {
            #[serde(rename = "_id")]
            id: u64,
        }

        let envelope: Envelope<Item> =
            parse_envelope("/raindrop/1", json!({"result": true, "item": {"_id": 5}})).unwrap();
        assert!(envelope.result);
        assert_eq!(envelope.item.unwrap().id, 5);
        assert!(envelope.items.is_none());
    }

    #[test]
    fn test_parse_envelope_decode_error_on_shape_mismatch() {
        #[derive(Debug, Deserialize)]
        struct Item {
            #[serde(rename = "_id")]
            _id: u64,
        }

        let result: Result<Envelope<Item>, _> =
            parse_envelope("/raindrop/1", json!({"result": true, "item": {"_id": "nope"}}));
        assert!(matches!(result, Err(ApiError::Decode { .. })));
    }
}
