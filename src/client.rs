//! Typed client for the action API.
//!
//! Every failure, whether it comes from the network, the HTTP status, or the
//! response envelope, is turned into a single [`ClientError`] by [`decode`].

use crate::config::ClientConfig;
use crate::models::{Action, ActionInput, FieldErrors, HealthResponse};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transport,
    Malformed,
    Server,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Validation {
        status: u16,
        message: String,
        errors: FieldErrors,
    },

    #[error("{message}")]
    NotFound { message: String },

    /// No HTTP response was received.
    #[error("{message}")]
    Transport { message: String },

    #[error("{message}")]
    Malformed { status: u16, message: String },

    #[error("{message}")]
    Server { status: u16, message: String },
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::Server { .. } => ErrorKind::Server,
        }
    }

    /// HTTP status of the failed response, or 0 when none was received.
    pub fn status(&self) -> u16 {
        match self {
            Self::Validation { status, .. }
            | Self::Malformed { status, .. }
            | Self::Server { status, .. } => *status,
            Self::NotFound { .. } => 404,
            Self::Transport { .. } => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::NotFound { message }
            | Self::Transport { message }
            | Self::Malformed { message, .. }
            | Self::Server { message, .. } => message,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Whether resending the same request may succeed. Callers still have to
    /// decide whether the request itself is safe to repeat.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Server { .. })
    }

    fn transport(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "Request timed out".to_string()
        } else {
            format!("Network error: {err}")
        };
        Self::Transport { message }
    }
}

/// Which update semantics `update_action` uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdateMode {
    /// PATCH: omitted fields keep their stored values.
    #[default]
    Partial,
    /// PUT: every field is replaced.
    Full,
}

impl UpdateMode {
    fn method(self) -> Method {
        match self {
            Self::Partial => Method::PATCH,
            Self::Full => Method::PUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ClientError::transport)?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_actions(&self) -> Result<Vec<Action>, ClientError> {
        let (status, body) = self.send(self.http.get(self.url("/actions/"))).await?;
        data_field(status, body)
    }

    pub async fn get_action(&self, id: u64) -> Result<Action, ClientError> {
        let (status, body) = self.send(self.http.get(self.action_url(id))).await?;
        data_field(status, body)
    }

    pub async fn create_action(&self, input: &ActionInput) -> Result<Action, ClientError> {
        let request = self.http.post(self.url("/actions/")).json(input);
        let (status, body) = self.send(request).await?;
        data_field(status, body)
    }

    pub async fn update_action(
        &self,
        id: u64,
        input: &ActionInput,
        mode: UpdateMode,
    ) -> Result<Action, ClientError> {
        let request = self
            .http
            .request(mode.method(), self.action_url(id))
            .json(input);
        let (status, body) = self.send(request).await?;
        data_field(status, body)
    }

    pub async fn delete_action(&self, id: u64) -> Result<(), ClientError> {
        self.send(self.http.delete(self.action_url(id))).await?;
        Ok(())
    }

    pub async fn check_health(&self) -> Result<HealthResponse, ClientError> {
        let (status, body) = self.send(self.http.get(self.url("/health/"))).await?;
        health_body(status, body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn action_url(&self, id: u64) -> String {
        self.url(&format!("/actions/{id}/"))
    }

    /// Returns the HTTP status alongside the decoded envelope so later
    /// payload failures still report it.
    async fn send(&self, request: RequestBuilder) -> Result<(u16, Option<Value>), ClientError> {
        let response = request.send().await.map_err(ClientError::transport)?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(ClientError::transport)?;
        debug!(status, len = bytes.len(), "received response");
        Ok((status, decode(status, &bytes)?))
    }
}

/// Turns a raw response into the parsed envelope, or the error it describes.
///
/// An empty body on a 2xx status is a success with no payload.
pub fn decode(status: u16, body: &[u8]) -> Result<Option<Value>, ClientError> {
    let ok_status = (200..300).contains(&status);

    if body.iter().all(u8::is_ascii_whitespace) {
        return if ok_status {
            Ok(None)
        } else {
            Err(classify(status, None, FieldErrors::new()))
        };
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) if ok_status => return Err(malformed(status, err)),
        Err(_) => return Err(classify(status, None, FieldErrors::new())),
    };

    let Some(success) = value.get("success").and_then(Value::as_bool) else {
        if ok_status {
            return Err(malformed(status, "missing success flag"));
        }
        return Err(classify(status, None, FieldErrors::new()));
    };

    if success && ok_status {
        return Ok(Some(value));
    }

    let message = ["message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string);
    let errors = value
        .get("errors")
        .cloned()
        .and_then(|errors| serde_json::from_value::<FieldErrors>(errors).ok())
        .unwrap_or_default();
    Err(classify(status, message, errors))
}

fn classify(status: u16, message: Option<String>, errors: FieldErrors) -> ClientError {
    if !errors.is_empty() || status == 400 || status == 422 {
        return ClientError::Validation {
            status,
            message: message.unwrap_or_else(|| "Validation failed".to_string()),
            errors,
        };
    }
    if status == 404 {
        return ClientError::NotFound {
            message: message.unwrap_or_else(|| "Resource not found".to_string()),
        };
    }
    if status >= 500 {
        debug!(status, detail = message.as_deref().unwrap_or(""), "server error");
        return ClientError::Server {
            status,
            message: "Server error. Please try again later.".to_string(),
        };
    }
    ClientError::Server {
        status,
        message: message.unwrap_or_else(|| format!("Request failed with status {status}")),
    }
}

fn data_field<T: DeserializeOwned>(status: u16, body: Option<Value>) -> Result<T, ClientError> {
    let data = body
        .and_then(|mut body| body.get_mut("data").map(Value::take))
        .ok_or_else(|| malformed(status, "missing data"))?;
    serde_json::from_value(data).map_err(|err| malformed(status, err))
}

fn health_body(status: u16, body: Option<Value>) -> Result<HealthResponse, ClientError> {
    let body = body.ok_or_else(|| malformed(status, "empty health body"))?;
    serde_json::from_value(body).map_err(|err| malformed(status, err))
}

fn malformed(status: u16, detail: impl std::fmt::Display) -> ClientError {
    ClientError::Malformed {
        status,
        message: format!("Malformed response: {detail}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn successful_envelope_is_returned() {
        let value = decode(200, &body(json!({ "success": true, "data": [] }))).unwrap();
        assert_eq!(value, Some(json!({ "success": true, "data": [] })));
    }

    #[test]
    fn empty_success_body_is_empty_payload() {
        assert_eq!(decode(204, b"").unwrap(), None);
    }

    #[test]
    fn success_false_fails_even_with_200() {
        let err = decode(200, &body(json!({ "success": false, "error": "Nope" }))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), 200);
        assert_eq!(err.message(), "Nope");
    }

    #[test]
    fn validation_errors_keep_field_map() {
        let raw = json!({
            "success": false,
            "error": "Validation failed",
            "errors": { "action": ["Action description must be at least 3 characters long."] }
        });
        let err = decode(400, &body(raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status(), 400);
        assert_eq!(err.message(), "Validation failed");
        let errors = err.field_errors().unwrap();
        assert!(errors["action"][0].contains("at least 3"));
    }

    #[test]
    fn not_found_uses_server_message() {
        let raw = json!({
            "success": false,
            "error": "Action not found",
            "message": "Action with ID 9 does not exist"
        });
        let err = decode(404, &body(raw)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.status(), 404);
        assert_eq!(err.message(), "Action with ID 9 does not exist");
        assert!(!err.is_retryable());
    }

    #[test]
    fn server_errors_get_generic_message() {
        let err = decode(503, b"<html>upstream down</html>").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
        assert_eq!(err.status(), 503);
        assert_eq!(err.message(), "Server error. Please try again later.");
        assert!(err.is_retryable());
    }

    #[test]
    fn invalid_json_on_success_is_malformed() {
        let err = decode(200, b"{oops").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.message().starts_with("Malformed response"));

        let err = decode(200, &body(json!([1, 2, 3]))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
    }

    #[test]
    fn missing_data_is_malformed() {
        let err = data_field::<Vec<Action>>(200, Some(json!({ "success": true }))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.status(), 200);
    }

    #[test]
    fn malformed_payload_keeps_response_status() {
        let raw = json!({ "success": true, "data": { "id": "x" } });
        let envelope = decode(201, &body(raw)).unwrap();
        let err = data_field::<Action>(201, envelope).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.status(), 201);

        let err = health_body(200, Some(json!({ "success": true }))).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.status(), 200);
    }

    #[test]
    fn data_is_deserialized_into_actions() {
        let raw = json!({
            "success": true,
            "data": {
                "id": 1,
                "action": "Recycling plastic bottles",
                "date": "2025-01-08",
                "points": 25
            }
        });
        let action: Action = data_field(200, Some(raw)).unwrap();
        assert_eq!(action.id, 1);
        assert_eq!(action.description, "Recycling plastic bottles");
    }

    #[test]
    fn update_mode_defaults_to_partial() {
        assert_eq!(UpdateMode::default(), UpdateMode::Partial);
        assert_eq!(UpdateMode::Partial.method(), Method::PATCH);
        assert_eq!(UpdateMode::Full.method(), Method::PUT);
    }
}
