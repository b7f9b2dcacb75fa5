//! Errors returned by the ordering API client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("request failed with status {status}")]
    Status { status: u16, message: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// The request never produced an HTTP response
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::InvalidUrl(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::InvalidCredentials => Some(StatusCode::CONFLICT.as_u16()),
            _ => None,
        }
    }

    /// The server no longer accepts the session cookie
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message: Some(message), .. } => Some(message),
            _ => None,
        }
    }

    /// Text for a toast: the server's own message when it sent one
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}

/// Error bodies carry `message` as a string or, for validation failures, a list
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<ErrorMessage>,
}

pub(crate) fn map_status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .map(|m| match m {
            ErrorMessage::One(s) => s,
            ErrorMessage::Many(list) => list.join(", "),
        })
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());

    ApiError::Status { status: status.as_u16(), message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain(br#"{"message":"Order already paid","statusCode":400}"#.as_slice(), Some("Order already paid"))]
    #[case::list(br#"{"message":["price must be positive","name is empty"]}"#.as_slice(), Some("price must be positive, name is empty"))]
    #[case::blank(br#"{"message":"  "}"#.as_slice(), None)]
    #[case::not_json(b"<html>502</html>".as_slice(), None)]
    #[case::empty(b"".as_slice(), None)]
    fn extracts_server_message(#[case] body: &[u8], #[case] expected: Option<&str>) {
        let error = map_status_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(error.server_message(), expected);
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn message_or_prefers_server_text() {
        let with = map_status_error(StatusCode::FORBIDDEN, br#"{"message":"Not your country"}"#);
        assert_eq!(with.message_or("Payment failed"), "Not your country");

        let without = map_status_error(StatusCode::INTERNAL_SERVER_ERROR, b"");
        assert_eq!(without.message_or("Payment failed"), "Payment failed");
        assert!(!without.is_network());
    }

    #[test]
    fn invalid_credentials_reports_conflict() {
        assert_eq!(ApiError::InvalidCredentials.status(), Some(409));
        assert!(ApiError::InvalidUrl("x".into()).is_network());
        assert!(!ApiError::InvalidCredentials.is_unauthorized());
    }

    #[test]
    fn unauthorized_is_recognised() {
        let error = map_status_error(StatusCode::UNAUTHORIZED, br#"{"message":"Unauthorized"}"#);
        assert!(error.is_unauthorized());
        assert_eq!(error.server_message(), Some("Unauthorized"));
    }
}
