//! Standardized conversion of transport and HTTP failures into [`Cause`] values

use crate::error::Cause;
use reqwest::StatusCode;

/// Standard handler for HTTP responses
pub struct HttpErrorHandler;

impl HttpErrorHandler {
    /// Status line for a response that did not carry the expected status,
    /// e.g. `401 Unauthorized`
    pub fn unexpected_status(status: StatusCode) -> Cause {
        Cause::Status(status.to_string())
    }

    /// Require an exact status code
    pub fn expect_status(actual: StatusCode, expected: StatusCode) -> Result<(), Cause> {
        if actual == expected {
            Ok(())
        } else {
            Err(Self::unexpected_status(actual))
        }
    }
}

/// Network error categorization
pub struct NetworkErrorHandler;

impl NetworkErrorHandler {
    pub fn handle_network_error(error: &reqwest::Error, context: &str) -> Cause {
        if error.is_timeout() {
            Cause::Transport(format!("{} timed out: {}", context, error))
        } else if error.is_connect() {
            Cause::Transport(format!("connection error during {}: {}", context, error))
        } else if error.is_decode() || error.is_body() {
            Cause::Transport(format!("failed to read {} response: {}", context, error))
        } else {
            Cause::Transport(format!("{} network error: {}", context, error))
        }
    }
}

/// JSON body parsing errors
pub struct ParseErrorHandler;

impl ParseErrorHandler {
    pub fn handle_json_error(error: &serde_json::Error, context: &str) -> Cause {
        Cause::Malformed(format!("failed to parse {} response: {}", context, error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_status_reports_status_line() {
        assert_eq!(
            HttpErrorHandler::expect_status(StatusCode::OK, StatusCode::OK),
            Ok(())
        );
        assert_eq!(
            HttpErrorHandler::expect_status(StatusCode::NOT_FOUND, StatusCode::NO_CONTENT),
            Err(Cause::Status("404 Not Found".to_string()))
        );
    }

    #[test]
    fn json_errors_become_malformed() {
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let cause = ParseErrorHandler::handle_json_error(&err, "tag listing");
        assert!(matches!(cause, Cause::Malformed(msg) if msg.starts_with("failed to parse tag listing")));
    }
}
