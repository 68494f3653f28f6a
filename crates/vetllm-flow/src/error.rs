//! Error types for the conversation flow.

use vetllm_core::error::VetError;

/// Errors from the flow controller and its relay transport.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} while in {state}")]
    InvalidTransition { state: String, action: &'static str },
    #[error("unknown category: {0}")]
    UnknownCategory(String),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("a request is already in flight")]
    RequestInFlight,
    #[error("no request is in flight")]
    NoRequestInFlight,
    #[error("input cannot be empty")]
    EmptyInput,
    /// Shown to the user verbatim after `"Error: "`.
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for FlowError {
    fn from(err: reqwest::Error) -> Self {
        FlowError::Transport(err.to_string())
    }
}

impl From<FlowError> for VetError {
    fn from(err: FlowError) -> Self {
        VetError::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_error_display() {
        let err = FlowError::InvalidTransition {
            state: "SelectCategory".to_string(),
            action: "go back",
        };
        assert_eq!(err.to_string(), "cannot go back while in SelectCategory");

        assert_eq!(
            FlowError::UnknownCategory("surgery".to_string()).to_string(),
            "unknown category: surgery"
        );
        assert_eq!(
            FlowError::UnknownAction("grooming".to_string()).to_string(),
            "unknown action: grooming"
        );
        assert_eq!(
            FlowError::RequestInFlight.to_string(),
            "a request is already in flight"
        );
        assert_eq!(
            FlowError::NoRequestInFlight.to_string(),
            "no request is in flight"
        );
        assert_eq!(FlowError::EmptyInput.to_string(), "input cannot be empty");
    }

    #[test]
    fn test_transport_error_is_bare_message() {
        let err = FlowError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_into_vet_error() {
        let err: VetError = FlowError::Transport("timed out".to_string()).into();
        assert!(matches!(err, VetError::Http(_)));
        assert!(err.to_string().contains("timed out"));
    }
}
