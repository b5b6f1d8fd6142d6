//! Error types for registry and hub operations
//!
//! Every failure is one of a small closed set of variants so that callers can
//! branch on the kind of failure (the pruner skips a repository whose tag
//! listing fails, but aborts on anything else) instead of matching strings.

pub mod handlers;

use std::fmt;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HousekeepingError>;

/// Remote call that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    RegistryLogin,
    HubLogin,
    PullManifest,
    PushManifest,
    ListOrganizationImages,
    ListTags,
    TagMetadata,
    DeleteTag,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::RegistryLogin => "registry login",
            Operation::HubLogin => "hub login",
            Operation::PullManifest => "manifest pull",
            Operation::PushManifest => "manifest push",
            Operation::ListOrganizationImages => "organization image listing",
            Operation::ListTags => "tag listing",
            Operation::TagMetadata => "tag metadata lookup",
            Operation::DeleteTag => "tag deletion",
        };
        f.write_str(name)
    }
}

/// Underlying reason a remote call failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Cause {
    /// The request never produced a response
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response status was not the one the call requires
    #[error("unexpected status {0}")]
    Status(String),
    /// The response body could not be interpreted
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("empty token")]
    EmptyToken,
}

#[derive(Error, Debug)]
pub enum HousekeepingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed during {operation} for {target}: {cause}")]
    Auth {
        operation: Operation,
        target: String,
        #[source]
        cause: Cause,
    },

    #[error("Transfer failed during {operation} of {repository}/{reference}: {cause}")]
    Transfer {
        operation: Operation,
        repository: String,
        reference: String,
        #[source]
        cause: Cause,
    },

    #[error("Discovery failed during {operation} for {target}: {cause}")]
    Discovery {
        operation: Operation,
        target: String,
        #[source]
        cause: Cause,
    },

    #[error("Failed to delete tag {tag} from {repository}: {cause}")]
    Delete {
        repository: String,
        tag: String,
        #[source]
        cause: Cause,
    },
}

impl HousekeepingError {
    pub fn auth(operation: Operation, target: impl Into<String>, cause: Cause) -> Self {
        HousekeepingError::Auth {
            operation,
            target: target.into(),
            cause,
        }
    }

    pub fn transfer(
        operation: Operation,
        repository: impl Into<String>,
        reference: impl Into<String>,
        cause: Cause,
    ) -> Self {
        HousekeepingError::Transfer {
            operation,
            repository: repository.into(),
            reference: reference.into(),
            cause,
        }
    }

    pub fn discovery(operation: Operation, target: impl Into<String>, cause: Cause) -> Self {
        HousekeepingError::Discovery {
            operation,
            target: target.into(),
            cause,
        }
    }

    pub fn delete(repository: impl Into<String>, tag: impl Into<String>, cause: Cause) -> Self {
        HousekeepingError::Delete {
            repository: repository.into(),
            tag: tag.into(),
            cause,
        }
    }

    /// The remote call that failed, if the error came from one
    pub fn operation(&self) -> Option<Operation> {
        match self {
            HousekeepingError::Config(_) => None,
            HousekeepingError::Auth { operation, .. }
            | HousekeepingError::Transfer { operation, .. }
            | HousekeepingError::Discovery { operation, .. } => Some(*operation),
            HousekeepingError::Delete { .. } => Some(Operation::DeleteTag),
        }
    }

    /// True for the one failure the pruner tolerates per repository
    pub fn is_tag_listing_failure(&self) -> bool {
        matches!(
            self,
            HousekeepingError::Discovery {
                operation: Operation::ListTags,
                ..
            }
        )
    }
}

impl From<url::ParseError> for HousekeepingError {
    fn from(err: url::ParseError) -> Self {
        HousekeepingError::Config(format!("invalid endpoint URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_listing_failures_are_distinguished_from_other_discovery_errors() {
        let listing = HousekeepingError::discovery(
            Operation::ListTags,
            "antidotelabs/vqfx",
            Cause::Status("404 Not Found".to_string()),
        );
        let metadata = HousekeepingError::discovery(
            Operation::TagMetadata,
            "antidotelabs/vqfx:preview-abc",
            Cause::Status("404 Not Found".to_string()),
        );

        assert!(listing.is_tag_listing_failure());
        assert!(!metadata.is_tag_listing_failure());
    }

    #[test]
    fn delete_error_names_the_tag() {
        let err = HousekeepingError::delete(
            "antidotelabs/vqfx",
            "preview-abc",
            Cause::Status("404 Not Found".to_string()),
        );

        assert_eq!(err.operation(), Some(Operation::DeleteTag));
        assert_eq!(
            err.to_string(),
            "Failed to delete tag preview-abc from antidotelabs/vqfx: unexpected status 404 Not Found"
        );
    }

    #[test]
    fn config_errors_have_no_operation() {
        let err = HousekeepingError::Config("DOCKERHUB_USERNAME not found in environment".into());
        assert_eq!(err.operation(), None);
    }
}
