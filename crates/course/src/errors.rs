//! Error types for the provisioning domain.
//!
//! [`HostingError`] is the single error shape every [`crate::HostingClient`]
//! call returns. Adapters classify platform failures into a
//! [`HostingErrorKind`] at the boundary so the workflow's recovery branches
//! match on structure and never on message text.
//!
//! [`CourseError`] covers precondition failures that abort a whole setup run
//! before any student is provisioned.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Hosting-platform errors
// ---------------------------------------------------------------------------

/// Structured reason for a failed platform call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostingErrorKind {
    /// An object with the requested name, path, or identity already exists.
    AlreadyExists,
    /// The authenticated account may not perform the call.
    PermissionDenied,
    /// The addressed object does not exist (or is invisible to the caller).
    NotFound,
    /// Anything else: validation failures, server errors, transport failures.
    Other,
}

impl std::fmt::Display for HostingErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AlreadyExists => "already exists",
            Self::PermissionDenied => "permission denied",
            Self::NotFound => "not found",
            Self::Other => "platform error",
        };
        f.write_str(s)
    }
}

/// What the failed call was trying to do.
///
/// Creation failures are often expected (collisions, repeated forks) while
/// read and update failures usually are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostingAction {
    Create,
    Read,
    Update,
}

impl std::fmt::Display for HostingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
        };
        f.write_str(s)
    }
}

/// A failed hosting-platform call.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{action} failed ({kind}): {message}")]
pub struct HostingError {
    pub kind: HostingErrorKind,
    pub action: HostingAction,
    /// Platform-supplied description, for logs only.
    pub message: String,
}

impl HostingError {
    pub fn new(kind: HostingErrorKind, action: HostingAction, message: impl Into<String>) -> Self {
        Self {
            kind,
            action,
            message: message.into(),
        }
    }

    /// Shorthand for a creation failure.
    pub fn create(kind: HostingErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, HostingAction::Create, message)
    }

    /// Shorthand for a read failure.
    pub fn read(kind: HostingErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, HostingAction::Read, message)
    }

    /// Shorthand for an update failure.
    pub fn update(kind: HostingErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, HostingAction::Update, message)
    }

    /// Returns `true` if this is a creation failure.
    pub fn is_creation_failure(&self) -> bool {
        self.action == HostingAction::Create
    }

    /// Returns `true` if creation failed because the object already exists.
    pub fn is_already_exists(&self) -> bool {
        self.kind == HostingErrorKind::AlreadyExists
    }
}

// ---------------------------------------------------------------------------
// Course precondition errors
// ---------------------------------------------------------------------------

/// Errors that abort an entire setup run before provisioning begins.
#[derive(Debug, Error)]
pub enum CourseError {
    /// The course reference is malformed or does not resolve to a group.
    #[error("Invalid course '{reference}': {reason}")]
    InvalidCourse {
        /// The reference as supplied by configuration.
        reference: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The platform failed while resolving the course or its solutions
    /// infrastructure.
    #[error(transparent)]
    Hosting(#[from] HostingError),
}
