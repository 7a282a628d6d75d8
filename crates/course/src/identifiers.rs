//! Newtype domain identifiers.
//!
//! Every hosting-platform object that has an identity is represented as a
//! distinct newtype wrapping a primitive. This prevents accidentally passing a
//! [`ProjectId`] where a [`GroupId`] (the fork's target namespace) is expected,
//! even though both are `u64` under the hood.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (platform-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: platform-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// Identifies a group or subgroup (a namespace) on the hosting platform.
    ///
    /// Courses, the solutions group, and every student subgroup are groups.
    GroupId
}

u64_id! {
    /// Identifies a project (repository) on the hosting platform.
    ProjectId
}

u64_id! {
    /// Identifies a platform user account.
    UserId
}

u64_id! {
    /// Identifies a deploy key attached to a project.
    DeployKeyId
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single invocation of the course setup workflow.
///
/// Generated fresh for every run; attached to the setup span so all platform
/// calls from one run can be correlated in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SetupRunId(Uuid);

impl SetupRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`SetupRunId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for SetupRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Identifiers: String-backed (platform names and Git refs)
// ---------------------------------------------------------------------------

string_id! {
    /// A group name as displayed by the platform (e.g. `"solutions"`, `"alice"`).
    ///
    /// The workflow always creates groups whose path equals their name.
    GroupName
}

string_id! {
    /// A platform username. Student subgroups are named after it.
    Username
}

string_id! {
    /// A Git tag name (e.g. `"deadline-1"`).
    TagName
}

string_id! {
    /// Any Git ref a tag can point at: a branch name or a commit SHA.
    RefName
}

string_id! {
    /// A Git branch name (e.g. `"master"`).
    BranchName
}

impl From<Username> for GroupName {
    fn from(username: Username) -> Self {
        Self(username.0)
    }
}

impl From<BranchName> for RefName {
    fn from(branch: BranchName) -> Self {
        Self(branch.0)
    }
}
