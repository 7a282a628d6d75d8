//! Hosting-platform value types.
//!
//! Every object here is owned and persisted by the hosting platform. The
//! workflow only ever holds short-lived copies returned by a
//! [`crate::HostingClient`] call; it never caches them across runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    BranchName, DeployKeyId, GroupId, GroupName, ProjectId, RefName, TagName, UserId, Username,
};

// ---------------------------------------------------------------------------
// Exact-name matching
// ---------------------------------------------------------------------------

/// A platform object that can be matched by its exact display name.
///
/// Platform search endpoints match substrings, so every search result must be
/// filtered through [`Named::name`] equality before it is trusted.
pub trait Named {
    /// Returns the object's display name.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Permissions and visibility
// ---------------------------------------------------------------------------

/// Membership role within a group, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Guest,
    Reporter,
    /// May push code but not administer. Students get this on their own subgroup.
    Developer,
    Maintainer,
    Owner,
}

impl AccessLevel {
    /// Returns the platform's numeric code for this level.
    pub fn code(self) -> u8 {
        match self {
            Self::Guest => 10,
            Self::Reporter => 20,
            Self::Developer => 30,
            Self::Maintainer => 40,
            Self::Owner => 50,
        }
    }

    /// Maps a numeric platform code back to a level.
    ///
    /// Codes without a matching level (e.g. minimal access `5`) yield `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            10 => Some(Self::Guest),
            20 => Some(Self::Reporter),
            30 => Some(Self::Developer),
            40 => Some(Self::Maintainer),
            50 => Some(Self::Owner),
            _ => None,
        }
    }
}

/// Project visibility level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Groups and members
// ---------------------------------------------------------------------------

/// A group or subgroup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// URL path segment of this group (last component of `full_path`).
    pub path: String,
    /// Slash-separated path from the top-level namespace (e.g. `"course/solutions"`).
    pub full_path: String,
    /// `None` for top-level groups.
    pub parent_id: Option<GroupId>,
}

impl Named for Group {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Request payload for creating a (sub)group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGroup {
    pub name: GroupName,
    pub path: GroupName,
    pub parent_id: GroupId,
}

impl NewGroup {
    /// A subgroup of `parent` whose path equals its name.
    pub fn subgroup(name: GroupName, parent_id: GroupId) -> Self {
        Self {
            path: name.clone(),
            name,
            parent_id,
        }
    }
}

/// A user's membership in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: UserId,
    pub username: Username,
    pub access_level: AccessLevel,
}

/// An enrolled student as yielded by the [`crate::EnrollmentProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Student {
    pub id: UserId,
    pub username: Username,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

/// A project (repository) together with the mutable settings the workflow manages.
///
/// Settings changed on this value take effect only once passed to
/// [`crate::HostingClient::save_project`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub path_with_namespace: String,
    pub namespace_id: GroupId,
    pub visibility: Visibility,
    pub container_registry_enabled: bool,
    pub lfs_enabled: bool,
    /// The project this one was forked from, if any.
    pub forked_from: Option<ProjectId>,
}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Request payload for creating a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProject {
    pub name: String,
    pub namespace_id: GroupId,
    pub visibility: Visibility,
}

/// The partial object returned by a fork request.
///
/// Fork creation is asynchronous on the platform side; the full [`Project`]
/// must be re-fetched by id before it is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForkHandle {
    pub id: ProjectId,
}

// ---------------------------------------------------------------------------
// Deploy keys
// ---------------------------------------------------------------------------

/// Public key material for the grading system's deploy key.
///
/// Surrounding whitespace is stripped; the content is otherwise opaque and
/// validated by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeployKeyMaterial(String);

impl DeployKeyMaterial {
    /// Returns `None` if the key is empty after trimming.
    pub fn new(key: impl AsRef<str>) -> Option<Self> {
        let trimmed = key.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Request payload for creating a deploy key on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDeployKey {
    pub title: String,
    pub key: DeployKeyMaterial,
    /// Grants write access in addition to read.
    pub can_push: bool,
}

/// A deploy key attached to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployKey {
    pub id: DeployKeyId,
    pub title: String,
    pub can_push: bool,
    /// Whether the key is enabled for the project it is attached to.
    pub enabled: bool,
}

// ---------------------------------------------------------------------------
// Commits and tags
// ---------------------------------------------------------------------------

/// One file operation within a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CommitAction {
    Create { file_path: String, content: String },
}

/// Request payload for committing file actions to a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCommit {
    pub branch: BranchName,
    pub message: String,
    pub actions: Vec<CommitAction>,
}

/// A commit created on the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub message: String,
}

/// An immutable named pointer into a project's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: TagName,
    /// The ref the tag was requested on.
    pub target_ref: RefName,
    /// Commit SHA the tag resolved to.
    pub commit_id: String,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
