//! Core domain for per-student course provisioning.
//!
//! This crate contains every domain concept, newtype identifier, hosting-platform
//! value type, and error kind used by the provisioning workflow. The hosting
//! platform is the sole source of truth; nothing here caches or persists state.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** This crate has no I/O dependencies.
//! It defines *what* the workflow needs from the hosting platform
//! ([`HostingClient`]) and from the enrollment source ([`EnrollmentProvider`]);
//! infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`GroupId`, `ProjectId`, `Username`, etc.) |
//! | [`types`] | Platform value types (`Group`, `Project`, `DeployKey`, `Tag`, etc.) |
//! | [`errors`] | Structured hosting error kinds and course precondition errors |
//! | [`course`] | Course references and their resolution against the platform |
//! | [`ports`] | The `HostingClient` and `EnrollmentProvider` capability traits |

pub mod course;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use course::{resolve_course, CourseRef};
pub use errors::{CourseError, HostingAction, HostingError, HostingErrorKind};
pub use identifiers::{
    BranchName, DeployKeyId, GroupId, GroupName, ProjectId, RefName, SetupRunId, TagName, UserId,
    Username,
};
pub use ports::{EnrollmentProvider, HostingClient};
pub use types::{
    AccessLevel, Commit, CommitAction, DeployKey, DeployKeyMaterial, ForkHandle, Group, Member,
    Named, NewCommit, NewDeployKey, NewGroup, NewProject, Project, Student, Tag, Timestamp,
    Visibility,
};
