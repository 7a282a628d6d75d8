//! GitLab infrastructure adapter.
//!
//! Implements the [`course::HostingClient`] and [`course::EnrollmentProvider`]
//! traits against the GitLab REST API (v4) using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. Authentication,
//! pagination, URL encoding, and the mapping from HTTP failures to
//! [`course::HostingErrorKind`] all live here; the `workflow` crate never sees
//! them.
//!
//! ## Error mapping
//!
//! | Response | Kind |
//! |----------|------|
//! | 401, 403 | `PermissionDenied` |
//! | 404 | `NotFound` |
//! | 409 | `AlreadyExists` |
//! | 400/422 with a `has already been taken` field error, or `... already exists` | `AlreadyExists` |
//! | anything else, transport failures | `Other` |
//!
//! Timeouts are set on the underlying HTTP client; no call is retried.

mod client;
mod errors;
mod models;

pub use client::{GitlabClient, GitlabConfig};
pub use errors::GitlabError;
