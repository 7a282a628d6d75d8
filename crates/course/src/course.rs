//! Course references.
//!
//! A course is a top-level (or nested) group, configured either by its numeric
//! id or by its full path. Malformed references and references that do not
//! resolve are both reported as [`CourseError::InvalidCourse`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CourseError, Group, GroupId, HostingClient, HostingErrorKind};

/// How a course group is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseRef {
    Id(GroupId),
    /// Full slash-separated group path, e.g. `"teaching/algorithms-2026"`.
    Path(String),
}

impl FromStr for CourseRef {
    type Err = CourseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CourseError::InvalidCourse {
            reference: s.to_string(),
            reason: reason.to_string(),
        };

        if s.is_empty() {
            return Err(invalid("reference is empty"));
        }
        if s.chars().all(|c| c.is_ascii_digit()) {
            let id = s.parse::<u64>().map_err(|_| invalid("group id out of range"))?;
            return Ok(Self::Id(GroupId::new(id)));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(invalid("path contains whitespace"));
        }
        if s.split('/').any(str::is_empty) {
            return Err(invalid("path has an empty segment"));
        }
        Ok(Self::Path(s.to_string()))
    }
}

impl std::fmt::Display for CourseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

/// Fetches the course group a reference points at.
///
/// A reference that does not resolve becomes [`CourseError::InvalidCourse`];
/// other platform failures are passed through.
#[tracing::instrument(skip(client))]
pub async fn resolve_course(
    client: &dyn HostingClient,
    course: &CourseRef,
) -> Result<Group, CourseError> {
    let result = match course {
        CourseRef::Id(id) => client.get_group(*id).await,
        CourseRef::Path(path) => client.get_group_by_path(path).await,
    };

    match result {
        Ok(group) => Ok(group),
        Err(e) if e.kind == HostingErrorKind::NotFound => Err(CourseError::InvalidCourse {
            reference: course.to_string(),
            reason: "no such group".to_string(),
        }),
        Err(e) => Err(e.into()),
    }
}
