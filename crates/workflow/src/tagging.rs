//! Deadline tagging.
//!
//! A tag freezes a student's submission at a deadline. It is created once and
//! never moved or recreated; a second attempt with the same name fails.

use course::{HostingClient, HostingError, Project, RefName, Tag, TagName};

/// Creates tag `name` on `target` in `project`.
///
/// Fails with an already-exists creation error if the tag exists, or another
/// creation error if `target` is not a valid ref. No idempotence is attempted.
#[tracing::instrument(skip_all, fields(project = %project.path_with_namespace, tag = %name, target = %target))]
pub async fn tag(
    client: &dyn HostingClient,
    project: &Project,
    name: &TagName,
    target: &RefName,
) -> Result<Tag, HostingError> {
    let tag = client.create_tag(project.id, name, target).await?;
    tracing::info!(commit = %tag.commit_id, "created deadline tag");
    Ok(tag)
}
