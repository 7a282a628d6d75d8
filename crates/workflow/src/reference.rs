//! Reference Solution Manager.
//!
//! Ensures exactly one solutions subgroup exists under a course and exactly one
//! reference project exists inside it. Both are located by exact-name search on
//! every run; nothing is cached between runs.

use course::{
    CommitAction, Group, HostingClient, HostingError, NewCommit, NewGroup, NewProject, Project,
};
use serde::Serialize;

use crate::lookup::{find_or_create, Resolution};
use crate::SetupOptions;

/// The solutions group and the reference project every student forks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceSolution {
    pub group: Group,
    pub project: Project,
    pub group_resolution: Resolution,
    pub project_resolution: Resolution,
}

/// Finds or creates the solutions group and reference project under `course`.
///
/// Running this twice never creates a second group or project.
#[tracing::instrument(skip_all, fields(course = %course.full_path))]
pub async fn ensure_reference(
    client: &dyn HostingClient,
    course: &Group,
    options: &SetupOptions,
) -> Result<ReferenceSolution, HostingError> {
    let (group, group_resolution) = ensure_solutions_group(client, course, options).await?;

    let name = options.solutions_name.as_str();
    let (project, project_resolution) = find_or_create(
        name,
        client.list_group_projects(group.id, name),
        || create_reference_project(client, &group, options),
    )
    .await?;

    if project_resolution == Resolution::Found {
        tracing::debug!(project = %project.path_with_namespace, "reusing reference project");
    }

    Ok(ReferenceSolution {
        group,
        project,
        group_resolution,
        project_resolution,
    })
}

/// Finds or creates the solutions subgroup of `course`.
pub async fn ensure_solutions_group(
    client: &dyn HostingClient,
    course: &Group,
    options: &SetupOptions,
) -> Result<(Group, Resolution), HostingError> {
    let name = options.solutions_name.as_str();
    let (group, resolution) = find_or_create(
        name,
        client.list_subgroups(course.id, name),
        || create_solutions_group(client, course, options),
    )
    .await?;

    if resolution == Resolution::Found {
        tracing::debug!(group = %group.full_path, "reusing solutions group");
    }
    Ok((group, resolution))
}

/// Creates the solutions subgroup of `course` unconditionally.
pub async fn create_solutions_group(
    client: &dyn HostingClient,
    course: &Group,
    options: &SetupOptions,
) -> Result<Group, HostingError> {
    let request = NewGroup::subgroup(options.solutions_name.clone(), course.id);
    let group = client.create_group(&request).await?;
    tracing::info!(group = %group.full_path, "created solutions group");
    Ok(group)
}

/// Creates the reference project in `group` and seeds it with a placeholder README.
async fn create_reference_project(
    client: &dyn HostingClient,
    group: &Group,
    options: &SetupOptions,
) -> Result<Project, HostingError> {
    let project = client
        .create_project(&NewProject {
            name: options.solutions_name.to_string(),
            namespace_id: group.id,
            visibility: options.reference_visibility,
        })
        .await?;

    let seed = NewCommit {
        branch: options.reference_branch.clone(),
        message: options.seed_commit_message.clone(),
        actions: vec![CommitAction::Create {
            file_path: "README.md".to_string(),
            content: options.readme_content.clone(),
        }],
    };
    client.create_commit(project.id, &seed).await?;

    tracing::info!(
        project = %project.path_with_namespace,
        branch = %options.reference_branch,
        "created reference project"
    );
    Ok(project)
}
