//! Student Project Provisioner.
//!
//! For one student: create (or adopt) a subgroup named after the username,
//! grant the student developer access to it, and fork the reference project
//! into it with the grading system's deploy key installed.
//!
//! ## Failure classification
//!
//! | Step | Failure | Handling |
//! |------|---------|----------|
//! | Subgroup | already exists, exact match found | adopt existing subgroup |
//! | Subgroup | already exists, no exact match | return the original error |
//! | Membership | any | warn, continue |
//! | Fork / deploy key | creation failure | warn, return [`ProvisionOutcome::ForkSkipped`] |
//! | Re-fetch / key enable / save | any | return the error |
//!
//! A rejected deploy key leaves the fork in place with the reference's
//! visibility and features, since the settings are saved last. Later runs see
//! the fork as already existing and skip it, so such a fork needs manual
//! cleanup.
//!
//! Nothing is retried within a run; the next run starts again from the
//! subgroup step and adopts what already exists.

use course::{
    AccessLevel, DeployKey, Group, HostingClient, HostingError, NewDeployKey, NewGroup, Project,
    Student, Visibility,
};
use serde::Serialize;

use crate::lookup::{create_or_adopt, Resolution};
use crate::GraderKey;

/// Result of provisioning one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    /// The fork exists, is private, and carries an enabled deploy key.
    Provisioned {
        subgroup: Group,
        subgroup_resolution: Resolution,
        project: Project,
        deploy_key: DeployKey,
        /// Set when the membership step failed; the student may lack access.
        membership_warning: Option<String>,
    },
    /// The fork step was rejected by the platform; the next run retries it.
    ForkSkipped {
        subgroup: Group,
        subgroup_resolution: Resolution,
        reason: String,
        membership_warning: Option<String>,
    },
}

impl ProvisionOutcome {
    /// The student subgroup, whether the fork succeeded or not.
    pub fn subgroup(&self) -> &Group {
        match self {
            Self::Provisioned { subgroup, .. } | Self::ForkSkipped { subgroup, .. } => subgroup,
        }
    }

    pub fn is_provisioned(&self) -> bool {
        matches!(self, Self::Provisioned { .. })
    }
}

/// Provisions `student` under `solutions_group`.
///
/// Expected partial failures are logged and reflected in the outcome. An
/// `Err` means something unexpected happened; the caller decides whether to
/// continue with other students.
#[tracing::instrument(skip_all, fields(student = %student.username))]
pub async fn provision(
    client: &dyn HostingClient,
    solutions_group: &Group,
    student: &Student,
    reference: &Project,
    key: &GraderKey,
) -> Result<ProvisionOutcome, HostingError> {
    let name = student.username.as_str();
    let request = NewGroup::subgroup(student.username.clone().into(), solutions_group.id);

    let (subgroup, subgroup_resolution) = create_or_adopt(
        name,
        client.create_group(&request),
        || client.list_subgroups(solutions_group.id, name),
    )
    .await?;

    match subgroup_resolution {
        Resolution::Created => tracing::info!(group = %subgroup.full_path, "created student subgroup"),
        Resolution::Found => tracing::info!(group = %subgroup.full_path, "adopted existing student subgroup"),
    }

    let membership_warning = match client
        .add_group_member(subgroup.id, student.id, AccessLevel::Developer)
        .await
    {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(
                operation = "add_member",
                error = %e,
                "failed to add student to its own group"
            );
            Some(e.to_string())
        }
    };

    match fork_reference(client, reference, &subgroup, key).await {
        Ok((project, deploy_key)) => Ok(ProvisionOutcome::Provisioned {
            subgroup,
            subgroup_resolution,
            project,
            deploy_key,
            membership_warning,
        }),
        Err(e) if e.is_creation_failure() => {
            tracing::warn!(operation = "fork", error = %e.message, "fork setup skipped");
            Ok(ProvisionOutcome::ForkSkipped {
                subgroup,
                subgroup_resolution,
                reason: e.message,
                membership_warning,
            })
        }
        Err(e) => Err(e),
    }
}

/// Forks `reference` into `namespace`, locks the fork down, and installs the deploy key.
///
/// Returns the saved project and the enabled key.
pub async fn fork_reference(
    client: &dyn HostingClient,
    reference: &Project,
    namespace: &Group,
    key: &GraderKey,
) -> Result<(Project, DeployKey), HostingError> {
    let fork = client.fork_project(reference.id, namespace.id).await?;

    // The fork response is partial; mutate only the fully fetched project.
    let mut project = client.get_project(fork.id).await?;
    project.visibility = Visibility::Private;
    project.container_registry_enabled = false;
    project.lfs_enabled = false;

    let created = client
        .create_deploy_key(
            project.id,
            &NewDeployKey {
                title: key.title.clone(),
                key: key.material.clone(),
                can_push: key.can_push,
            },
        )
        .await?;
    let deploy_key = client.enable_deploy_key(project.id, created.id).await?;

    let project = client.save_project(&project).await?;
    tracing::info!(
        project = %project.path_with_namespace,
        deploy_key = %deploy_key.id,
        "forked reference project"
    );
    Ok((project, deploy_key))
}
