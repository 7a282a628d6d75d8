//! Capability traits the workflow needs from its external collaborators.
//!
//! The workflow receives these as explicit `&dyn` parameters; there is no
//! process-wide platform session.
//!
//! ## Search semantics
//!
//! The listing calls taking a `search` argument match **substrings** of names.
//! Callers must filter results for exact name equality (see [`crate::Named`])
//! and must not rely on result order.

use async_trait::async_trait;

use crate::{
    AccessLevel, Commit, DeployKey, DeployKeyId, ForkHandle, Group, GroupId, HostingError, Member,
    NewCommit, NewDeployKey, NewGroup, NewProject, Project, ProjectId, RefName, Student, Tag,
    TagName, UserId,
};

/// Group, project, membership, key, and tag operations on the hosting platform.
///
/// Every method performs at least one network call. Timeouts and transport
/// retries are the implementor's concern; the workflow never retries.
#[async_trait]
pub trait HostingClient: Send + Sync {
    // -- groups -------------------------------------------------------------

    /// Creates a subgroup.
    ///
    /// Fails with [`crate::HostingErrorKind::AlreadyExists`] if a group with
    /// the same path already exists under the parent.
    async fn create_group(&self, group: &NewGroup) -> Result<Group, HostingError>;

    async fn get_group(&self, id: GroupId) -> Result<Group, HostingError>;

    /// Fetches a group by its full slash-separated path.
    async fn get_group_by_path(&self, full_path: &str) -> Result<Group, HostingError>;

    /// Lists direct subgroups of `parent` whose name contains `search`.
    async fn list_subgroups(&self, parent: GroupId, search: &str)
        -> Result<Vec<Group>, HostingError>;

    /// Adds a user to a group.
    ///
    /// Fails if the user already is a member or the caller lacks permission.
    async fn add_group_member(
        &self,
        group: GroupId,
        user: UserId,
        access_level: AccessLevel,
    ) -> Result<Member, HostingError>;

    // -- projects -----------------------------------------------------------

    async fn create_project(&self, project: &NewProject) -> Result<Project, HostingError>;

    async fn get_project(&self, id: ProjectId) -> Result<Project, HostingError>;

    /// Fetches a project by its `namespace/path` form.
    async fn get_project_by_path(&self, path_with_namespace: &str)
        -> Result<Project, HostingError>;

    /// Lists projects directly in `namespace` whose name contains `search`.
    async fn list_group_projects(
        &self,
        namespace: GroupId,
        search: &str,
    ) -> Result<Vec<Project>, HostingError>;

    /// Requests a fork of `source` into `namespace`.
    ///
    /// The returned handle is partial; re-fetch with [`Self::get_project`].
    async fn fork_project(
        &self,
        source: ProjectId,
        namespace: GroupId,
    ) -> Result<ForkHandle, HostingError>;

    /// Persists `visibility`, `container_registry_enabled`, and `lfs_enabled`.
    async fn save_project(&self, project: &Project) -> Result<Project, HostingError>;

    /// Commits file actions, creating the branch if the repository is empty.
    async fn create_commit(
        &self,
        project: ProjectId,
        commit: &NewCommit,
    ) -> Result<Commit, HostingError>;

    // -- keys and tags ------------------------------------------------------

    async fn create_deploy_key(
        &self,
        project: ProjectId,
        key: &NewDeployKey,
    ) -> Result<DeployKey, HostingError>;

    /// Enables an existing deploy key for `project`; the result has `enabled == true`.
    async fn enable_deploy_key(
        &self,
        project: ProjectId,
        key: DeployKeyId,
    ) -> Result<DeployKey, HostingError>;

    /// Creates a tag on `target`.
    ///
    /// Fails with [`crate::HostingErrorKind::AlreadyExists`] if the tag exists,
    /// or another creation failure if the ref is invalid.
    async fn create_tag(
        &self,
        project: ProjectId,
        name: &TagName,
        target: &RefName,
    ) -> Result<Tag, HostingError>;
}

/// Source of the students enrolled in a course.
#[async_trait]
pub trait EnrollmentProvider: Send + Sync {
    async fn enrolled_students(&self, course: &Group) -> Result<Vec<Student>, HostingError>;
}
