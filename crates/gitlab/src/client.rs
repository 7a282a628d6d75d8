//! [`GitlabClient`]: the REST v4 implementation of the hosting ports.

use std::time::Duration;

use async_trait::async_trait;
use course::{
    AccessLevel, Commit, CommitAction, DeployKey, DeployKeyId, EnrollmentProvider, ForkHandle,
    Group, GroupId, HostingAction, HostingClient, HostingError, HostingErrorKind, Member,
    NewCommit, NewDeployKey, NewGroup, NewProject, Project, ProjectId, RefName, Student, Tag,
    TagName, UserId, Username,
};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use url::Url;

use crate::errors::{from_response, from_transport, GitlabError};
use crate::models::{CommitDto, DeployKeyDto, GroupDto, IdDto, MemberDto, ProjectDto, TagDto};

/// Page size requested from list endpoints (GitLab's maximum).
const PER_PAGE: &str = "100";

/// Connection settings for a GitLab instance.
#[derive(Clone)]
pub struct GitlabConfig {
    /// Instance root, e.g. `https://gitlab.example.com`.
    pub base_url: Url,
    /// Personal, group, or project access token with `api` scope.
    pub token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for GitlabConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitlabConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// GitLab API client.
///
/// Calls are issued one at a time by the workflow; the client itself holds no
/// platform state beyond the connection pool.
pub struct GitlabClient {
    http: reqwest::Client,
    api: Url,
    token: String,
}

impl GitlabClient {
    pub fn new(config: GitlabConfig) -> Result<Self, GitlabError> {
        let api = api_root(&config.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("course-setup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            api,
            token: config.token,
        })
    }

    fn endpoint(
        &self,
        action: HostingAction,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, HostingError> {
        let mut url = self.api.join(path).map_err(|e| {
            HostingError::new(HostingErrorKind::Other, action, format!("bad endpoint {path}: {e}"))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// `{collection}/{full_path}` with the full path encoded as one segment.
    fn by_path(&self, collection: &str, full_path: &str) -> Result<Url, HostingError> {
        let action = HostingAction::Read;
        let mut url = self.endpoint(action, collection, &[])?;
        url.path_segments_mut()
            .map_err(|()| {
                HostingError::new(HostingErrorKind::Other, action, "API URL cannot have a path")
            })?
            .push(full_path);
        Ok(url)
    }

    async fn execute(
        &self,
        action: HostingAction,
        method: Method,
        url: Url,
        body: Option<Value>,
    ) -> Result<Response, HostingError> {
        tracing::debug!(%method, url = %url, "gitlab request");
        let mut request = self
            .http
            .request(method, url)
            .header("PRIVATE-TOKEN", &self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| from_transport(action, &e))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let err = from_response(action, status, &text);
        tracing::debug!(kind = %err.kind, error = %err.message, "gitlab request failed");
        Err(err)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        action: HostingAction,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, HostingError> {
        let url = self.endpoint(action, path, &[])?;
        let response = self.execute(action, method, url, body).await?;
        decode(action, response).await
    }

    async fn get_by_path<T: DeserializeOwned>(
        &self,
        collection: &str,
        full_path: &str,
    ) -> Result<T, HostingError> {
        let action = HostingAction::Read;
        let url = self.by_path(collection, full_path)?;
        let response = self.execute(action, Method::GET, url, None).await?;
        decode(action, response).await
    }

    /// GETs every page of a list endpoint.
    async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, HostingError> {
        let action = HostingAction::Read;
        let mut items = Vec::new();
        let mut page = "1".to_string();
        loop {
            let mut pairs = query.to_vec();
            pairs.push(("per_page", PER_PAGE));
            pairs.push(("page", page.as_str()));
            let url = self.endpoint(action, path, &pairs)?;
            let response = self.execute(action, Method::GET, url, None).await?;

            let next = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            items.extend(decode::<Vec<T>>(action, response).await?);

            match next {
                Some(next) => page = next,
                None => return Ok(items),
            }
        }
    }
}

/// `https://host/prefix` → `https://host/prefix/api/v4/`.
fn api_root(base: &Url) -> Result<Url, GitlabError> {
    if !matches!(base.scheme(), "http" | "https") {
        return Err(GitlabError::InvalidUrl {
            url: base.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let path = format!("{}/", root.path());
        root.set_path(&path);
    }
    root.join("api/v4/").map_err(|e| GitlabError::InvalidUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

async fn decode<T: DeserializeOwned>(
    action: HostingAction,
    response: Response,
) -> Result<T, HostingError> {
    response.json::<T>().await.map_err(|e| {
        HostingError::new(HostingErrorKind::Other, action, format!("unexpected response body: {e}"))
    })
}

fn commit_body(commit: &NewCommit) -> Value {
    let actions: Vec<Value> = commit
        .actions
        .iter()
        .map(|action| match action {
            CommitAction::Create { file_path, content } => json!({
                "action": "create",
                "file_path": file_path,
                "content": content,
            }),
        })
        .collect();
    json!({
        "branch": commit.branch,
        "commit_message": commit.message,
        "actions": actions,
    })
}

fn settings_body(project: &Project) -> Value {
    let registry = if project.container_registry_enabled {
        "enabled"
    } else {
        "disabled"
    };
    json!({
        "visibility": project.visibility,
        "container_registry_enabled": project.container_registry_enabled,
        "container_registry_access_level": registry,
        "lfs_enabled": project.lfs_enabled,
    })
}

#[async_trait]
impl HostingClient for GitlabClient {
    async fn create_group(&self, group: &NewGroup) -> Result<Group, HostingError> {
        let dto: GroupDto = self
            .call(HostingAction::Create, Method::POST, "groups", Some(json!(group)))
            .await?;
        Ok(dto.into())
    }

    async fn get_group(&self, id: GroupId) -> Result<Group, HostingError> {
        let dto: GroupDto = self
            .call(HostingAction::Read, Method::GET, &format!("groups/{id}"), None)
            .await?;
        Ok(dto.into())
    }

    async fn get_group_by_path(&self, full_path: &str) -> Result<Group, HostingError> {
        let dto: GroupDto = self.get_by_path("groups", full_path).await?;
        Ok(dto.into())
    }

    async fn list_subgroups(
        &self,
        parent: GroupId,
        search: &str,
    ) -> Result<Vec<Group>, HostingError> {
        let groups: Vec<GroupDto> = self
            .list(&format!("groups/{parent}/subgroups"), &[("search", search)])
            .await?;
        Ok(groups.into_iter().map(Group::from).collect())
    }

    async fn add_group_member(
        &self,
        group: GroupId,
        user: UserId,
        access_level: AccessLevel,
    ) -> Result<Member, HostingError> {
        let body = json!({"user_id": user, "access_level": access_level.code()});
        let dto: MemberDto = self
            .call(
                HostingAction::Create,
                Method::POST,
                &format!("groups/{group}/members"),
                Some(body),
            )
            .await?;
        let username = Username::new(dto.username.clone()).ok_or_else(|| {
            HostingError::create(HostingErrorKind::Other, "member without username")
        })?;
        Ok(Member {
            user_id: UserId::new(dto.id),
            username,
            access_level: dto.access_level().unwrap_or(access_level),
        })
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, HostingError> {
        let dto: ProjectDto = self
            .call(HostingAction::Create, Method::POST, "projects", Some(json!(project)))
            .await?;
        Ok(dto.into())
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, HostingError> {
        let dto: ProjectDto = self
            .call(HostingAction::Read, Method::GET, &format!("projects/{id}"), None)
            .await?;
        Ok(dto.into())
    }

    async fn get_project_by_path(
        &self,
        path_with_namespace: &str,
    ) -> Result<Project, HostingError> {
        let dto: ProjectDto = self.get_by_path("projects", path_with_namespace).await?;
        Ok(dto.into())
    }

    async fn list_group_projects(
        &self,
        namespace: GroupId,
        search: &str,
    ) -> Result<Vec<Project>, HostingError> {
        let projects: Vec<ProjectDto> = self
            .list(&format!("groups/{namespace}/projects"), &[("search", search)])
            .await?;
        Ok(projects.into_iter().map(Project::from).collect())
    }

    async fn fork_project(
        &self,
        source: ProjectId,
        namespace: GroupId,
    ) -> Result<ForkHandle, HostingError> {
        let dto: IdDto = self
            .call(
                HostingAction::Create,
                Method::POST,
                &format!("projects/{source}/fork"),
                Some(json!({"namespace_id": namespace})),
            )
            .await?;
        Ok(ForkHandle {
            id: ProjectId::new(dto.id),
        })
    }

    async fn save_project(&self, project: &Project) -> Result<Project, HostingError> {
        let dto: ProjectDto = self
            .call(
                HostingAction::Update,
                Method::PUT,
                &format!("projects/{}", project.id),
                Some(settings_body(project)),
            )
            .await?;
        Ok(dto.into())
    }

    async fn create_commit(
        &self,
        project: ProjectId,
        commit: &NewCommit,
    ) -> Result<Commit, HostingError> {
        let dto: CommitDto = self
            .call(
                HostingAction::Create,
                Method::POST,
                &format!("projects/{project}/repository/commits"),
                Some(commit_body(commit)),
            )
            .await?;
        Ok(dto.into())
    }

    async fn create_deploy_key(
        &self,
        project: ProjectId,
        key: &NewDeployKey,
    ) -> Result<DeployKey, HostingError> {
        let dto: DeployKeyDto = self
            .call(
                HostingAction::Create,
                Method::POST,
                &format!("projects/{project}/deploy_keys"),
                Some(json!(key)),
            )
            .await?;
        // Reported as enabled only once `enable_deploy_key` succeeds.
        Ok(dto.into_key(false))
    }

    async fn enable_deploy_key(
        &self,
        project: ProjectId,
        key: DeployKeyId,
    ) -> Result<DeployKey, HostingError> {
        let dto: DeployKeyDto = self
            .call(
                HostingAction::Update,
                Method::POST,
                &format!("projects/{project}/deploy_keys/{key}/enable"),
                None,
            )
            .await?;
        Ok(dto.into_key(true))
    }

    async fn create_tag(
        &self,
        project: ProjectId,
        name: &TagName,
        target: &RefName,
    ) -> Result<Tag, HostingError> {
        let dto: TagDto = self
            .call(
                HostingAction::Create,
                Method::POST,
                &format!("projects/{project}/repository/tags"),
                Some(json!({"tag_name": name, "ref": target})),
            )
            .await?;
        Ok(dto.into_tag(name, target))
    }
}

#[async_trait]
impl EnrollmentProvider for GitlabClient {
    #[tracing::instrument(skip_all, fields(course = %course.full_path))]
    async fn enrolled_students(&self, course: &Group) -> Result<Vec<Student>, HostingError> {
        let members: Vec<MemberDto> = self.list(&format!("groups/{}/members", course.id), &[]).await?;
        let mut students: Vec<Student> = members
            .into_iter()
            .filter_map(MemberDto::into_student)
            .collect();
        students.sort_by(|a, b| a.username.cmp(&b.username));
        tracing::debug!(count = students.len(), "resolved enrolled students");
        Ok(students)
    }
}
