//! In-memory hosting platform used by the workflow integration tests.
//!
//! Mirrors the platform behaviours the workflow depends on: substring search,
//! path collisions under a parent, partial fork handles, disabled-by-default
//! deploy keys, and tag uniqueness. Individual calls can be made to fail.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use course::{
    AccessLevel, Commit, CommitAction, DeployKey, DeployKeyId, EnrollmentProvider, ForkHandle,
    Group, GroupId, HostingClient, HostingError, HostingErrorKind, Member, NewCommit,
    NewDeployKey, NewGroup, NewProject, Project, ProjectId, RefName, Student, Tag, TagName,
    UserId, Username, Visibility,
};

/// The course is always the first object the fake hands out.
pub fn course_id() -> GroupId {
    GroupId::new(1)
}

#[derive(Debug, Clone)]
pub struct StoredKey {
    pub project: ProjectId,
    pub key: DeployKey,
    pub material: String,
}

#[derive(Default)]
pub struct State {
    next_id: u64,
    pub groups: Vec<Group>,
    pub projects: Vec<Project>,
    pub members: Vec<(GroupId, Member)>,
    pub keys: Vec<StoredKey>,
    pub tags: HashMap<ProjectId, Vec<Tag>>,
    pub commits: HashMap<ProjectId, Vec<NewCommit>>,
    /// Head commit per (project, branch).
    branches: HashMap<(ProjectId, String), String>,
    pub students: Vec<Student>,
    /// Every call, in order, as `"method:detail"`.
    pub calls: Vec<String>,

    // -- failure injection --------------------------------------------------
    /// Namespace paths whose fork requests are rejected.
    pub reject_forks_into: HashSet<String>,
    /// Namespace paths whose fork re-fetch fails with a read error.
    pub fail_refetch_in: HashSet<String>,
    /// Namespace paths whose deploy key creation is rejected.
    pub fail_key_create_in: HashSet<String>,
    /// Namespace paths whose deploy key cannot be enabled.
    pub fail_key_enable_in: HashSet<String>,
    /// Names left out of subgroup search results.
    pub hidden_from_search: HashSet<String>,
    /// Fail every group lookup by id or path with a permission error.
    pub deny_group_lookup: bool,
    /// Fail every membership call with a permission error.
    pub deny_membership: bool,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn group(&self, id: GroupId) -> Result<&Group, HostingError> {
        self.groups
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| HostingError::read(HostingErrorKind::NotFound, "404 Group Not Found"))
    }

    fn project_index(&self, id: ProjectId) -> Result<usize, HostingError> {
        self.projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| HostingError::read(HostingErrorKind::NotFound, "404 Project Not Found"))
    }

    fn namespace_path_of(&self, project: ProjectId) -> Result<String, HostingError> {
        let index = self.project_index(project)?;
        Ok(self.group(self.projects[index].namespace_id)?.full_path.clone())
    }

    fn insert_group(&mut self, name: &str, path: &str, parent: Option<GroupId>) -> Group {
        let full_path = match parent.and_then(|id| self.group(id).ok()) {
            Some(p) => format!("{}/{}", p.full_path, path),
            None => path.to_string(),
        };
        let group = Group {
            id: GroupId::new(self.next_id()),
            name: name.to_string(),
            path: path.to_string(),
            full_path,
            parent_id: parent,
        };
        self.groups.push(group.clone());
        group
    }

    fn insert_project(
        &mut self,
        name: &str,
        namespace: GroupId,
        visibility: Visibility,
        forked_from: Option<ProjectId>,
    ) -> Result<Project, HostingError> {
        let ns_path = self.group(namespace)?.full_path.clone();
        let project = Project {
            id: ProjectId::new(self.next_id()),
            name: name.to_string(),
            path_with_namespace: format!("{ns_path}/{name}"),
            namespace_id: namespace,
            visibility,
            container_registry_enabled: true,
            lfs_enabled: true,
            forked_from,
        };
        self.projects.push(project.clone());
        Ok(project)
    }
}

/// Fake hosting platform with a single course group `teaching/course`.
pub struct FakeHosting {
    pub state: Mutex<State>,
}

impl FakeHosting {
    pub fn new() -> Self {
        let mut state = State::default();
        let course = state.insert_group("course", "teaching/course", None);
        assert_eq!(course.id, course_id());
        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn course(&self) -> Group {
        self.state.lock().await.groups[0].clone()
    }

    pub async fn enroll(&self, id: u64, username: &str) -> Student {
        let student = Student {
            id: UserId::new(id),
            username: Username::new(username).unwrap(),
        };
        self.state.lock().await.students.push(student.clone());
        student
    }

    /// Creates a subgroup directly, as a previous (partial) run would have.
    pub async fn seed_subgroup(&self, name: &str, parent: GroupId) -> Group {
        self.state.lock().await.insert_group(name, name, Some(parent))
    }

    /// Creates a project directly, bypassing the workflow.
    pub async fn seed_project(&self, name: &str, namespace: GroupId) -> Project {
        self.state
            .lock()
            .await
            .insert_project(name, namespace, Visibility::Internal, None)
            .unwrap()
    }

    pub async fn groups_named(&self, name: &str) -> Vec<Group> {
        let state = self.state.lock().await;
        state.groups.iter().filter(|g| g.name == name).cloned().collect()
    }

    pub async fn projects_in(&self, namespace: GroupId) -> Vec<Project> {
        let state = self.state.lock().await;
        state
            .projects
            .iter()
            .filter(|p| p.namespace_id == namespace)
            .cloned()
            .collect()
    }

    pub async fn keys_of(&self, project: ProjectId) -> Vec<StoredKey> {
        let state = self.state.lock().await;
        state.keys.iter().filter(|k| k.project == project).cloned().collect()
    }

    pub async fn members_of(&self, group: GroupId) -> Vec<Member> {
        let state = self.state.lock().await;
        state
            .members
            .iter()
            .filter(|(g, _)| *g == group)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub async fn calls(&self) -> Vec<String> {
        self.state.lock().await.calls.clone()
    }
}

#[async_trait]
impl HostingClient for FakeHosting {
    async fn create_group(&self, group: &NewGroup) -> Result<Group, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("create_group:{}", group.name));
        state.group(group.parent_id).map_err(|e| HostingError::create(e.kind, e.message))?;
        let taken = state
            .groups
            .iter()
            .any(|g| g.parent_id == Some(group.parent_id) && g.path == group.path.as_str());
        if taken {
            return Err(HostingError::create(
                HostingErrorKind::AlreadyExists,
                "path has already been taken",
            ));
        }
        Ok(state.insert_group(group.name.as_str(), group.path.as_str(), Some(group.parent_id)))
    }

    async fn get_group(&self, id: GroupId) -> Result<Group, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("get_group:{id}"));
        if state.deny_group_lookup {
            return Err(HostingError::read(HostingErrorKind::PermissionDenied, "403 Forbidden"));
        }
        state.group(id).cloned()
    }

    async fn get_group_by_path(&self, full_path: &str) -> Result<Group, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("get_group_by_path:{full_path}"));
        if state.deny_group_lookup {
            return Err(HostingError::read(HostingErrorKind::PermissionDenied, "403 Forbidden"));
        }
        state
            .groups
            .iter()
            .find(|g| g.full_path == full_path)
            .cloned()
            .ok_or_else(|| HostingError::read(HostingErrorKind::NotFound, "404 Group Not Found"))
    }

    async fn list_subgroups(
        &self,
        parent: GroupId,
        search: &str,
    ) -> Result<Vec<Group>, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("list_subgroups:{search}"));
        let mut found: Vec<Group> = state
            .groups
            .iter()
            .filter(|g| g.parent_id == Some(parent))
            .filter(|g| g.name.contains(search))
            .filter(|g| !state.hidden_from_search.contains(&g.name))
            .cloned()
            .collect();
        // Exact matches last, so callers relying on order pick the wrong one.
        found.sort_by_key(|g| g.name == search);
        Ok(found)
    }

    async fn add_group_member(
        &self,
        group: GroupId,
        user: UserId,
        access_level: AccessLevel,
    ) -> Result<Member, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("add_group_member:{group}:{user}"));
        if state.deny_membership {
            return Err(HostingError::create(HostingErrorKind::PermissionDenied, "403 Forbidden"));
        }
        if state.members.iter().any(|(g, m)| *g == group && m.user_id == user) {
            return Err(HostingError::create(
                HostingErrorKind::AlreadyExists,
                "Member already exists",
            ));
        }
        let username = state
            .students
            .iter()
            .find(|s| s.id == user)
            .map(|s| s.username.clone())
            .ok_or_else(|| HostingError::create(HostingErrorKind::NotFound, "404 User Not Found"))?;
        let member = Member {
            user_id: user,
            username,
            access_level,
        };
        state.members.push((group, member.clone()));
        Ok(member)
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("create_project:{}", project.name));
        let taken = state
            .projects
            .iter()
            .any(|p| p.namespace_id == project.namespace_id && p.name == project.name);
        if taken {
            return Err(HostingError::create(
                HostingErrorKind::AlreadyExists,
                "name has already been taken",
            ));
        }
        state
            .insert_project(&project.name, project.namespace_id, project.visibility, None)
            .map_err(|e| HostingError::create(e.kind, e.message))
    }

    async fn get_project(&self, id: ProjectId) -> Result<Project, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("get_project:{id}"));
        let index = state.project_index(id)?;
        let project = state.projects[index].clone();
        let ns_path = state.group(project.namespace_id)?.full_path.clone();
        if state.fail_refetch_in.contains(&ns_path) {
            return Err(HostingError::read(HostingErrorKind::Other, "500 Internal Server Error"));
        }
        Ok(project)
    }

    async fn get_project_by_path(&self, path_with_namespace: &str) -> Result<Project, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("get_project_by_path:{path_with_namespace}"));
        state
            .projects
            .iter()
            .find(|p| p.path_with_namespace == path_with_namespace)
            .cloned()
            .ok_or_else(|| HostingError::read(HostingErrorKind::NotFound, "404 Project Not Found"))
    }

    async fn list_group_projects(
        &self,
        namespace: GroupId,
        search: &str,
    ) -> Result<Vec<Project>, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("list_group_projects:{search}"));
        let mut found: Vec<Project> = state
            .projects
            .iter()
            .filter(|p| p.namespace_id == namespace && p.name.contains(search))
            .cloned()
            .collect();
        found.sort_by_key(|p| p.name == search);
        Ok(found)
    }

    async fn fork_project(
        &self,
        source: ProjectId,
        namespace: GroupId,
    ) -> Result<ForkHandle, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("fork_project:{source}:{namespace}"));
        let ns_path = state
            .group(namespace)
            .map_err(|e| HostingError::create(e.kind, e.message))?
            .full_path
            .clone();
        if state.reject_forks_into.contains(&ns_path) {
            return Err(HostingError::create(
                HostingErrorKind::Other,
                "Project namespace is not valid",
            ));
        }
        let source_project = {
            let index = state
                .project_index(source)
                .map_err(|e| HostingError::create(e.kind, e.message))?;
            state.projects[index].clone()
        };
        let taken = state
            .projects
            .iter()
            .any(|p| p.namespace_id == namespace && p.name == source_project.name);
        if taken {
            return Err(HostingError::create(
                HostingErrorKind::AlreadyExists,
                "Project namespace name has already been taken",
            ));
        }
        let fork = state.insert_project(
            &source_project.name,
            namespace,
            source_project.visibility,
            Some(source),
        )?;
        let inherited: Vec<(String, String)> = state
            .branches
            .iter()
            .filter(|((p, _), _)| *p == source)
            .map(|((_, b), sha)| (b.clone(), sha.clone()))
            .collect();
        for (branch, sha) in inherited {
            state.branches.insert((fork.id, branch), sha);
        }
        Ok(ForkHandle { id: fork.id })
    }

    async fn save_project(&self, project: &Project) -> Result<Project, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("save_project:{}", project.id));
        let index = state
            .project_index(project.id)
            .map_err(|e| HostingError::update(e.kind, e.message))?;
        let stored = &mut state.projects[index];
        stored.visibility = project.visibility;
        stored.container_registry_enabled = project.container_registry_enabled;
        stored.lfs_enabled = project.lfs_enabled;
        Ok(stored.clone())
    }

    async fn create_commit(
        &self,
        project: ProjectId,
        commit: &NewCommit,
    ) -> Result<Commit, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("create_commit:{project}:{}", commit.branch));
        state
            .project_index(project)
            .map_err(|e| HostingError::create(e.kind, e.message))?;
        let sha = format!("{:040x}", state.next_id());
        state
            .branches
            .insert((project, commit.branch.to_string()), sha.clone());
        state.commits.entry(project).or_default().push(commit.clone());
        Ok(Commit {
            id: sha,
            message: commit.message.clone(),
        })
    }

    async fn create_deploy_key(
        &self,
        project: ProjectId,
        key: &NewDeployKey,
    ) -> Result<DeployKey, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("create_deploy_key:{project}"));
        if state.fail_key_create_in.contains(&state.namespace_path_of(project)?) {
            return Err(HostingError::create(
                HostingErrorKind::Other,
                "400 Bad Request: key is invalid",
            ));
        }
        let deploy_key = DeployKey {
            id: DeployKeyId::new(state.next_id()),
            title: key.title.clone(),
            can_push: key.can_push,
            enabled: false,
        };
        state.keys.push(StoredKey {
            project,
            key: deploy_key.clone(),
            material: key.key.as_str().to_string(),
        });
        Ok(deploy_key)
    }

    async fn enable_deploy_key(
        &self,
        project: ProjectId,
        key: DeployKeyId,
    ) -> Result<DeployKey, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("enable_deploy_key:{project}:{key}"));
        if state.fail_key_enable_in.contains(&state.namespace_path_of(project)?) {
            return Err(HostingError::update(
                HostingErrorKind::Other,
                "500 Internal Server Error",
            ));
        }
        let stored = state
            .keys
            .iter_mut()
            .find(|k| k.project == project && k.key.id == key)
            .ok_or_else(|| HostingError::update(HostingErrorKind::NotFound, "404 Deploy Key Not Found"))?;
        stored.key.enabled = true;
        Ok(stored.key.clone())
    }

    async fn create_tag(
        &self,
        project: ProjectId,
        name: &TagName,
        target: &RefName,
    ) -> Result<Tag, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push(format!("create_tag:{project}:{name}"));
        if state
            .tags
            .get(&project)
            .is_some_and(|tags| tags.iter().any(|t| &t.name == name))
        {
            return Err(HostingError::create(
                HostingErrorKind::AlreadyExists,
                format!("Tag {name} already exists"),
            ));
        }
        let commit_id = state
            .branches
            .iter()
            .find(|((p, branch), sha)| {
                *p == project && (branch == target.as_str() || sha.as_str() == target.as_str())
            })
            .map(|(_, sha)| sha.clone())
            .ok_or_else(|| HostingError::create(HostingErrorKind::Other, "Target is invalid"))?;
        let tag = Tag {
            name: name.clone(),
            target_ref: target.clone(),
            commit_id,
        };
        state.tags.entry(project).or_default().push(tag.clone());
        Ok(tag)
    }
}

#[async_trait]
impl EnrollmentProvider for FakeHosting {
    async fn enrolled_students(&self, _course: &Group) -> Result<Vec<Student>, HostingError> {
        let mut state = self.state.lock().await;
        state.calls.push("enrolled_students".to_string());
        Ok(state.students.clone())
    }
}

/// Convenience: the README content of the first commit made to `project`.
pub async fn seeded_readme(fake: &FakeHosting, project: ProjectId) -> Option<String> {
    let state = fake.state.lock().await;
    let commit = state.commits.get(&project)?.first()?;
    commit.actions.iter().find_map(|action| match action {
        CommitAction::Create { file_path, content } if file_path == "README.md" => {
            Some(content.clone())
        }
        _ => None,
    })
}
