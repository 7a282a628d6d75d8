//! GitLab REST payloads and their conversion into domain types.
//!
//! Only the fields the workflow reads are declared; GitLab returns many more.

use course::{
    AccessLevel, Commit, DeployKey, DeployKeyId, Group, GroupId, Project, ProjectId, RefName,
    Student, Tag, TagName, UserId, Username, Visibility,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GroupDto {
    pub id: u64,
    pub name: String,
    pub path: String,
    pub full_path: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

impl From<GroupDto> for Group {
    fn from(dto: GroupDto) -> Self {
        Self {
            id: GroupId::new(dto.id),
            name: dto.name,
            path: dto.path,
            full_path: dto.full_path,
            parent_id: dto.parent_id.map(GroupId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdDto {
    pub id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectDto {
    pub id: u64,
    pub name: String,
    pub path_with_namespace: String,
    pub namespace: IdDto,
    /// Absent when the token lacks access to project settings.
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub container_registry_enabled: Option<bool>,
    #[serde(default)]
    pub lfs_enabled: Option<bool>,
    #[serde(default)]
    pub forked_from_project: Option<IdDto>,
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Self {
            id: ProjectId::new(dto.id),
            name: dto.name,
            path_with_namespace: dto.path_with_namespace,
            namespace_id: GroupId::new(dto.namespace.id),
            visibility: dto.visibility.unwrap_or(Visibility::Private),
            container_registry_enabled: dto.container_registry_enabled.unwrap_or(false),
            lfs_enabled: dto.lfs_enabled.unwrap_or(false),
            forked_from: dto.forked_from_project.map(|p| ProjectId::new(p.id)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MemberDto {
    pub id: u64,
    pub username: String,
    pub access_level: u8,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl MemberDto {
    pub fn access_level(&self) -> Option<AccessLevel> {
        AccessLevel::from_code(self.access_level)
    }

    /// Active human members below Maintainer are the course's students.
    pub fn into_student(self) -> Option<Student> {
        let active = self.state.as_deref().map_or(true, |s| s == "active");
        let level = self.access_level()?;
        if !active || self.bot || level >= AccessLevel::Maintainer {
            return None;
        }
        Some(Student {
            id: UserId::new(self.id),
            username: Username::new(self.username)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct DeployKeyDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub can_push: bool,
}

impl DeployKeyDto {
    pub fn into_key(self, enabled: bool) -> DeployKey {
        DeployKey {
            id: DeployKeyId::new(self.id),
            title: self.title,
            can_push: self.can_push,
            enabled,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommitDto {
    pub id: String,
    #[serde(default)]
    pub message: String,
}

impl From<CommitDto> for Commit {
    fn from(dto: CommitDto) -> Self {
        Self {
            id: dto.id,
            message: dto.message,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagDto {
    pub name: String,
    pub commit: CommitDto,
}

impl TagDto {
    /// Falls back to the requested name if GitLab echoes an empty one.
    pub fn into_tag(self, requested: &TagName, target: &RefName) -> Tag {
        Tag {
            name: TagName::new(self.name).unwrap_or_else(|| requested.clone()),
            target_ref: target.clone(),
            commit_id: self.commit.id,
        }
    }
}
