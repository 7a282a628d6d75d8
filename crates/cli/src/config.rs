//! `course-setup.toml` loading and validation.
//!
//! The file names the GitLab instance, the course, and the grading system's
//! public key. The API token itself never appears in the file; it is read from
//! the environment variable named by `gitlab.token_env`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use course::{BranchName, DeployKeyMaterial, GroupName};
use gitlab::GitlabConfig;
use serde::Deserialize;
use thiserror::Error;
use url::Url;
use workflow::SetupOptions;

const DEFAULT_TOKEN_ENV: &str = "GITLAB_TOKEN";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid gitlab.url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("gitlab.timeout_secs must be greater than zero")]
    InvalidTimeout,

    #[error("Environment variable {var} is not set or empty")]
    MissingToken { var: String },

    #[error("No course configured (set course.group or pass --course)")]
    MissingCourse,

    #[error("No deploy key configured (set course.deploy_key_file or pass --deploy-key-file)")]
    MissingDeployKey,

    #[error("Deploy key file {} is empty", path.display())]
    EmptyDeployKey { path: PathBuf },

    #[error("setup.{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Output style of the fmt log layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitlabSection {
    pub url: String,
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseSection {
    /// Course group path or numeric id.
    pub group: Option<String>,
    pub deploy_key_file: Option<PathBuf>,
}

/// Overrides for [`SetupOptions`]; unset fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupSection {
    pub solutions_name: Option<String>,
    pub reference_branch: Option<String>,
    pub readme_content: Option<String>,
    pub deploy_key_title: Option<String>,
    pub deploy_key_can_push: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default)]
    pub format: LogFormat,
}

/// Parsed configuration file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub gitlab: GitlabSection,
    #[serde(default)]
    pub course: CourseSection,
    #[serde(default)]
    pub setup: SetupSection,
    #[serde(default)]
    pub logging: LoggingSection,

    /// Directory relative paths in the file are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_token_env() -> String {
    DEFAULT_TOKEN_ENV.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Builds the GitLab connection settings, reading the token through `env`.
    pub fn gitlab_config(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<GitlabConfig, ConfigError> {
        let base_url = Url::parse(&self.gitlab.url).map_err(|e| ConfigError::InvalidUrl {
            url: self.gitlab.url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.gitlab.url.clone(),
                reason: "scheme must be http or https".to_string(),
            });
        }
        if self.gitlab.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        let token = env(&self.gitlab.token_env)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingToken {
                var: self.gitlab.token_env.clone(),
            })?;

        Ok(GitlabConfig {
            base_url,
            token,
            timeout: Duration::from_secs(self.gitlab.timeout_secs),
        })
    }

    /// The course reference, preferring `cli_override`.
    pub fn course_group(&self, cli_override: Option<&str>) -> Result<String, ConfigError> {
        cli_override
            .map(str::to_string)
            .or_else(|| self.course.group.clone())
            .ok_or(ConfigError::MissingCourse)
    }

    /// Reads the deploy key, preferring `cli_override` over the configured file.
    ///
    /// A configured relative path is resolved against the config file's
    /// directory; an override is taken as given.
    pub fn deploy_key(&self, cli_override: Option<&Path>) -> Result<DeployKeyMaterial, ConfigError> {
        let path = match (cli_override, &self.course.deploy_key_file) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => self.base_dir.join(path),
            (None, None) => return Err(ConfigError::MissingDeployKey),
        };
        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        DeployKeyMaterial::new(text).ok_or(ConfigError::EmptyDeployKey { path })
    }

    pub fn setup_options(&self) -> Result<SetupOptions, ConfigError> {
        let mut options = SetupOptions::default();
        let section = &self.setup;

        if let Some(name) = &section.solutions_name {
            options.solutions_name = GroupName::new(name.as_str())
                .ok_or(ConfigError::EmptyField { field: "solutions_name" })?;
        }
        if let Some(branch) = &section.reference_branch {
            options.reference_branch = BranchName::new(branch.as_str())
                .ok_or(ConfigError::EmptyField { field: "reference_branch" })?;
        }
        if let Some(content) = &section.readme_content {
            options.readme_content = content.clone();
        }
        if let Some(title) = &section.deploy_key_title {
            if title.trim().is_empty() {
                return Err(ConfigError::EmptyField { field: "deploy_key_title" });
            }
            options.deploy_key_title = title.clone();
        }
        if let Some(can_push) = section.deploy_key_can_push {
            options.deploy_key_can_push = can_push;
        }
        Ok(options)
    }
}
