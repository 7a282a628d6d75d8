//! Tunable names and content used by the setup workflow.

use course::{BranchName, DeployKeyMaterial, GroupName, Visibility};

/// Name shared by the solutions group and the reference project.
pub const SOLUTIONS_NAME: &str = "solutions";

/// Everything the workflow creates that is not derived from platform state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupOptions {
    /// Name (and path) of both the solutions subgroup and the reference project.
    pub solutions_name: GroupName,
    /// Visibility of a newly created reference project.
    pub reference_visibility: Visibility,
    /// Branch receiving the seed commit of a new reference project.
    pub reference_branch: BranchName,
    pub seed_commit_message: String,
    /// Content of the placeholder `README.md`.
    pub readme_content: String,
    /// Title under which the deploy key appears on each student project.
    pub deploy_key_title: String,
    /// Whether the grading system may push with the deploy key.
    pub deploy_key_can_push: bool,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            solutions_name: GroupName::new(SOLUTIONS_NAME).expect("non-empty literal"),
            reference_visibility: Visibility::Internal,
            reference_branch: BranchName::new("master").expect("non-empty literal"),
            seed_commit_message: "Initial commit".to_string(),
            readme_content: "Example solutions go here".to_string(),
            deploy_key_title: "Deploy Key".to_string(),
            deploy_key_can_push: true,
        }
    }
}

/// The public half of the grading system's key plus the options it is installed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraderKey {
    pub title: String,
    pub material: DeployKeyMaterial,
    pub can_push: bool,
}

impl GraderKey {
    /// Builds the key from `options`' title and push setting.
    pub fn from_options(material: DeployKeyMaterial, options: &SetupOptions) -> Self {
        Self {
            title: options.deploy_key_title.clone(),
            material,
            can_push: options.deploy_key_can_push,
        }
    }
}
