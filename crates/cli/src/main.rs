//! Course setup CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: load `course-setup.toml` and validate it.
//! 2. **Wire observability**: configure `tracing-subscriber` with a pretty or
//!    JSON layer and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: create the [`gitlab::GitlabClient`] and
//!    pass it to the workflow as both hosting client and enrollment provider.
//! 4. **Run the command**:
//!    - `setup`: resolve the course and provision every enrolled student.
//!    - `tag`: create one deadline tag on one project.

mod config;
mod telemetry;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use course::{resolve_course, CourseRef, HostingClient, ProjectId, RefName, TagName};
use gitlab::GitlabClient;
use workflow::{GraderKey, ProvisionOutcome, SetupReport, StudentResult};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "course-setup", version, about = "Provision per-student GitLab projects for a course")]
struct Cli {
    /// Configuration file.
    #[arg(short, long, env = "COURSE_SETUP_CONFIG", default_value = "course-setup.toml")]
    config: PathBuf,

    /// Print the result as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the solutions group, the reference project, and every student's fork.
    Setup {
        /// Course group path or id (overrides `course.group`).
        #[arg(long)]
        course: Option<String>,

        /// Public key of the grading system (overrides `course.deploy_key_file`).
        #[arg(long)]
        deploy_key_file: Option<PathBuf>,
    },

    /// Create a deadline tag on a project. Fails if the tag already exists.
    Tag {
        /// Project id or `namespace/path`.
        #[arg(long)]
        project: String,

        /// Tag name.
        #[arg(long)]
        name: String,

        /// Branch or commit to tag.
        #[arg(long = "ref")]
        target: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let telemetry = match telemetry::init(config.logging.format) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let code = match run(&cli, &config).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("command failed: {e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    };

    telemetry.shutdown();
    code
}

async fn run(cli: &Cli, config: &Config) -> anyhow::Result<ExitCode> {
    let gitlab_config = config.gitlab_config(|var| std::env::var(var).ok())?;
    let client = GitlabClient::new(gitlab_config).context("failed to create GitLab client")?;

    match &cli.command {
        Command::Setup {
            course,
            deploy_key_file,
        } => {
            let course_ref: CourseRef = config.course_group(course.as_deref())?.parse()?;
            let options = config.setup_options()?;
            let material = config.deploy_key(deploy_key_file.as_deref())?;
            let key = GraderKey::from_options(material, &options);

            let course = resolve_course(&client, &course_ref).await?;
            let report = workflow::setup(&client, &client, &course, &key, &options)
                .await
                .with_context(|| format!("setup of course {course_ref} aborted"))?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_summary(&report);
            }
            Ok(if report.failed().next().is_some() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            })
        }

        Command::Tag {
            project,
            name,
            target,
        } => {
            let name = TagName::new(name.as_str()).context("tag name must not be empty")?;
            let target = RefName::new(target.as_str()).context("ref must not be empty")?;
            let project = match project.parse::<u64>() {
                Ok(id) => client.get_project(ProjectId::new(id)).await,
                Err(_) => client.get_project_by_path(project).await,
            }
            .with_context(|| format!("failed to look up project {project}"))?;

            let tag = workflow::tag(&client, &project, &name, &target)
                .await
                .with_context(|| {
                    format!("failed to tag {} as {name}", project.path_with_namespace)
                })?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&tag)?);
            } else {
                println!(
                    "{}: tagged {} as {} ({})",
                    project.path_with_namespace, tag.target_ref, tag.name, tag.commit_id
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_summary(report: &SetupReport) {
    println!(
        "course {}: reference {} ({:?})",
        report.course.full_path,
        report.reference.project.path_with_namespace,
        report.reference.project_resolution
    );
    for student in &report.students {
        let line = match &student.result {
            StudentResult::Completed(ProvisionOutcome::Provisioned { project, .. }) => {
                format!("provisioned {}", project.path_with_namespace)
            }
            StudentResult::Completed(ProvisionOutcome::ForkSkipped { reason, .. }) => {
                format!("fork skipped: {reason}")
            }
            StudentResult::Failed { error } => format!("FAILED: {error}"),
        };
        println!("  {:<24} {line}", student.username.as_str());
    }
    println!(
        "{} provisioned, {} skipped, {} failed",
        report.provisioned().count(),
        report.skipped().count(),
        report.failed().count()
    );
}
