//! Course Setup Orchestrator.
//!
//! Resolves the reference solution, then provisions every enrolled student in
//! order. Students are independent: an unexpected failure for one is recorded
//! in the [`SetupReport`] and the run moves on to the next.

use course::{
    CourseError, EnrollmentProvider, Group, HostingClient, SetupRunId, Student, Timestamp,
    Username,
};
use serde::Serialize;

use crate::reference::{ensure_reference, ReferenceSolution};
use crate::student::{provision, ProvisionOutcome};
use crate::GraderKey;
use crate::SetupOptions;

/// Per-student entry of a [`SetupReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentReport {
    pub username: Username,
    #[serde(flatten)]
    pub result: StudentResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentResult {
    Completed(ProvisionOutcome),
    /// Provisioning stopped on an unexpected platform error.
    Failed { error: String },
}

/// Summary of one setup run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupReport {
    pub run_id: SetupRunId,
    pub course: Group,
    pub reference: ReferenceSolution,
    pub started_at: Timestamp,
    pub finished_at: Timestamp,
    pub students: Vec<StudentReport>,
}

impl SetupReport {
    /// Students whose fork and deploy key are in place.
    pub fn provisioned(&self) -> impl Iterator<Item = &StudentReport> {
        self.students.iter().filter(|s| {
            matches!(&s.result, StudentResult::Completed(outcome) if outcome.is_provisioned())
        })
    }

    /// Students whose fork step was skipped for this run.
    pub fn skipped(&self) -> impl Iterator<Item = &StudentReport> {
        self.students.iter().filter(|s| {
            matches!(&s.result, StudentResult::Completed(outcome) if !outcome.is_provisioned())
        })
    }

    /// Students whose provisioning failed unexpectedly.
    pub fn failed(&self) -> impl Iterator<Item = &StudentReport> {
        self.students
            .iter()
            .filter(|s| matches!(s.result, StudentResult::Failed { .. }))
    }

    /// `true` if every student was provisioned without skips or failures.
    pub fn is_clean(&self) -> bool {
        self.provisioned().count() == self.students.len()
    }
}

/// Runs the full setup for `course`.
///
/// Only failures before the student loop (reference solution, enrollment)
/// abort the run.
#[tracing::instrument(skip_all, fields(course = %course.full_path, run_id = tracing::field::Empty))]
pub async fn setup(
    client: &dyn HostingClient,
    enrollment: &dyn EnrollmentProvider,
    course: &Group,
    key: &GraderKey,
    options: &SetupOptions,
) -> Result<SetupReport, CourseError> {
    let run_id = SetupRunId::new_random();
    tracing::Span::current().record("run_id", tracing::field::display(run_id));
    let started_at = Timestamp::now();

    let reference = ensure_reference(client, course, options).await?;
    let students = enrollment.enrolled_students(course).await?;
    tracing::info!(count = students.len(), "provisioning enrolled students");

    let mut reports = Vec::with_capacity(students.len());
    for student in &students {
        reports.push(provision_one(client, &reference, student, key).await);
    }

    let report = SetupReport {
        run_id,
        course: course.clone(),
        reference,
        started_at,
        finished_at: Timestamp::now(),
        students: reports,
    };
    tracing::info!(
        provisioned = report.provisioned().count(),
        skipped = report.skipped().count(),
        failed = report.failed().count(),
        "course setup finished"
    );
    Ok(report)
}

async fn provision_one(
    client: &dyn HostingClient,
    reference: &ReferenceSolution,
    student: &Student,
    key: &GraderKey,
) -> StudentReport {
    let result = match provision(client, &reference.group, student, &reference.project, key).await
    {
        Ok(outcome) => StudentResult::Completed(outcome),
        Err(e) => {
            tracing::error!(student = %student.username, error = %e, "student provisioning failed");
            StudentResult::Failed {
                error: e.to_string(),
            }
        }
    };
    StudentReport {
        username: student.username.clone(),
        result,
    }
}
