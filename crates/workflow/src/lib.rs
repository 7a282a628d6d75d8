//! Idempotent course setup workflow.
//!
//! This crate sequences calls against the [`course::HostingClient`] port to
//! bring a course into its provisioned shape:
//!
//! ```text
//! course
//! └── solutions               (group)
//!     ├── solutions           (reference project, seeded README)
//!     ├── alice               (student subgroup, alice = developer)
//!     │   └── solutions       (private fork + enabled deploy key)
//!     └── bob
//!         └── solutions
//! ```
//!
//! Every existence check re-queries the platform, so a run may be interrupted
//! at any point and simply started again.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Calls are issued strictly one after another; the
//! platform's own locking is relied upon for concurrent creation. This crate
//! contains no transport code.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`lookup`] | Exact-name find-or-create and create-or-adopt primitives |
//! | [`reference`] | Solutions group and reference project |
//! | [`student`] | Per-student subgroup, membership, fork, and deploy key |
//! | [`setup`] | The whole-course run and its report |
//! | [`tagging`] | Deadline tags |

pub mod lookup;
pub mod options;
pub mod reference;
pub mod setup;
pub mod student;
pub mod tagging;

pub use lookup::{create_or_adopt, find_exact, find_or_create, Resolution};
pub use options::{GraderKey, SetupOptions, SOLUTIONS_NAME};
pub use reference::{create_solutions_group, ensure_reference, ReferenceSolution};
pub use setup::{setup, SetupReport, StudentReport, StudentResult};
pub use student::{fork_reference, provision, ProvisionOutcome};
pub use tagging::tag;
