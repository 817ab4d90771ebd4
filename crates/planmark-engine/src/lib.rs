//! planmark-engine: core engine for the `.plan` specification language.
//!
//! The pipeline is classification, then parsing, then linting, then fixing:
//!
//! - [`parsing`] turns raw text into a typed [`models::PlanDocument`] AST
//!   with precise 1-based positions and recovery-oriented error handling.
//! - [`linting`] runs the PLAN-001 through PLAN-014 rule catalog against one
//!   document or a project snapshot, honoring `@lint-disable` directives.
//! - [`fixing`] maps specific diagnostics to textual edits and applies them
//!   bottom-up.
//! - [`project`] discovers and parses a directory of documents for the
//!   cross-file rules.
//! - [`convert`], [`format`], [`report`], and [`scaffold`] are the thin
//!   consumers: serialization, normalization, reporting, and boilerplate.
//!
//! Everything is synchronous and in-memory; every call recomputes from its
//! inputs.

pub mod convert;
pub mod fixing;
pub mod format;
pub mod linting;
pub mod models;
pub mod parsing;
pub mod project;
pub mod report;
pub mod scaffold;

// Re-export key types for easier usage
pub use fixing::{Fix, FixRegistry, apply_fixes, fixes_for_diagnostics};
pub use linting::{LintEngine, LintOptions};
pub use models::{Diagnostic, PlanDocument, Severity};
pub use parsing::parse_plan_file;
