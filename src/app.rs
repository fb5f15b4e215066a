//! Application logic for the `check` command.
//!
//! Kept apart from the binary entry point so it can be tested directly.

mod changed;
mod check;
mod helpers;
mod types;

pub use changed::{changed_sources, reviewable_paths};
pub use check::run_check;
pub use helpers::{
    calculate_exit_code, convert_format, create_output_options, get_effective_url, read_source,
    source_label
};
pub use types::{
    CheckParams, CheckReport, CheckResult, DYNAMIC_SQL_NOTE, SnippetReport, Verdict
};
