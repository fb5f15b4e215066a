//! Pass-through to the external `sqlfluff` linter.
//!
//! Each call stages the SQL in a temporary `.sql` file, runs
//!
//! ```text
//! <command...> lint <file> --dialect <dialect> --format json
//! ```
//!
//! under a hard timeout, and parses the JSON the linter prints. The file is
//! closed before the linter starts and removed when the call returns, on
//! every path.
//!
//! # Exit Codes
//!
//! `0` (no violations) and `1` (violations found) are both successful runs.
//! Anything else, including death by signal, is reported as a failure with
//! the linter's stderr attached.

mod types;

use std::{io::Write, process::Stdio, time::Duration};

use tempfile::{Builder, TempPath};
use tokio::{process::Command, time::timeout};
pub use types::{FileReport, RawViolation, summarize};

use crate::{
    config::LinterConfig,
    error::{
        AppResult, config_error, invalid_dialect_error, linter_failed_error, linter_output_error,
        linter_spawn_error, linter_timeout_error, temp_file_error
    }
};

/// Handle on the external linter command.
#[derive(Debug, Clone)]
pub struct SqlFluff {
    program: String,
    args:    Vec<String>,
    timeout: Duration
}

impl SqlFluff {
    /// Create a linter from a program plus leading arguments
    pub fn new(command: &[String], timeout: Duration) -> AppResult<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| config_error("Linter command must not be empty"))?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout
        })
    }

    pub fn from_config(config: &LinterConfig) -> AppResult<Self> {
        Self::new(&config.command, config.timeout())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Lint `sql` as `dialect` and return the linter's per-file reports
    ///
    /// # Errors
    ///
    /// - bad request if `dialect` is not a plain identifier
    /// - timeout if the linter runs longer than the configured limit
    /// - internal if the file cannot be staged, the linter cannot start,
    ///   exits with an unexpected status or prints something other than JSON
    pub async fn lint(&self, sql: &str, dialect: &str) -> AppResult<Vec<FileReport>> {
        validate_dialect(dialect)?;
        let sql_file = stage_sql(sql)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("lint")
            .arg(&*sql_file)
            .args(["--dialect", dialect, "--format", "json"])
            .stdin(Stdio::null())
            .kill_on_drop(true);

        tracing::debug!(program = %self.program, dialect, path = %sql_file.display(), "running linter");

        let output = match timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(|e| linter_spawn_error(&self.program, e))?,
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs_f64(), "linter timed out");
                return Err(linter_timeout_error(self.timeout));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        match output.status.code() {
            Some(0) | Some(1) => parse_output(&stdout),
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                tracing::error!(?code, stderr = %stderr.trim(), "linter failed");
                Err(linter_failed_error(code, &stderr))
            }
        }
    }
}

/// Parse the linter's JSON output; empty output means no reports
pub fn parse_output(stdout: &str) -> AppResult<Vec<FileReport>> {
    if stdout.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(stdout).map_err(|_| linter_output_error(stdout))
}

/// Dialect names are passed as a separate argument; restricting them to
/// identifiers keeps them from being read as linter flags.
pub fn validate_dialect(dialect: &str) -> AppResult<()> {
    let valid = !dialect.is_empty()
        && dialect
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(invalid_dialect_error(dialect))
    }
}

/// Write `sql` to a closed temporary file that is deleted when dropped
fn stage_sql(sql: &str) -> AppResult<TempPath> {
    let mut file = Builder::new()
        .prefix("sql-lint-")
        .suffix(".sql")
        .tempfile()
        .map_err(temp_file_error)?;
    file.write_all(sql.as_bytes()).map_err(temp_file_error)?;
    file.flush().map_err(temp_file_error)?;
    Ok(file.into_temp_path())
}
