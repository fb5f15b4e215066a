//! Shared helpers for integration tests.
//!
//! Linter behaviour is exercised with small `sh` scripts standing in for
//! `sqlfluff`. Scripts receive the same arguments the real linter would:
//! `$1=lint $2=<file> $3=--dialect $4=<dialect> $5=--format $6=json`.

#![allow(dead_code)]

use std::{fs, path::Path, time::Duration};

use sql_lint_gateway::{lint::LintService, linter::SqlFluff, security::SecurityScanner};
use tempfile::TempDir;

/// Reports one layout violation on line 1 and exits like sqlfluff does when
/// violations are found.
pub const ONE_VIOLATION: &str = r#"printf '[{"filepath":"%s","violations":[{"line_no":1,"code":"LT01","description":"Expected only single space."}]}]' "$2"
exit 1
"#;

/// Reports a clean run.
pub const CLEAN: &str = "printf '[]'\nexit 0\n";

/// Echoes the dialect argument back as the violation code.
pub const ECHO_DIALECT: &str = r#"printf '[{"filepath":"%s","violations":[{"line_no":1,"code":"%s","description":"dialect"}]}]' "$2" "$4"
exit 1
"#;

/// Echoes the staged SQL back as the violation description.
pub const ECHO_SQL: &str = r#"printf '[{"filepath":"%s","violations":[{"line_no":1,"code":"X","description":"%s"}]}]' "$2" "$(cat "$2")"
exit 1
"#;

/// Never finishes in time.
pub const HANG: &str = "exec sleep 5\n";

/// Records the staged file path in `staged` next to the script, then hangs.
pub const RECORD_AND_HANG: &str = "echo \"$2\" > \"$(dirname \"$0\")/staged\"\nexec sleep 5\n";

/// Fails with the staged file path on stderr.
pub const FAIL_WITH_PATH: &str = "echo \"$2\" >&2\nexit 70\n";

/// A linter script kept alive for the duration of a test.
pub struct FakeLinter {
    _dir:        TempDir,
    pub command: Vec<String>
}

impl FakeLinter {
    pub fn new(script: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sqlfluff.sh");
        fs::write(&path, script).unwrap();
        Self {
            command: vec!["sh".to_string(), path.display().to_string()],
            _dir:    dir
        }
    }

    /// Directory holding the script; scripts may leave files here
    pub fn dir(&self) -> &Path {
        self._dir.path()
    }

    pub fn linter(&self, timeout: Duration) -> SqlFluff {
        SqlFluff::new(&self.command, timeout).unwrap()
    }

    pub fn service(&self) -> LintService {
        LintService::new(
            self.linter(Duration::from_secs(5)),
            SecurityScanner::new(),
            "ansi"
        )
    }
}
