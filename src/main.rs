//! # SQL Lint Gateway
//!
//! HTTP gateway that screens SQL for dangerous statements and lints it with
//! [sqlfluff](https://sqlfluff.com).
//!
//! The gateway owns no SQL grammar of its own. Every request goes through
//! two independent layers:
//!
//! 1. **Security screening** - regular-expression rules over the raw text
//!    (destructive keywords, `SELECT *`, resident registration numbers).
//! 2. **Linting** - the text is written to a temporary file and handed to
//!    `sqlfluff lint --format json` under a timeout; its violations are
//!    flattened to one line each.
//!
//! # Quick Start
//!
//! ```bash
//! # Serve on 0.0.0.0:8000
//! sql-lint-gateway serve
//!
//! # Lint a statement
//! curl -s localhost:8000/lint -H 'content-type: application/json' \
//!     -d '{"sql": "select * from users", "dialect": "postgres"}'
//!
//! # Review the SQL embedded in data-access code without a server
//! sql-lint-gateway check src/main/java/com/example/UserDao.java
//!
//! # Security screening only (no sqlfluff needed)
//! sql-lint-gateway check --security-only app.py queries.sql
//!
//! # Send snippets to a shared gateway
//! sql-lint-gateway check --url http://lint.internal:8000 UserDao.java
//!
//! # Markdown report for the sources changed in the last commit
//! sql-lint-gateway check --changed --security-only -f markdown
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded from (in order of precedence):
//!
//! 1. Command-line arguments
//! 2. Environment variables (`SQL_LINT_PORT`, `SQL_LINT_COMMAND`, etc.)
//! 3. `.sql-lint-gateway.toml` in current directory
//! 4. `~/.config/sql-lint-gateway/config.toml`
//!
//! Log verbosity follows `RUST_LOG` (default `info` for `serve`, `warn` for
//! `check`). Logs go to stderr.
//!
//! # Exit Codes
//!
//! For `check`, the exit code reflects the most serious verdict:
//!
//! - `0` - Every statement passed
//! - `1` - At least one statement needs review
//! - `2` - At least one statement is blocked
//! - `3` - The command itself failed (unreadable file, linter error, ...)

use std::process;

use clap::Parser;
use sql_lint_gateway::{
    app::{CheckParams, run_check},
    cli::{Cli, Commands},
    config::Config,
    error::{AppResult, error_message},
    lint::LintService,
    server
};
use tokio::main;
use tracing_subscriber::EnvFilter;

#[main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.command);

    match run(cli).await {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", error_message(&e));
            process::exit(3);
        }
    }
}

fn init_tracing(command: &Commands) {
    let default_level = match command {
        Commands::Serve { .. } => "info",
        Commands::Check { .. } => "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> AppResult<i32> {
    let mut config = Config::load()?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            linter,
            timeout_secs
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(linter) = linter {
                config.linter.command = vec![linter];
            }
            if let Some(secs) = timeout_secs {
                config.linter.timeout_secs = secs;
            }

            let service = LintService::from_config(&config)?;
            tracing::info!(
                linter = ?config.linter.command,
                timeout_secs = config.linter.timeout_secs,
                default_dialect = %config.linter.default_dialect,
                "starting gateway"
            );
            server::serve(service, &config.server.host, config.server.port).await?;
            Ok(0)
        }
        Commands::Check {
            paths,
            dialect,
            url,
            changed,
            security_only,
            output_format,
            no_color
        } => {
            let params = CheckParams {
                paths,
                dialect,
                url,
                security_only,
                changed,
                output_format,
                no_color
            };
            let result = run_check(params, config).await?;
            println!("{}", result.output.trim_end());
            Ok(result.exit_code)
        }
    }
}
