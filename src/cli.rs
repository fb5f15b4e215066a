use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SQL Lint Gateway - screen SQL and lint it with sqlfluff over HTTP
#[derive(Parser, Debug)]
#[command(name = "sql-lint-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the lint endpoint over HTTP
    Serve {
        /// Address to bind (default from config: 0.0.0.0)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default from config: 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Linter program to run instead of `sqlfluff`
        #[arg(long)]
        linter: Option<String>,

        /// Seconds before a linter run is killed
        #[arg(long)]
        timeout_secs: Option<u64>
    },

    /// Extract SQL from source files and review each statement
    Check {
        /// Java, Python or SQL files (use - for SQL on stdin)
        #[arg(required_unless_present = "changed")]
        paths: Vec<PathBuf>,

        /// Also review the sources changed in the last commit (all tracked
        /// sources when none changed)
        #[arg(long)]
        changed: bool,

        /// Linter dialect (default from config: ansi)
        #[arg(short, long)]
        dialect: Option<String>,

        /// Send snippets to a running gateway instead of linting locally
        #[arg(short, long)]
        url: Option<String>,

        /// Only run the security screening; skip the linter
        #[arg(long)]
        security_only: bool,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        output_format: Format,

        /// Disable colored output
        #[arg(long)]
        no_color: bool
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Format {
    Text,
    Json,
    Yaml,
    Markdown
}
