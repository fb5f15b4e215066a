//! Core `check` execution logic.
//!
//! Extracts SQL from every input, then reviews each snippet with one of
//! three backends: security screening only, the in-process lint pipeline,
//! or a remote gateway.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::{
    changed::changed_sources,
    helpers::{
        calculate_exit_code, create_output_options, get_effective_url, read_source, source_label
    },
    types::{CheckParams, CheckReport, CheckResult, SnippetReport}
};
use crate::{
    client::GatewayClient,
    config::Config,
    error::AppResult,
    extract::{Snippet, extract},
    lint::{LintRequest, LintService, SyntaxAnalysis},
    output::format_check_report,
    security::{SecurityAnalysis, SecurityScanner}
};

/// Where snippets are reviewed.
enum Backend {
    SecurityOnly(SecurityScanner),
    Local(LintService),
    Remote(GatewayClient)
}

impl Backend {
    fn from_params(params: &CheckParams, config: &Config) -> AppResult<Self> {
        if params.security_only {
            return Ok(Self::SecurityOnly(SecurityScanner::with_config(
                config.security.clone()
            )));
        }
        match get_effective_url(params.url.clone(), config.client.url.clone()) {
            Some(url) => Ok(Self::Remote(GatewayClient::with_retry_config(
                url,
                config.retry.clone()
            ))),
            None => Ok(Self::Local(LintService::from_config(config)?))
        }
    }

    async fn review(
        &self,
        snippet: &Snippet,
        dialect: Option<&str>
    ) -> AppResult<(SecurityAnalysis, Option<SyntaxAnalysis>)> {
        let mut request = LintRequest::new(snippet.sql.clone());
        if let Some(dialect) = dialect {
            request = request.with_dialect(dialect);
        }
        match self {
            Self::SecurityOnly(scanner) => Ok((scanner.scan(&snippet.sql), None)),
            Self::Local(service) => {
                let response = service.lint(&request).await?;
                Ok((response.security_analysis, Some(response.syntax_analysis)))
            }
            Self::Remote(client) => {
                let response = client.lint(&request).await?;
                Ok((response.security_analysis, Some(response.syntax_analysis)))
            }
        }
    }
}

/// Executes the check command.
///
/// 1. **Extraction**: reads every path (plus, with `changed`, the sources
///    git reports for the last commit) and pulls out SQL snippets
/// 2. **Review**: screens (and unless `security_only`, lints) each snippet
/// 3. **Formatting**: renders the report in the requested format
///
/// The exit code is 2 when any snippet is blocked, 1 when any needs review
/// and 0 otherwise.
///
/// # Errors
///
/// Returns an error if an input cannot be read, has an unsupported
/// extension, git cannot list changed files, or the linter or gateway fails.
///
/// # Example
///
/// ```no_run
/// use sql_lint_gateway::{
///     app::{CheckParams, run_check},
///     cli::Format,
///     config::Config
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let params = CheckParams {
///     paths:         vec!["src/UserDao.java".into()],
///     dialect:       None,
///     url:           None,
///     security_only: true,
///     changed:       false,
///     output_format: Format::Text,
///     no_color:      true
/// };
///
/// let result = run_check(params, Config::default()).await?;
/// println!("Exit code: {}", result.exit_code);
/// # Ok(())
/// # }
/// ```
pub async fn run_check(params: CheckParams, config: Config) -> AppResult<CheckResult> {
    let mut paths = params.paths.clone();
    if params.changed {
        let changed = changed_sources().await?;
        tracing::info!(files = changed.len(), "reviewing changed sources");
        paths.extend(changed);
    }

    let mut inputs = Vec::new();
    for path in &paths {
        let (content, kind) = read_source(path)?;
        let snippets = extract(&content, kind);
        tracing::debug!(path = %path.display(), snippets = snippets.len(), "extracted SQL");
        inputs.push((source_label(path), snippets));
    }

    let backend = Backend::from_params(&params, &config)?;
    let total: usize = inputs.iter().map(|(_, s)| s.len()).sum();

    let pb = if matches!(backend, Backend::SecurityOnly(_)) {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{pos}/{len}] {msg}")
        {
            pb.set_style(style);
        }
        pb.set_message("Linting SQL snippets...");
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let mut report = CheckReport::default();
    for (source, snippets) in inputs {
        for snippet in snippets {
            let (security, syntax) = backend
                .review(&snippet, params.dialect.as_deref())
                .await?;
            report
                .snippets
                .push(SnippetReport::new(source.clone(), snippet, security, syntax));
            pb.inc(1);
        }
    }
    pb.finish_and_clear();

    let output_opts = create_output_options(params.output_format, params.no_color);
    let output = format_check_report(&report, &output_opts);
    let exit_code = calculate_exit_code(&report);

    Ok(CheckResult {
        exit_code,
        output,
        report
    })
}
