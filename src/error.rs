use std::time::Duration;

pub use masterror::{AppError, AppErrorKind, AppResult};

/// Create file read error
pub fn file_read_error(path: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to read file '{}': {}", path, source))
}

/// Create config error
pub fn config_error(message: impl Into<String>) -> AppError {
    AppError::bad_request(message.into())
}

/// Create error for a dialect name that cannot be passed to the linter
pub fn invalid_dialect_error(dialect: &str) -> AppError {
    AppError::bad_request(format!(
        "Invalid dialect '{}': expected letters, digits or '_'",
        dialect
    ))
}

/// Create error for a source file the extractor cannot read SQL from
pub fn unsupported_source_error(path: &str) -> AppError {
    AppError::bad_request(format!(
        "Unsupported source file '{}': expected .java, .py or .sql",
        path
    ))
}

/// Create error for a failure while staging SQL into a temporary file
pub fn temp_file_error(source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to write temporary SQL file: {}", source))
}

/// Create error for a linter binary that could not be started
pub fn linter_spawn_error(program: &str, source: std::io::Error) -> AppError {
    AppError::internal(format!("Failed to start linter '{}': {}", program, source))
}

/// Create error for a linter run that ended with an unexpected status
pub fn linter_failed_error(code: Option<i32>, stderr: &str) -> AppError {
    let status = code
        .map(|c| format!("exit code {}", c))
        .unwrap_or_else(|| String::from("terminated by signal"));
    AppError::internal(format!(
        "Linter process failed ({}): {}",
        status,
        stderr.trim()
    ))
}

/// Create error for linter output that is not the expected JSON
pub fn linter_output_error(raw_output: &str) -> AppError {
    AppError::internal(format!(
        "Failed to parse linter JSON output: {}",
        raw_output.trim()
    ))
}

/// Create error for a linter run that exceeded its time budget
pub fn linter_timeout_error(limit: Duration) -> AppError {
    AppError::timeout(format!(
        "Linting process timed out ({}s)",
        limit.as_secs_f64()
    ))
}

/// Create error for a request body that is not a valid lint request
pub fn request_body_error(detail: &str) -> AppError {
    AppError::bad_request(format!("Invalid request body: {}", detail))
}

/// Create error for a git command that could not be run
pub fn git_error(args: &str, detail: &str) -> AppError {
    AppError::internal(format!("git {} failed: {}", args, detail))
}

/// Create error for a listener that failed to bind or serve
pub fn server_error(source: std::io::Error) -> AppError {
    AppError::internal(format!("Server error: {}", source))
}

/// Create lint service API error
pub fn gateway_api_error(message: impl Into<String>) -> AppError {
    AppError::service(message.into())
}

/// Create error for a gateway reply that rejected the request (non-5xx)
pub fn gateway_rejected_error(status: u16, message: &str) -> AppError {
    AppError::bad_request(format!("Lint service error {}: {}", status, message))
}

/// Create HTTP error
pub fn http_error(err: reqwest::Error) -> AppError {
    let msg = if err.is_timeout() {
        format!("Request timeout: {}", err)
    } else if err.is_connect() {
        format!("Connection failed: {}", err)
    } else if err.is_status() {
        format!("HTTP error {}: {}", err.status().unwrap_or_default(), err)
    } else {
        err.to_string()
    };
    AppError::service(msg)
}

/// Human-readable message carried by an error, falling back to its kind
pub fn error_message(err: &AppError) -> String {
    err.message
        .as_deref()
        .map(str::to_owned)
        .unwrap_or_else(|| err.kind.to_string())
}
