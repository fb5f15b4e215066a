//! # SQL Lint Gateway Library
//!
//! Security screening and `sqlfluff` pass-through for SQL text, served over
//! HTTP or run against source files.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod lint;
pub mod linter;
pub mod output;
pub mod security;
pub mod server;
