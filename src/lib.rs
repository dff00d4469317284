//! Cutover - activity tracking for go-live plans.
//!
//! This library provides the core functionality for the `cv` CLI tool and its
//! web API: phased activities with statuses, inferred begin/end timestamps,
//! finish-to-start dependencies and a per-activity audit trail.

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod gui;
pub mod models;
pub mod storage;


/// Library-level error type for Cutover operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings parse error: {0}")]
    Kdl(#[from] kdl::KdlError),

    #[error("Not initialized: run `cv system init` first")]
    NotInitialized,

    #[error("Activity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Cutover operations.
pub type Result<T> = std::result::Result<T, Error>;
