// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Error types for SpyEdge

use thiserror::Error;

/// Result type alias for SpyEdge operations
pub type Result<T> = std::result::Result<T, SpyEdgeError>;

/// SpyEdge error types
#[derive(Error, Debug)]
pub enum SpyEdgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Collaborator not available: {0}")]
    CollaboratorUnavailable(String),

    #[error("Malformed collaborator response: {0}")]
    MalformedResponse(String),

    #[error("No analysis is ready for export")]
    ExportUnavailable,
}
