// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanmark.

use thiserror::Error;

/// Top-level error type for all Scanmark operations.
///
/// Failing to find a document outline is deliberately absent: that outcome is
/// a designed fallback, not an error.
#[derive(Debug, Error)]
pub enum ScanError {
    // -- Input validation --
    #[error("invalid input image ({width}x{height}): {reason}")]
    InvalidInput {
        width: u32,
        height: u32,
        reason: String,
    },

    #[error("invalid scan options: {0}")]
    InvalidOptions(String),

    // -- Pipeline stages --
    #[error("could not solve a projective transform for the located corners")]
    Projection,

    #[error("overlay font could not be loaded: {0}")]
    Font(String),

    // -- I/O and encoding --
    #[error("image processing failed: {0}")]
    Image(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanError>;
