// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for printgate.

use std::fmt;

use thiserror::Error;

use crate::types::JobId;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Render,
    Convert,
    Dispatch,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Render => "render",
            Self::Convert => "convert",
            Self::Dispatch => "dispatch",
        })
    }
}

/// Top-level error type for all printgate operations.
#[derive(Debug, Error)]
pub enum PrintgateError {
    // -- Startup --
    #[error("config validation: {0}")]
    Config(String),

    #[error("printer validation: {0}")]
    Printer(String),

    // -- Request parsing --
    #[error("unable to parse request form: {0}")]
    MalformedForm(String),

    #[error("key \"{0}\" in request has more than 1 value")]
    MultiValuedField(String),

    #[error("unable to write file from file_data parameter in request: {0}")]
    RawArtifact(String),

    // -- Job validation --
    #[error("print job validation: {0}")]
    Validation(String),

    // -- Pipeline stages --
    #[error("template rendering failed: {0}")]
    Render(String),

    #[error("barcode generation failed: {0}")]
    Barcode(String),

    #[error("page conversion failed: {0}")]
    Conversion(String),

    #[error("dispatch to \"{device}\" failed: {output}")]
    Dispatch { device: String, output: String },

    /// A stage failure annotated with the job it belonged to.
    #[error("job {job}: {stage} stage: {source}")]
    Stage {
        stage: Stage,
        job: JobId,
        #[source]
        source: Box<PrintgateError>,
    },

    // -- Storage --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PrintgateError {
    /// Wrap a stage failure with the job that produced it.
    pub fn in_stage(self, stage: Stage, job: &JobId) -> Self {
        Self::Stage {
            stage,
            job: job.clone(),
            source: Box::new(self),
        }
    }

    /// Whether the failure was caused by the request itself (bad form data,
    /// unknown template or printer) rather than by a pipeline stage.
    pub fn is_request_error(&self) -> bool {
        match self {
            Self::MalformedForm(_)
            | Self::MultiValuedField(_)
            | Self::RawArtifact(_)
            | Self::Validation(_) => true,
            Self::Stage { source, .. } => source.is_request_error(),
            _ => false,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintgateError>;
