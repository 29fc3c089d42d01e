// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// HTML to PDF conversion sized to a printer's page.
//
// Conversion is delegated to the wkhtmltopdf binary. The page geometry always
// comes from the job's printer profile; resolution is fixed at 300 DPI with
// no margins so the output maps one-to-one onto the physical label.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::PageGeometry;

/// Rendering resolution passed to the converter.
pub const CONVERSION_DPI: u32 = 300;

/// Capability: turn a rendered document into a paginated artifact.
pub trait PageConverter: Send + Sync {
    fn convert(&self, document: &Path, output: &Path, geometry: PageGeometry) -> Result<()>;
}

/// Converter that shells out to `wkhtmltopdf`.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfConverter {
    binary: PathBuf,
}

impl WkhtmltopdfConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Command-line arguments for one conversion.
    pub fn arguments(document: &Path, output: &Path, geometry: PageGeometry) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--quiet".to_owned(),
            "--dpi".to_owned(),
            CONVERSION_DPI.to_string(),
            "--page-width".to_owned(),
            format!("{}mm", geometry.width_mm),
            "--page-height".to_owned(),
            format!("{}mm", geometry.height_mm),
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        for margin in ["-T", "-B", "-L", "-R"] {
            args.push(margin.into());
            args.push("0".into());
        }
        args.push(document.into());
        args.push(output.into());
        args
    }
}

impl PageConverter for WkhtmltopdfConverter {
    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    fn convert(&self, document: &Path, output: &Path, geometry: PageGeometry) -> Result<()> {
        let args = Self::arguments(document, output, geometry);
        debug!(?args, "running converter");

        let result = Command::new(&self.binary).args(&args).output().map_err(|e| {
            PrintgateError::Conversion(format!(
                "unable to launch {}: {e}",
                self.binary.display()
            ))
        })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(PrintgateError::Conversion(format!(
                "{} exited with {}: {}",
                self.binary.display(),
                result.status,
                stderr.trim_end()
            )));
        }

        info!(
            width_mm = geometry.width_mm,
            height_mm = geometry.height_mm,
            "document converted"
        );
        Ok(())
    }
}
