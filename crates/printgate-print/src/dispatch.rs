// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print dispatch via Ghostscript.
//
// The artifact is handed to Ghostscript's `mswinpr2` device with the output
// redirected to the named Windows printer (`%printer%<name>`). Device size in
// points is derived from the printer profile's page size in millimetres.
// One attempt per job; the call blocks until Ghostscript exits.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{error, info, instrument};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::PrinterProfile;

/// Ghostscript device that prints through the Windows spooler.
pub const DEVICE: &str = "mswinpr2";

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// PostScript points per inch.
const POINTS_PER_INCH: f64 = 72.0;

/// Flags passed on every invocation, ahead of the per-printer ones.
const FIXED_FLAGS: [&str; 9] = [
    "-dBATCH",
    "-dNOPAUSE",
    "-dNOPROMPT",
    "-dNoCancel",
    "-dPDFFitPage",
    "-dNumCopies=1",
    "-empty",
    "-dPrinted",
    "-dNOSAFER",
];

/// Convert a length in millimetres to whole PostScript points.
pub fn mm_to_points(mm: u32) -> u32 {
    (f64::from(mm) / MM_PER_INCH * POINTS_PER_INCH).round() as u32
}

/// Result of a dispatch call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// False when printing is disabled and the invocation was only logged.
    pub dispatched: bool,
    /// Whatever the tool wrote to stdout/stderr.
    pub output: String,
}

/// Capability: submit an artifact to a physical device.
pub trait PrintDispatcher: Send + Sync {
    fn submit(&self, artifact: &Path, printer: &PrinterProfile) -> Result<DispatchOutcome>;
}

/// Dispatcher invoking the Ghostscript command-line tool.
#[derive(Debug, Clone)]
pub struct GhostscriptDispatcher {
    binary: PathBuf,
    debug: bool,
    print_out: bool,
}

impl GhostscriptDispatcher {
    pub fn new(binary: impl Into<PathBuf>, debug: bool, print_out: bool) -> Self {
        Self {
            binary: binary.into(),
            debug,
            print_out,
        }
    }

    /// Full argument list for printing `artifact` on `printer`.
    pub fn arguments(artifact: &Path, printer: &PrinterProfile) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(FIXED_FLAGS.len() + 5);
        args.push(format!("-sDEVICE={DEVICE}").into());
        args.extend(FIXED_FLAGS.into_iter().map(OsString::from));
        args.push(format!("-dDEVICEWIDTHPOINTS={}", mm_to_points(printer.page_width)).into());
        args.push(format!("-dDEVICEHEIGHTPOINTS={}", mm_to_points(printer.page_height)).into());
        args.push(format!("-sOutputFile=%printer%{}", printer.name).into());
        args.push(artifact.into());
        args
    }

    fn command_line(&self, args: &[OsString]) -> String {
        let mut line = self.binary.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

impl PrintDispatcher for GhostscriptDispatcher {
    #[instrument(skip_all, fields(device = %printer.name, artifact = %artifact.display()))]
    fn submit(&self, artifact: &Path, printer: &PrinterProfile) -> Result<DispatchOutcome> {
        let artifact = std::path::absolute(artifact).map_err(|e| PrintgateError::Dispatch {
            device: printer.name.clone(),
            output: format!("unable to resolve {}: {e}", artifact.display()),
        })?;
        let args = Self::arguments(&artifact, printer);

        if !self.print_out {
            info!(command = %self.command_line(&args), "print_out disabled; not dispatching");
            return Ok(DispatchOutcome::default());
        }
        if self.debug {
            info!(command = %self.command_line(&args), "dispatching");
        }

        let result = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| PrintgateError::Dispatch {
                device: printer.name.clone(),
                output: format!("unable to launch {}: {e}", self.binary.display()),
            })?;

        let mut output = String::from_utf8_lossy(&result.stdout).into_owned();
        output.push_str(&String::from_utf8_lossy(&result.stderr));

        if !result.status.success() {
            error!(status = %result.status, output = %output, "print tool failed");
            return Err(PrintgateError::Dispatch {
                device: printer.name.clone(),
                output: format!("{}: {}", result.status, output.trim_end()),
            });
        }

        info!("artifact dispatched");
        Ok(DispatchOutcome {
            dispatched: true,
            output,
        })
    }
}
