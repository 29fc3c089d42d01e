// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-job temporary file naming and cleanup.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use printgate_core::types::JobId;

/// Every temp path one job may create, all derived from its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPaths {
    /// Verbatim copy of the `file_data` field.
    pub raw: PathBuf,
    /// Rendered HTML document.
    pub document: PathBuf,
    /// Barcode bitmap, consumed during rendering.
    pub barcode: PathBuf,
    /// Converted PDF.
    pub artifact: PathBuf,
}

impl JobPaths {
    pub fn new(temp_dir: &Path, id: &JobId) -> Self {
        Self {
            raw: temp_dir.join(format!("{id}-raw.pdf")),
            document: temp_dir.join(format!("{id}.html")),
            barcode: temp_dir.join(format!("{id}-barcode.png")),
            artifact: temp_dir.join(format!("{id}.pdf")),
        }
    }
}

/// Files a job caused to exist, removed when the guard drops.
///
/// Paths are registered before the stage that creates them runs, so a
/// stage that fails halfway still has its output removed. Retained paths
/// survive when `retain` is set (debug mode); scratch paths never do.
#[derive(Debug)]
pub struct TempArtifacts {
    retain: bool,
    retained: Vec<PathBuf>,
    scratch: Vec<PathBuf>,
}

impl TempArtifacts {
    pub fn new(retain: bool) -> Self {
        Self {
            retain,
            retained: Vec::new(),
            scratch: Vec::new(),
        }
    }

    /// Register an intermediate that debug mode keeps for inspection.
    pub fn track(&mut self, path: &Path) {
        self.retained.push(path.to_path_buf());
    }

    /// Register a file that is removed even in debug mode.
    pub fn track_scratch(&mut self, path: &Path) {
        self.scratch.push(path.to_path_buf());
    }
}

impl Drop for TempArtifacts {
    fn drop(&mut self) {
        if self.retain {
            for path in &self.retained {
                debug!(path = %path.display(), "debug mode: keeping intermediate");
            }
        } else {
            self.retained.iter().for_each(|p| remove_quietly(p));
        }
        self.scratch.iter().for_each(|p| remove_quietly(p));
    }
}

/// Best-effort removal: a file that never got created is fine, anything else
/// is logged and swallowed.
fn remove_quietly(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed temp file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
    }
}
