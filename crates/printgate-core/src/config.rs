// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gateway configuration and printer registry.
//
// Loaded once at startup from a JSON file, validated in full, and then shared
// read-only by every request handler.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::error::{PrintgateError, Result};
use crate::types::PrinterProfile;

/// Default HTTP body limit; raw artifacts arrive inline in the form.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024; // 64 MiB

/// File extension appended to template names.
const TEMPLATE_EXTENSION: &str = "html";

/// Process-wide gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Listening port, kept as the string the config file carries.
    #[serde(default)]
    pub port: String,
    /// Printer registry keyed by the `printer` form value.
    #[serde(default)]
    pub printers: BTreeMap<String, PrinterProfile>,
    /// Keep intermediates on disk and log dispatch commands.
    #[serde(default)]
    pub debug_mode: bool,
    /// When false, jobs are converted but never sent to a device.
    #[serde(default = "default_true")]
    pub print_out: bool,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    /// Directory holding the external tool binaries.
    #[serde(default = "default_bin_dir")]
    pub bin_dir: PathBuf,
    /// Converter binary file name inside `bin_dir`.
    #[serde(default = "default_wkhtmltopdf")]
    pub wkhtmltopdf: String,
    /// Ghostscript binary file name inside `bin_dir`.
    #[serde(default = "default_ghostscript")]
    pub ghostscript: String,
    #[serde(default = "default_max_request_bytes")]
    pub max_request_bytes: usize,
}

fn default_true() -> bool {
    true
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_bin_dir() -> PathBuf {
    PathBuf::from("bin")
}

fn default_wkhtmltopdf() -> String {
    if cfg!(windows) {
        "wkhtmltopdf.exe".into()
    } else {
        "wkhtmltopdf".into()
    }
}

fn default_ghostscript() -> String {
    if cfg!(windows) {
        "gswin64c.exe".into()
    } else {
        "gs".into()
    }
}

fn default_max_request_bytes() -> usize {
    DEFAULT_MAX_REQUEST_BYTES
}

impl GatewayConfig {
    /// Read, parse and validate the config file at `path`.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PrintgateError::Config(format!("unable to read {}: {e}", path.display()))
        })?;
        let config = Self::from_json(&raw)?;
        info!(printers = config.printers.len(), "configuration loaded");
        Ok(config)
    }

    /// Parse and validate a JSON config document.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| PrintgateError::Config(format!("malformed config file: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the whole configuration. Misconfigured flags only warn.
    pub fn validate(&self) -> Result<()> {
        if self.debug_mode {
            warn!("\"debug_mode\" in config file set \"true\"");
        }
        if !self.print_out {
            warn!("\"print_out\" in config file set \"false\"; jobs will not reach any printer");
        }
        self.port()?;
        if self.printers.is_empty() {
            return Err(PrintgateError::Config(
                "printers parameter undefined or filled incorrectly".into(),
            ));
        }
        for (key, printer) in &self.printers {
            printer.validate().map_err(|e| {
                PrintgateError::Config(format!("printer \"{key}\" is not defined correctly: {e}"))
            })?;
        }
        Ok(())
    }

    /// The listening port as a number.
    pub fn port(&self) -> Result<u16> {
        match self.port.trim().parse::<u16>() {
            Ok(port) if port > 0 => Ok(port),
            _ => Err(PrintgateError::Config(
                "port parameter undefined or filled incorrectly".into(),
            )),
        }
    }

    /// Look up a printer profile by its registry key.
    pub fn printer(&self, key: &str) -> Option<&PrinterProfile> {
        self.printers.get(key)
    }

    /// Resolve a template name to `templates_dir/<name>.html`.
    ///
    /// Returns `None` for names that are not a single plain file name, so a
    /// request can never reach outside the templates directory.
    pub fn template_path(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Some(
                self.templates_dir
                    .join(format!("{name}.{TEMPLATE_EXTENSION}")),
            ),
            _ => None,
        }
    }

    /// Override the tool directory (command line or environment).
    pub fn with_bin_dir(mut self, bin_dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = bin_dir.into();
        self
    }

    pub fn wkhtmltopdf_path(&self) -> PathBuf {
        self.bin_dir.join(&self.wkhtmltopdf)
    }

    pub fn ghostscript_path(&self) -> PathBuf {
        self.bin_dir.join(&self.ghostscript)
    }

    /// Create the working temp directory if it does not exist yet.
    pub fn ensure_temp_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.temp_dir).map_err(|e| {
            PrintgateError::Config(format!(
                "unable to create temp directory {}: {e}",
                self.temp_dir.display()
            ))
        })
    }
}
