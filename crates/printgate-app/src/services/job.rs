// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request → job translation.
//
// Form fields are classified once into reserved selectors and template data,
// folded into a `JobBuilder`, and validated against the printer registry
// before any rendering, conversion or dispatch work begins.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;
use std::path::PathBuf;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{JobId, JobMode, PrinterProfile};
use printgate_core::GatewayConfig;

use crate::form::FormPairs;

use super::temp::{JobPaths, TempArtifacts};

/// Field selecting the template by name.
pub const TEMPLATE_FIELD: &str = "template";

/// Field selecting the printer by registry key.
pub const PRINTER_FIELD: &str = "printer";

/// Field carrying a pre-rendered document.
pub const FILE_DATA_FIELD: &str = "file_data";

/// One classified form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormField {
    TemplateSelector(String),
    PrinterSelector(String),
    RawArtifact(Vec<u8>),
    TemplateDatum(String, String),
}

impl FormField {
    pub fn classify(name: String, value: Vec<u8>) -> Self {
        match name.as_str() {
            TEMPLATE_FIELD => Self::TemplateSelector(lossy(value)),
            PRINTER_FIELD => Self::PrinterSelector(lossy(value)),
            FILE_DATA_FIELD => Self::RawArtifact(value),
            _ => Self::TemplateDatum(name, lossy(value)),
        }
    }
}

fn lossy(value: Vec<u8>) -> String {
    String::from_utf8(value).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Classify every pair, rejecting any field name that appears twice.
pub fn classify_form(pairs: FormPairs) -> Result<Vec<FormField>> {
    let mut seen = HashSet::with_capacity(pairs.len());
    for (name, _) in &pairs {
        if !seen.insert(name.as_str()) {
            return Err(PrintgateError::MultiValuedField(name.clone()));
        }
    }
    Ok(pairs
        .into_iter()
        .map(|(name, value)| FormField::classify(name, value))
        .collect())
}

/// Where a job's printable content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobSource {
    Template {
        name: String,
        path: PathBuf,
        data: BTreeMap<String, String>,
    },
    Artifact {
        path: PathBuf,
    },
}

/// A validated print job.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: JobId,
    pub source: JobSource,
    pub printer_key: String,
    pub printer: PrinterProfile,
}

impl PrintJob {
    pub fn mode(&self) -> JobMode {
        match self.source {
            JobSource::Template { .. } => JobMode::Template,
            JobSource::Artifact { .. } => JobMode::Artifact,
        }
    }
}

/// Accumulates classified fields into a job.
#[derive(Debug, Default)]
pub struct JobBuilder {
    template: Option<String>,
    printer_key: Option<String>,
    raw: Option<Vec<u8>>,
    data: BTreeMap<String, String>,
}

impl JobBuilder {
    pub fn from_fields(fields: impl IntoIterator<Item = FormField>) -> Self {
        fields.into_iter().fold(Self::default(), |mut builder, field| {
            builder.push(field);
            builder
        })
    }

    pub fn push(&mut self, field: FormField) {
        match field {
            FormField::TemplateSelector(name) => self.template = Some(name),
            FormField::PrinterSelector(key) => self.printer_key = Some(key),
            FormField::RawArtifact(bytes) => self.raw = Some(bytes),
            FormField::TemplateDatum(name, value) => {
                self.data.insert(name, value);
            }
        }
    }

    /// Materialise the raw artifact (if any) and validate the job.
    ///
    /// The raw artifact is registered with `temp` before it is written, so a
    /// job that fails validation afterwards leaves nothing behind.
    pub fn build(
        self,
        id: JobId,
        config: &GatewayConfig,
        paths: &JobPaths,
        temp: &mut TempArtifacts,
    ) -> Result<PrintJob> {
        let source = match self.raw {
            Some(bytes) => {
                if let Some(name) = &self.template {
                    debug!(job = %id, template = %name, "file_data supplied; ignoring template");
                }
                temp.track(&paths.raw);
                write_raw(&paths.raw, &bytes)?;
                info!(
                    job = %id,
                    bytes = bytes.len(),
                    sha256 = %hex::encode(Sha256::digest(&bytes)),
                    "raw artifact received"
                );
                JobSource::Artifact {
                    path: paths.raw.clone(),
                }
            }
            None => {
                let name = self.template.unwrap_or_default();
                if name.is_empty() {
                    return Err(invalid("template or file_data not defined in request"));
                }
                let path = config
                    .template_path(&name)
                    .filter(|p| p.is_file())
                    .ok_or_else(|| {
                        let shown = config
                            .template_path(&name)
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| name.clone());
                        invalid(format!("template \"{shown}\" doesn't exist"))
                    })?;
                JobSource::Template {
                    name,
                    path,
                    data: self.data,
                }
            }
        };

        if let JobSource::Artifact { path } = &source {
            if !path.is_file() {
                return Err(invalid(format!("file \"{}\" doesn't exist", path.display())));
            }
        }

        let printer_key = self.printer_key.unwrap_or_default();
        if printer_key.is_empty() {
            return Err(invalid("printer not defined in request"));
        }
        let printer = config
            .printer(&printer_key)
            .filter(|p| p.validate().is_ok())
            .cloned()
            .ok_or_else(|| {
                invalid(format!("printer \"{printer_key}\" doesn't exist in config file"))
            })?;

        Ok(PrintJob {
            id,
            source,
            printer_key,
            printer,
        })
    }
}

fn invalid(detail: impl Into<String>) -> PrintgateError {
    PrintgateError::Validation(detail.into())
}

fn write_raw(path: &std::path::Path, bytes: &[u8]) -> Result<()> {
    let mut file = std::fs::File::create(path)
        .map_err(|e| PrintgateError::RawArtifact(format!("{}: {e}", path.display())))?;
    file.write_all(bytes)
        .map_err(|e| PrintgateError::RawArtifact(format!("{}: {e}", path.display())))
}
