// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test fixtures: a scratch workspace and recording capability fakes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use printgate_core::error::{PrintgateError, Result};
use printgate_core::types::{PageGeometry, PrinterProfile, SequentialIds};
use printgate_core::GatewayConfig;
use printgate_document::{Code128Encoder, DocumentRenderer, GoTemplateEngine, PageConverter};
use printgate_print::{DispatchOutcome, PrintDispatcher};

use crate::form::FormPairs;

use super::orchestrator::JobOrchestrator;

const CONFIG: &str = r#"{
    "port": "8080",
    "printers": {
        "zebra1": { "name": "ZebraPrinter", "page_width": 100, "page_height": 50, "dpi": 300 }
    }
}"#;

/// Scratch directory with `templates/label.html` and an empty `temp/`.
pub struct Workspace {
    _dir: tempfile::TempDir,
    pub config: GatewayConfig,
}

impl Workspace {
    pub fn new(debug_mode: bool, print_out: bool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = GatewayConfig::from_json(CONFIG).unwrap();
        config.debug_mode = debug_mode;
        config.print_out = print_out;
        config.templates_dir = dir.path().join("templates");
        config.temp_dir = dir.path().join("temp");
        std::fs::create_dir_all(&config.templates_dir).unwrap();
        config.ensure_temp_dir().unwrap();
        std::fs::write(
            config.templates_dir.join("label.html"),
            "<html><body><h1>{{.NAME}}</h1>\
             {{if .BARCODE_IMAGE_BASE64}}<img src=\"data:image/png;base64,{{.BARCODE_IMAGE_BASE64}}\">{{end}}\
             </body></html>",
        )
        .unwrap();
        Self { _dir: dir, config }
    }

    pub fn temp_entries(&self) -> usize {
        std::fs::read_dir(&self.config.temp_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    pub fn orchestrator(
        &self,
        converter: Arc<RecordingConverter>,
        dispatcher: Arc<RecordingDispatcher>,
    ) -> JobOrchestrator {
        JobOrchestrator::new(
            Arc::new(self.config.clone()),
            DocumentRenderer::new(Box::new(GoTemplateEngine::new()), Box::new(Code128Encoder)),
            converter,
            dispatcher,
            Arc::new(SequentialIds::new("job-")),
        )
    }
}

/// Text form pairs.
pub fn form(items: &[(&str, &str)]) -> FormPairs {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
        .collect()
}

/// What the converter saw on one call.
#[derive(Debug, Clone)]
pub struct ConvertCall {
    pub document: PathBuf,
    pub document_html: String,
    pub output: PathBuf,
    pub geometry: PageGeometry,
}

/// Converter that writes a stub PDF and records its inputs.
#[derive(Default)]
pub struct RecordingConverter {
    pub calls: Mutex<Vec<ConvertCall>>,
    pub fail_with: Option<String>,
}

impl RecordingConverter {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(message.to_owned()),
        }
    }

    pub fn calls(&self) -> Vec<ConvertCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageConverter for RecordingConverter {
    fn convert(&self, document: &Path, output: &Path, geometry: PageGeometry) -> Result<()> {
        self.calls.lock().unwrap().push(ConvertCall {
            document: document.to_path_buf(),
            document_html: std::fs::read_to_string(document).unwrap_or_default(),
            output: output.to_path_buf(),
            geometry,
        });
        if let Some(message) = &self.fail_with {
            // a half-written output must still be cleaned up
            std::fs::write(output, b"%PDF-partial").unwrap();
            return Err(PrintgateError::Conversion(message.clone()));
        }
        std::fs::write(output, b"%PDF-1.4 converted").unwrap();
        Ok(())
    }
}

/// What the dispatcher saw on one call.
#[derive(Debug, Clone)]
pub struct DispatchCall {
    pub artifact: PathBuf,
    pub artifact_bytes: Vec<u8>,
    pub printer: PrinterProfile,
}

/// Dispatcher that records submissions instead of printing.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub calls: Mutex<Vec<DispatchCall>>,
    pub fail_with: Option<String>,
}

impl RecordingDispatcher {
    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(message.to_owned()),
        }
    }

    pub fn calls(&self) -> Vec<DispatchCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PrintDispatcher for RecordingDispatcher {
    fn submit(&self, artifact: &Path, printer: &PrinterProfile) -> Result<DispatchOutcome> {
        self.calls.lock().unwrap().push(DispatchCall {
            artifact: artifact.to_path_buf(),
            artifact_bytes: std::fs::read(artifact).unwrap_or_default(),
            printer: printer.clone(),
        });
        match &self.fail_with {
            Some(message) => Err(PrintgateError::Dispatch {
                device: printer.name.clone(),
                output: message.clone(),
            }),
            None => Ok(DispatchOutcome {
                dispatched: true,
                output: String::new(),
            }),
        }
    }
}
