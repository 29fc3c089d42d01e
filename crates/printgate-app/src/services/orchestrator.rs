// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Job orchestrator — the print pipeline.
//
// One call to `process` handles one request end to end:
//
//   form → classify → build + validate job
//        → render → convert → dispatch     (template jobs)
//        → dispatch                        (file_data jobs)
//
// Everything is synchronous and blocking; the HTTP layer runs each call on
// its own blocking thread. The first failing stage ends the job and its error
// is returned wrapped with the stage name and job id. Intermediates are
// removed when the job ends unless debug mode is on.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use printgate_core::error::{Result, Stage};
use printgate_core::types::{IdGenerator, JobId, JobMode, TimestampUuidIds};
use printgate_core::GatewayConfig;
use printgate_document::{
    Code128Encoder, DocumentRenderer, GoTemplateEngine, PageConverter, WkhtmltopdfConverter,
};
use printgate_print::{GhostscriptDispatcher, PrintDispatcher};

use crate::form::FormPairs;

use super::job::{JobBuilder, JobSource, classify_form};
use super::temp::{JobPaths, TempArtifacts};

/// Summary of a completed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job_id: JobId,
    pub printer_key: String,
    pub device: String,
    pub mode: JobMode,
    /// False when `print_out` is disabled.
    pub dispatched: bool,
}

/// Sequences rendering, conversion and dispatch for each request.
pub struct JobOrchestrator {
    config: Arc<GatewayConfig>,
    renderer: DocumentRenderer,
    converter: Arc<dyn PageConverter>,
    dispatcher: Arc<dyn PrintDispatcher>,
    ids: Arc<dyn IdGenerator>,
}

impl JobOrchestrator {
    pub fn new(
        config: Arc<GatewayConfig>,
        renderer: DocumentRenderer,
        converter: Arc<dyn PageConverter>,
        dispatcher: Arc<dyn PrintDispatcher>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            config,
            renderer,
            converter,
            dispatcher,
            ids,
        }
    }

    /// Production wiring: Go templates + Code 128, wkhtmltopdf and Ghostscript
    /// from the configured bin directory.
    pub fn from_config(config: Arc<GatewayConfig>) -> Self {
        let converter = WkhtmltopdfConverter::new(config.wkhtmltopdf_path());
        let dispatcher = GhostscriptDispatcher::new(
            config.ghostscript_path(),
            config.debug_mode,
            config.print_out,
        );
        Self::new(
            Arc::clone(&config),
            DocumentRenderer::new(Box::new(GoTemplateEngine::new()), Box::new(Code128Encoder)),
            Arc::new(converter),
            Arc::new(dispatcher),
            Arc::new(TimestampUuidIds),
        )
    }

    /// Run one print job from its raw form fields.
    #[instrument(skip_all, fields(fields = form.len()))]
    pub fn process(&self, form: FormPairs) -> Result<JobReport> {
        let fields = classify_form(form)?;

        let id = self.ids.next_id();
        let paths = JobPaths::new(&self.config.temp_dir, &id);
        let mut temp = TempArtifacts::new(self.config.debug_mode);

        let job = JobBuilder::from_fields(fields).build(id, &self.config, &paths, &mut temp)?;
        info!(
            job = %job.id,
            mode = %job.mode(),
            printer = %job.printer_key,
            "job accepted"
        );

        let artifact: PathBuf = match &job.source {
            JobSource::Template { name, path, data } => {
                debug!(job = %job.id, template = %name, fields = data.len(), "rendering");
                temp.track(&paths.document);
                temp.track_scratch(&paths.barcode);
                self.renderer
                    .render(path, data, &paths.document, &paths.barcode)
                    .map_err(|e| e.in_stage(Stage::Render, &job.id))?;

                temp.track(&paths.artifact);
                self.converter
                    .convert(&paths.document, &paths.artifact, job.printer.geometry())
                    .map_err(|e| e.in_stage(Stage::Convert, &job.id))?;
                paths.artifact.clone()
            }
            JobSource::Artifact { path } => path.clone(),
        };

        let outcome = self
            .dispatcher
            .submit(&artifact, &job.printer)
            .map_err(|e| e.in_stage(Stage::Dispatch, &job.id))?;

        info!(
            job = %job.id,
            device = %job.printer.name,
            dispatched = outcome.dispatched,
            "job completed"
        );
        Ok(JobReport {
            mode: job.mode(),
            device: job.printer.name.clone(),
            dispatched: outcome.dispatched,
            printer_key: job.printer_key,
            job_id: job.id,
        })
    }
}
