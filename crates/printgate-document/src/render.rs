// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document renderer — fills a template with form data and writes the HTML
// document the page converter consumes.
//
// When the data carries `BARCODE_DATA`, a Code 128 bitmap is generated,
// written to a scratch PNG, read back as base64 into `BARCODE_IMAGE_BASE64`
// and the PNG is removed straight away. Templates embed it with
// `<img src="data:image/png;base64,{{.BARCODE_IMAGE_BASE64}}">`.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;
use tracing::{debug, instrument, warn};

use printgate_core::error::{PrintgateError, Result};

use crate::barcode::BarcodeEncoder;
use crate::template::TemplateEngine;

/// Form field holding the raw barcode payload.
pub const BARCODE_DATA_KEY: &str = "BARCODE_DATA";

/// Field the base64 PNG is injected under.
pub const BARCODE_IMAGE_KEY: &str = "BARCODE_IMAGE_BASE64";

/// Square resolution of generated barcode bitmaps.
pub const BARCODE_SIZE_PX: u32 = 1000;

/// Renders templates into HTML documents on disk.
pub struct DocumentRenderer {
    engine: Box<dyn TemplateEngine>,
    barcodes: Box<dyn BarcodeEncoder>,
}

impl DocumentRenderer {
    pub fn new(engine: Box<dyn TemplateEngine>, barcodes: Box<dyn BarcodeEncoder>) -> Self {
        Self { engine, barcodes }
    }

    /// Render `template` with `data` into `output`.
    ///
    /// `barcode_scratch` is where the intermediate PNG is written when a
    /// barcode is requested; it never outlives this call.
    #[instrument(skip_all, fields(template = %template.display(), output = %output.display()))]
    pub fn render(
        &self,
        template: &Path,
        data: &BTreeMap<String, String>,
        output: &Path,
        barcode_scratch: &Path,
    ) -> Result<()> {
        let data = match data.get(BARCODE_DATA_KEY) {
            Some(payload) => {
                let encoded = self.barcode_base64(payload, barcode_scratch)?;
                let mut with_image = data.clone();
                with_image.insert(BARCODE_IMAGE_KEY.to_owned(), encoded);
                Cow::Owned(with_image)
            }
            None => Cow::Borrowed(data),
        };

        let html = self.engine.render(template, &data)?;
        std::fs::write(output, html.as_bytes()).map_err(|e| {
            PrintgateError::Render(format!("unable to write {}: {e}", output.display()))
        })?;
        debug!(bytes = html.len(), "document written");
        Ok(())
    }

    fn barcode_base64(&self, payload: &str, scratch: &Path) -> Result<String> {
        let bitmap = self
            .barcodes
            .encode(payload, BARCODE_SIZE_PX, BARCODE_SIZE_PX)?;
        bitmap
            .save_with_format(scratch, ImageFormat::Png)
            .map_err(|e| {
                PrintgateError::Barcode(format!("unable to write {}: {e}", scratch.display()))
            })?;

        let bytes = std::fs::read(scratch);
        if let Err(e) = std::fs::remove_file(scratch) {
            warn!(path = %scratch.display(), error = %e, "failed to remove barcode image");
        }
        let bytes = bytes.map_err(|e| {
            PrintgateError::Barcode(format!("unable to read {}: {e}", scratch.display()))
        })?;
        Ok(STANDARD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use image::GrayImage;

    use super::*;
    use crate::barcode::Code128Encoder;
    use crate::template::GoTemplateEngine;

    /// Engine that records the data it was given.
    struct CapturingEngine(Arc<Mutex<Option<BTreeMap<String, String>>>>);

    impl TemplateEngine for CapturingEngine {
        fn render(&self, _template: &Path, data: &BTreeMap<String, String>) -> Result<String> {
            *self.0.lock().unwrap() = Some(data.clone());
            Ok("ok".into())
        }
    }

    struct FailingBarcodes;

    impl BarcodeEncoder for FailingBarcodes {
        fn encode(&self, _data: &str, _w: u32, _h: u32) -> Result<GrayImage> {
            Err(PrintgateError::Barcode("unsupported character".into()))
        }
    }

    fn fields(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn renders_template_to_output() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("label.html");
        std::fs::write(&template, "<h1>{{.NAME}}</h1>").unwrap();
        let output = dir.path().join("job.html");

        let renderer =
            DocumentRenderer::new(Box::new(GoTemplateEngine::new()), Box::new(Code128Encoder));
        renderer
            .render(&template, &fields(&[("NAME", "Alice")]), &output, &dir.path().join("b.png"))
            .unwrap();

        assert_eq!(std::fs::read_to_string(output).unwrap(), "<h1>Alice</h1>");
    }

    #[test]
    fn barcode_is_embedded_and_scratch_removed() {
        let dir = tempfile::tempdir().unwrap();
        let scratch = dir.path().join("job-barcode.png");
        let seen = Arc::new(Mutex::new(None));
        let renderer = DocumentRenderer::new(
            Box::new(CapturingEngine(Arc::clone(&seen))),
            Box::new(Code128Encoder),
        );

        renderer
            .render(
                Path::new("unused.html"),
                &fields(&[("BARCODE_DATA", "PKG-0042")]),
                &dir.path().join("job.html"),
                &scratch,
            )
            .unwrap();

        let data = seen.lock().unwrap().take().unwrap();
        let encoded = data.get(BARCODE_IMAGE_KEY).expect("barcode injected");
        let png = STANDARD.decode(encoded).unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (BARCODE_SIZE_PX, BARCODE_SIZE_PX));
        assert_eq!(data.get(BARCODE_DATA_KEY).unwrap(), "PKG-0042");
        assert!(!scratch.exists());
    }

    #[test]
    fn no_barcode_key_leaves_data_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(None));
        let renderer = DocumentRenderer::new(
            Box::new(CapturingEngine(Arc::clone(&seen))),
            Box::new(FailingBarcodes),
        );

        renderer
            .render(
                Path::new("unused.html"),
                &fields(&[("NAME", "Bob")]),
                &dir.path().join("job.html"),
                &dir.path().join("b.png"),
            )
            .unwrap();

        let data = seen.lock().unwrap().take().unwrap();
        assert!(!data.contains_key(BARCODE_IMAGE_KEY));
    }

    #[test]
    fn barcode_failure_stops_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("job.html");
        let seen = Arc::new(Mutex::new(None));
        let renderer = DocumentRenderer::new(
            Box::new(CapturingEngine(Arc::clone(&seen))),
            Box::new(FailingBarcodes),
        );

        let err = renderer
            .render(
                Path::new("unused.html"),
                &fields(&[("BARCODE_DATA", "x")]),
                &output,
                &dir.path().join("b.png"),
            )
            .unwrap_err();

        assert!(err.to_string().contains("unsupported character"));
        assert!(seen.lock().unwrap().is_none());
        assert!(!output.exists());
    }
}
