// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printgate-document — Document generation for the printgate print gateway.
//
// Provides template rendering (with optional Code 128 barcode embedding) and
// conversion of rendered HTML into a PDF sized to a printer's page geometry.
// The template engine, the barcode encoder and the converter sit behind
// traits so the pipeline can be exercised without external binaries.

pub mod barcode;
pub mod convert;
pub mod render;
pub mod template;

pub use barcode::{BarcodeEncoder, Code128Encoder};
pub use convert::{PageConverter, WkhtmltopdfConverter};
pub use render::DocumentRenderer;
pub use template::{GoTemplateEngine, TemplateEngine};
