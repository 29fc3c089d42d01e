// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Template engine seam.
//
// Label templates use the Go template dialect: `{{.NAME}}` substitutes a
// field, `{{if .BARCODE_IMAGE_BASE64}}...{{end}}` guards optional blocks.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument};

use printgate_core::error::{PrintgateError, Result};

/// Capability: render a template file with flat string data.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &Path, data: &BTreeMap<String, String>) -> Result<String>;
}

/// One `{{ ... }}` action, delimiters excluded.
static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\{\{(.*?)\}\}").expect("BUG: invalid ACTION_RE regex literal")
});

/// A top-level `.Field` reference inside an action.
static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s(])\.([A-Za-z_][A-Za-z0-9_]*)")
        .expect("BUG: invalid FIELD_RE regex literal")
});

/// Go-dialect engine backed by `gtmpl`.
///
/// Templates are read from disk on every call so edits to the templates
/// directory take effect without a restart. Fields a template references
/// but the request omits render as empty strings, and values are
/// HTML-escaped before substitution.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoTemplateEngine;

impl GoTemplateEngine {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateEngine for GoTemplateEngine {
    #[instrument(skip(self, data), fields(template = %template.display(), fields = data.len()))]
    fn render(&self, template: &Path, data: &BTreeMap<String, String>) -> Result<String> {
        let source = std::fs::read_to_string(template).map_err(|e| {
            PrintgateError::Render(format!("unable to read template {}: {e}", template.display()))
        })?;

        let mut context: HashMap<String, String> = data
            .iter()
            .map(|(k, v)| (k.clone(), escape_html(v)))
            .collect();
        for field in referenced_fields(&source) {
            context.entry(field).or_default();
        }

        let rendered = gtmpl::template(&source, context)
            .map_err(|e| PrintgateError::Render(format!("{}: {e}", template.display())))?;
        debug!(bytes = rendered.len(), "template rendered");
        Ok(rendered)
    }
}

/// Names of every `.Field` the template's actions refer to.
fn referenced_fields(source: &str) -> Vec<String> {
    ACTION_RE
        .captures_iter(source)
        .filter_map(|action| action.get(1))
        .flat_map(|action| {
            FIELD_RE
                .captures_iter(action.as_str())
                .filter_map(|c| c.get(1).map(|m| m.as_str().to_owned()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
