// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the printgate print gateway.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PrintgateError, Result};

/// Unique identifier for a print job.
///
/// Every temporary file a job creates is named after its id, so ids must
/// never repeat within a process, even across concurrently handled requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of job identifiers, injected into the orchestrator.
pub trait IdGenerator: Send + Sync {
    /// Produce an id that no earlier call in this process has returned.
    fn next_id(&self) -> JobId;
}

/// Production generator: second-resolution UTC timestamp plus a random
/// UUID v4 token. The timestamp keeps temp listings sortable, the token
/// keeps names unique when many jobs start within the same second.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimestampUuidIds;

impl IdGenerator for TimestampUuidIds {
    fn next_id(&self) -> JobId {
        JobId(format!(
            "{}-{}",
            Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4().simple()
        ))
    }
}

/// Deterministic generator backed by a monotonically increasing counter.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> JobId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        JobId(format!("{}{n:06}", self.prefix))
    }
}

/// A named physical printer and its page geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterProfile {
    /// Device name as known to the OS print subsystem.
    #[serde(default)]
    pub name: String,
    /// Page width in millimetres.
    #[serde(default)]
    pub page_width: u32,
    /// Page height in millimetres.
    #[serde(default)]
    pub page_height: u32,
    #[serde(default)]
    pub dpi: u32,
}

impl PrinterProfile {
    /// Check that every field is set. Fields are checked in declaration
    /// order and the first missing one is reported.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(printer_field_error("\"name\" undefined or empty"));
        }
        if self.page_width == 0 {
            return Err(printer_field_error("\"page_width\" undefined or zero"));
        }
        if self.page_height == 0 {
            return Err(printer_field_error("\"page_height\" undefined or zero"));
        }
        if self.dpi == 0 {
            return Err(printer_field_error("\"dpi\" undefined or zero"));
        }
        Ok(())
    }

    /// Physical page geometry used for conversion.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width_mm: self.page_width,
            height_mm: self.page_height,
        }
    }
}

fn printer_field_error(detail: &str) -> PrintgateError {
    PrintgateError::Printer(detail.to_owned())
}

/// Page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width_mm: u32,
    pub height_mm: u32,
}

/// How a job's artifact was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobMode {
    /// Rendered from a named template and form fields.
    Template,
    /// Supplied pre-rendered in the `file_data` field.
    Artifact,
}

impl std::fmt::Display for JobMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Template => "template",
            Self::Artifact => "artifact",
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;

    fn zebra() -> PrinterProfile {
        PrinterProfile {
            name: "ZebraPrinter".into(),
            page_width: 100,
            page_height: 50,
            dpi: 300,
        }
    }

    #[test]
    fn complete_profile_is_valid() {
        assert!(zebra().validate().is_ok());
    }

    #[test]
    fn each_missing_field_is_rejected() {
        let cases: [(fn(&mut PrinterProfile), &str); 4] = [
            (|p| p.name.clear(), "\"name\""),
            (|p| p.page_width = 0, "\"page_width\""),
            (|p| p.page_height = 0, "\"page_height\""),
            (|p| p.dpi = 0, "\"dpi\""),
        ];
        for (breaks, field) in cases {
            let mut profile = zebra();
            breaks(&mut profile);
            let err = profile.validate().unwrap_err().to_string();
            assert!(err.contains(field), "{err} should mention {field}");
        }
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new("job-");
        assert_eq!(ids.next_id().as_str(), "job-000001");
        assert_eq!(ids.next_id().as_str(), "job-000002");
    }

    #[test]
    fn timestamp_ids_do_not_collide_within_one_second() {
        let ids = TimestampUuidIds;
        let seen: HashSet<JobId> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn sequential_ids_are_unique_across_threads() {
        let ids = Arc::new(SequentialIds::new("t"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = Arc::clone(&ids);
                std::thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 2000);
    }

    #[test]
    fn geometry_comes_from_profile() {
        assert_eq!(
            zebra().geometry(),
            PageGeometry {
                width_mm: 100,
                height_mm: 50
            }
        );
    }
}
