// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// printgate-print — Submission of paginated artifacts to named physical
// printers.

pub mod dispatch;

pub use dispatch::{DispatchOutcome, GhostscriptDispatcher, PrintDispatcher, mm_to_points};
