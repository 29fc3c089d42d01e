// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — turns form submissions into dispatched print jobs.

pub mod job;
pub mod orchestrator;
pub mod temp;

#[cfg(test)]
pub(crate) mod testing;
