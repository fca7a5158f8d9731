// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use crate::error::diagnostic::Diagnostic;

pub const CANCELLED: &str = "REFRESH_001";

/// The statement was cancelled at a cooperative checkpoint
pub fn statement_cancelled() -> Diagnostic {
	Diagnostic {
		code: CANCELLED.to_string(),
		message: "canceling statement due to cancellation request".to_string(),
		label: None,
		help: None,
		notes: vec![],
	}
}
