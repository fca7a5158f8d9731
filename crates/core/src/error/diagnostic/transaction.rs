// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use crate::error::diagnostic::Diagnostic;

/// Another transaction holds a conflicting lock on the object
pub fn lock_conflict(name: &str) -> Diagnostic {
	Diagnostic {
		code: "TXN_001".to_string(),
		message: format!("could not obtain lock on \"{}\"", name),
		label: Some("lock conflict".to_string()),
		help: Some("Retry once the conflicting transaction has ended".to_string()),
		notes: vec![],
	}
}

/// The transaction has already ended and cannot be used further
pub fn transaction_not_active() -> Diagnostic {
	Diagnostic {
		code: "TXN_002".to_string(),
		message: "transaction is not active".to_string(),
		label: None,
		help: Some("Begin a new transaction".to_string()),
		notes: vec![],
	}
}
