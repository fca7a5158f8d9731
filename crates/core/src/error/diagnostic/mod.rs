// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

pub mod catalog;
pub mod internal;
pub mod refresh;
pub mod transaction;

/// A structured description of a failure: a stable code, a human-readable
/// message and optional label/help/notes for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
}

impl Diagnostic {
	pub fn render(&self) -> String {
		let mut out = format!("[{}] {}", self.code, self.message);
		if let Some(label) = &self.label {
			out.push_str("\n  ");
			out.push_str(label);
		}
		if let Some(help) = &self.help {
			out.push_str("\nhelp: ");
			out.push_str(help);
		}
		for note in &self.notes {
			out.push_str("\nnote: ");
			out.push_str(note);
		}
		out
	}
}

/// Returns early with an [`crate::Error`] built from the given diagnostic.
#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::Error($diagnostic))
	};
}
