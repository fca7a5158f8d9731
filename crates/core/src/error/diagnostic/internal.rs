// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use crate::error::diagnostic::Diagnostic;

pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Creates an internal error diagnostic with source location context.
///
/// Internal errors indicate a violated engine invariant. They are always
/// fatal to the current statement and are never silently recovered.
pub fn internal_with_location(reason: impl Into<String>, file: &str, line: u32) -> Diagnostic {
	Diagnostic {
		code: INTERNAL_ERROR.to_string(),
		message: format!("Internal error: {}", reason.into()),
		label: Some(format!("invariant violated at {}:{}", file, line)),
		help: Some(
			"This is an internal error that should never occur in normal operation. \
			 Please file a bug report including the location above."
				.to_string(),
		),
		notes: vec!["This error indicates a critical internal inconsistency.".to_string()],
	}
}

pub fn internal(reason: impl Into<String>) -> Diagnostic {
	internal_with_location(reason, "unknown", 0)
}

/// Creates an internal error diagnostic with automatic source location capture.
#[macro_export]
macro_rules! internal_error {
	($reason:expr) => {
		$crate::diagnostic::internal::internal_with_location($reason, file!(), line!())
	};
	($fmt:expr, $($arg:tt)*) => {
		$crate::diagnostic::internal::internal_with_location(format!($fmt, $($arg)*), file!(), line!())
	};
}

/// Returns an internal error with automatic source location capture.
#[macro_export]
macro_rules! return_internal_error {
	($reason:expr) => {
		return Err($crate::Error($crate::internal_error!($reason)))
	};
	($fmt:expr, $($arg:tt)*) => {
		return Err($crate::Error($crate::internal_error!($fmt, $($arg)*)))
	};
}
