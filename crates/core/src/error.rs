// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::fmt::{Display, Formatter};

pub mod diagnostic;

use diagnostic::Diagnostic;

/// The single error type of the engine. Every failure carries a [`Diagnostic`]
/// describing what went wrong and, where useful, how to proceed.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Diagnostic);

impl Error {
	pub fn diagnostic(self) -> Diagnostic {
		self.0
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}

	/// Cancellation is a normal abort path, not a system error.
	pub fn is_cancellation(&self) -> bool {
		self.0.code == diagnostic::refresh::CANCELLED
	}

	/// Internal-consistency faults indicate a violated engine invariant.
	pub fn is_internal(&self) -> bool {
		self.0.code == diagnostic::internal::INTERNAL_ERROR
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0.render())
	}
}

impl std::error::Error for Error {}
