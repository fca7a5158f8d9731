// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::sync::{
	Arc,
	atomic::{AtomicBool, Ordering},
};

use crate::{diagnostic::refresh::statement_cancelled, return_error};

/// Cooperative cancellation token passed into long-running operations.
///
/// Cloning shares the underlying flag, so a token handed to an operation can
/// be cancelled from outside it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.0.store(true, Ordering::Release);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}

	/// Surfaces a pending cancellation request as a cancellation fault.
	pub fn check(&self) -> crate::Result<()> {
		if self.is_cancelled() {
			return_error!(statement_cancelled());
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_check_passes_until_cancelled() {
		let token = CancellationToken::new();
		assert!(token.check().is_ok());

		let shared = token.clone();
		shared.cancel();

		let err = token.check().unwrap_err();
		assert!(err.is_cancellation());
	}
}
