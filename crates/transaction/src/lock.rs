// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::collections::HashMap;

use parking_lot::Mutex;
use stratadb_core::{diagnostic::transaction::lock_conflict, interface::id::ObjectId, return_error};
use tracing::debug;

use crate::{Transaction, TransactionId};

/// Object-granularity exclusive lock manager.
///
/// Locks are held until end of transaction; the holder releases them all at
/// commit or rollback. There is no lock queue: a conflicting request fails
/// immediately and the caller decides whether to retry, which keeps the
/// engine free of deadlocks by construction.
#[derive(Default)]
pub struct LockManager {
	held: Mutex<HashMap<ObjectId, TransactionId>>,
}

impl LockManager {
	pub fn new() -> Self {
		Self::default()
	}

	/// Acquires an exclusive, whole-object lock for the transaction's
	/// duration. Re-acquiring a lock the transaction already holds is a
	/// no-op.
	pub fn acquire_exclusive(
		&self,
		txn: &Transaction,
		object: ObjectId,
		name: &str,
	) -> stratadb_core::Result<()> {
		let mut held = self.held.lock();
		match held.get(&object) {
			Some(&holder) if holder == txn.id() => Ok(()),
			Some(_) => return_error!(lock_conflict(name)),
			None => {
				held.insert(object, txn.id());
				debug!(txn = %txn.id(), object = %object, "acquired exclusive lock");
				Ok(())
			}
		}
	}

	/// Verifies the transaction may read the object: access conflicts with
	/// an exclusive lock held by anyone else. Readers outside an in-flight
	/// refresh must never observe its uncommitted contents, so they fail
	/// fast here instead of reading through the lock.
	pub fn check_access(
		&self,
		txn: &Transaction,
		object: ObjectId,
		name: &str,
	) -> stratadb_core::Result<()> {
		match self.held.lock().get(&object) {
			Some(&holder) if holder != txn.id() => return_error!(lock_conflict(name)),
			_ => Ok(()),
		}
	}

	pub fn holds(&self, txn: &Transaction, object: ObjectId) -> bool {
		self.held.lock().get(&object) == Some(&txn.id())
	}

	/// Drops every held lock. Recovery-only: lock state is in-memory and
	/// does not survive a crash.
	pub fn reset(&self) {
		self.held.lock().clear();
	}

	/// Releases every lock held by the transaction. Called at end of
	/// transaction, never earlier.
	pub fn release_all(&self, txn: &Transaction) {
		self.held.lock().retain(|_, holder| *holder != txn.id());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_exclusive_lock_conflicts_across_transactions() {
		let locks = LockManager::new();
		let a = Transaction::begin();
		let b = Transaction::begin();
		let object = ObjectId(2000);

		locks.acquire_exclusive(&a, object, "v").unwrap();
		// Re-entrant for the holder.
		locks.acquire_exclusive(&a, object, "v").unwrap();

		let err = locks.acquire_exclusive(&b, object, "v").unwrap_err();
		assert_eq!(err.code(), "TXN_001");

		locks.release_all(&a);
		locks.acquire_exclusive(&b, object, "v").unwrap();
	}

	#[test]
	fn test_access_conflicts_with_foreign_exclusive_lock() {
		let locks = LockManager::new();
		let holder = Transaction::begin();
		let reader = Transaction::begin();
		let object = ObjectId(2000);

		// Unlocked objects and own locks are accessible.
		locks.check_access(&reader, object, "v").unwrap();
		locks.acquire_exclusive(&holder, object, "v").unwrap();
		locks.check_access(&holder, object, "v").unwrap();

		let err = locks.check_access(&reader, object, "v").unwrap_err();
		assert_eq!(err.code(), "TXN_001");

		locks.release_all(&holder);
		locks.check_access(&reader, object, "v").unwrap();
	}

	#[test]
	fn test_release_all_only_drops_own_locks() {
		let locks = LockManager::new();
		let a = Transaction::begin();
		let b = Transaction::begin();

		locks.acquire_exclusive(&a, ObjectId(2000), "x").unwrap();
		locks.acquire_exclusive(&b, ObjectId(2001), "y").unwrap();

		locks.release_all(&a);
		assert!(!locks.holds(&a, ObjectId(2000)));
		assert!(locks.holds(&b, ObjectId(2001)));
	}
}
