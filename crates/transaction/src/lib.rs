// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::fmt::{Display, Formatter};

use stratadb_core::{
	common::{CommandId, Snapshot},
	diagnostic::transaction::transaction_not_active,
	interface::id::{ExtentId, ObjectId, UserId},
	return_error,
};
use stratadb_storage::Storage;
use tracing::debug;

pub mod lock;

pub use lock::LockManager;

/// A unique identifier for a transaction using UUIDv7 for time-ordered
/// uniqueness
#[repr(transparent)]
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct TransactionId(uuid::Uuid);

impl TransactionId {
	pub fn generate() -> Self {
		Self(uuid::Uuid::now_v7())
	}
}

impl Default for TransactionId {
	fn default() -> Self {
		Self::generate()
	}
}

impl Display for TransactionId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransactionState {
	Active,
	Committed,
	RolledBack,
}

/// Record of a storage-identity exchange performed under this transaction,
/// kept so rollback can restore the previous binding.
#[derive(Debug, Clone, Copy)]
pub struct StorageSwap {
	pub object: ObjectId,
	pub previous_storage: ExtentId,
	pub previous_populated: bool,
}

/// One transaction's mutable state.
///
/// The transaction tracks everything commit and rollback have to settle that
/// storage will not settle by itself: extents created for its own use
/// (transient refresh targets included), storage-identity swaps to revert,
/// extents it superseded and must reclaim at commit, and the set of extents
/// it wrote, so commit can freeze their rows into general visibility. All of
/// this bookkeeping is private to the transaction; another transaction's
/// commit or rollback never touches it.
pub struct Transaction {
	id: TransactionId,
	user: UserId,
	state: TransactionState,
	command_id: CommandId,
	created_extents: Vec<ExtentId>,
	written_extents: Vec<ExtentId>,
	reclaim_extents: Vec<ExtentId>,
	swaps: Vec<StorageSwap>,
	open_scans: Vec<ObjectId>,
}

impl Transaction {
	pub fn begin() -> Self {
		Self::begin_as(UserId(1))
	}

	pub fn begin_as(user: UserId) -> Self {
		let id = TransactionId::generate();
		debug!(txn = %id, user = %user, "begin transaction");
		Self {
			id,
			user,
			state: TransactionState::Active,
			command_id: CommandId::FIRST,
			created_extents: Vec::new(),
			written_extents: Vec::new(),
			reclaim_extents: Vec::new(),
			swaps: Vec::new(),
			open_scans: Vec::new(),
		}
	}

	pub fn id(&self) -> TransactionId {
		self.id
	}

	pub fn user(&self) -> UserId {
		self.user
	}

	pub fn is_active(&self) -> bool {
		self.state == TransactionState::Active
	}

	pub fn ensure_active(&self) -> stratadb_core::Result<()> {
		if !self.is_active() {
			return_error!(transaction_not_active());
		}
		Ok(())
	}

	/// The command id under which writes of the current statement land.
	pub fn current_command_id(&self) -> CommandId {
		self.command_id
	}

	/// Starts the next statement of this transaction.
	pub fn advance_command(&mut self) {
		self.command_id = self.command_id.next();
	}

	/// The currently active snapshot: sees all *prior* commands of this
	/// transaction, not the current one.
	pub fn active_snapshot(&self) -> Snapshot {
		Snapshot::at(self.command_id)
	}

	pub fn register_created_extent(&mut self, extent: ExtentId) {
		self.created_extents.push(extent);
	}

	pub fn register_written_extent(&mut self, extent: ExtentId) {
		if !self.written_extents.contains(&extent) {
			self.written_extents.push(extent);
		}
	}

	/// Schedules an extent this transaction superseded for reclamation at
	/// commit. Deferred because the old storage may still be needed for
	/// visibility until then, and a rollback must leave it untouched.
	pub fn register_reclaim(&mut self, extent: ExtentId) {
		self.reclaim_extents.push(extent);
	}

	pub fn register_swap(&mut self, swap: StorageSwap) {
		self.swaps.push(swap);
	}

	/// Drains the recorded swaps for reversal, most recent first. Used by
	/// rollback; after commit the records are simply dropped.
	pub fn take_swaps(&mut self) -> Vec<StorageSwap> {
		let mut swaps = std::mem::take(&mut self.swaps);
		swaps.reverse();
		swaps
	}

	/// Registers an open scan (a pin) on the object. An object with open
	/// scans must not have its physical identity invalidated underneath
	/// them.
	pub fn register_scan(&mut self, object: ObjectId) {
		self.open_scans.push(object);
	}

	pub fn unregister_scan(&mut self, object: ObjectId) {
		if let Some(pos) = self.open_scans.iter().position(|&o| o == object) {
			self.open_scans.swap_remove(pos);
		}
	}

	pub fn has_open_scan(&self, object: ObjectId) -> bool {
		self.open_scans.contains(&object)
	}

	/// Commits: freezes written rows into general visibility and reclaims
	/// the extents this transaction superseded. Reclamations scheduled by
	/// other, still-active transactions are not affected.
	pub fn commit(&mut self, storage: &Storage) -> stratadb_core::Result<()> {
		self.ensure_active()?;
		for extent in self.written_extents.drain(..) {
			storage.freeze_rows(extent)?;
		}
		for extent in self.reclaim_extents.drain(..) {
			storage.drop_extent(extent);
			debug!(txn = %self.id, extent = %extent, "reclaimed superseded extent");
		}
		self.swaps.clear();
		self.state = TransactionState::Committed;
		debug!(txn = %self.id, "committed transaction");
		Ok(())
	}

	/// Rolls back: abandons extents created by this transaction and discards
	/// its own scheduled reclamations, leaving all pre-existing state intact.
	pub fn rollback(&mut self, storage: &Storage) {
		if !self.is_active() {
			return;
		}
		self.reclaim_extents.clear();
		for extent in self.created_extents.drain(..) {
			storage.drop_extent(extent);
		}
		self.state = TransactionState::RolledBack;
		debug!(txn = %self.id, "rolled back transaction");
	}
}
