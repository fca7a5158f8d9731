// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_catalog::{Catalog, table::TableToCreate, view::MaterializedViewToCreate};
use stratadb_core::{
	diagnostic::catalog::{not_a_table, object_not_found},
	interface::{
		catalog::{MaterializedViewDef, ObjectDef, TableDef},
		id::{ObjectId, UserId},
	},
	return_error,
	row::Row,
};
use stratadb_storage::{BulkWriteOptions, Storage, StorageSettings};
use stratadb_transaction::{LockManager, Transaction};
use tracing::{debug, warn};

pub mod execute;
pub mod refresh;
pub mod rewrite;
pub mod sink;

use execute::{ExecutionContext, execute_query};
use sink::RowCollector;

/// The engine ties storage, catalog and locking together and carries the
/// statement-level operations sessions call.
pub struct Engine {
	storage: Storage,
	catalog: Catalog,
	locks: LockManager,
}

impl Engine {
	pub fn new(settings: StorageSettings) -> Self {
		Self {
			storage: Storage::new(settings),
			catalog: Catalog::new(),
			locks: LockManager::new(),
		}
	}

	pub fn storage(&self) -> &Storage {
		&self.storage
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}

	pub fn locks(&self) -> &LockManager {
		&self.locks
	}

	pub fn begin(&self) -> Transaction {
		Transaction::begin()
	}

	pub fn begin_as(&self, user: UserId) -> Transaction {
		Transaction::begin_as(user)
	}

	/// Commits the transaction and releases its locks. Locks are released
	/// even when the commit itself fails.
	pub fn commit(&self, txn: &mut Transaction) -> stratadb_core::Result<()> {
		let result = txn.commit(&self.storage);
		self.locks.release_all(txn);
		result
	}

	/// Rolls back the transaction: storage-identity swaps are reverted, then
	/// created extents are abandoned and locks released.
	pub fn rollback(&self, txn: &mut Transaction) {
		for swap in txn.take_swaps() {
			if let Err(err) =
				self.catalog.swap_storage_identities(swap.object, swap.previous_storage, swap.previous_populated)
			{
				warn!(object = %swap.object, %err, "failed to revert storage swap during rollback");
			}
		}
		txn.rollback(&self.storage);
		self.locks.release_all(txn);
	}

	pub fn create_table(
		&self,
		txn: &mut Transaction,
		to_create: TableToCreate,
	) -> stratadb_core::Result<TableDef> {
		txn.ensure_active()?;
		let def = self.catalog.create_table(txn, &self.storage, to_create)?;
		txn.advance_command();
		Ok(def)
	}

	pub fn create_materialized_view(
		&self,
		txn: &mut Transaction,
		to_create: MaterializedViewToCreate,
	) -> stratadb_core::Result<MaterializedViewDef> {
		txn.ensure_active()?;
		let def = self.catalog.create_materialized_view(txn, &self.storage, to_create)?;
		txn.advance_command();
		Ok(def)
	}

	/// Inserts rows into a table through the plain write path: per-row
	/// command stamping, per-page durability logging, free-space reuse.
	pub fn insert(&self, txn: &mut Transaction, name: &str, rows: Vec<Row>) -> stratadb_core::Result<u64> {
		txn.ensure_active()?;
		let table = match self.find_by_name(name)? {
			ObjectDef::Table(def) => def,
			_ => return_error!(not_a_table(name)),
		};
		self.locks.acquire_exclusive(txn, table.id, name)?;

		let count = rows.len() as u64;
		let mut cursor = self.storage.open_for_write(table.storage, BulkWriteOptions::default())?;
		for row in rows {
			let payload = row.encode()?;
			self.storage.append_row(&mut cursor, payload, txn.current_command_id())?;
		}
		self.storage.close_cursor(cursor)?;

		txn.register_written_extent(table.storage);
		txn.advance_command();
		debug!(table = %table.id, rows = count, "inserted rows");
		Ok(count)
	}

	/// Reads every row of the named object in storage order. Scanning an
	/// unpopulated materialized view fails with a user-facing diagnostic,
	/// and an object exclusively locked by another transaction (a refresh in
	/// flight) is inaccessible until that transaction ends.
	pub fn scan(&self, txn: &Transaction, name: &str) -> stratadb_core::Result<Vec<Row>> {
		txn.ensure_active()?;
		let def = self.find_by_name(name)?;
		self.locks.check_access(txn, def.id(), name)?;
		let query = stratadb_core::interface::query::Query::select(
			name,
			def.id(),
			(0..def.columns().len()).collect(),
		);
		let ctx = ExecutionContext {
			catalog: &self.catalog,
			storage: &self.storage,
			snapshot: txn.active_snapshot(),
		};
		let mut collector = RowCollector::new();
		execute_query(&ctx, &query, &mut collector)?;
		Ok(collector.into_rows())
	}

	/// Opens a scan pin on the named object. While the pin is held, the
	/// transaction itself must not invalidate the object's physical identity
	/// out from under the scan.
	pub fn open_scan(&self, txn: &mut Transaction, name: &str) -> stratadb_core::Result<ObjectId> {
		txn.ensure_active()?;
		let def = self.find_by_name(name)?;
		self.locks.check_access(txn, def.id(), name)?;
		txn.register_scan(def.id());
		Ok(def.id())
	}

	pub fn close_scan(&self, txn: &mut Transaction, object: ObjectId) {
		txn.unregister_scan(object);
	}

	/// Simulates a crash followed by recovery: storage keeps only durable
	/// pages and all in-memory transaction state, locks included, is gone.
	pub fn crash_and_recover(&self) {
		self.storage.crash_and_recover();
		self.locks.reset();
	}

	fn find_by_name(&self, name: &str) -> stratadb_core::Result<ObjectDef> {
		match self.catalog.find_object_by_name(name) {
			Some(def) => Ok(def),
			None => return_error!(object_not_found(name)),
		}
	}
}

impl Default for Engine {
	fn default() -> Self {
		Self::new(StorageSettings::default())
	}
}
