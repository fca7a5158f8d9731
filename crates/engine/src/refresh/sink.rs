// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_catalog::cache::DescriptorCache;
use stratadb_core::{
	common::CommandId,
	interface::{catalog::ColumnDef, id::ExtentId},
	return_internal_error,
	row::Row,
};
use stratadb_storage::{BulkWriteOptions, Storage, WriteCursor};
use tracing::debug;

use crate::{
	refresh::marker::mark_populated,
	sink::{RowSink, SinkOperation},
};

/// The row sink the refresh orchestrator plugs into the executor.
///
/// Receives the result stream of the view's definition query and bulk-loads
/// it into the transient extent: free-space lookup is skipped (the extent is
/// brand new), rows are written frozen (nothing can see the extent before it
/// replaces the live view), and per-page durability logging is skipped when
/// the mode allows it, compensated by one synchronous flush at shutdown.
/// Indexes are not maintained here; the orchestrator rebuilds them after the
/// swap.
///
/// The executor stays unaware that its rows are materializing a view.
pub struct TransientSink<'a> {
	storage: &'a Storage,
	cache: &'a DescriptorCache,
	transient: ExtentId,
	/// Command id stamped on every loaded row.
	output_cid: CommandId,
	options: BulkWriteOptions,
	cursor: Option<WriteCursor>,
	rows_received: u64,
}

impl<'a> TransientSink<'a> {
	pub fn new(
		storage: &'a Storage,
		cache: &'a DescriptorCache,
		transient: ExtentId,
		output_cid: CommandId,
	) -> Self {
		Self {
			storage,
			cache,
			transient,
			output_cid,
			options: BulkWriteOptions {
				skip_wal: !storage.logging_required_for_new_objects(),
				frozen: true,
				skip_fsm: true,
			},
			cursor: None,
			rows_received: 0,
		}
	}

	pub fn rows_received(&self) -> u64 {
		self.rows_received
	}
}

impl RowSink for TransientSink<'_> {
	fn startup(&mut self, operation: SinkOperation, _shape: &[ColumnDef]) -> stratadb_core::Result<()> {
		if operation != SinkOperation::Select {
			return_internal_error!("transient sink received non-select operation {:?}", operation);
		}
		mark_populated(self.storage, self.cache, None, self.transient)?;
		self.cursor = Some(self.storage.open_for_write(self.transient, self.options)?);
		Ok(())
	}

	fn receive(&mut self, row: Row) -> stratadb_core::Result<()> {
		let cursor = match self.cursor.as_mut() {
			Some(cursor) => cursor,
			None => return_internal_error!("transient sink received a row before startup"),
		};
		// The row is detached from any executor-owned memory here; pages own
		// their payload bytes outright.
		let payload = row.encode()?;
		self.storage.append_row(cursor, payload, self.output_cid)?;
		self.rows_received += 1;
		Ok(())
	}

	fn shutdown(&mut self) -> stratadb_core::Result<()> {
		if let Some(cursor) = self.cursor.take() {
			self.storage.close_cursor(cursor)?;
			if self.options.skip_wal {
				self.storage.flush_to_stable(self.transient)?;
			}
		}
		debug!(extent = %self.transient, rows = self.rows_received, "transient load complete");
		Ok(())
	}
}
