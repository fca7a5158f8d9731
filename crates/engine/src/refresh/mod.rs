// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_core::{
	cancellation::CancellationToken,
	diagnostic::catalog::{not_a_materialized_view, object_in_use, object_not_found, permission_denied},
	interface::catalog::ObjectKind,
	return_error, return_internal_error,
};
use stratadb_transaction::{StorageSwap, Transaction};
use tracing::{debug, instrument};

use crate::{
	Engine,
	execute::{ExecutionContext, execute_query},
	refresh::{
		resolve::{adapt_for_execution, resolve_definition},
		sink::TransientSink,
	},
};

pub mod marker;
pub mod resolve;
pub mod sink;

#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOptions {
	/// Swap in never-written storage instead of re-running the definition,
	/// leaving the view unpopulated and unscannable. The WITH NO DATA form.
	pub skip_data: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
	pub rows_loaded: u64,
	pub indexes_rebuilt: usize,
}

impl Engine {
	/// Replaces a materialized view's contents with a fresh evaluation of its
	/// defining query, by atomic storage-identity exchange.
	///
	/// The new contents are built in a transient extent invisible to every
	/// other transaction, then swapped in as the view's storage in one
	/// catalog operation. Until the swap, the sole irreversible step, the old
	/// contents are untouched; any fault before it unwinds to the transaction
	/// boundary, where rollback abandons the transient extent. The superseded
	/// extent is reclaimed only when the transaction commits, and indexes are
	/// rebuilt from the swapped-in storage rather than maintained during the
	/// load.
	///
	/// The exclusive whole-object lock taken here is held until end of
	/// transaction.
	#[instrument(name = "engine::refresh", level = "debug", skip(self, txn, options, token))]
	pub fn refresh_materialized_view(
		&self,
		txn: &mut Transaction,
		name: &str,
		options: RefreshOptions,
		token: &CancellationToken,
	) -> stratadb_core::Result<RefreshOutcome> {
		txn.ensure_active()?;

		// Lock before validating: the definition must not change under us.
		let def = match self.catalog.find_object_by_name(name) {
			Some(def) => def,
			None => return_error!(object_not_found(name)),
		};
		self.locks.acquire_exclusive(txn, def.id(), name)?;

		if def.kind() != ObjectKind::MaterializedView {
			return_error!(not_a_materialized_view(name));
		}
		let view = self.catalog.get_view(def.id())?;
		if view.owner != txn.user() {
			return_error!(permission_denied(name));
		}
		if def.is_system() {
			return_internal_error!("cannot refresh system object \"{}\"", name);
		}
		if txn.has_open_scan(view.id) {
			return_error!(object_in_use(name));
		}

		let definition = resolve_definition(&self.catalog, &view)?;

		// The transient extent lives in the view's tablespace and has no
		// catalog identity; rollback abandons it wholesale.
		let transient = self.storage.create_extent(view.tablespace);
		txn.register_created_extent(transient);

		let rows_loaded = if options.skip_data {
			// Population is skipped entirely: the transient extent stays
			// never-written, which is exactly the unpopulated state.
			0
		} else {
			let query = adapt_for_execution(&view, &definition)?;
			token.check()?;

			let snapshot = txn.active_snapshot().advanced_to(txn.current_command_id());
			let ctx = ExecutionContext {
				catalog: &self.catalog,
				storage: &self.storage,
				snapshot,
			};
			let mut sink =
				TransientSink::new(&self.storage, self.catalog.cache(), transient, txn.current_command_id());
			token.check()?;
			execute_query(&ctx, &query, &mut sink)?;
			sink.rows_received()
		};

		// The swap. Storage pointer and populated flag change together; from
		// here on the refresh is committed to the new contents.
		let old = self.catalog.swap_storage_identities(view.id, transient, !options.skip_data)?;
		txn.register_swap(StorageSwap {
			object: view.id,
			previous_storage: old,
			previous_populated: view.populated,
		});
		txn.register_reclaim(old);

		let indexes_rebuilt = self.catalog.rebuild_indexes(view.id);

		txn.advance_command();
		debug!(view = %view.id, rows_loaded, indexes_rebuilt, "refreshed materialized view");
		Ok(RefreshOutcome {
			rows_loaded,
			indexes_rebuilt,
		})
	}
}
