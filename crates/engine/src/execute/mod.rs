// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_catalog::Catalog;
use stratadb_core::{
	common::Snapshot,
	diagnostic::catalog::view_not_populated,
	interface::{catalog::ColumnDef, query::Query},
	return_error,
};
use stratadb_storage::Storage;
use tracing::debug;

use crate::sink::{RowSink, SinkOperation};

pub struct ExecutionContext<'a> {
	pub catalog: &'a Catalog,
	pub storage: &'a Storage,
	pub snapshot: Snapshot,
}

/// Executes a plain read query, streaming result rows into the sink.
///
/// Every range-table entry is opened and checked for scannability first;
/// result-relation-like entries are exempt, which is what lets a rewritten
/// definition query carry placeholder references to a currently-unpopulated
/// view. The sink's `shutdown` runs exactly once, also when the row stream
/// fails partway.
pub fn execute_query(
	ctx: &ExecutionContext<'_>,
	query: &Query,
	sink: &mut dyn RowSink,
) -> stratadb_core::Result<()> {
	for entry in &query.range_table {
		let descriptor = ctx.catalog.descriptor(entry.target)?;
		if !descriptor.populated && !entry.result_relation {
			let def = ctx.catalog.get_object(entry.target)?;
			return_error!(view_not_populated(def.name()));
		}
	}

	let source = query.source_entry();
	let source_def = ctx.catalog.get_object(source.target)?;
	let descriptor = ctx.catalog.descriptor(source.target)?;
	let shape: Vec<ColumnDef> =
		query.projection.iter().map(|&idx| source_def.columns()[idx].clone()).collect();

	sink.startup(SinkOperation::Select, &shape)?;

	let streamed = stream_rows(ctx, query, descriptor.storage, sink);
	// The executor owns the shutdown call on both success and error paths.
	let shutdown = sink.shutdown();
	streamed.and(shutdown)
}

fn stream_rows(
	ctx: &ExecutionContext<'_>,
	query: &Query,
	extent: stratadb_core::interface::id::ExtentId,
	sink: &mut dyn RowSink,
) -> stratadb_core::Result<()> {
	let rows = ctx.storage.scan(extent, ctx.snapshot)?;
	let count = rows.len();
	for row in rows {
		sink.receive(row.project(&query.projection))?;
	}
	debug!(rows = count, "query execution complete");
	Ok(())
}

#[cfg(test)]
mod tests {
	use stratadb_core::{
		Error,
		common::CommandId,
		interface::id::{TablespaceId, UserId},
		internal_error,
		row::Row,
		value::{Type, Value},
	};
	use stratadb_storage::StorageSettings;
	use stratadb_transaction::Transaction;

	use super::*;
	use crate::sink::RowCollector;

	fn setup() -> (Catalog, Storage, Transaction) {
		(Catalog::new(), Storage::new(StorageSettings::default()), Transaction::begin())
	}

	fn create_orders(catalog: &Catalog, storage: &Storage, txn: &mut Transaction) -> stratadb_core::interface::catalog::TableDef {
		catalog.create_table(
			txn,
			storage,
			stratadb_catalog::table::TableToCreate {
				name: "orders".to_string(),
				owner: UserId(1),
				tablespace: TablespaceId::DEFAULT,
				columns: vec![
					ColumnDef {
						name: "id".to_string(),
						ty: Type::Int8,
					},
					ColumnDef {
						name: "total".to_string(),
						ty: Type::Float8,
					},
				],
			},
		)
		.unwrap()
	}

	fn fill(storage: &Storage, table: &stratadb_core::interface::catalog::TableDef, rows: &[(i64, f64)]) {
		let mut cursor = storage.open_for_write(table.storage, Default::default()).unwrap();
		for &(id, total) in rows {
			let payload = Row::new(vec![Value::Int8(id), Value::Float8(total)]).encode().unwrap();
			storage.append_row(&mut cursor, payload, CommandId(0)).unwrap();
		}
		storage.close_cursor(cursor).unwrap();
		storage.freeze_rows(table.storage).unwrap();
	}

	#[test]
	fn test_projection_in_result_order() {
		let (catalog, storage, mut txn) = setup();
		let table = create_orders(&catalog, &storage, &mut txn);
		fill(&storage, &table, &[(1, 10.0), (2, 20.0)]);

		let ctx = ExecutionContext {
			catalog: &catalog,
			storage: &storage,
			snapshot: txn.active_snapshot(),
		};
		let query = Query::select("orders", table.id, vec![1]);
		let mut sink = RowCollector::new();
		execute_query(&ctx, &query, &mut sink).unwrap();

		assert_eq!(
			sink.into_rows(),
			vec![Row::new(vec![Value::Float8(10.0)]), Row::new(vec![Value::Float8(20.0)])]
		);
	}

	#[test]
	fn test_unpopulated_view_is_unscannable() {
		let (catalog, storage, mut txn) = setup();
		let table = create_orders(&catalog, &storage, &mut txn);
		let view = catalog
			.create_materialized_view(
				&mut txn,
				&storage,
				stratadb_catalog::view::MaterializedViewToCreate {
					name: "v".to_string(),
					owner: UserId(1),
					tablespace: TablespaceId::DEFAULT,
					columns: table.columns.clone(),
					query: Query::select("orders", table.id, vec![0, 1]),
				},
			)
			.unwrap();

		let ctx = ExecutionContext {
			catalog: &catalog,
			storage: &storage,
			snapshot: txn.active_snapshot(),
		};
		let query = Query::select("v", view.id, vec![0]);
		let mut sink = RowCollector::new();
		let err = execute_query(&ctx, &query, &mut sink).unwrap_err();
		assert_eq!(err.code(), "CAT_004");
	}

	#[test]
	fn test_result_relation_entries_skip_scannability_check() {
		let (catalog, storage, mut txn) = setup();
		let table = create_orders(&catalog, &storage, &mut txn);
		fill(&storage, &table, &[(1, 10.0)]);
		let view = catalog
			.create_materialized_view(
				&mut txn,
				&storage,
				stratadb_catalog::view::MaterializedViewToCreate {
					name: "v".to_string(),
					owner: UserId(1),
					tablespace: TablespaceId::DEFAULT,
					columns: table.columns.clone(),
					query: Query::select("orders", table.id, vec![0, 1]),
				},
			)
			.unwrap();

		// A query whose range table references the unpopulated view through
		// a result-relation-like placeholder still executes.
		let mut query = Query::select("orders", table.id, vec![0]);
		let mut placeholder = stratadb_core::interface::query::RangeTableEntry::new("new", view.id);
		placeholder.result_relation = true;
		query.range_table.insert(0, placeholder);
		query.source = 1;

		let ctx = ExecutionContext {
			catalog: &catalog,
			storage: &storage,
			snapshot: txn.active_snapshot(),
		};
		let mut sink = RowCollector::new();
		execute_query(&ctx, &query, &mut sink).unwrap();
		assert_eq!(sink.rows.len(), 1);
	}

	#[test]
	fn test_shutdown_runs_after_partial_stream() {
		struct FailingSink {
			received: usize,
			shutdown_calls: usize,
		}

		impl RowSink for FailingSink {
			fn startup(&mut self, _: SinkOperation, _: &[ColumnDef]) -> stratadb_core::Result<()> {
				Ok(())
			}

			fn receive(&mut self, _: Row) -> stratadb_core::Result<()> {
				self.received += 1;
				if self.received == 2 {
					return Err(Error(internal_error!("sink full")));
				}
				Ok(())
			}

			fn shutdown(&mut self) -> stratadb_core::Result<()> {
				self.shutdown_calls += 1;
				Ok(())
			}
		}

		let (catalog, storage, mut txn) = setup();
		let table = create_orders(&catalog, &storage, &mut txn);
		fill(&storage, &table, &[(1, 10.0), (2, 20.0), (3, 30.0)]);

		let ctx = ExecutionContext {
			catalog: &catalog,
			storage: &storage,
			snapshot: txn.active_snapshot(),
		};
		let query = Query::select("orders", table.id, vec![0]);
		let mut sink = FailingSink {
			received: 0,
			shutdown_calls: 0,
		};
		assert!(execute_query(&ctx, &query, &mut sink).is_err());
		assert_eq!(sink.shutdown_calls, 1);
	}
}
