// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_core::{interface::catalog::ColumnDef, row::Row};

/// The operation a sink is receiving rows for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOperation {
	Select,
}

/// Streaming destination driven by the query executor.
///
/// The executor calls `startup` exactly once before any row, `receive` zero
/// or more times in result order, and `shutdown` exactly once whether or not
/// execution succeeded partway — implementations must tolerate shutdown
/// after a partial row stream. Teardown of the sink's own resources happens
/// on drop.
///
/// The executor knows nothing about what a sink does with the rows; the
/// materialized-view refresh path plugs in here without the executor being
/// aware of it.
pub trait RowSink {
	fn startup(&mut self, operation: SinkOperation, shape: &[ColumnDef]) -> stratadb_core::Result<()>;

	fn receive(&mut self, row: Row) -> stratadb_core::Result<()>;

	fn shutdown(&mut self) -> stratadb_core::Result<()>;
}

/// A sink that buffers all received rows in memory. Serves plain reads.
#[derive(Debug, Default)]
pub struct RowCollector {
	pub rows: Vec<Row>,
}

impl RowCollector {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn into_rows(self) -> Vec<Row> {
		self.rows
	}
}

impl RowSink for RowCollector {
	fn startup(&mut self, _operation: SinkOperation, _shape: &[ColumnDef]) -> stratadb_core::Result<()> {
		Ok(())
	}

	fn receive(&mut self, row: Row) -> stratadb_core::Result<()> {
		self.rows.push(row);
		Ok(())
	}

	fn shutdown(&mut self) -> stratadb_core::Result<()> {
		Ok(())
	}
}
