// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use serde::{Deserialize, Serialize};

use crate::interface::id::ObjectId;

/// Alias of the first placeholder range-table entry prepended by the rewrite
/// pass to satisfy the rule substitution mechanism.
pub const NEW_PLACEHOLDER: &str = "new";
/// Alias of the second placeholder range-table entry.
pub const OLD_PLACEHOLDER: &str = "old";

/// One entry of a query's range table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTableEntry {
	pub alias: String,
	pub target: ObjectId,
	/// Result-relation-like entries are exempt from the scannability check,
	/// so a query referencing a currently-unpopulated view can still be
	/// planned and executed against its other sources.
	pub result_relation: bool,
}

impl RangeTableEntry {
	pub fn new(alias: impl Into<String>, target: ObjectId) -> Self {
		Self {
			alias: alias.into(),
			target,
			result_relation: false,
		}
	}
}

/// A plain read query: scan one range-table entry, project a subset of its
/// columns, in storage order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
	pub range_table: Vec<RangeTableEntry>,
	/// Index into `range_table` of the scanned relation.
	pub source: usize,
	/// Column indexes of the source projected into the result.
	pub projection: Vec<usize>,
}

impl Query {
	pub fn select(alias: impl Into<String>, target: ObjectId, projection: Vec<usize>) -> Self {
		Self {
			range_table: vec![RangeTableEntry::new(alias, target)],
			source: 0,
			projection,
		}
	}

	pub fn source_entry(&self) -> &RangeTableEntry {
		&self.range_table[self.source]
	}
}
