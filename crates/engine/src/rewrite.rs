// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_core::interface::{
	id::ObjectId,
	query::{NEW_PLACEHOLDER, OLD_PLACEHOLDER, Query, RangeTableEntry},
};

/// Runs a view definition through the rule-substitution rewrite pass.
///
/// The rewriter operates on queries shaped like rule actions: range-table
/// entries 0 and 1 are the `new` and `old` placeholders referring to the
/// object the rule is attached to, and real sources start at entry 2. A
/// definition stored as a bare query therefore gets the two placeholders
/// prepended here, shifting its source index, before substitution runs.
///
/// Returns the rewritten query list; plain substitute-on-read definitions
/// rewrite to exactly one query.
pub fn rewrite_query(object: ObjectId, definition: &Query) -> Vec<Query> {
	let mut rewritten = definition.clone();
	rewritten.range_table.insert(0, RangeTableEntry::new(NEW_PLACEHOLDER, object));
	rewritten.range_table.insert(1, RangeTableEntry::new(OLD_PLACEHOLDER, object));
	rewritten.source = definition.source + 2;
	vec![rewritten]
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_placeholders_prepended_and_source_shifted() {
		let view = ObjectId(2000);
		let definition = Query::select("orders", ObjectId(1500), vec![0, 1]);

		let rewritten = rewrite_query(view, &definition);
		assert_eq!(rewritten.len(), 1);

		let query = &rewritten[0];
		assert_eq!(query.range_table.len(), 3);
		assert_eq!(query.range_table[0].alias, NEW_PLACEHOLDER);
		assert_eq!(query.range_table[0].target, view);
		assert_eq!(query.range_table[1].alias, OLD_PLACEHOLDER);
		assert_eq!(query.range_table[1].target, view);
		assert_eq!(query.source, 2);
		assert_eq!(query.source_entry().alias, "orders");
		assert_eq!(query.projection, vec![0, 1]);
	}

	#[test]
	fn test_definition_is_not_mutated() {
		let definition = Query::select("orders", ObjectId(1500), vec![0]);
		let copy = definition.clone();
		rewrite_query(ObjectId(2000), &definition);
		assert_eq!(definition, copy);
	}
}
