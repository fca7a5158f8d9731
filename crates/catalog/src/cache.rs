// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use dashmap::DashMap;
use stratadb_core::interface::id::{ExtentId, ObjectId};

use crate::Catalog;

/// A cached description of an object's current physical binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
	pub storage: ExtentId,
	pub populated: bool,
}

/// Cache of physical descriptors keyed by logical identity.
///
/// Readers resolve an object's backing extent through here. Any operation
/// that changes a physical binding must invalidate the entry so subsequent
/// lookups re-derive current state from the catalog.
#[derive(Default)]
pub struct DescriptorCache {
	entries: DashMap<ObjectId, Descriptor>,
}

impl DescriptorCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, id: ObjectId) -> Option<Descriptor> {
		self.entries.get(&id).map(|entry| *entry.value())
	}

	pub fn put(&self, id: ObjectId, descriptor: Descriptor) {
		self.entries.insert(id, descriptor);
	}

	pub fn invalidate(&self, id: ObjectId) {
		self.entries.remove(&id);
	}
}

impl Catalog {
	/// Resolves the object's physical descriptor, consulting the cache
	/// first and rebuilding the entry from the catalog on a miss.
	pub fn descriptor(&self, id: ObjectId) -> crate::Result<Descriptor> {
		if let Some(descriptor) = self.cache().get(id) {
			return Ok(descriptor);
		}
		let def = self.get_object(id)?;
		let descriptor = Descriptor {
			storage: def.storage(),
			populated: match &def {
				stratadb_core::interface::catalog::ObjectDef::Table(_) => true,
				stratadb_core::interface::catalog::ObjectDef::View(view) => view.populated,
			},
		};
		self.cache().put(id, descriptor);
		Ok(descriptor)
	}
}

#[cfg(test)]
mod tests {
	use stratadb_core::{
		interface::id::{TablespaceId, UserId},
		interface::query::Query,
	};
	use stratadb_storage::{Storage, StorageSettings};
	use stratadb_transaction::Transaction;

	use super::*;
	use crate::view::MaterializedViewToCreate;

	#[test]
	fn test_descriptor_rebuilt_after_invalidation() {
		let catalog = Catalog::new();
		let storage = Storage::new(StorageSettings::default());
		let mut txn = Transaction::begin();

		let def = catalog
			.create_materialized_view(
				&mut txn,
				&storage,
				MaterializedViewToCreate {
					name: "v".to_string(),
					owner: UserId(1),
					tablespace: TablespaceId::DEFAULT,
					columns: vec![],
					query: Query::select("t", ObjectId(1500), vec![]),
				},
			)
			.unwrap();

		let before = catalog.descriptor(def.id).unwrap();
		assert_eq!(before.storage, def.storage);
		assert!(!before.populated);

		// Swap invalidates; the next lookup sees the new binding.
		let replacement = storage.create_extent(TablespaceId::DEFAULT);
		catalog.swap_storage_identities(def.id, replacement, true).unwrap();

		let after = catalog.descriptor(def.id).unwrap();
		assert_eq!(after.storage, replacement);
		assert!(after.populated);
	}

	#[test]
	fn test_stale_entry_served_until_invalidated() {
		let cache = DescriptorCache::new();
		let id = ObjectId(2000);
		let descriptor = Descriptor {
			storage: stratadb_core::interface::id::ExtentId(1),
			populated: true,
		};
		cache.put(id, descriptor);
		assert_eq!(cache.get(id), Some(descriptor));

		cache.invalidate(id);
		assert_eq!(cache.get(id), None);
	}
}
