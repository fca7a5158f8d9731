// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_catalog::cache::DescriptorCache;
use stratadb_core::interface::id::{ExtentId, ObjectId};
use stratadb_storage::Storage;
use tracing::debug;

/// Makes an extent parse as valid, populated (if empty) storage.
///
/// Writes the single empty, checksummed page that distinguishes populated
/// storage from never-written storage, logs its image iff the durability mode
/// requires logging for new objects, and always flushes synchronously: the
/// populated marker must be on stable storage before anything that depends on
/// it (the identity swap above all) can become durable.
///
/// One-directional within a refresh cycle. Transient extents have no catalog
/// identity yet, so `object` is optional; when present its cached descriptor
/// is invalidated.
pub fn mark_populated(
	storage: &Storage,
	cache: &DescriptorCache,
	object: Option<ObjectId>,
	extent: ExtentId,
) -> stratadb_core::Result<()> {
	storage.write_initial_page(extent)?;
	if storage.logging_required_for_new_objects() {
		storage.log_page_image(extent, 0)?;
	}
	storage.flush_to_stable(extent)?;
	if let Some(object) = object {
		cache.invalidate(object);
	}
	debug!(extent = %extent, "marked storage populated");
	Ok(())
}

#[cfg(test)]
mod tests {
	use stratadb_core::{
		common::{CommandId, Snapshot},
		interface::id::TablespaceId,
	};
	use stratadb_storage::{StorageSettings, WalMode};

	use super::*;

	#[test]
	fn test_marker_survives_crash_under_minimal_wal() {
		let storage = Storage::new(StorageSettings::default());
		let cache = DescriptorCache::new();
		let extent = storage.create_extent(TablespaceId::DEFAULT);

		mark_populated(&storage, &cache, None, extent).unwrap();
		assert!(storage.is_initialized(extent));

		// The synchronous flush makes the marker durable even without WAL.
		storage.crash_and_recover();
		assert!(storage.is_initialized(extent));
		assert!(storage.scan(extent, Snapshot::at(CommandId(0))).unwrap().is_empty());
	}

	#[test]
	fn test_marker_is_logged_under_archive_wal() {
		let storage = Storage::new(StorageSettings {
			wal_mode: WalMode::Archive,
			..Default::default()
		});
		let cache = DescriptorCache::new();
		let extent = storage.create_extent(TablespaceId::DEFAULT);

		mark_populated(&storage, &cache, None, extent).unwrap();
		storage.crash_and_recover();
		assert!(storage.is_initialized(extent));
	}

	#[test]
	fn test_marking_twice_is_internal_fault() {
		let storage = Storage::new(StorageSettings::default());
		let cache = DescriptorCache::new();
		let extent = storage.create_extent(TablespaceId::DEFAULT);

		mark_populated(&storage, &cache, None, extent).unwrap();
		let err = mark_populated(&storage, &cache, None, extent).unwrap_err();
		assert!(err.is_internal());
	}
}
