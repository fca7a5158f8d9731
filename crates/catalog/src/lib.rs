// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_skiplist::SkipMap;
use stratadb_core::{
	Error,
	interface::{
		catalog::{FIRST_USER_OBJECT_ID, IndexDef, ObjectDef},
		id::ObjectId,
	},
	internal_error,
};

pub mod cache;
pub mod index;
pub mod rule;
pub mod table;
pub mod view;

use cache::DescriptorCache;
use rule::DefinitionRule;

pub use stratadb_core::Result;

/// The object catalog.
///
/// Holds the definitions of all named objects, the definitional rules
/// attached to materialized views, the indexes defined on objects, and a
/// descriptor cache that readers consult to resolve an object's current
/// physical binding.
pub struct Catalog {
	objects: SkipMap<ObjectId, ObjectDef>,
	names: SkipMap<String, ObjectId>,
	rules: SkipMap<ObjectId, Vec<DefinitionRule>>,
	indexes: SkipMap<ObjectId, Vec<IndexDef>>,
	sequence: AtomicU64,
	cache: DescriptorCache,
}

impl Default for Catalog {
	fn default() -> Self {
		Self::new()
	}
}

impl Catalog {
	pub fn new() -> Self {
		Self {
			objects: SkipMap::new(),
			names: SkipMap::new(),
			rules: SkipMap::new(),
			indexes: SkipMap::new(),
			sequence: AtomicU64::new(FIRST_USER_OBJECT_ID),
			cache: DescriptorCache::new(),
		}
	}

	pub(crate) fn allocate_object_id(&self) -> ObjectId {
		ObjectId(self.sequence.fetch_add(1, Ordering::Relaxed))
	}

	pub fn find_object(&self, id: ObjectId) -> Option<ObjectDef> {
		self.objects.get(&id).map(|entry| entry.value().clone())
	}

	pub fn find_object_by_name(&self, name: &str) -> Option<ObjectDef> {
		self.names.get(name).and_then(|entry| self.find_object(*entry.value()))
	}

	pub fn get_object(&self, id: ObjectId) -> Result<ObjectDef> {
		self.find_object(id).ok_or_else(|| {
			Error(internal_error!(
				"object {} not found in catalog. This indicates a catalog inconsistency.",
				id
			))
		})
	}

	pub(crate) fn insert_object(&self, def: ObjectDef) {
		self.names.insert(def.name().to_string(), def.id());
		self.objects.insert(def.id(), def);
	}

	pub fn cache(&self) -> &DescriptorCache {
		&self.cache
	}
}
