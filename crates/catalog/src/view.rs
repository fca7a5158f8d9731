// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_core::{
	Error,
	diagnostic::catalog::object_already_exists,
	interface::{
		catalog::{ColumnDef, MaterializedViewDef, ObjectDef},
		id::{ExtentId, ObjectId, TablespaceId, UserId},
		query::Query,
	},
	internal_error, return_error,
};
use stratadb_storage::Storage;
use stratadb_transaction::Transaction;
use tracing::{debug, instrument};

use crate::{
	Catalog,
	rule::{DefinitionKind, DefinitionRule},
};

#[derive(Debug, Clone)]
pub struct MaterializedViewToCreate {
	pub name: String,
	pub owner: UserId,
	pub tablespace: TablespaceId,
	pub columns: Vec<ColumnDef>,
	/// The defining query, stored as the view's single substitute-on-read
	/// rule.
	pub query: Query,
}

impl Catalog {
	/// Creates a materialized view in the unpopulated state, the equivalent
	/// of creation WITH NO DATA. The first refresh populates it.
	#[instrument(name = "catalog::view::create", level = "debug", skip(self, txn, storage, to_create))]
	pub fn create_materialized_view(
		&self,
		txn: &mut Transaction,
		storage: &Storage,
		to_create: MaterializedViewToCreate,
	) -> crate::Result<MaterializedViewDef> {
		if self.find_object_by_name(&to_create.name).is_some() {
			return_error!(object_already_exists(&to_create.name));
		}

		let id = self.allocate_object_id();
		let extent = storage.create_extent(to_create.tablespace);
		txn.register_created_extent(extent);

		let def = MaterializedViewDef {
			id,
			name: to_create.name,
			owner: to_create.owner,
			tablespace: to_create.tablespace,
			storage: extent,
			populated: false,
			columns: to_create.columns,
		};
		self.insert_object(ObjectDef::View(def.clone()));
		self.attach_definition_rule(DefinitionRule {
			object: id,
			kind: DefinitionKind::SubstituteOnRead {
				actions: vec![to_create.query],
			},
		});
		Ok(def)
	}

	pub fn get_view(&self, id: ObjectId) -> crate::Result<MaterializedViewDef> {
		match self.get_object(id)? {
			ObjectDef::View(def) => Ok(def),
			other => Err(Error(internal_error!(
				"object {} (\"{}\") is not a materialized view",
				id,
				other.name()
			))),
		}
	}

	/// Atomically exchanges the view's physical storage binding for the
	/// given extent, updating `storage` and `populated` together, and
	/// returns the superseded extent for reclamation.
	///
	/// The view's logical identity is untouched: grants, dependent objects
	/// and indexes stay attached without any catalog rewriting beyond the
	/// storage pointer. Caller must hold the exclusive object lock.
	#[instrument(name = "catalog::view::swap_storage", level = "debug", skip(self))]
	pub fn swap_storage_identities(
		&self,
		view: ObjectId,
		new_storage: ExtentId,
		populated: bool,
	) -> crate::Result<ExtentId> {
		let mut def = self.get_view(view)?;
		let old_storage = def.storage;
		def.storage = new_storage;
		def.populated = populated;
		self.insert_object(ObjectDef::View(def));
		self.cache().invalidate(view);
		debug!(view = %view, old = %old_storage, new = %new_storage, populated, "swapped storage identities");
		Ok(old_storage)
	}
}
