// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_core::{
	diagnostic::catalog::object_already_exists,
	interface::{
		catalog::{ColumnDef, ObjectDef, TableDef},
		id::{TablespaceId, UserId},
	},
	return_error,
};
use stratadb_storage::Storage;
use stratadb_transaction::Transaction;
use tracing::instrument;

use crate::Catalog;

#[derive(Debug, Clone)]
pub struct TableToCreate {
	pub name: String,
	pub owner: UserId,
	pub tablespace: TablespaceId,
	pub columns: Vec<ColumnDef>,
}

impl Catalog {
	#[instrument(name = "catalog::table::create", level = "debug", skip(self, txn, storage, to_create))]
	pub fn create_table(
		&self,
		txn: &mut Transaction,
		storage: &Storage,
		to_create: TableToCreate,
	) -> crate::Result<TableDef> {
		if self.find_object_by_name(&to_create.name).is_some() {
			return_error!(object_already_exists(&to_create.name));
		}

		let id = self.allocate_object_id();
		let extent = storage.create_extent(to_create.tablespace);
		txn.register_created_extent(extent);

		let def = TableDef {
			id,
			name: to_create.name,
			owner: to_create.owner,
			tablespace: to_create.tablespace,
			storage: extent,
			columns: to_create.columns,
		};
		self.insert_object(ObjectDef::Table(def.clone()));
		Ok(def)
	}
}

#[cfg(test)]
mod tests {
	use stratadb_core::value::Type;
	use stratadb_storage::StorageSettings;

	use super::*;

	fn to_create(name: &str) -> TableToCreate {
		TableToCreate {
			name: name.to_string(),
			owner: UserId(1),
			tablespace: TablespaceId::DEFAULT,
			columns: vec![ColumnDef {
				name: "id".to_string(),
				ty: Type::Int8,
			}],
		}
	}

	#[test]
	fn test_create_and_find_table() {
		let catalog = Catalog::new();
		let storage = Storage::new(StorageSettings::default());
		let mut txn = Transaction::begin();

		let def = catalog.create_table(&mut txn, &storage, to_create("orders")).unwrap();
		assert!(storage.exists(def.storage));

		let found = catalog.find_object_by_name("orders").unwrap();
		assert_eq!(found.id(), def.id);
	}

	#[test]
	fn test_duplicate_name_rejected() {
		let catalog = Catalog::new();
		let storage = Storage::new(StorageSettings::default());
		let mut txn = Transaction::begin();

		catalog.create_table(&mut txn, &storage, to_create("orders")).unwrap();
		let err = catalog.create_table(&mut txn, &storage, to_create("orders")).unwrap_err();
		assert_eq!(err.code(), "CAT_005");
	}
}
