// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use serde::{Deserialize, Serialize};

use crate::{
	interface::id::{ExtentId, ObjectId, TablespaceId, UserId},
	value::Type,
};

/// Object ids below this value are reserved for system catalogs.
pub const FIRST_USER_OBJECT_ID: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
	Table,
	MaterializedView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
	pub name: String,
	pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
	pub id: ObjectId,
	pub name: String,
	pub owner: UserId,
	pub tablespace: TablespaceId,
	pub storage: ExtentId,
	pub columns: Vec<ColumnDef>,
}

/// A materialized view: a named object holding the persisted result of its
/// defining query.
///
/// `id` is immutable. `storage` and `populated` change together, atomically,
/// only during creation or a successful refresh. A view with
/// `populated == false` must never be treated as scannable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializedViewDef {
	pub id: ObjectId,
	pub name: String,
	pub owner: UserId,
	pub tablespace: TablespaceId,
	pub storage: ExtentId,
	pub populated: bool,
	pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ObjectDef {
	Table(TableDef),
	View(MaterializedViewDef),
}

impl ObjectDef {
	pub fn id(&self) -> ObjectId {
		match self {
			ObjectDef::Table(def) => def.id,
			ObjectDef::View(def) => def.id,
		}
	}

	pub fn name(&self) -> &str {
		match self {
			ObjectDef::Table(def) => &def.name,
			ObjectDef::View(def) => &def.name,
		}
	}

	pub fn kind(&self) -> ObjectKind {
		match self {
			ObjectDef::Table(_) => ObjectKind::Table,
			ObjectDef::View(_) => ObjectKind::MaterializedView,
		}
	}

	pub fn storage(&self) -> ExtentId {
		match self {
			ObjectDef::Table(def) => def.storage,
			ObjectDef::View(def) => def.storage,
		}
	}

	pub fn columns(&self) -> &[ColumnDef] {
		match self {
			ObjectDef::Table(def) => &def.columns,
			ObjectDef::View(def) => &def.columns,
		}
	}

	pub fn is_system(&self) -> bool {
		self.id().0 < FIRST_USER_OBJECT_ID
	}
}

/// An index previously defined on a materialized view. Indexes are not
/// maintained during bulk load; the refresh orchestrator asks the index
/// subsystem to rebuild them after the swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
	pub name: String,
	pub object: ObjectId,
	pub columns: Vec<usize>,
	/// Number of times this index has been rebuilt from scratch.
	pub rebuilds: u64,
}
