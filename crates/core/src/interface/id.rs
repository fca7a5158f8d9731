// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! define_id {
	($(#[$doc:meta])* $name:ident) => {
		$(#[$doc])*
		#[repr(transparent)]
		#[derive(
			Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
		)]
		pub struct $name(pub u64);

		impl Display for $name {
			fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}

		impl From<$name> for u64 {
			fn from(id: $name) -> u64 {
				id.0
			}
		}
	};
}

define_id! {
	/// Stable logical identifier of a catalog object. Never changes for the
	/// lifetime of the object, across refreshes included.
	ObjectId
}

define_id! {
	/// Identifier of a physical storage extent. A catalog object points at
	/// the extent currently backing it; refresh exchanges that binding.
	ExtentId
}

define_id! {
	/// Placement hint for newly created extents.
	TablespaceId
}

define_id! {
	/// Owner of a catalog object.
	UserId
}

impl TablespaceId {
	pub const DEFAULT: TablespaceId = TablespaceId(0);
}
