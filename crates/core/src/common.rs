// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use serde::{Deserialize, Serialize};

/// Ordinal of a command within its transaction. Rows written by command `n`
/// become visible to snapshots whose command id is greater than `n`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CommandId(pub u32);

impl CommandId {
	pub const FIRST: CommandId = CommandId(0);

	pub fn next(self) -> CommandId {
		CommandId(self.0 + 1)
	}
}

/// A visibility snapshot.
///
/// The engine is serialized at object granularity by the lock manager, so a
/// snapshot only has to arbitrate visibility *within* the owning transaction:
/// a row is visible if it was frozen at write time (bulk loads mark rows as
/// visible-to-everyone) or if it was written by an earlier command of the
/// same transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
	pub command_id: CommandId,
}

impl Snapshot {
	pub fn at(command_id: CommandId) -> Self {
		Self {
			command_id,
		}
	}

	/// A copy of this snapshot advanced to the given command id, so the
	/// reader observes all prior effects of its own transaction.
	pub fn advanced_to(self, command_id: CommandId) -> Self {
		Self {
			command_id,
		}
	}

	pub fn sees(&self, row_cid: CommandId, frozen: bool) -> bool {
		frozen || row_cid < self.command_id
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_snapshot_sees_earlier_commands() {
		let snapshot = Snapshot::at(CommandId(3));
		assert!(snapshot.sees(CommandId(2), false));
		assert!(!snapshot.sees(CommandId(3), false));
		assert!(!snapshot.sees(CommandId(4), false));
	}

	#[test]
	fn test_snapshot_sees_frozen_rows() {
		let snapshot = Snapshot::at(CommandId(0));
		assert!(snapshot.sees(CommandId(9), true));
	}
}
