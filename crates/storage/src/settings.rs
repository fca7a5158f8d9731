// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

/// Durability logging mode of the installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WalMode {
	/// Writes into extents created by the current transaction need no WAL;
	/// a synchronous flush before commit is sufficient for crash safety.
	#[default]
	Minimal,
	/// Every page write must be logged, e.g. because log archiving or
	/// replication consumes the stream.
	Archive,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
	pub wal_mode: WalMode,
	pub page_size: usize,
}

impl Default for StorageSettings {
	fn default() -> Self {
		Self {
			wal_mode: WalMode::default(),
			page_size: 8192,
		}
	}
}
