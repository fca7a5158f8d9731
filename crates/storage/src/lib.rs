// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::{collections::HashMap, sync::atomic::{AtomicU64, Ordering}};

use parking_lot::RwLock;
use stratadb_core::{
	Error,
	common::{CommandId, Snapshot},
	interface::id::{ExtentId, TablespaceId},
	internal_error,
	row::Row,
};
use tracing::debug;

pub mod page;
pub mod settings;

use page::{Page, StoredRow};
pub use settings::{StorageSettings, WalMode};

/// Performance flags for a write cursor.
///
/// The bulk-insert path used by materialized-view refresh skips free-space
/// lookup (the target extent has no prior free space), marks rows as frozen
/// (no concurrent transaction can see the extent before it replaces the live
/// view) and may skip per-page durability logging, compensated by one
/// synchronous flush before commit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BulkWriteOptions {
	pub skip_wal: bool,
	pub frozen: bool,
	pub skip_fsm: bool,
}

/// An open write cursor over one extent. Starts unallocated; the first
/// append decides which page receives the row.
#[derive(Debug)]
pub struct WriteCursor {
	extent: ExtentId,
	options: BulkWriteOptions,
	/// Pending page and, when rewriting an existing slot, its index.
	page: Option<(Option<usize>, Page)>,
}

impl WriteCursor {
	pub fn is_unallocated(&self) -> bool {
		self.page.is_none()
	}
}

#[derive(Debug, Clone)]
struct PageSlot {
	bytes: Vec<u8>,
	/// Synchronously flushed to stable storage.
	durable: bool,
	/// Full page image written to the durability log; recovery replays it.
	logged: bool,
}

#[derive(Debug)]
struct ExtentState {
	#[allow(dead_code)]
	tablespace: TablespaceId,
	slots: Vec<PageSlot>,
}

/// The page-extent storage engine.
///
/// Extents are anonymous runs of pages. Catalog objects point at the extent
/// currently backing them; the binding is exchanged during refresh and the
/// superseded extent is reclaimed by the owning transaction when it commits.
///
/// Durability is modeled explicitly so crash behavior is testable: a page
/// survives [`Storage::crash_and_recover`] iff it was flushed to stable
/// storage or its image was written to the durability log.
pub struct Storage {
	settings: StorageSettings,
	extents: RwLock<HashMap<ExtentId, ExtentState>>,
	next_extent: AtomicU64,
}

impl Storage {
	pub fn new(settings: StorageSettings) -> Self {
		Self {
			settings,
			extents: RwLock::new(HashMap::new()),
			next_extent: AtomicU64::new(1),
		}
	}

	pub fn settings(&self) -> &StorageSettings {
		&self.settings
	}

	/// Whether writes into extents created by the current transaction must
	/// go through the durability log. Under [`WalMode::Minimal`] a final
	/// synchronous flush is sufficient.
	pub fn logging_required_for_new_objects(&self) -> bool {
		self.settings.wal_mode == WalMode::Archive
	}

	pub fn create_extent(&self, tablespace: TablespaceId) -> ExtentId {
		let id = ExtentId(self.next_extent.fetch_add(1, Ordering::Relaxed));
		self.extents.write().insert(
			id,
			ExtentState {
				tablespace,
				slots: Vec::new(),
			},
		);
		debug!(extent = %id, tablespace = %tablespace, "created extent");
		id
	}

	pub fn drop_extent(&self, extent: ExtentId) {
		self.extents.write().remove(&extent);
		debug!(extent = %extent, "dropped extent");
	}

	pub fn exists(&self, extent: ExtentId) -> bool {
		self.extents.read().contains_key(&extent)
	}

	/// Writes the single, empty, correctly-formatted page that makes an
	/// extent parse as a valid (empty) object. The extent must not have been
	/// written before.
	pub fn write_initial_page(&self, extent: ExtentId) -> stratadb_core::Result<()> {
		let mut extents = self.extents.write();
		let state = Self::state_mut(&mut extents, extent)?;
		if !state.slots.is_empty() {
			return Err(Error(internal_error!(
				"extent {} already initialized with {} pages",
				extent,
				state.slots.len()
			)));
		}
		let bytes = Page::empty(self.settings.page_size).encode()?;
		state.slots.push(PageSlot {
			bytes,
			durable: false,
			logged: false,
		});
		Ok(())
	}

	/// Writes the current image of a page to the durability log.
	pub fn log_page_image(&self, extent: ExtentId, page_no: usize) -> stratadb_core::Result<()> {
		let mut extents = self.extents.write();
		let state = Self::state_mut(&mut extents, extent)?;
		match state.slots.get_mut(page_no) {
			Some(slot) => {
				slot.logged = true;
				Ok(())
			}
			None => Err(Error(internal_error!("extent {} has no page {}", extent, page_no))),
		}
	}

	/// Synchronously flushes all of the extent's pages to stable storage.
	pub fn flush_to_stable(&self, extent: ExtentId) -> stratadb_core::Result<()> {
		let mut extents = self.extents.write();
		let state = Self::state_mut(&mut extents, extent)?;
		for slot in &mut state.slots {
			slot.durable = true;
		}
		debug!(extent = %extent, "flushed extent to stable storage");
		Ok(())
	}

	pub fn open_for_write(&self, extent: ExtentId, options: BulkWriteOptions) -> stratadb_core::Result<WriteCursor> {
		if !self.exists(extent) {
			return Err(Error(internal_error!("unknown extent {}", extent)));
		}
		Ok(WriteCursor {
			extent,
			options,
			page: None,
		})
	}

	/// Appends one row through the cursor, buffering into the pending page
	/// and sealing it once full.
	pub fn append_row(
		&self,
		cursor: &mut WriteCursor,
		payload: Vec<u8>,
		cid: CommandId,
	) -> stratadb_core::Result<()> {
		if cursor.page.is_none() {
			cursor.page = Some(self.allocate_target(cursor)?);
		}
		let fits = cursor.page.as_ref().map(|(_, page)| page.fits(payload.len())).unwrap_or(true);
		if !fits {
			let (slot, page) = cursor.page.take().unwrap();
			self.write_page(cursor.extent, slot, &page, cursor.options.skip_wal)?;
			cursor.page = Some((None, Page::empty(self.settings.page_size)));
		}
		let (_, page) = cursor.page.as_mut().unwrap();
		page.push_row(StoredRow {
			cid,
			frozen: cursor.options.frozen,
			payload,
		});
		Ok(())
	}

	/// Releases the cursor's accumulator, sealing any partially filled page.
	pub fn close_cursor(&self, mut cursor: WriteCursor) -> stratadb_core::Result<()> {
		if let Some((slot, page)) = cursor.page.take() {
			if !page.is_empty() {
				self.write_page(cursor.extent, slot, &page, cursor.options.skip_wal)?;
			}
		}
		Ok(())
	}

	/// Picks the page the first append lands on. Unless free-space lookup is
	/// skipped, a trailing page with room left is reopened.
	fn allocate_target(&self, cursor: &WriteCursor) -> stratadb_core::Result<(Option<usize>, Page)> {
		if !cursor.options.skip_fsm {
			let extents = self.extents.read();
			let state = Self::state(&extents, cursor.extent)?;
			if let Some((idx, slot)) = state.slots.iter().enumerate().last() {
				let page = Page::decode(&slot.bytes, self.settings.page_size)?;
				if page.fits(0) {
					return Ok((Some(idx), page));
				}
			}
		}
		Ok((None, Page::empty(self.settings.page_size)))
	}

	fn write_page(
		&self,
		extent: ExtentId,
		slot: Option<usize>,
		page: &Page,
		skip_wal: bool,
	) -> stratadb_core::Result<()> {
		let bytes = page.encode()?;
		let mut extents = self.extents.write();
		let state = Self::state_mut(&mut extents, extent)?;
		let new_slot = PageSlot {
			bytes,
			durable: false,
			logged: !skip_wal,
		};
		match slot {
			Some(idx) => state.slots[idx] = new_slot,
			None => state.slots.push(new_slot),
		}
		Ok(())
	}

	/// Returns the rows of the extent visible under the snapshot, in
	/// storage order.
	pub fn scan(&self, extent: ExtentId, snapshot: Snapshot) -> stratadb_core::Result<Vec<Row>> {
		let extents = self.extents.read();
		let state = Self::state(&extents, extent)?;
		let mut rows = Vec::new();
		for slot in &state.slots {
			let page = Page::decode(&slot.bytes, self.settings.page_size)?;
			for stored in page.rows() {
				if snapshot.sees(stored.cid, stored.frozen) {
					rows.push(Row::decode(&stored.payload)?);
				}
			}
		}
		Ok(rows)
	}

	pub fn page_count(&self, extent: ExtentId) -> usize {
		self.extents.read().get(&extent).map(|s| s.slots.len()).unwrap_or(0)
	}

	/// Whether the extent carries at least its initial page.
	pub fn is_initialized(&self, extent: ExtentId) -> bool {
		self.page_count(extent) > 0
	}

	/// Marks every row of the extent as frozen, making it visible to all
	/// snapshots. Called when the writing transaction commits.
	pub fn freeze_rows(&self, extent: ExtentId) -> stratadb_core::Result<()> {
		let mut extents = self.extents.write();
		let state = match extents.get_mut(&extent) {
			Some(state) => state,
			// The extent may have been reclaimed by the same commit.
			None => return Ok(()),
		};
		for slot in &mut state.slots {
			let mut page = Page::decode(&slot.bytes, self.settings.page_size)?;
			if page.freeze() {
				slot.bytes = page.encode()?;
			}
		}
		Ok(())
	}

	/// Simulates a crash followed by recovery: only pages that were flushed
	/// to stable storage or whose image reached the durability log survive.
	/// A lost page truncates the extent from that point, like a torn file.
	pub fn crash_and_recover(&self) {
		let mut extents = self.extents.write();
		for (extent, state) in extents.iter_mut() {
			let recovered = state.slots.iter().take_while(|s| s.durable || s.logged).count();
			if recovered < state.slots.len() {
				debug!(extent = %extent, lost = state.slots.len() - recovered, "crash lost pages");
				state.slots.truncate(recovered);
			}
		}
	}

	fn state<'a>(
		extents: &'a HashMap<ExtentId, ExtentState>,
		extent: ExtentId,
	) -> stratadb_core::Result<&'a ExtentState> {
		extents.get(&extent).ok_or_else(|| Error(internal_error!("unknown extent {}", extent)))
	}

	fn state_mut<'a>(
		extents: &'a mut HashMap<ExtentId, ExtentState>,
		extent: ExtentId,
	) -> stratadb_core::Result<&'a mut ExtentState> {
		extents.get_mut(&extent).ok_or_else(|| Error(internal_error!("unknown extent {}", extent)))
	}
}
