// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use serde::{Deserialize, Serialize};
use stratadb_core::{Error, common::CommandId, internal_error};
use xxhash_rust::xxh3::xxh3_64;

/// Marker identifying a well-formed page to the generic page reader.
pub const PAGE_MAGIC: u32 = 0x5354_5041; // "STPA"

/// Fixed header: magic (4) + checksum (8) + reserved (4).
pub const PAGE_HEADER_LEN: usize = 16;

/// A row as stored on a page, together with its visibility metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
	/// Command under which the row was written.
	pub cid: CommandId,
	/// Frozen rows are visible to everyone regardless of snapshot.
	pub frozen: bool,
	pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
struct PageBody {
	rows: Vec<StoredRow>,
}

/// An in-construction page. Rows are accumulated until the encoded size
/// would exceed the page size, then the page is sealed and written out.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
	body: PageBody,
	page_size: usize,
	used: usize,
}

impl Page {
	pub fn empty(page_size: usize) -> Self {
		Self {
			body: PageBody::default(),
			page_size,
			used: PAGE_HEADER_LEN,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.body.rows.is_empty()
	}

	pub fn row_count(&self) -> usize {
		self.body.rows.len()
	}

	/// Whether a row of the given payload size still fits on this page.
	/// Oversized rows are accepted onto an otherwise empty page.
	pub fn fits(&self, payload_len: usize) -> bool {
		let row_overhead = 16;
		self.is_empty() || self.used + payload_len + row_overhead <= self.page_size
	}

	pub fn push_row(&mut self, row: StoredRow) {
		self.used += row.payload.len() + 16;
		self.body.rows.push(row);
	}

	pub fn rows(&self) -> &[StoredRow] {
		&self.body.rows
	}

	/// Marks all rows as frozen. Returns whether anything changed.
	pub fn freeze(&mut self) -> bool {
		let mut changed = false;
		for row in &mut self.body.rows {
			changed |= !row.frozen;
			row.frozen = true;
		}
		changed
	}

	/// Seals the page into its on-disk representation: header with magic and
	/// body checksum, followed by the encoded body.
	pub fn encode(&self) -> stratadb_core::Result<Vec<u8>> {
		let body = postcard::to_stdvec(&self.body)
			.map_err(|e| Error(internal_error!("page encoding failed: {}", e)))?;
		let mut out = Vec::with_capacity(PAGE_HEADER_LEN + body.len());
		out.extend_from_slice(&PAGE_MAGIC.to_le_bytes());
		out.extend_from_slice(&xxh3_64(&body).to_le_bytes());
		out.extend_from_slice(&[0u8; 4]);
		out.extend_from_slice(&body);
		Ok(out)
	}

	/// Parses and verifies a sealed page.
	pub fn decode(bytes: &[u8], page_size: usize) -> stratadb_core::Result<Page> {
		if bytes.len() < PAGE_HEADER_LEN {
			return Err(Error(internal_error!("page too short: {} bytes", bytes.len())));
		}
		let magic = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
		if magic != PAGE_MAGIC {
			return Err(Error(internal_error!("bad page magic: {:#010x}", magic)));
		}
		let checksum = u64::from_le_bytes(bytes[4..12].try_into().unwrap());
		let body_bytes = &bytes[PAGE_HEADER_LEN..];
		if checksum != xxh3_64(body_bytes) {
			return Err(Error(internal_error!("page checksum mismatch")));
		}
		let body: PageBody = postcard::from_bytes(body_bytes)
			.map_err(|e| Error(internal_error!("page body decoding failed: {}", e)))?;
		let used = PAGE_HEADER_LEN + body.rows.iter().map(|r| r.payload.len() + 16).sum::<usize>();
		Ok(Page {
			body,
			page_size,
			used,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn row(payload: &[u8]) -> StoredRow {
		StoredRow {
			cid: CommandId(0),
			frozen: false,
			payload: payload.to_vec(),
		}
	}

	#[test]
	fn test_empty_page_round_trip() {
		let page = Page::empty(8192);
		let bytes = page.encode().unwrap();
		let decoded = Page::decode(&bytes, 8192).unwrap();
		assert!(decoded.is_empty());
	}

	#[test]
	fn test_rows_round_trip() {
		let mut page = Page::empty(8192);
		page.push_row(row(b"first"));
		page.push_row(row(b"second"));
		let decoded = Page::decode(&page.encode().unwrap(), 8192).unwrap();
		assert_eq!(decoded.rows().len(), 2);
		assert_eq!(decoded.rows()[1].payload, b"second");
	}

	#[test]
	fn test_fits_accounts_for_page_size() {
		let mut page = Page::empty(128);
		assert!(page.fits(64));
		page.push_row(row(&[0u8; 64]));
		assert!(!page.fits(64));
	}

	#[test]
	fn test_oversized_row_accepted_on_empty_page() {
		let page = Page::empty(128);
		assert!(page.fits(4096));
	}

	#[test]
	fn test_decode_rejects_corruption() {
		let mut page = Page::empty(8192);
		page.push_row(row(b"data"));
		let mut bytes = page.encode().unwrap();
		let last = bytes.len() - 1;
		bytes[last] ^= 0xff;
		let err = Page::decode(&bytes, 8192).unwrap_err();
		assert!(err.is_internal());
	}

	#[test]
	fn test_decode_rejects_bad_magic() {
		let bytes = vec![0u8; PAGE_HEADER_LEN];
		assert!(Page::decode(&bytes, 8192).is_err());
	}
}
