// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use serde::{Deserialize, Serialize};

use crate::{internal_error, value::Value};

/// An owned, directly storable row of values.
///
/// Rows streamed out of the executor may borrow from execution-time state;
/// materializing into a `Row` detaches them before they reach storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row(pub Vec<Value>);

impl Row {
	pub fn new(values: Vec<Value>) -> Self {
		Self(values)
	}

	pub fn project(&self, columns: &[usize]) -> Row {
		Row(columns.iter().map(|&idx| self.0[idx].clone()).collect())
	}

	pub fn encode(&self) -> crate::Result<Vec<u8>> {
		postcard::to_stdvec(self).map_err(|e| crate::Error(internal_error!("row encoding failed: {}", e)))
	}

	pub fn decode(bytes: &[u8]) -> crate::Result<Row> {
		postcard::from_bytes(bytes).map_err(|e| crate::Error(internal_error!("row decoding failed: {}", e)))
	}
}
