// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Column data types supported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
	Bool,
	Int8,
	Float8,
	Utf8,
}

/// A single column value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
	Bool(bool),
	Int8(i64),
	Float8(f64),
	Utf8(String),
}

impl Value {
	pub fn ty(&self) -> Type {
		match self {
			Value::Bool(_) => Type::Bool,
			Value::Int8(_) => Type::Int8,
			Value::Float8(_) => Type::Float8,
			Value::Utf8(_) => Type::Utf8,
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Bool(v) => write!(f, "{}", v),
			Value::Int8(v) => write!(f, "{}", v),
			Value::Float8(v) => write!(f, "{}", v),
			Value::Utf8(v) => f.write_str(v),
		}
	}
}
