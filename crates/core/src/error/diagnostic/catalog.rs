// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use crate::error::diagnostic::Diagnostic;

/// The named object does not exist
pub fn object_not_found(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_001".to_string(),
		message: format!("object \"{}\" does not exist", name),
		label: Some("unknown object".to_string()),
		help: Some("Check the object name and that it has been created".to_string()),
		notes: vec![],
	}
}

/// The named object exists but is not a materialized view
pub fn not_a_materialized_view(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_002".to_string(),
		message: format!("\"{}\" is not a materialized view", name),
		label: Some("wrong object kind".to_string()),
		help: Some("REFRESH can only be applied to materialized views".to_string()),
		notes: vec![],
	}
}

/// The object is already in use by the current transaction
pub fn object_in_use(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_003".to_string(),
		message: format!("cannot refresh \"{}\" because it is being used by active queries in this session", name),
		label: Some("object in use".to_string()),
		help: Some("Close open scans of this object before refreshing it".to_string()),
		notes: vec![],
	}
}

/// The materialized view has no valid contents to scan
pub fn view_not_populated(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_004".to_string(),
		message: format!("materialized view \"{}\" has not been populated", name),
		label: Some("unscannable view".to_string()),
		help: Some("Use REFRESH MATERIALIZED VIEW to populate it".to_string()),
		notes: vec![],
	}
}

/// An object with the same name already exists
pub fn object_already_exists(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_005".to_string(),
		message: format!("object \"{}\" already exists", name),
		label: Some("duplicate name".to_string()),
		help: Some("Choose a different name or drop the existing object".to_string()),
		notes: vec![],
	}
}

/// The named object exists but is not a table
pub fn not_a_table(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_007".to_string(),
		message: format!("\"{}\" is not a table", name),
		label: Some("wrong object kind".to_string()),
		help: Some("Rows can only be inserted into tables".to_string()),
		notes: vec![],
	}
}

/// The caller does not own the object
pub fn permission_denied(name: &str) -> Diagnostic {
	Diagnostic {
		code: "CAT_006".to_string(),
		message: format!("must be owner of materialized view \"{}\"", name),
		label: Some("permission denied".to_string()),
		help: None,
		notes: vec![],
	}
}
