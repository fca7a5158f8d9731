// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use serde::{Deserialize, Serialize};
use stratadb_core::interface::{id::ObjectId, query::Query};

use crate::Catalog;

/// The kind of a definitional rule.
///
/// A materialized view's defining query is stored as exactly one
/// unconditional substitute-on-read rule with exactly one action. Validation
/// of that invariant lives with the definition resolver; the catalog stores
/// whatever it is handed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DefinitionKind {
	/// Unconditionally substitute the actions for any read of the object.
	SubstituteOnRead { actions: Vec<Query> },
	/// Substitute the actions for writes to the object. Never valid as a
	/// materialized view definition.
	SubstituteOnWrite { actions: Vec<Query> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionRule {
	pub object: ObjectId,
	pub kind: DefinitionKind,
}

impl Catalog {
	/// All definitional rules attached to the object, in attachment order.
	pub fn get_definition_rules(&self, object: ObjectId) -> Vec<DefinitionRule> {
		self.rules.get(&object).map(|entry| entry.value().clone()).unwrap_or_default()
	}

	pub(crate) fn attach_definition_rule(&self, rule: DefinitionRule) {
		let mut rules = self.get_definition_rules(rule.object);
		rules.push(rule.clone());
		self.rules.insert(rule.object, rules);
	}

	/// Replaces the object's rules wholesale. Exists for administrative
	/// repair and for exercising the resolver's consistency checks.
	pub fn set_definition_rules(&self, object: ObjectId, rules: Vec<DefinitionRule>) {
		self.rules.insert(object, rules);
	}
}

#[cfg(test)]
mod tests {
	use stratadb_core::interface::query::Query;

	use super::*;

	#[test]
	fn test_rules_attach_in_order() {
		let catalog = Catalog::new();
		let object = ObjectId(2000);
		assert!(catalog.get_definition_rules(object).is_empty());

		let first = DefinitionRule {
			object,
			kind: DefinitionKind::SubstituteOnRead {
				actions: vec![Query::select("t", ObjectId(2001), vec![0])],
			},
		};
		let second = DefinitionRule {
			object,
			kind: DefinitionKind::SubstituteOnWrite {
				actions: vec![],
			},
		};
		catalog.attach_definition_rule(first.clone());
		catalog.attach_definition_rule(second.clone());

		assert_eq!(catalog.get_definition_rules(object), vec![first, second]);
	}
}
