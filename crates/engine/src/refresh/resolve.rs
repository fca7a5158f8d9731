// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 StrataDB

use stratadb_catalog::{
	Catalog,
	rule::{DefinitionKind, DefinitionRule},
};
use stratadb_core::{
	interface::{
		catalog::MaterializedViewDef,
		query::{NEW_PLACEHOLDER, OLD_PLACEHOLDER, Query},
	},
	return_internal_error,
};

use crate::rewrite::rewrite_query;

/// Resolves a materialized view's defining query from its attached rules.
///
/// The catalog stores rules without judging them; this is where the shape
/// invariant lives. A materialized view must carry exactly one rule, of kind
/// substitute-on-read, with exactly one action. Any other shape means the
/// catalog was corrupted or manipulated, so every violation is an
/// internal-consistency fault rather than a user error.
pub fn resolve_definition(catalog: &Catalog, view: &MaterializedViewDef) -> stratadb_core::Result<Query> {
	let rules = catalog.get_definition_rules(view.id);
	if rules.is_empty() {
		return_internal_error!("materialized view \"{}\" is missing its definition rule", view.name);
	}
	if rules.len() > 1 {
		return_internal_error!(
			"materialized view \"{}\" has {} definition rules, expected exactly one",
			view.name,
			rules.len()
		);
	}
	let DefinitionRule { kind, .. } = &rules[0];
	let actions = match kind {
		DefinitionKind::SubstituteOnRead { actions } => actions,
		DefinitionKind::SubstituteOnWrite { .. } => {
			return_internal_error!(
				"the rule on materialized view \"{}\" is not a substitute-on-read rule",
				view.name
			);
		}
	};
	match actions.as_slice() {
		[action] => Ok(action.clone()),
		_ => {
			return_internal_error!(
				"the rule on materialized view \"{}\" has {} actions, expected exactly one",
				view.name,
				actions.len()
			);
		}
	}
}

/// Runs the definition through the rewrite pass and adapts the result for
/// direct execution.
///
/// The rewriter prepends the `new`/`old` placeholder entries, both referring
/// to the view itself. The placeholders keep the rule machinery happy but
/// would trip the executor's scannability check while the view is
/// unpopulated, so both are marked result-relation-like here. The alias
/// checks are positive assertions of the rewrite ordering contract and fail
/// loudly if it is ever violated.
pub fn adapt_for_execution(view: &MaterializedViewDef, definition: &Query) -> stratadb_core::Result<Query> {
	let mut rewritten = rewrite_query(view.id, definition);
	let mut query = match rewritten.len() {
		1 => rewritten.swap_remove(0),
		n => {
			return_internal_error!(
				"the definition of materialized view \"{}\" rewrote to {} queries, expected exactly one",
				view.name,
				n
			);
		}
	};
	if query.range_table.len() < 2 {
		return_internal_error!(
			"rewritten definition of \"{}\" lacks the placeholder range-table entries",
			view.name
		);
	}
	if query.range_table[0].alias != NEW_PLACEHOLDER {
		return_internal_error!(
			"first range-table entry of rewritten definition of \"{}\" is \"{}\", expected \"{}\"",
			view.name,
			query.range_table[0].alias,
			NEW_PLACEHOLDER
		);
	}
	if query.range_table[1].alias != OLD_PLACEHOLDER {
		return_internal_error!(
			"second range-table entry of rewritten definition of \"{}\" is \"{}\", expected \"{}\"",
			view.name,
			query.range_table[1].alias,
			OLD_PLACEHOLDER
		);
	}
	query.range_table[0].result_relation = true;
	query.range_table[1].result_relation = true;
	Ok(query)
}

#[cfg(test)]
mod tests {
	use stratadb_core::interface::{
		id::{ExtentId, ObjectId, TablespaceId, UserId},
		query::Query,
	};

	use super::*;

	fn view() -> MaterializedViewDef {
		MaterializedViewDef {
			id: ObjectId(2000),
			name: "v".to_string(),
			owner: UserId(1),
			tablespace: TablespaceId::DEFAULT,
			storage: ExtentId(1),
			populated: false,
			columns: vec![],
		}
	}

	fn read_rule(object: ObjectId, actions: Vec<Query>) -> DefinitionRule {
		DefinitionRule {
			object,
			kind: DefinitionKind::SubstituteOnRead { actions },
		}
	}

	#[test]
	fn test_resolves_single_well_formed_rule() {
		let catalog = Catalog::new();
		let view = view();
		let definition = Query::select("orders", ObjectId(1500), vec![0]);
		catalog.set_definition_rules(view.id, vec![read_rule(view.id, vec![definition.clone()])]);

		assert_eq!(resolve_definition(&catalog, &view).unwrap(), definition);
	}

	#[test]
	fn test_missing_rule_is_internal_fault() {
		let catalog = Catalog::new();
		let err = resolve_definition(&catalog, &view()).unwrap_err();
		assert!(err.is_internal());
	}

	#[test]
	fn test_multiple_rules_are_internal_fault() {
		let catalog = Catalog::new();
		let view = view();
		let action = Query::select("orders", ObjectId(1500), vec![0]);
		catalog.set_definition_rules(
			view.id,
			vec![
				read_rule(view.id, vec![action.clone()]),
				read_rule(view.id, vec![action]),
			],
		);

		assert!(resolve_definition(&catalog, &view).unwrap_err().is_internal());
	}

	#[test]
	fn test_write_rule_is_internal_fault() {
		let catalog = Catalog::new();
		let view = view();
		catalog.set_definition_rules(
			view.id,
			vec![DefinitionRule {
				object: view.id,
				kind: DefinitionKind::SubstituteOnWrite {
					actions: vec![Query::select("orders", ObjectId(1500), vec![0])],
				},
			}],
		);

		assert!(resolve_definition(&catalog, &view).unwrap_err().is_internal());
	}

	#[test]
	fn test_action_cardinality_is_checked() {
		let catalog = Catalog::new();
		let view = view();
		catalog.set_definition_rules(view.id, vec![read_rule(view.id, vec![])]);
		assert!(resolve_definition(&catalog, &view).unwrap_err().is_internal());

		let action = Query::select("orders", ObjectId(1500), vec![0]);
		catalog.set_definition_rules(view.id, vec![read_rule(view.id, vec![action.clone(), action])]);
		assert!(resolve_definition(&catalog, &view).unwrap_err().is_internal());
	}

	#[test]
	fn test_adaptation_marks_placeholders_as_result_relations() {
		let view = view();
		let definition = Query::select("orders", ObjectId(1500), vec![0, 1]);

		let adapted = adapt_for_execution(&view, &definition).unwrap();
		assert!(adapted.range_table[0].result_relation);
		assert!(adapted.range_table[1].result_relation);
		assert!(!adapted.range_table[2].result_relation);
		assert_eq!(adapted.source, 2);
		assert_eq!(adapted.source_entry().alias, "orders");
	}
}
