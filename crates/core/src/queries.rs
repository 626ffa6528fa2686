//! Filter expressions for the backend search endpoint
//!
//! Queries are AND/OR trees of equality predicates, serialized into the
//! backend's `{"$AND":[{"iteration":{"$EQ":...}}, ...]}` JSON shape and sent
//! as a JSON string inside the `filter[expression]` query parameter (an
//! inconsistency in the backend's own API shape).
//!
//! Building a query and resolving the human-readable names inside it are two
//! separate steps: [`and_query`] produces the structure, [`resolve_filter`]
//! rewrites names to identifiers once the lookup tables are available.

use regex::Regex;
use serde_json::{json, Value};

use crate::planner::{Iteration, WorkItemType};

/// Field name for iteration equality predicates
pub const FIELD_ITERATION: &str = "iteration";

/// Field name for work item type equality predicates
pub const FIELD_WORK_ITEM_TYPE: &str = "workitemtype";

const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

/// A predicate tree sent to the backend search endpoint.
///
/// Only equality predicates are produced by this crate; `And`/`Or` combine
/// them into the shapes the backend understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Eq { field: String, value: String },
}

impl Filter {
    /// Equality predicate on a single field
    pub fn eq(field: &str, value: &str) -> Filter {
        Filter::Eq {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Render the filter into the backend's JSON shape
    pub fn to_value(&self) -> Value {
        match self {
            Filter::And(clauses) => {
                json!({ "$AND": clauses.iter().map(Filter::to_value).collect::<Vec<_>>() })
            }
            Filter::Or(clauses) => {
                json!({ "$OR": clauses.iter().map(Filter::to_value).collect::<Vec<_>>() })
            }
            Filter::Eq { field, value } => {
                let mut predicate = serde_json::Map::new();
                predicate.insert(field.clone(), json!({ "$EQ": value }));
                Value::Object(predicate)
            }
        }
    }

    /// Serialize the filter into the string embedded in `filter[expression]`
    pub fn to_expression(&self) -> String {
        self.to_value().to_string()
    }
}

/// Build the standard per-iteration query:
/// `iteration == <id> AND (workitemtype == <t1> OR workitemtype == <t2> ...)`,
/// or the iteration predicate alone when no types are given.
///
/// Names are not resolved here; apply [`resolve_filter`] afterwards.
pub fn and_query(iteration: &str, item_types: &[String]) -> Filter {
    let mut clauses = vec![Filter::eq(FIELD_ITERATION, iteration)];
    if !item_types.is_empty() {
        clauses.push(Filter::Or(
            item_types
                .iter()
                .map(|item_type| Filter::eq(FIELD_WORK_ITEM_TYPE, item_type))
                .collect(),
        ));
    }
    Filter::And(clauses)
}

/// Whether a value already looks like an opaque backend identifier
pub fn is_identifier(value: &str) -> bool {
    Regex::new(UUID_PATTERN).unwrap().is_match(value)
}

/// Rewrite human-readable names inside a filter to backend identifiers.
///
/// Iteration-equality values are looked up by name in the iteration table,
/// work-item-type values in the type table; the two namespaces are never
/// conflated. Values that already match the identifier format pass through
/// untouched, which makes resolution idempotent. Names with no match are
/// preserved unchanged and left for the backend to reject.
pub fn resolve_filter(
    filter: &Filter,
    iterations: &[Iteration],
    item_types: &[WorkItemType],
) -> Filter {
    match filter {
        Filter::And(clauses) => Filter::And(
            clauses
                .iter()
                .map(|clause| resolve_filter(clause, iterations, item_types))
                .collect(),
        ),
        Filter::Or(clauses) => Filter::Or(
            clauses
                .iter()
                .map(|clause| resolve_filter(clause, iterations, item_types))
                .collect(),
        ),
        Filter::Eq { field, value } => {
            let resolved = if is_identifier(value) {
                None
            } else if field == FIELD_ITERATION {
                iterations
                    .iter()
                    .find(|iteration| iteration.name == *value)
                    .map(|iteration| iteration.id.clone())
            } else if field == FIELD_WORK_ITEM_TYPE {
                item_types
                    .iter()
                    .find(|item_type| item_type.name == *value)
                    .map(|item_type| item_type.id.clone())
            } else {
                None
            };

            Filter::Eq {
                field: field.clone(),
                value: resolved.unwrap_or_else(|| value.clone()),
            }
        }
    }
}
