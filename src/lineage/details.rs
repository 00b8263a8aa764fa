//! Detail panel contents for a selected node or edge.

use std::collections::BTreeSet;

use serde::Serialize;

use super::elements::{GraphElements, RelationEdge};

/// Shown when nothing is selected.
pub const EMPTY_SELECTION_HINT: &str = "Select a table, field or relation to see more information.";
/// Placeholder for an empty list.
pub const NONE_MARKER: &str = "-";
/// Remediation shown with load failures.
pub const LOAD_ERROR_HINT: &str =
	"Check that the JSON files exist and that the folder is served over a local HTTP server.";

/// Structured description of one selected graph element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Details {
	/// A table node.
	Table {
		/// Table name.
		table: String,
		/// Zone the table belongs to.
		zone: String,
		/// Zone-type label, e.g. `staging-area`.
		zone_type: &'static str,
		/// Edges ending at the table.
		incoming: usize,
		/// Edges leaving the table.
		outgoing: usize,
		/// Sorted, deduplicated column names.
		columns: Vec<String>,
	},
	/// A field node.
	Field {
		/// Owning table.
		table: String,
		/// Field name.
		field: String,
		/// `table.field (transformation)` of each incoming edge.
		origins: Vec<String>,
		/// `table.field (transformation)` of each outgoing edge.
		targets: Vec<String>,
	},
	/// A relation edge.
	Edge {
		/// `table[.field]` of the source end.
		source: String,
		/// `table[.field]` of the target end.
		target: String,
		/// Distinct transformations; `copy` when none was recorded.
		transformations: Vec<String>,
		/// Distinct recommendations.
		recommendations: Vec<String>,
		/// Up to three sampled queries.
		queries: Vec<String>,
	},
	/// A failed load.
	Error {
		/// Load error message.
		message: String,
		/// Remediation hint.
		hint: &'static str,
	},
}

impl Details {
	/// Error details with the standard remediation hint.
	pub fn load_error(message: impl Into<String>) -> Self {
		Details::Error {
			message: message.into(),
			hint: LOAD_ERROR_HINT,
		}
	}

	/// Panel heading.
	pub fn title(&self) -> &'static str {
		match self {
			Details::Table { .. } => "Table",
			Details::Field { .. } => "Field",
			Details::Edge { .. } => "Relation",
			Details::Error { .. } => "Error",
		}
	}

	/// `(label, lines)` rows for display; empty lists render as `-`.
	pub fn rows(&self) -> Vec<(&'static str, Vec<String>)> {
		fn list(items: &[String]) -> Vec<String> {
			if items.is_empty() {
				vec![NONE_MARKER.to_string()]
			} else {
				items.to_vec()
			}
		}

		match self {
			Details::Table {
				table,
				zone,
				zone_type,
				incoming,
				outgoing,
				columns,
			} => vec![
				("Table", vec![table.clone()]),
				("Zone", vec![zone.clone()]),
				("Zone type", vec![zone_type.to_string()]),
				("Incoming relations", vec![incoming.to_string()]),
				("Outgoing relations", vec![outgoing.to_string()]),
				("Columns", list(columns)),
			],
			Details::Field {
				table,
				field,
				origins,
				targets,
			} => vec![
				("Table", vec![table.clone()]),
				("Field", vec![field.clone()]),
				("Origins", list(origins)),
				("Targets", list(targets)),
			],
			Details::Edge {
				source,
				target,
				transformations,
				recommendations,
				queries,
			} => vec![
				("Source", vec![source.clone()]),
				("Target", vec![target.clone()]),
				("Transformations", list(transformations)),
				("Recommendations", list(recommendations)),
				("Queries", list(queries)),
			],
			Details::Error { message, hint } => {
				vec![("Message", vec![message.clone()]), ("Hint", vec![hint.to_string()])]
			}
		}
	}
}

fn endpoint_summary(label: String, edge: &RelationEdge) -> String {
	format!("{label} ({})", edge.first_transformation())
}

/// Details for the element with `id`, or `None` when it is not in the graph.
pub fn describe(elements: &GraphElements, id: &str) -> Option<Details> {
	if let Some(table) = elements.table(id) {
		let columns: BTreeSet<&String> = table.columns.iter().collect();
		return Some(Details::Table {
			table: table.table.clone(),
			zone: table.zone.clone(),
			zone_type: table.zone_type.label(),
			incoming: elements.incoming(id).count(),
			outgoing: elements.outgoing(id).count(),
			columns: columns.into_iter().cloned().collect(),
		});
	}

	if let Some(field) = elements.field(id) {
		return Some(Details::Field {
			table: field.table.clone(),
			field: field.field.clone(),
			origins: elements
				.incoming(id)
				.map(|e| endpoint_summary(e.source_label(), e))
				.collect(),
			targets: elements
				.outgoing(id)
				.map(|e| endpoint_summary(e.target_label(), e))
				.collect(),
		});
	}

	elements.edge(id).map(|edge| {
		let transformations = if edge.transformations.is_empty() {
			vec![edge.first_transformation().to_string()]
		} else {
			edge.transformations.iter().cloned().collect()
		};
		Details::Edge {
			source: edge.source_label(),
			target: edge.target_label(),
			transformations,
			recommendations: edge.recommendations.iter().cloned().collect(),
			queries: edge.queries.clone(),
		}
	})
}
