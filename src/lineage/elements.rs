//! Node and edge construction for the filtered record subset.
//!
//! Nodes and edges are keyed by id in ordered maps, so the produced sets do
//! not depend on the order of the input records. The one exception is query
//! sampling: an edge keeps the first [`MAX_SAMPLED_QUERIES`] queries it sees.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::record::{RelationRecord, ViewMode, WHOLE_TABLE};
use super::zone::{ZoneType, is_lz, zone_of_table};

/// Queries kept per edge.
pub const MAX_SAMPLED_QUERIES: usize = 3;
/// Column label used for a whole-table (`*`) destination.
pub const WHOLE_TABLE_LABEL: &str = "(*)";
/// Display value for an edge without transformations.
pub const IDENTITY_TRANSFORMATION: &str = "copy";

/// A table in the rendered graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TableNode {
	/// Node id, `table:<table>`.
	pub id: String,
	/// Table name.
	pub table: String,
	/// Zone extracted from the table name.
	pub zone: String,
	/// Selects the band and colours.
	pub zone_type: ZoneType,
	/// Field names seen on this table, deduplicated, in first-seen order.
	pub columns: Vec<String>,
}

impl TableNode {
	/// Node id of `table`.
	pub fn id_for(table: &str) -> String {
		format!("table:{table}")
	}

	fn new(table: &str) -> Self {
		let (zone, zone_type) = zone_of_table(table);
		Self {
			id: Self::id_for(table),
			table: table.to_string(),
			zone,
			zone_type,
			columns: Vec::new(),
		}
	}

	fn add_column(&mut self, column: &str) {
		if !self.columns.iter().any(|c| c == column) {
			self.columns.push(column.to_string());
		}
	}
}

/// A field inside a table; only present at field level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldNode {
	/// Node id, `column:<table>:<field>`.
	pub id: String,
	/// Owning table name.
	pub table: String,
	/// Field name.
	pub field: String,
	/// Id of the owning [`TableNode`].
	pub parent: String,
	/// Zone-type of the owning table.
	pub zone_type: ZoneType,
}

impl FieldNode {
	/// Node id of `field` in `table`.
	pub fn id_for(table: &str, field: &str) -> String {
		format!("column:{table}:{field}")
	}
}

/// A deduplicated relation between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelationEdge {
	/// Edge id, `<source>-><target>`.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Table at the source end.
	pub source_table: String,
	/// Table at the target end.
	pub target_table: String,
	/// Source field; `None` at table level.
	pub source_field: Option<String>,
	/// Target field; `None` at table level.
	pub target_field: Option<String>,
	/// Granularity the edge was built at.
	pub level: ViewMode,
	/// Source table lives in a landing zone.
	pub lz: bool,
	/// Distinct, non-blank, trimmed transformations.
	pub transformations: BTreeSet<String>,
	/// Distinct, non-blank, trimmed recommendations.
	pub recommendations: BTreeSet<String>,
	/// The first queries seen, at most [`MAX_SAMPLED_QUERIES`].
	pub queries: Vec<String>,
}

impl RelationEdge {
	/// Edge id for a node pair.
	pub fn id_for(source: &str, target: &str) -> String {
		format!("{source}->{target}")
	}

	fn new(
		source: &str,
		target: &str,
		rec: &RelationRecord,
		fields: Option<(&str, &str)>,
		level: ViewMode,
	) -> Self {
		Self {
			id: Self::id_for(source, target),
			source: source.to_string(),
			target: target.to_string(),
			source_table: rec.source_table.clone(),
			target_table: rec.target_table.clone(),
			source_field: fields.map(|(s, _)| s.to_string()),
			target_field: fields.map(|(_, t)| t.to_string()),
			level,
			lz: is_lz(&rec.source_table),
			transformations: BTreeSet::new(),
			recommendations: BTreeSet::new(),
			queries: Vec::new(),
		}
	}

	fn absorb(&mut self, rec: &RelationRecord) {
		if let Some(t) = non_blank(rec.transformation.as_deref()) {
			self.transformations.insert(t.to_string());
		}
		if let Some(r) = non_blank(rec.recommendation.as_deref()) {
			self.recommendations.insert(r.to_string());
		}
		if let Some(q) = non_blank(rec.query.as_deref()) {
			if self.queries.len() < MAX_SAMPLED_QUERIES {
				self.queries.push(q.to_string());
			}
		}
	}

	/// First transformation, or `copy` when none was recorded.
	pub fn first_transformation(&self) -> &str {
		self.transformations
			.iter()
			.next()
			.map(String::as_str)
			.unwrap_or(IDENTITY_TRANSFORMATION)
	}

	/// `table[.field]` label of the source end.
	pub fn source_label(&self) -> String {
		endpoint_label(&self.source_table, self.source_field.as_deref())
	}

	/// `table[.field]` label of the target end.
	pub fn target_label(&self) -> String {
		endpoint_label(&self.target_table, self.target_field.as_deref())
	}

	/// One-line hover summary.
	pub fn tooltip(&self) -> String {
		format!(
			"{} ➞ {} ({})",
			self.source_label(),
			self.target_label(),
			self.first_transformation()
		)
	}
}

fn endpoint_label(table: &str, field: Option<&str>) -> String {
	match field {
		Some(field) => format!("{table}.{field}"),
		None => table.to_string(),
	}
}

fn non_blank(text: Option<&str>) -> Option<&str> {
	text.map(str::trim).filter(|t| !t.is_empty())
}

/// Everything the renderer needs for one filtered subset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GraphElements {
	/// Granularity of every node and edge.
	pub mode: ViewMode,
	/// Tables sorted by id.
	pub tables: Vec<TableNode>,
	/// Fields sorted by id; empty at table level.
	pub fields: Vec<FieldNode>,
	/// Edges sorted by id.
	pub edges: Vec<RelationEdge>,
}

impl GraphElements {
	/// True when there are no tables.
	pub fn is_empty(&self) -> bool {
		self.tables.is_empty()
	}

	/// Looks up a table node by id.
	pub fn table(&self, id: &str) -> Option<&TableNode> {
		self.tables.iter().find(|t| t.id == id)
	}

	/// Looks up a field node by id.
	pub fn field(&self, id: &str) -> Option<&FieldNode> {
		self.fields.iter().find(|f| f.id == id)
	}

	/// Looks up an edge by id.
	pub fn edge(&self, id: &str) -> Option<&RelationEdge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// Field nodes whose parent is `table_id`.
	pub fn children<'a>(&'a self, table_id: &'a str) -> impl Iterator<Item = &'a FieldNode> {
		self.fields.iter().filter(move |f| f.parent == table_id)
	}

	/// Edges ending at `node_id`.
	pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a RelationEdge> {
		self.edges.iter().filter(move |e| e.target == node_id)
	}

	/// Edges leaving `node_id`.
	pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a RelationEdge> {
		self.edges.iter().filter(move |e| e.source == node_id)
	}
}

/// Builds deduplicated nodes and edges from filtered records.
pub fn build_elements<'a>(
	records: impl IntoIterator<Item = &'a RelationRecord>,
	mode: ViewMode,
) -> GraphElements {
	match mode {
		ViewMode::Tables => build_table_elements(records),
		ViewMode::Fields => build_field_elements(records),
	}
}

fn table_entry<'m>(tables: &'m mut BTreeMap<String, TableNode>, table: &str) -> &'m mut TableNode {
	tables
		.entry(TableNode::id_for(table))
		.or_insert_with(|| TableNode::new(table))
}

fn build_table_elements<'a>(records: impl IntoIterator<Item = &'a RelationRecord>) -> GraphElements {
	let mut tables: BTreeMap<String, TableNode> = BTreeMap::new();
	let mut edges: BTreeMap<String, RelationEdge> = BTreeMap::new();

	for rec in records {
		if rec.source_table.is_empty() || rec.target_table.is_empty() {
			continue;
		}
		let source = table_entry(&mut tables, &rec.source_table);
		if let Some(field) = rec.source_field.as_deref().filter(|f| *f != WHOLE_TABLE) {
			source.add_column(field);
		}
		let source_id = source.id.clone();

		let target = table_entry(&mut tables, &rec.target_table);
		if rec.target_field == WHOLE_TABLE {
			target.add_column(WHOLE_TABLE_LABEL);
		} else {
			target.add_column(&rec.target_field);
		}
		let target_id = target.id.clone();

		edges
			.entry(RelationEdge::id_for(&source_id, &target_id))
			.or_insert_with(|| RelationEdge::new(&source_id, &target_id, rec, None, ViewMode::Tables))
			.absorb(rec);
	}

	GraphElements {
		mode: ViewMode::Tables,
		tables: tables.into_values().collect(),
		fields: Vec::new(),
		edges: edges.into_values().collect(),
	}
}

fn build_field_elements<'a>(records: impl IntoIterator<Item = &'a RelationRecord>) -> GraphElements {
	let mut tables: BTreeMap<String, TableNode> = BTreeMap::new();
	let mut fields: BTreeMap<String, FieldNode> = BTreeMap::new();
	let mut edges: BTreeMap<String, RelationEdge> = BTreeMap::new();

	let mut ensure_field = |tables: &mut BTreeMap<String, TableNode>, table: &str, field: &str| {
		let node = table_entry(tables, table);
		node.add_column(field);
		let (parent, zone_type) = (node.id.clone(), node.zone_type);
		fields
			.entry(FieldNode::id_for(table, field))
			.or_insert_with(|| FieldNode {
				id: FieldNode::id_for(table, field),
				table: table.to_string(),
				field: field.to_string(),
				parent,
				zone_type,
			})
			.id
			.clone()
	};

	for rec in records {
		if rec.source_table.is_empty() || rec.target_table.is_empty() {
			continue;
		}
		if !rec.has_concrete_source_field() || !rec.has_concrete_target_field() {
			continue;
		}
		let Some(source_field) = rec.source_field.as_deref() else {
			continue;
		};
		let source_id = ensure_field(&mut tables, &rec.source_table, source_field);
		let target_id = ensure_field(&mut tables, &rec.target_table, &rec.target_field);

		edges
			.entry(RelationEdge::id_for(&source_id, &target_id))
			.or_insert_with(|| {
				RelationEdge::new(
					&source_id,
					&target_id,
					rec,
					Some((source_field, rec.target_field.as_str())),
					ViewMode::Fields,
				)
			})
			.absorb(rec);
	}

	GraphElements {
		mode: ViewMode::Fields,
		tables: tables.into_values().collect(),
		fields: fields.into_values().collect(),
		edges: edges.into_values().collect(),
	}
}
