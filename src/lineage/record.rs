//! Relation records: the raw JSON shape and its normalized form.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel field name meaning "the whole table".
pub const WHOLE_TABLE: &str = "*";

/// Granularity of a record set and of the rendered graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	/// One node per table, `*` fields allowed.
	#[default]
	Tables,
	/// One node per (table, field) pair.
	Fields,
}

impl ViewMode {
	/// Selector value of this mode.
	pub fn as_str(self) -> &'static str {
		match self {
			ViewMode::Tables => "tables",
			ViewMode::Fields => "fields",
		}
	}

	/// Parses a selector value, defaulting to table level.
	pub fn from_value(value: &str) -> Self {
		match value {
			"fields" => ViewMode::Fields,
			_ => ViewMode::Tables,
		}
	}

	/// Human-readable level used in status messages.
	pub fn level_label(self) -> &'static str {
		match self {
			ViewMode::Tables => "table level",
			ViewMode::Fields => "field level",
		}
	}
}

/// A relation record exactly as it appears in the input documents.
///
/// Every attribute is kept as a loose JSON value so that a single odd row
/// (a numeric field name, a missing table) never fails the whole document.
/// Unknown attributes such as `id` are ignored.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
	/// Source table.
	#[serde(default)]
	pub tabla_origen: Option<Value>,
	/// Destination table.
	#[serde(default)]
	pub tabla_destino: Option<Value>,
	/// Source field; `*` for a whole table.
	#[serde(default)]
	pub campo_origen: Option<Value>,
	/// Destination field; `*` for a whole table.
	#[serde(default)]
	pub campo_destino: Option<Value>,
	/// Free-text transformation.
	#[serde(default)]
	pub transformacion_aplicada: Option<Value>,
	/// Free-text recommendation.
	#[serde(default)]
	pub recomendaciones: Option<Value>,
	/// Query that produced the relation.
	#[serde(default)]
	pub consulta: Option<Value>,
}

impl RawRecord {
	/// Convenience constructor for a plain string record.
	pub fn new(
		source_table: &str,
		target_table: &str,
		source_field: Option<&str>,
		target_field: Option<&str>,
	) -> Self {
		Self {
			tabla_origen: Some(Value::from(source_table)),
			tabla_destino: Some(Value::from(target_table)),
			campo_origen: source_field.map(Value::from),
			campo_destino: target_field.map(Value::from),
			..Self::default()
		}
	}

	/// Sets the transformation text.
	pub fn with_transformation(mut self, text: &str) -> Self {
		self.transformacion_aplicada = Some(Value::from(text));
		self
	}

	/// Sets the recommendation text.
	pub fn with_recommendation(mut self, text: &str) -> Self {
		self.recomendaciones = Some(Value::from(text));
		self
	}

	/// Sets the query text.
	pub fn with_query(mut self, text: &str) -> Self {
		self.consulta = Some(Value::from(text));
		self
	}
}

/// A sanitized relation record.
///
/// Table names are trimmed and lowercased, the target field is always
/// present, and free-text attributes are kept verbatim (trimming happens when
/// they are accumulated on an edge).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RelationRecord {
	/// Normalized source table; never empty.
	pub source_table: String,
	/// Normalized destination table; never empty.
	pub target_table: String,
	/// Normalized source field, absent for some table-level rows.
	pub source_field: Option<String>,
	/// Normalized destination field; `*` only at table level.
	pub target_field: String,
	/// Transformation text, if it was a string.
	pub transformation: Option<String>,
	/// Recommendation text, if it was a string.
	pub recommendation: Option<String>,
	/// Query text, if it was a string.
	pub query: Option<String>,
}

impl RelationRecord {
	/// Whether the source side names a concrete field (not absent, not `*`).
	pub fn has_concrete_source_field(&self) -> bool {
		matches!(self.source_field.as_deref(), Some(f) if f != WHOLE_TABLE)
	}

	/// Whether the destination names a field rather than `*`.
	pub fn has_concrete_target_field(&self) -> bool {
		self.target_field != WHOLE_TABLE
	}
}

impl From<&RelationRecord> for RawRecord {
	fn from(record: &RelationRecord) -> Self {
		Self {
			tabla_origen: Some(Value::from(record.source_table.as_str())),
			tabla_destino: Some(Value::from(record.target_table.as_str())),
			campo_origen: record.source_field.as_deref().map(Value::from),
			campo_destino: Some(Value::from(record.target_field.as_str())),
			transformacion_aplicada: record.transformation.as_deref().map(Value::from),
			recomendaciones: record.recommendation.as_deref().map(Value::from),
			consulta: record.query.as_deref().map(Value::from),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn raw_record_ignores_unknown_attributes() {
		let json = r#"{"id": "x1", "tabla_origen": "s_bani.a", "tabla_destino": "resultados.b",
			"campo_origen": "id", "campo_destino": 7, "extra": [1, 2]}"#;
		let raw: RawRecord = serde_json::from_str(json).unwrap();
		assert_eq!(raw.campo_destino, Some(Value::from(7)));
		assert_eq!(raw.consulta, None);
	}

	#[test]
	fn view_mode_parses_selector_values() {
		assert_eq!(ViewMode::from_value("fields"), ViewMode::Fields);
		assert_eq!(ViewMode::from_value("tables"), ViewMode::Tables);
		assert_eq!(ViewMode::from_value("bogus"), ViewMode::Tables);
	}

	#[test]
	fn concrete_field_checks() {
		let rec = RelationRecord {
			source_table: "s_bani.a".into(),
			target_table: "resultados.b".into(),
			source_field: Some("*".into()),
			target_field: "id".into(),
			transformation: None,
			recommendation: None,
			query: None,
		};
		assert!(!rec.has_concrete_source_field());
		assert!(rec.has_concrete_target_field());
	}
}
