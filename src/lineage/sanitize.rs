//! Record sanitization.
//!
//! Normalizes raw relation records and silently drops the ones that break
//! the naming rules. Every drop is counted per [`Rejection`] class so the
//! policy stays observable even though nothing is raised to the caller.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde_json::Value;

use super::record::{RawRecord, RelationRecord, ViewMode, WHOLE_TABLE};
use super::zone::{LZ_FUNCTION_ZONE, LZ_STATIC_ZONE};

/// Impala/Hive keywords and builtin names that cannot be field names.
const RESERVED_FIELD_WORDS: &[&str] = &[
	"abort", "add", "add_months", "adddate", "aggregate", "all", "alter", "analyze",
	"analytic", "and", "any", "appx_median", "archive", "array", "as", "asc",
	"authorization", "avg", "between", "bigint", "binary", "boolean", "both", "break",
	"bucket", "buckets", "by", "cache", "case", "cascade", "cast", "change",
	"char", "class", "close", "cluster", "clustered", "coalesce", "collection", "column",
	"columns", "comment", "compact", "compactions", "compute", "conf", "continue", "count",
	"create", "cross", "current", "current_date", "current_timestamp", "cursor", "data", "database",
	"databases", "date", "date_add", "date_sub", "datediff", "datetime", "day", "dayname",
	"dayofmonth", "dayofweek", "dayofyear", "dbproperties", "decimal", "deferred", "delimited", "dependency",
	"desc", "describe", "directories", "directory", "disable", "distinct", "distribute", "div",
	"double", "drop", "else", "enable", "end", "escape", "escaped", "except",
	"exchange", "exclusive", "exists", "explain", "extract", "extended", "external", "false",
	"fetch", "field", "fields", "file", "fileformat", "files", "finalize", "first",
	"float", "floor", "following", "for", "format", "from", "from_timestamp", "from_unixtime",
	"from_utc_timestamp", "full", "function", "functions", "grant", "group", "having", "hold",
	"hour", "if", "ifnull", "import", "in", "incremental", "init", "initially",
	"inner", "inputdriver", "inputformat", "inpath", "insert", "int", "integer", "intersect",
	"interval", "into", "is", "isnull", "item", "join", "key", "keys",
	"last", "last_day", "lateral", "left", "length", "like", "limit", "lines",
	"load", "local", "location", "lock", "locks", "log", "lower", "macro",
	"map", "mapjoin", "materialized", "max", "merge", "metadata", "min", "minus",
	"minute", "more", "months_between", "none", "nonstrict", "not", "now", "null",
	"nulls", "nvl", "offset", "on", "or", "order", "outer", "outputdriver",
	"outputformat", "over", "overwrite", "parquet", "partition", "partitioned", "partitions", "percent",
	"power", "preceding", "primary", "procedure", "protection", "purge", "range", "read",
	"readonly", "real", "rebuild", "recordreader", "recordwriter", "recover", "regexp_count", "regexp_extract",
	"regexp_instr", "regexp_like", "regexp_replace", "regexp_substr", "reload", "rename", "replace", "replication",
	"repair", "restrict", "revoke", "rewrite", "right", "rlike", "role", "roles",
	"rollback", "round", "row", "rows", "schema", "schemas", "second", "select",
	"semi", "sequencefile", "serde", "serdeproperties", "server", "set", "sets", "shared",
	"show", "skewed", "smallint", "sort", "sqrt", "ssl", "statistics", "stored",
	"streamtable", "str_to_timestamp", "string", "struct", "substr", "sum", "table", "tables",
	"tablesample", "tblproperties", "temporary", "terminated", "textfile", "then", "timestamp", "timestamp_micros",
	"timestamp_millis", "timestamp_seconds", "tinyint", "to", "to_date", "to_timestamp", "to_unix_timestamp", "touch",
	"transform", "transaction", "transactions", "trim", "true", "trunc", "truncate", "typeof",
	"unarchive", "unbounded", "union", "unique", "unix_timestamp", "unlock", "unsigned", "update",
	"upper", "use", "using", "validate", "value", "values", "variance", "varchar",
	"view", "views", "wait", "when", "where", "while", "with", "write",
];

static RESERVED: LazyLock<HashSet<&'static str>> =
	LazyLock::new(|| RESERVED_FIELD_WORDS.iter().copied().collect());

/// Dotted `<prefix-group>.<name>` table patterns.
static TABLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
	[
		r"(?i)^s_bani[^.]*\.[^.]+$",
		r"(?i)^proceso[^.]*\.[^.]+$",
		r"(?i)^resultados[^.]*\.[^.]+$",
	]
	.iter()
	.filter_map(|p| Regex::new(p).ok())
	.collect()
});

static SNAKE_CASE: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:_[a-z0-9]+)*$").ok());

static NUMERIC: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?$").ok());

/// Why a record was dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rejection {
	/// Source or target table outside the allowed namespaces.
	DisallowedTable,
	/// Target field absent or empty.
	MissingTargetField,
	/// `*` source or target in a field-level record set.
	WholeTableAtFieldLevel,
	/// Target field fails the naming rules.
	InvalidTargetField,
	/// Source field fails the naming rules (or is absent at field level).
	InvalidSourceField,
}

/// Output of [`sanitize`]: the kept records plus per-class drop counts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeReport {
	/// Records that passed, in input order.
	pub records: Vec<RelationRecord>,
	/// Dropped record count per reason.
	pub rejections: BTreeMap<Rejection, usize>,
}

impl SanitizeReport {
	/// Total number of dropped records.
	pub fn rejected(&self) -> usize {
		self.rejections.values().sum()
	}

	/// Records dropped for `reason`.
	pub fn count(&self, reason: Rejection) -> usize {
		self.rejections.get(&reason).copied().unwrap_or(0)
	}
}

/// Trims and lowercases a table name; anything but a string becomes empty.
pub fn normalize_table(value: Option<&Value>) -> String {
	match value {
		Some(Value::String(s)) => s.trim().to_lowercase(),
		_ => String::new(),
	}
}

/// Trims and lowercases a field name, stringifying non-string values.
/// Absent, null, and blank values yield `None`.
pub fn normalize_field(value: Option<&Value>) -> Option<String> {
	let text = match value? {
		Value::Null => return None,
		Value::String(s) => s.trim().to_lowercase(),
		other => other.to_string().trim().to_lowercase(),
	};
	(!text.is_empty()).then_some(text)
}

fn text(value: Option<&Value>) -> Option<String> {
	match value {
		Some(Value::String(s)) => Some(s.clone()),
		_ => None,
	}
}

/// Whether a (normalized) table name belongs to an allowed namespace.
pub fn is_allowed_table(table: &str) -> bool {
	if table.is_empty() {
		return false;
	}
	if table.starts_with(LZ_STATIC_ZONE) || table.starts_with(LZ_FUNCTION_ZONE) {
		return true;
	}
	TABLE_PATTERNS.iter().any(|rx| rx.is_match(table))
}

/// Field naming rule: `*`, or a lowercase snake_case name that is neither a
/// reserved word nor a plain number.
pub fn is_valid_field(field: &str) -> bool {
	if field.is_empty() {
		return false;
	}
	if field == WHOLE_TABLE {
		return true;
	}
	if RESERVED.contains(field) {
		return false;
	}
	if NUMERIC.as_ref().is_some_and(|rx| rx.is_match(field)) {
		return false;
	}
	if field.contains('*') {
		return false;
	}
	SNAKE_CASE.as_ref().is_some_and(|rx| rx.is_match(field))
}

fn check(raw: &RawRecord, level: ViewMode) -> Result<RelationRecord, Rejection> {
	let target_table = normalize_table(raw.tabla_destino.as_ref());
	let source_table = normalize_table(raw.tabla_origen.as_ref());
	let target_field = normalize_field(raw.campo_destino.as_ref());
	let source_field = normalize_field(raw.campo_origen.as_ref());

	if !is_allowed_table(&target_table) || !is_allowed_table(&source_table) {
		return Err(Rejection::DisallowedTable);
	}
	let Some(target_field) = target_field else {
		return Err(Rejection::MissingTargetField);
	};

	match level {
		ViewMode::Fields => {
			if target_field == WHOLE_TABLE || source_field.as_deref() == Some(WHOLE_TABLE) {
				return Err(Rejection::WholeTableAtFieldLevel);
			}
			if !is_valid_field(&target_field) {
				return Err(Rejection::InvalidTargetField);
			}
			if !source_field.as_deref().is_some_and(is_valid_field) {
				return Err(Rejection::InvalidSourceField);
			}
		}
		ViewMode::Tables => {
			if !is_valid_field(&target_field) {
				return Err(Rejection::InvalidTargetField);
			}
			if source_field.as_deref().is_some_and(|f| !is_valid_field(f)) {
				return Err(Rejection::InvalidSourceField);
			}
		}
	}

	Ok(RelationRecord {
		source_table,
		target_table,
		source_field,
		target_field,
		transformation: text(raw.transformacion_aplicada.as_ref()),
		recommendation: text(raw.recomendaciones.as_ref()),
		query: text(raw.consulta.as_ref()),
	})
}

/// Normalizes `records` for the given granularity, dropping invalid rows.
pub fn sanitize(records: &[RawRecord], level: ViewMode) -> SanitizeReport {
	let mut report = SanitizeReport::default();
	for raw in records {
		match check(raw, level) {
			Ok(record) => report.records.push(record),
			Err(reason) => *report.rejections.entry(reason).or_insert(0) += 1,
		}
	}
	debug!(
		"lineage-graph: sanitized {} {} records, kept {}, dropped {} ({:?})",
		records.len(),
		level.as_str(),
		report.records.len(),
		report.rejected(),
		report.rejections
	);
	report
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(source: &str, target: &str, sf: Option<&str>, tf: Option<&str>) -> RawRecord {
		RawRecord::new(source, target, sf, tf)
	}

	#[test]
	fn allowed_tables() {
		assert!(is_allowed_table("s_bani.a"));
		assert!(is_allowed_table("s_bani_hist.a"));
		assert!(is_allowed_table("proceso.b"));
		assert!(is_allowed_table("resultados_2.c"));
		assert!(is_allowed_table("lz.estatico.clientes"));
		assert!(is_allowed_table("lz.funcion"));
		assert!(!is_allowed_table("resultados"));
		assert!(!is_allowed_table("resultados.a.b"));
		assert!(!is_allowed_table("otro.a"));
		assert!(!is_allowed_table("lz.otro"));
		assert!(!is_allowed_table(""));
	}

	#[test]
	fn field_naming_rules() {
		assert!(is_valid_field("*"));
		assert!(is_valid_field("id"));
		assert!(is_valid_field("id_cliente_2"));
		assert!(is_valid_field("2024_total"));
		assert!(!is_valid_field("select"));
		assert!(!is_valid_field("date"));
		assert!(!is_valid_field("123"));
		assert!(!is_valid_field("t.*"));
		assert!(!is_valid_field("_id"));
		assert!(!is_valid_field("id_"));
		assert!(!is_valid_field("id__x"));
		assert!(!is_valid_field("Id"));
		assert!(!is_valid_field("a-b"));
		assert!(!is_valid_field(""));
	}

	#[test]
	fn normalizes_names() {
		let record = RawRecord {
			tabla_origen: Some(Value::from("  S_BANI.Clientes ")),
			tabla_destino: Some(Value::from("Resultados.Ventas")),
			campo_origen: Some(Value::from(" ID ")),
			campo_destino: Some(Value::from("Id")),
			..RawRecord::default()
		};
		let report = sanitize(&[record], ViewMode::Tables);
		assert_eq!(report.records.len(), 1);
		let rec = &report.records[0];
		assert_eq!(rec.source_table, "s_bani.clientes");
		assert_eq!(rec.target_table, "resultados.ventas");
		assert_eq!(rec.source_field.as_deref(), Some("id"));
		assert_eq!(rec.target_field, "id");
	}

	#[test]
	fn numeric_field_values_are_stringified_then_rejected() {
		let record = RawRecord {
			campo_destino: Some(Value::from(42)),
			..raw("s_bani.a", "resultados.b", Some("id"), None)
		};
		let report = sanitize(&[record], ViewMode::Tables);
		assert!(report.records.is_empty());
		assert_eq!(report.count(Rejection::InvalidTargetField), 1);
	}

	#[test]
	fn non_string_table_is_disallowed() {
		let record = RawRecord {
			tabla_origen: Some(Value::from(5)),
			..raw("s_bani.a", "resultados.b", Some("id"), Some("id"))
		};
		let report = sanitize(&[record], ViewMode::Tables);
		assert_eq!(report.count(Rejection::DisallowedTable), 1);
	}

	#[test]
	fn drop_criteria_per_level() {
		let records = vec![
			raw("s_bani.a", "resultados.b", Some("id"), Some("id")),
			raw("otro.a", "resultados.b", Some("id"), Some("id")),
			raw("s_bani.a", "resultados.b", Some("id"), None),
			raw("s_bani.a", "resultados.b", Some("id"), Some("   ")),
			raw("s_bani.a", "resultados.b", Some("*"), Some("*")),
			raw("s_bani.a", "resultados.b", None, Some("id")),
			raw("s_bani.a", "resultados.b", Some("from"), Some("id")),
			raw("s_bani.a", "resultados.b", Some("id"), Some("select")),
		];

		let tables = sanitize(&records, ViewMode::Tables);
		assert_eq!(tables.records.len(), 3);
		assert_eq!(tables.count(Rejection::DisallowedTable), 1);
		assert_eq!(tables.count(Rejection::MissingTargetField), 2);
		assert_eq!(tables.count(Rejection::InvalidSourceField), 1);
		assert_eq!(tables.count(Rejection::InvalidTargetField), 1);
		assert_eq!(tables.rejected() + tables.records.len(), records.len());

		let fields = sanitize(&records, ViewMode::Fields);
		assert_eq!(fields.records.len(), 1);
		assert_eq!(fields.count(Rejection::WholeTableAtFieldLevel), 1);
		assert_eq!(fields.count(Rejection::InvalidSourceField), 2);
		assert_eq!(fields.count(Rejection::InvalidTargetField), 1);
		assert_eq!(fields.rejected() + fields.records.len(), records.len());
	}

	#[test]
	fn whole_table_source_is_dropped_at_field_level() {
		let records = [raw("s_bani.a", "proceso.b", Some("*"), Some("id"))];
		let report = sanitize(&records, ViewMode::Fields);
		assert!(report.records.is_empty());
		assert_eq!(report.count(Rejection::WholeTableAtFieldLevel), 1);

		let tables = sanitize(&records, ViewMode::Tables);
		assert_eq!(tables.records[0].source_field.as_deref(), Some("*"));
	}

	#[test]
	fn every_reserved_word_is_rejected() {
		let accepted: Vec<&str> = RESERVED_FIELD_WORDS
			.iter()
			.copied()
			.filter(|word| is_valid_field(word))
			.collect();
		assert_eq!(accepted, Vec::<&str>::new());
		assert!(!is_valid_field("appx_median"));
		assert!(!is_valid_field("outer"));
	}

	#[test]
	fn free_text_is_kept_verbatim() {
		let record = raw("s_bani.a", "resultados.b", Some("id"), Some("id"))
			.with_transformation(" upper(x) ")
			.with_query("insert into resultados.b select id from s_bani.a");
		let report = sanitize(&[record], ViewMode::Tables);
		let rec = &report.records[0];
		assert_eq!(rec.transformation.as_deref(), Some(" upper(x) "));
		assert!(rec.query.is_some());
		assert_eq!(rec.recommendation, None);
	}
}
