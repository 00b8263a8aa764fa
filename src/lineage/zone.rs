//! Zone derivation from dotted table names.
//!
//! A table name looks like `<zone>.<name>`. Two zones (`lz.estatico` and
//! `lz.funcion`) contain a dot themselves, so they are matched as literal
//! prefixes before falling back to "everything before the first dot".

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::record::RelationRecord;

/// Literal zone holding static landing-zone tables.
pub const LZ_STATIC_ZONE: &str = "lz.estatico";
/// Literal zone holding function-generated landing-zone tables.
pub const LZ_FUNCTION_ZONE: &str = "lz.funcion";

const RESULTS_PREFIX: &str = "resultados";
const PROCESS_PREFIX: &str = "proceso";
const STAGING_PREFIX: &str = "s_bani";

/// Prefixes that qualify a table as a start table (and as a node the
/// upstream closure may recurse through).
pub const START_TABLE_PREFIXES: [&str; 2] = [RESULTS_PREFIX, PROCESS_PREFIX];

/// Classification of a zone. Governs layout band, colour, and selector order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneType {
	/// `resultados*` zones.
	Results,
	/// `proceso*` zones.
	Process,
	/// `sa*` zones.
	StagingArea,
	/// The static landing zone.
	LzStatic,
	/// The function landing zone.
	LzFunction,
	/// Anything else.
	Other,
}

impl ZoneType {
	/// Classifies a zone name by prefix, in fixed priority order.
	pub fn of_zone(zone: &str) -> Self {
		if zone.starts_with(RESULTS_PREFIX) {
			ZoneType::Results
		} else if zone.starts_with(PROCESS_PREFIX) {
			ZoneType::Process
		} else if zone.starts_with(STAGING_PREFIX) {
			ZoneType::StagingArea
		} else if zone.starts_with(LZ_STATIC_ZONE) {
			ZoneType::LzStatic
		} else if zone.starts_with(LZ_FUNCTION_ZONE) {
			ZoneType::LzFunction
		} else {
			ZoneType::Other
		}
	}

	/// Sort key for zone selectors, ascending.
	pub fn order(self) -> u8 {
		match self {
			ZoneType::Results => 0,
			ZoneType::Process => 1,
			ZoneType::StagingArea => 2,
			ZoneType::LzStatic => 3,
			ZoneType::LzFunction => 4,
			ZoneType::Other => 5,
		}
	}

	/// Layout band the zone's tables are drawn in.
	pub fn column(self) -> ColumnKey {
		match self {
			ZoneType::Results => ColumnKey::Right,
			ZoneType::StagingArea => ColumnKey::Left,
			ZoneType::Process | ZoneType::LzStatic | ZoneType::LzFunction | ZoneType::Other => {
				ColumnKey::Center
			}
		}
	}

	/// Display name of the zone type.
	pub fn label(self) -> &'static str {
		match self {
			ZoneType::Results => "results",
			ZoneType::Process => "process",
			ZoneType::StagingArea => "staging-area",
			ZoneType::LzStatic => "lz-static",
			ZoneType::LzFunction => "lz-function",
			ZoneType::Other => "other",
		}
	}
}

/// One of the three horizontal bands of the column layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ColumnKey {
	/// Landing zones.
	Left,
	/// Staging and process zones.
	Center,
	/// Results zones.
	Right,
}

impl ColumnKey {
	/// Bands from left to right.
	pub const ALL: [ColumnKey; 3] = [ColumnKey::Left, ColumnKey::Center, ColumnKey::Right];

	/// Zero-based band index, left to right.
	pub fn index(self) -> usize {
		match self {
			ColumnKey::Left => 0,
			ColumnKey::Center => 1,
			ColumnKey::Right => 2,
		}
	}
}

/// Extracts the zone of a table name; `None` for an empty name.
pub fn extract_zone(table: &str) -> Option<&str> {
	if table.is_empty() {
		return None;
	}
	for literal in [LZ_STATIC_ZONE, LZ_FUNCTION_ZONE] {
		if table.starts_with(literal) {
			return Some(literal);
		}
	}
	match table.find('.') {
		Some(idx) => Some(&table[..idx]),
		None => Some(table),
	}
}

/// Zone and zone-type of a table, with `unknown` standing in for no zone.
pub fn zone_of_table(table: &str) -> (String, ZoneType) {
	let zone = extract_zone(table).unwrap_or("unknown");
	(zone.to_string(), ZoneType::of_zone(zone))
}

fn starts_with_any(name: &str, prefixes: &[&str]) -> bool {
	!name.is_empty() && prefixes.iter().any(|p| name.starts_with(p))
}

/// Whether a table may seed an upstream closure walk.
pub fn is_start_table(table: &str) -> bool {
	starts_with_any(table, &START_TABLE_PREFIXES)
}

/// Whether a table lives in one of the landing zones.
pub fn is_lz(table: &str) -> bool {
	starts_with_any(table, &[LZ_STATIC_ZONE, LZ_FUNCTION_ZONE])
}

/// Selector metadata for one destination zone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ZoneInfo {
	/// Zone name.
	pub zone: String,
	/// Classification of the zone.
	pub zone_type: ZoneType,
	/// Start tables whose zone this is.
	pub start_tables: BTreeSet<String>,
	/// Every target table in the zone.
	pub destinations: BTreeSet<String>,
}

impl ZoneInfo {
	/// Label shown in the zone selector.
	pub fn option_label(&self) -> String {
		let count = if self.start_tables.is_empty() {
			self.destinations.len()
		} else {
			self.start_tables.len()
		};
		format!("{} ({} tables)", self.zone, count)
	}
}

/// Destination zones present in a record set, keyed by zone name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneIndex {
	// Names compare by bytes. Sanitized zone names are lowercase ASCII, where
	// this matches a locale collation except for `_` against digits.
	zones: BTreeMap<String, ZoneInfo>,
}

impl ZoneIndex {
	/// Collects the zones of every target table in `records`.
	pub fn build<'a>(records: impl IntoIterator<Item = &'a RelationRecord>) -> Self {
		let mut zones: BTreeMap<String, ZoneInfo> = BTreeMap::new();
		for rec in records {
			let Some(zone) = extract_zone(&rec.target_table) else {
				continue;
			};
			let info = zones.entry(zone.to_string()).or_insert_with(|| ZoneInfo {
				zone: zone.to_string(),
				zone_type: ZoneType::of_zone(zone),
				start_tables: BTreeSet::new(),
				destinations: BTreeSet::new(),
			});
			info.destinations.insert(rec.target_table.clone());
			if is_start_table(&rec.target_table) {
				info.start_tables.insert(rec.target_table.clone());
			}
		}
		Self { zones }
	}

	/// Metadata for `zone`, if present.
	pub fn get(&self, zone: &str) -> Option<&ZoneInfo> {
		self.zones.get(zone)
	}

	/// Whether `zone` has any destination table.
	pub fn contains(&self, zone: &str) -> bool {
		self.zones.contains_key(zone)
	}

	/// No destination zones at all.
	pub fn is_empty(&self) -> bool {
		self.zones.is_empty()
	}

	/// First zone name in alphabetical order.
	pub fn first_name(&self) -> Option<&str> {
		self.zones.keys().next().map(String::as_str)
	}

	/// Zones ordered for display: by zone-type order, then by name.
	pub fn ordered(&self) -> Vec<&ZoneInfo> {
		let mut entries: Vec<&ZoneInfo> = self.zones.values().collect();
		entries.sort_by(|a, b| {
			a.zone_type
				.order()
				.cmp(&b.zone_type.order())
				.then_with(|| a.zone.cmp(&b.zone))
		});
		entries
	}
}
