//! Constrained upstream closure.
//!
//! Starting from one table, walk incoming relations upstream. Every direct
//! origin of a visited table joins the closure, but the walk only continues
//! through origins that are themselves start tables (`resultados*` or
//! `proceso*`). Raw sources show up as leaves and are never expanded.

use std::collections::{BTreeSet, HashMap};

use super::record::RelationRecord;
use super::zone::{is_lz, is_start_table};

/// Destination table → distinct source tables of its incoming relations.
///
/// Built once per render and shared by every closure query of that render.
#[derive(Clone, Debug, Default)]
pub struct IncomingIndex {
	incoming: HashMap<String, BTreeSet<String>>,
}

impl IncomingIndex {
	/// Indexes `records`, skipping lz-sourced relations when `hide_lz` is set.
	pub fn build<'a>(records: impl IntoIterator<Item = &'a RelationRecord>, hide_lz: bool) -> Self {
		let mut incoming: HashMap<String, BTreeSet<String>> = HashMap::new();
		for rec in records {
			if hide_lz && is_lz(&rec.source_table) {
				continue;
			}
			if rec.source_table.is_empty() {
				continue;
			}
			incoming
				.entry(rec.target_table.clone())
				.or_default()
				.insert(rec.source_table.clone());
		}
		Self { incoming }
	}

	/// Distinct direct origins of `table`, in name order.
	pub fn sources_of(&self, table: &str) -> impl Iterator<Item = &str> {
		self.incoming
			.get(table)
			.into_iter()
			.flat_map(|set| set.iter().map(String::as_str))
	}

	/// Tables upstream of `start`, `start` included.
	pub fn closure(&self, start: &str) -> BTreeSet<String> {
		let mut closure = BTreeSet::from([start.to_string()]);
		let mut stack = vec![start.to_string()];

		while let Some(table) = stack.pop() {
			for origin in self.sources_of(&table) {
				if closure.contains(origin) {
					continue;
				}
				closure.insert(origin.to_string());
				if is_start_table(origin) {
					stack.push(origin.to_string());
				}
			}
		}
		closure
	}
}

/// One-shot closure over a record slice.
pub fn upstream_closure(start: &str, records: &[RelationRecord], hide_lz: bool) -> BTreeSet<String> {
	IncomingIndex::build(records, hide_lz).closure(start)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn rec(source: &str, target: &str) -> RelationRecord {
		RelationRecord {
			source_table: source.into(),
			target_table: target.into(),
			source_field: Some("id".into()),
			target_field: "id".into(),
			transformation: None,
			recommendation: None,
			query: None,
		}
	}

	fn set(items: &[&str]) -> BTreeSet<String> {
		items.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn start_table_is_always_included() {
		assert_eq!(upstream_closure("resultados.x", &[], false), set(&["resultados.x"]));
	}

	#[test]
	fn leaves_are_not_expanded() {
		let records = vec![rec("s_bani.y", "resultados.x"), rec("s_bani.z", "s_bani.y")];
		let closure = upstream_closure("resultados.x", &records, false);
		assert_eq!(closure, set(&["resultados.x", "s_bani.y"]));
	}

	#[test]
	fn recurses_through_process_and_results() {
		let records = vec![
			rec("proceso.p1", "resultados.x"),
			rec("resultados.r0", "proceso.p1"),
			rec("s_bani.a", "resultados.r0"),
			rec("lz.estatico.t", "proceso.p1"),
			rec("s_bani.b", "s_bani.a"),
			rec("s_bani.q", "resultados.unrelated"),
		];
		let closure = upstream_closure("resultados.x", &records, false);
		assert_eq!(
			closure,
			set(&[
				"resultados.x",
				"proceso.p1",
				"resultados.r0",
				"s_bani.a",
				"lz.estatico.t",
			])
		);
	}

	#[test]
	fn hide_lz_removes_lz_origins() {
		let records = vec![rec("lz.funcion.f", "proceso.p"), rec("s_bani.a", "proceso.p")];
		let closure = upstream_closure("proceso.p", &records, true);
		assert_eq!(closure, set(&["proceso.p", "s_bani.a"]));
	}

	#[test]
	fn cycles_terminate() {
		let records = vec![
			rec("proceso.a", "proceso.b"),
			rec("proceso.b", "proceso.a"),
			rec("proceso.b", "proceso.b"),
		];
		let closure = upstream_closure("proceso.a", &records, false);
		assert_eq!(closure, set(&["proceso.a", "proceso.b"]));
	}

	#[test]
	fn index_is_reusable_across_starts() {
		let records = vec![rec("s_bani.a", "resultados.x"), rec("s_bani.b", "proceso.y")];
		let index = IncomingIndex::build(&records, false);
		assert_eq!(index.closure("resultados.x"), set(&["resultados.x", "s_bani.a"]));
		assert_eq!(index.closure("proceso.y"), set(&["proceso.y", "s_bani.b"]));
	}
}
