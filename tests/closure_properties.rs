//! Properties of the constrained upstream closure.

#![allow(unused_crate_dependencies)]

use std::collections::BTreeSet;

use lineage_graph::lineage::{IncomingIndex, RelationRecord, upstream_closure};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

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

const TABLES: &[&str] = &[
	"resultados.a",
	"resultados.b",
	"proceso.c",
	"proceso.d",
	"s_bani.e",
	"s_bani.f",
	"lz.estatico.g",
];

fn records() -> impl Strategy<Value = Vec<RelationRecord>> {
	prop::collection::vec((0..TABLES.len(), 0..TABLES.len()), 0..30).prop_map(|pairs| {
		pairs
			.into_iter()
			.map(|(s, t)| rec(TABLES[s], TABLES[t]))
			.collect()
	})
}

#[test]
fn raw_sources_are_leaves() {
	// s_bani.x feeds proceso.p but its own origin is never reached.
	let records = vec![
		rec("proceso.p", "resultados.r"),
		rec("s_bani.x", "proceso.p"),
		rec("s_bani.y", "s_bani.x"),
	];
	let closure = upstream_closure("resultados.r", &records, false);
	assert_eq!(
		closure,
		BTreeSet::from([
			"proceso.p".to_string(),
			"resultados.r".to_string(),
			"s_bani.x".to_string(),
		])
	);
}

#[test]
fn cycles_terminate() {
	let records = vec![
		rec("proceso.a", "proceso.b"),
		rec("proceso.b", "proceso.a"),
		rec("proceso.a", "resultados.r"),
	];
	let closure = upstream_closure("resultados.r", &records, false);
	assert_eq!(closure.len(), 3);
}

fn records_and_shuffled() -> impl Strategy<Value = (Vec<RelationRecord>, Vec<RelationRecord>)> {
	records().prop_flat_map(|records| (Just(records.clone()), Just(records).prop_shuffle()))
}

proptest! {
	#[test]
	fn record_order_does_not_change_the_closure(
		(records, shuffled) in records_and_shuffled(),
		start in 0..TABLES.len(),
		hide_lz in any::<bool>(),
	) {
		let forward = upstream_closure(TABLES[start], &records, hide_lz);
		let mut reversed = records.clone();
		reversed.reverse();
		prop_assert_eq!(&upstream_closure(TABLES[start], &reversed, hide_lz), &forward);
		prop_assert_eq!(&upstream_closure(TABLES[start], &shuffled, hide_lz), &forward);
	}

	#[test]
	fn closure_contains_its_start(records in records(), start in 0..TABLES.len(), hide_lz in any::<bool>()) {
		let closure = upstream_closure(TABLES[start], &records, hide_lz);
		prop_assert!(closure.contains(TABLES[start]));
	}

	#[test]
	fn closure_is_bounded_by_touched_tables(records in records(), start in 0..TABLES.len()) {
		let closure = upstream_closure(TABLES[start], &records, false);
		let touched: BTreeSet<&str> = records
			.iter()
			.flat_map(|r| [r.source_table.as_str(), r.target_table.as_str()])
			.chain([TABLES[start]])
			.collect();
		prop_assert!(closure.iter().all(|t| touched.contains(t.as_str())));
	}

	#[test]
	fn more_relations_never_shrink_the_closure(
		records in records(),
		extra in records(),
		start in 0..TABLES.len(),
	) {
		let before = upstream_closure(TABLES[start], &records, false);
		let mut all = records.clone();
		all.extend(extra);
		let after = upstream_closure(TABLES[start], &all, false);
		prop_assert!(before.is_subset(&after));
	}

	#[test]
	fn hiding_lz_never_grows_the_closure(records in records(), start in 0..TABLES.len()) {
		let index = IncomingIndex::build(&records, true);
		let hidden = index.closure(TABLES[start]);
		let shown = upstream_closure(TABLES[start], &records, false);
		prop_assert!(hidden.is_subset(&shown));
		prop_assert!(hidden.iter().all(|t| t == TABLES[start] || !t.starts_with("lz.")));
	}
}
