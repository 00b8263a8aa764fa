//! Properties of record sanitization.

#![allow(unused_crate_dependencies)]

use lineage_graph::lineage::{RawRecord, ViewMode, sanitize};
use proptest::prelude::*;

fn table() -> impl Strategy<Value = String> {
	prop_oneof![
		Just("s_bani.a".to_string()),
		Just(" Proceso_X.Tab ".to_string()),
		Just("resultados.b".to_string()),
		Just("lz.estatico.c".to_string()),
		Just("otro.d".to_string()),
		Just("resultados".to_string()),
	]
}

fn field() -> impl Strategy<Value = Option<String>> {
	prop_oneof![
		Just(None),
		Just(Some("*".to_string())),
		Just(Some("select".to_string())),
		Just(Some("42".to_string())),
		Just(Some("  ".to_string())),
		"[a-z][a-z0-9_]{0,8}".prop_map(Some),
		"[A-Za-z ]{1,6}".prop_map(Some),
	]
}

fn record() -> impl Strategy<Value = RawRecord> {
	(table(), table(), field(), field()).prop_map(|(s, t, sf, tf)| {
		RawRecord::new(&s, &t, sf.as_deref(), tf.as_deref())
	})
}

fn level() -> impl Strategy<Value = ViewMode> {
	prop_oneof![Just(ViewMode::Tables), Just(ViewMode::Fields)]
}

proptest! {
	#[test]
	fn sanitizing_twice_changes_nothing(records in prop::collection::vec(record(), 0..24), level in level()) {
		let once = sanitize(&records, level);
		let raw: Vec<RawRecord> = once.records.iter().map(RawRecord::from).collect();
		let twice = sanitize(&raw, level);
		prop_assert_eq!(&twice.records, &once.records);
		prop_assert_eq!(twice.rejected(), 0);
	}

	#[test]
	fn every_record_is_kept_or_counted(records in prop::collection::vec(record(), 0..24), level in level()) {
		let report = sanitize(&records, level);
		prop_assert_eq!(report.records.len() + report.rejected(), records.len());
	}

	#[test]
	fn kept_records_have_a_target_field(records in prop::collection::vec(record(), 0..24), level in level()) {
		for rec in sanitize(&records, level).records {
			prop_assert!(!rec.target_field.is_empty());
			prop_assert_eq!(rec.target_table.trim(), rec.target_table.as_str());
			prop_assert_eq!(rec.source_table.to_lowercase(), rec.source_table.clone());
		}
	}

	#[test]
	fn field_level_never_keeps_whole_table_markers(records in prop::collection::vec(record(), 0..24)) {
		for rec in sanitize(&records, ViewMode::Fields).records {
			prop_assert_ne!(rec.target_field.as_str(), "*");
			prop_assert!(rec.source_field.is_some());
			prop_assert_ne!(rec.source_field.as_deref(), Some("*"));
		}
	}
}
