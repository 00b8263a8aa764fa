//! Filter state and subset derivation.
//!
//! [`FilterState`] is a plain value: every user interaction is an [`Action`]
//! that produces a new state, and [`filter_records`] derives the working
//! subset from a state and a record slice without touching anything else.

use super::closure::IncomingIndex;
use super::layout::LayoutMode;
use super::record::{RelationRecord, ViewMode};
use super::zone::{ZoneIndex, extract_zone, is_lz, is_start_table};

/// Selector value meaning "no specific choice".
pub const ALL: &str = "all";

/// A zone or table selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Choice {
	/// Nothing chosen, or the `all` option.
	#[default]
	All,
	/// A concrete zone or table name.
	Named(String),
}

impl Choice {
	/// Parses a selector value; `all` and the empty string mean [`Choice::All`].
	pub fn from_value(value: &str) -> Self {
		if value.is_empty() || value == ALL {
			Choice::All
		} else {
			Choice::Named(value.to_string())
		}
	}

	/// The chosen name, if any.
	pub fn named(&self) -> Option<&str> {
		match self {
			Choice::All => None,
			Choice::Named(name) => Some(name),
		}
	}

	/// True for [`Choice::All`].
	pub fn is_all(&self) -> bool {
		matches!(self, Choice::All)
	}

	/// Selector value for this choice.
	pub fn value(&self) -> &str {
		self.named().unwrap_or(ALL)
	}
}

/// A user interaction that changes the filter state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
	/// Switch between table and field level.
	SetViewMode(ViewMode),
	/// Pick a destination zone.
	SelectZone(Choice),
	/// Pick a start table within the zone.
	SelectTable(Choice),
	/// Show every start table of the zone.
	SetShowAll(bool),
	/// Drop relations sourced from landing zones.
	SetHideLz(bool),
	/// Choose the layout mode.
	SetLayout(LayoutMode),
}

impl Action {
	/// Whether the selectors must be re-synchronised after this action.
	pub fn requires_sync(&self) -> bool {
		!matches!(self, Action::SelectTable(_) | Action::SetLayout(_))
	}

	/// Layout changes only reposition the current graph.
	pub fn requires_refilter(&self) -> bool {
		!matches!(self, Action::SetLayout(_))
	}
}

/// User-selected view options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
	/// Table or field granularity.
	pub view_mode: ViewMode,
	/// Selected destination zone.
	pub zone: Choice,
	/// Selected start table.
	pub table: Choice,
	/// Show the whole zone instead of one closure.
	pub show_all: bool,
	/// Hide landing-zone sources.
	pub hide_lz: bool,
	/// Layout used for the next draw.
	pub layout: LayoutMode,
	/// Stays false until the user makes a qualifying selection.
	pub ready_to_render: bool,
}

impl FilterState {
	/// Defaults used after a (re)load. The layout choice survives.
	pub fn reset(&self) -> Self {
		Self {
			layout: self.layout,
			..Self::default()
		}
	}

	/// Applies one interaction, returning the next state.
	pub fn apply(self, action: Action) -> Self {
		match action {
			Action::SetViewMode(view_mode) => Self {
				view_mode,
				zone: Choice::All,
				table: Choice::All,
				show_all: false,
				ready_to_render: false,
				..self
			},
			Action::SelectZone(zone) => {
				let ready_to_render = !zone.is_all();
				Self {
					zone,
					show_all: false,
					ready_to_render,
					..self
				}
			}
			Action::SelectTable(table) => {
				let ready_to_render = !table.is_all() || !self.zone.is_all();
				Self {
					table,
					ready_to_render,
					..self
				}
			}
			Action::SetShowAll(show_all) => {
				let table = if show_all { Choice::All } else { self.table };
				let ready_to_render = show_all || !table.is_all() || !self.zone.is_all();
				Self {
					show_all,
					table,
					ready_to_render,
					..self
				}
			}
			Action::SetHideLz(hide_lz) => Self { hide_lz, ..self },
			Action::SetLayout(layout) => Self { layout, ..self },
		}
	}

	/// Reconciles zone/table choices with the zones actually present.
	pub fn synced(self, zones: &ZoneIndex) -> Self {
		let mut next = self;
		if let Some(zone) = next.zone.named() {
			if !zones.contains(zone) {
				next.zone = zones
					.first_name()
					.map(|z| Choice::Named(z.to_string()))
					.unwrap_or_default();
			}
		}

		let info = next.zone.named().and_then(|z| zones.get(z));
		match info {
			None => {
				next.table = Choice::All;
				next.show_all = false;
			}
			Some(info) => {
				let first = info.start_tables.iter().next();
				if info.start_tables.is_empty() {
					next.table = Choice::All;
					next.show_all = false;
				} else if next.show_all {
					next.table = Choice::All;
				} else if !next
					.table
					.named()
					.is_some_and(|t| info.start_tables.contains(t))
				{
					next.table = first.map(|t| Choice::Named(t.clone())).unwrap_or_default();
				}
			}
		}
		next
	}

	/// True while rendering should be replaced by a "please select" prompt.
	pub fn is_gated(&self) -> bool {
		let no_selection = self.zone.is_all() && self.table.is_all() && !self.show_all;
		!self.ready_to_render || no_selection
	}
}

/// Extra knobs for [`filter_records`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterOptions {
	/// Stop after the lz filter; used to populate the selectors.
	pub skip_zone: bool,
}

/// Derives the working subset of `records` for `state`.
///
/// `index` must have been built from the same records with the same
/// `hide_lz` flag; when absent it is built on demand.
pub fn filter_records<'a>(
	state: &FilterState,
	records: &'a [RelationRecord],
	index: Option<&IncomingIndex>,
	options: FilterOptions,
) -> Vec<&'a RelationRecord> {
	let visible = records
		.iter()
		.filter(|rec| !(state.hide_lz && is_lz(&rec.source_table)));

	if options.skip_zone {
		return visible.collect();
	}

	if let Some(table) = state.table.named() {
		let built;
		let index = match index {
			Some(index) => index,
			None => {
				built = IncomingIndex::build(records, state.hide_lz);
				&built
			}
		};
		let closure = index.closure(table);
		return visible
			.filter(|rec| closure.contains(&rec.target_table))
			.collect();
	}

	if let Some(zone) = state.zone.named() {
		// Show-all and the plain zone view share the start-table rule.
		return visible
			.filter(|rec| extract_zone(&rec.target_table) == Some(zone))
			.filter(|rec| is_start_table(&rec.target_table))
			.collect();
	}

	visible.filter(|rec| is_start_table(&rec.target_table)).collect()
}

/// Option lists and enabled flags for the selector widgets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectorView {
	/// `(value, label)` pairs, `all` first.
	pub zones: Vec<(String, String)>,
	/// `(value, label)` pairs; a single placeholder when disabled.
	pub tables: Vec<(String, String)>,
	/// Whether the table selector accepts input.
	pub tables_enabled: bool,
	/// Whether the show-all checkbox accepts input.
	pub show_all_enabled: bool,
}

/// Label of the `all` zone option.
pub const ALL_ZONES_LABEL: &str = "All zones (start: resultados/proceso)";

impl SelectorView {
	/// Derives the widget contents for `state`.
	pub fn build(state: &FilterState, zones: &ZoneIndex) -> Self {
		let mut zone_options = vec![(ALL.to_string(), ALL_ZONES_LABEL.to_string())];
		zone_options.extend(
			zones
				.ordered()
				.into_iter()
				.map(|info| (info.zone.clone(), info.option_label())),
		);

		let info = state.zone.named().and_then(|z| zones.get(z));
		let (tables, tables_enabled, show_all_enabled) = match info {
			None => (vec![(ALL.to_string(), "Select a zone".to_string())], false, false),
			Some(info) if info.start_tables.is_empty() => (
				vec![(ALL.to_string(), "No start tables".to_string())],
				false,
				false,
			),
			Some(info) => (
				info.start_tables
					.iter()
					.map(|t| (t.clone(), t.clone()))
					.collect(),
				!state.show_all,
				true,
			),
		};

		Self {
			zones: zone_options,
			tables,
			tables_enabled,
			show_all_enabled,
		}
	}
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

	fn sample() -> Vec<RelationRecord> {
		vec![
			rec("s_bani.a", "resultados.b"),
			rec("lz.estatico.t", "proceso.p"),
			rec("proceso.p", "resultados.c"),
			rec("s_bani.a", "s_bani.z"),
			rec("s_bani.q", "resultados.unrelated"),
		]
	}

	fn targets(records: &[&RelationRecord]) -> Vec<String> {
		records.iter().map(|r| r.target_table.clone()).collect()
	}

	#[test]
	fn defaults_are_gated() {
		let state = FilterState::default();
		assert!(state.is_gated());
		let state = state.apply(Action::SetHideLz(true));
		assert!(state.is_gated());
	}

	#[test]
	fn zone_selection_opens_gate() {
		let state = FilterState::default().apply(Action::SelectZone(Choice::from_value("resultados")));
		assert!(!state.is_gated());
		let state = state.apply(Action::SelectZone(Choice::All));
		assert!(state.is_gated());
	}

	#[test]
	fn show_all_clears_table() {
		let state = FilterState::default()
			.apply(Action::SelectZone(Choice::from_value("resultados")))
			.apply(Action::SelectTable(Choice::from_value("resultados.b")))
			.apply(Action::SetShowAll(true));
		assert_eq!(state.table, Choice::All);
		assert!(state.show_all);
		assert!(!state.is_gated());
	}

	#[test]
	fn view_mode_change_resets_selection() {
		let state = FilterState::default()
			.apply(Action::SelectZone(Choice::from_value("proceso")))
			.apply(Action::SetHideLz(true))
			.apply(Action::SetViewMode(ViewMode::Fields));
		assert_eq!(state.zone, Choice::All);
		assert!(state.hide_lz);
		assert!(!state.ready_to_render);
	}

	#[test]
	fn reset_keeps_layout() {
		let state = FilterState::default()
			.apply(Action::SetLayout(LayoutMode::FreeFlow))
			.apply(Action::SelectZone(Choice::from_value("proceso")));
		let reset = state.reset();
		assert_eq!(reset.layout, LayoutMode::FreeFlow);
		assert_eq!(reset.zone, Choice::All);
	}

	#[test]
	fn all_all_keeps_start_table_destinations() {
		let records = sample();
		let state = FilterState::default();
		let subset = filter_records(&state, &records, None, FilterOptions::default());
		assert_eq!(
			targets(&subset),
			vec!["resultados.b", "proceso.p", "resultados.c", "resultados.unrelated"]
		);
	}

	#[test]
	fn hide_lz_applies_before_skip_zone() {
		let records = sample();
		let state = FilterState::default().apply(Action::SetHideLz(true));
		let subset = filter_records(&state, &records, None, FilterOptions { skip_zone: true });
		assert_eq!(subset.len(), 4);
		assert!(subset.iter().all(|r| !is_lz(&r.source_table)));
	}

	#[test]
	fn zone_filter_keeps_start_tables_in_zone() {
		let records = sample();
		let state = FilterState::default()
			.apply(Action::SelectZone(Choice::from_value("resultados")))
			.apply(Action::SetShowAll(true));
		let subset = filter_records(&state, &records, None, FilterOptions::default());
		assert_eq!(
			targets(&subset),
			vec!["resultados.b", "resultados.c", "resultados.unrelated"]
		);

		let staging = FilterState::default().apply(Action::SelectZone(Choice::from_value("s_bani")));
		assert!(filter_records(&staging, &records, None, FilterOptions::default()).is_empty());
	}

	#[test]
	fn table_filter_uses_closure() {
		let records = sample();
		let state = FilterState::default()
			.apply(Action::SelectZone(Choice::from_value("resultados")))
			.apply(Action::SelectTable(Choice::from_value("resultados.c")));
		let subset = filter_records(&state, &records, None, FilterOptions::default());
		assert_eq!(targets(&subset), vec!["proceso.p", "resultados.c"]);

		let index = IncomingIndex::build(&records, false);
		let cached = filter_records(&state, &records, Some(&index), FilterOptions::default());
		assert_eq!(subset, cached);
	}

	#[test]
	fn sync_picks_first_start_table() {
		let records = sample();
		let zones = ZoneIndex::build(&records);
		let state = FilterState::default()
			.apply(Action::SelectZone(Choice::from_value("resultados")))
			.synced(&zones);
		assert_eq!(state.table, Choice::from_value("resultados.b"));

		let show_all = state.apply(Action::SetShowAll(true)).synced(&zones);
		assert_eq!(show_all.table, Choice::All);
	}

	#[test]
	fn sync_replaces_vanished_zone() {
		let records = sample();
		let zones = ZoneIndex::build(&records);
		let state = FilterState {
			zone: Choice::from_value("gone"),
			show_all: true,
			..FilterState::default()
		}
		.synced(&zones);
		assert_eq!(state.zone, Choice::from_value("proceso"));
		assert_eq!(state.table, Choice::All);
	}

	#[test]
	fn sync_clears_show_all_without_start_tables() {
		let records = sample();
		let zones = ZoneIndex::build(&records);
		let state = FilterState {
			zone: Choice::from_value("s_bani"),
			show_all: true,
			table: Choice::from_value("s_bani.z"),
			..FilterState::default()
		}
		.synced(&zones);
		assert!(!state.show_all);
		assert_eq!(state.table, Choice::All);
	}

	#[test]
	fn selector_view_disables_tables_without_zone() {
		let records = sample();
		let zones = ZoneIndex::build(&records);
		let view = SelectorView::build(&FilterState::default(), &zones);
		assert_eq!(view.zones[0].0, ALL);
		assert_eq!(view.zones[1].0, "resultados");
		assert!(!view.tables_enabled);
		assert!(!view.show_all_enabled);

		let state = FilterState::default().apply(Action::SelectZone(Choice::from_value("resultados")));
		let view = SelectorView::build(&state, &zones);
		assert!(view.tables_enabled);
		assert_eq!(view.tables.len(), 3);
	}
}
