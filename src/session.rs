//! Viewer session: loaded data, filter state and the serialized task queue.
//!
//! All user interactions and load completions funnel through [`Session`].
//! Tasks are processed strictly in order, one at a time, and each produces an
//! [`Outcome`] telling the view what to do next. Loads are tagged with a
//! generation so that a slow response can never overwrite a newer one.

use std::collections::VecDeque;
use std::fmt;

use log::{debug, error, info, warn};

use crate::error::LoadResult;
use crate::lineage::{
	Action, FilterOptions, FilterState, GraphElements, IncomingIndex, LOAD_ERROR_HINT, LayoutMode,
	RelationRecord, SanitizeReport, ViewMode, ZoneIndex, build_elements, filter_records, sanitize,
};
use crate::loader::Datasets;

/// Sanitized records of one successful load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
	/// Table-level records.
	pub tables: SanitizeReport,
	/// Field-level records.
	pub fields: SanitizeReport,
}

impl Dataset {
	/// Sanitizes both documents.
	pub fn from_raw(raw: &Datasets) -> Self {
		Self {
			tables: sanitize(&raw.tables, ViewMode::Tables),
			fields: sanitize(&raw.fields, ViewMode::Fields),
		}
	}

	/// Sanitized records for `mode`.
	pub fn records(&self, mode: ViewMode) -> &[RelationRecord] {
		match mode {
			ViewMode::Tables => &self.tables.records,
			ViewMode::Fields => &self.fields.records,
		}
	}
}

/// Identifies one load request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
	generation: u64,
	/// Triggered by the reload button rather than startup.
	pub reload: bool,
}

/// Hands out load generations; only the newest one may complete.
#[derive(Clone, Debug, Default)]
pub struct LoadTracker {
	latest: u64,
}

impl LoadTracker {
	/// Starts a new load, superseding every earlier ticket.
	pub fn begin(&mut self, reload: bool) -> LoadTicket {
		self.latest += 1;
		LoadTicket {
			generation: self.latest,
			reload,
		}
	}

	/// True while no newer load has begun.
	pub fn is_current(&self, ticket: &LoadTicket) -> bool {
		ticket.generation == self.latest
	}
}

/// Work item for the session queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
	/// Apply a selector change.
	Filter(Action),
	/// Re-run the layout of the current graph.
	ResetView,
	/// Re-derive the graph from the current state.
	Render,
}

impl From<Action> for Task {
	fn from(action: Action) -> Self {
		Task::Filter(action)
	}
}

/// A graph ready to be laid out and drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
	/// Nodes and edges to draw.
	pub elements: GraphElements,
	/// Layout to place them with.
	pub layout: LayoutMode,
	/// Records that survived filtering.
	pub matched: usize,
	/// Records available before zone/table filtering.
	pub total: usize,
}

/// What the view should do after a task.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
	/// Waiting for the user to pick a zone or start table; no graph.
	Prompt,
	/// The filters matched nothing; no graph.
	NoMatches {
		/// Records available before the zone and table filters.
		total: usize,
	},
	/// Replace the graph.
	Draw(Scene),
	/// Keep the graph, lay it out again with the current layout mode.
	Relayout(LayoutMode),
	/// New data is in place and the filters were reset; no graph.
	Loaded {
		/// True when this replaced earlier data.
		reloaded: bool,
	},
	/// The load failed; any graph is torn down and the old data kept.
	LoadFailed {
		/// Error text for the status line.
		message: String,
		/// Suggestion shown in the details panel.
		hint: &'static str,
	},
}

impl Outcome {
	/// Whether the view keeps (or gets) a graph after this outcome.
	pub fn has_graph(&self) -> bool {
		matches!(self, Outcome::Draw(_) | Outcome::Relayout(_))
	}

	/// Status line for this outcome, if it changes the status.
	pub fn status(&self) -> Option<Status> {
		match self {
			Outcome::Prompt => Some(Status::SelectionNeeded),
			Outcome::NoMatches { total } => Some(Status::NoMatches { total: *total }),
			Outcome::Draw(scene) => Some(Status::Showing {
				matched: scene.matched,
				mode: scene.elements.mode,
				total: scene.total,
			}),
			Outcome::Relayout(_) => None,
			Outcome::Loaded { reloaded } => Some(Status::Loaded { reloaded: *reloaded }),
			Outcome::LoadFailed { message, .. } => Some(Status::LoadFailed(message.clone())),
		}
	}
}

/// The status line shown above the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
	/// A load is in flight.
	Loading,
	/// Data arrived.
	Loaded {
		/// Whether this was a reload.
		reloaded: bool,
	},
	/// Waiting on the zone or table selector.
	SelectionNeeded,
	/// Filters matched nothing.
	NoMatches {
		/// Records before the zone and table filters.
		total: usize,
	},
	/// A graph is on screen.
	Showing {
		/// Records that fed the graph.
		matched: usize,
		/// Granularity of the graph.
		mode: ViewMode,
		/// Records before the zone and table filters.
		total: usize,
	},
	/// The last load failed with this message.
	LoadFailed(String),
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Loading => write!(f, "Loading data..."),
			Status::Loaded { reloaded: false } => {
				write!(f, "Data loaded. Select a zone or a start table.")
			}
			Status::Loaded { reloaded: true } => {
				write!(f, "Data reloaded. Select a zone or a start table.")
			}
			Status::SelectionNeeded => write!(f, "Select a zone or a start table to draw the graph."),
			Status::NoMatches { total } => write!(
				f,
				"No relations for the selected filters ({total} records available in total)."
			),
			Status::Showing { matched, mode, total } => write!(
				f,
				"Showing {matched} relations ({}) filtered from {total}.",
				mode.level_label()
			),
			Status::LoadFailed(message) => write!(f, "Error loading data: {message}"),
		}
	}
}

/// Owns everything the viewer knows between interactions.
#[derive(Debug, Default)]
pub struct Session {
	data: Option<Dataset>,
	state: FilterState,
	zones: ZoneIndex,
	queue: VecDeque<Task>,
	loads: LoadTracker,
	/// Incoming index for the current records, keyed by `(mode, hide_lz)`.
	index: Option<((ViewMode, bool), IncomingIndex)>,
	has_graph: bool,
}

impl Session {
	/// An empty session with no data loaded.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current selector state.
	pub fn state(&self) -> &FilterState {
		&self.state
	}

	/// Zones of the current view level.
	pub fn zones(&self) -> &ZoneIndex {
		&self.zones
	}

	/// Last successfully loaded data.
	pub fn data(&self) -> Option<&Dataset> {
		self.data.as_ref()
	}

	/// Whether a graph is on screen.
	pub fn has_graph(&self) -> bool {
		self.has_graph
	}

	/// Queues a task; nothing happens until [`Session::run_pending`].
	pub fn dispatch(&mut self, task: impl Into<Task>) {
		self.queue.push_back(task.into());
	}

	/// Processes queued tasks in order and returns the last outcome.
	pub fn run_pending(&mut self) -> Option<Outcome> {
		let mut last = None;
		while let Some(task) = self.queue.pop_front() {
			if let Some(outcome) = self.run(task) {
				self.has_graph = outcome.has_graph();
				last = Some(outcome);
			}
		}
		last
	}

	fn run(&mut self, task: Task) -> Option<Outcome> {
		match task {
			Task::Filter(action) => {
				let (sync, refilter) = (action.requires_sync(), action.requires_refilter());
				self.state = std::mem::take(&mut self.state).apply(action);
				if sync {
					self.sync();
				}
				if !refilter && self.has_graph {
					return Some(Outcome::Relayout(self.state.layout));
				}
				self.render()
			}
			Task::ResetView => self.has_graph.then_some(Outcome::Relayout(self.state.layout)),
			Task::Render => self.render(),
		}
	}

	/// Starts a load; the returned ticket must be passed to [`Session::finish_load`].
	pub fn begin_load(&mut self, reload: bool) -> LoadTicket {
		self.loads.begin(reload)
	}

	/// Applies a load result. Returns `None` for stale tickets.
	pub fn finish_load(&mut self, ticket: LoadTicket, result: LoadResult<Datasets>) -> Option<Outcome> {
		if !self.loads.is_current(&ticket) {
			warn!("lineage-graph: discarding stale load result");
			return None;
		}

		let outcome = match result {
			Ok(raw) => {
				let dataset = Dataset::from_raw(&raw);
				info!(
					"lineage-graph: {} table relations, {} field relations after sanitizing",
					dataset.tables.records.len(),
					dataset.fields.records.len()
				);
				self.data = Some(dataset);
				self.index = None;
				self.state = self.state.reset();
				self.sync();
				Outcome::Loaded {
					reloaded: ticket.reload,
				}
			}
			Err(e) => {
				error!("lineage-graph: failed to load data: {}", e);
				Outcome::LoadFailed {
					message: e.to_string(),
					hint: LOAD_ERROR_HINT,
				}
			}
		};
		self.has_graph = false;
		Some(outcome)
	}

	fn base_records(&self) -> Vec<&RelationRecord> {
		let Some(data) = &self.data else {
			return Vec::new();
		};
		filter_records(
			&self.state,
			data.records(self.state.view_mode),
			None,
			FilterOptions { skip_zone: true },
		)
	}

	fn sync(&mut self) {
		self.zones = ZoneIndex::build(self.base_records());
		self.state = std::mem::take(&mut self.state).synced(&self.zones);
		debug!(
			"lineage-graph: synced filters to {} zones (zone {}, table {})",
			self.zones.ordered().len(),
			self.state.zone.value(),
			self.state.table.value()
		);
	}

	fn incoming_index(&mut self) -> Option<&IncomingIndex> {
		let data = self.data.as_ref()?;
		let key = (self.state.view_mode, self.state.hide_lz);
		if self.index.as_ref().is_none_or(|(k, _)| *k != key) {
			let index = IncomingIndex::build(data.records(key.0), key.1);
			self.index = Some((key, index));
		}
		self.index.as_ref().map(|(_, index)| index)
	}

	fn render(&mut self) -> Option<Outcome> {
		self.data.as_ref()?;
		if self.state.is_gated() {
			return Some(Outcome::Prompt);
		}

		let total = self.base_records().len();
		// Build the cached index first so the borrow below stays shared.
		self.incoming_index();
		let data = self.data.as_ref()?;
		let records = data.records(self.state.view_mode);
		let index = self.index.as_ref().map(|(_, index)| index);
		let subset = filter_records(&self.state, records, index, FilterOptions::default());
		if subset.is_empty() {
			return Some(Outcome::NoMatches { total });
		}

		let elements = build_elements(subset.iter().copied(), self.state.view_mode);
		debug!(
			"lineage-graph: {} tables, {} fields, {} edges",
			elements.tables.len(),
			elements.fields.len(),
			elements.edges.len()
		);
		Some(Outcome::Draw(Scene {
			elements,
			layout: self.state.layout,
			matched: subset.len(),
			total,
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::LoadError;
	use crate::lineage::{Choice, RawRecord};

	fn datasets() -> Datasets {
		Datasets {
			tables: vec![
				RawRecord::new("s_bani.a", "resultados.b", Some("*"), Some("*")),
				RawRecord::new("proceso.p", "resultados.c", Some("id"), Some("id")),
				RawRecord::new("lz.estatico.t", "proceso.p", Some("id"), Some("id")),
				RawRecord::new("s_bani.a", "s_bani.z", Some("id"), Some("id")),
			],
			fields: vec![RawRecord::new("s_bani.a", "resultados.b", Some("id"), Some("id"))],
		}
	}

	fn loaded() -> Session {
		let mut session = Session::new();
		let ticket = session.begin_load(false);
		session.finish_load(ticket, Ok(datasets()));
		session
	}

	#[test]
	fn load_resets_filters_and_prompts() {
		let mut session = Session::new();
		let ticket = session.begin_load(false);
		let outcome = session.finish_load(ticket, Ok(datasets()));
		assert_eq!(outcome, Some(Outcome::Loaded { reloaded: false }));
		assert_eq!(session.data().unwrap().tables.records.len(), 4);
		assert!(session.state().is_gated());
		assert!(!session.zones().is_empty());
	}

	#[test]
	fn stale_loads_are_ignored() {
		let mut session = Session::new();
		let first = session.begin_load(false);
		let second = session.begin_load(true);
		assert_eq!(session.finish_load(first, Ok(datasets())), None);
		assert!(session.data().is_none());
		assert_eq!(
			session.finish_load(second, Ok(datasets())),
			Some(Outcome::Loaded { reloaded: true })
		);
	}

	#[test]
	fn failed_reload_keeps_previous_data() {
		let mut session = loaded();
		session.dispatch(Action::SelectZone(Choice::from_value("resultados")));
		assert!(matches!(session.run_pending(), Some(Outcome::Draw(_))));

		let ticket = session.begin_load(true);
		let outcome = session.finish_load(
			ticket,
			Err(LoadError::Http {
				status: 404,
				url: "x.json".into(),
			}),
		);
		let Some(Outcome::LoadFailed { message, hint }) = outcome else {
			panic!("expected a load failure");
		};
		assert_eq!(message, "HTTP 404 while loading x.json");
		assert_eq!(hint, LOAD_ERROR_HINT);
		assert!(!session.has_graph());
		assert_eq!(session.data().unwrap().tables.records.len(), 4);
	}

	#[test]
	fn zone_selection_draws_and_counts() {
		let mut session = loaded();
		session.dispatch(Action::SelectZone(Choice::from_value("resultados")));
		session.dispatch(Action::SetShowAll(true));
		let Some(Outcome::Draw(scene)) = session.run_pending() else {
			panic!("expected a scene");
		};
		assert_eq!(scene.matched, 2);
		assert_eq!(scene.total, 4);
		assert_eq!(
			Outcome::Draw(scene).status().unwrap().to_string(),
			"Showing 2 relations (table level) filtered from 4."
		);
	}

	#[test]
	fn layout_change_only_relays_out() {
		let mut session = loaded();
		session.dispatch(Action::SetLayout(LayoutMode::FreeFlow));
		assert_eq!(session.run_pending(), Some(Outcome::Prompt));

		session.dispatch(Action::SelectZone(Choice::from_value("proceso")));
		assert!(matches!(session.run_pending(), Some(Outcome::Draw(_))));
		session.dispatch(Action::SetLayout(LayoutMode::Columns));
		assert_eq!(session.run_pending(), Some(Outcome::Relayout(LayoutMode::Columns)));
		session.dispatch(Task::ResetView);
		assert_eq!(session.run_pending(), Some(Outcome::Relayout(LayoutMode::Columns)));
	}

	#[test]
	fn reset_view_without_graph_does_nothing() {
		let mut session = loaded();
		session.dispatch(Task::ResetView);
		assert_eq!(session.run_pending(), None);
	}

	#[test]
	fn zone_without_start_tables_has_no_matches() {
		let mut session = loaded();
		session.dispatch(Action::SetHideLz(true));
		session.dispatch(Action::SelectZone(Choice::from_value("s_bani")));
		assert_eq!(session.run_pending(), Some(Outcome::NoMatches { total: 3 }));
		assert_eq!(
			Status::NoMatches { total: 3 }.to_string(),
			"No relations for the selected filters (3 records available in total)."
		);
	}

	#[test]
	fn tasks_run_in_dispatch_order() {
		let mut session = loaded();
		session.dispatch(Action::SelectZone(Choice::from_value("resultados")));
		session.dispatch(Action::SetViewMode(ViewMode::Fields));
		assert_eq!(session.run_pending(), Some(Outcome::Prompt));
		assert_eq!(session.state().view_mode, ViewMode::Fields);
		assert_eq!(session.state().zone, Choice::All);
	}

	#[test]
	fn reload_keeps_layout_choice() {
		let mut session = loaded();
		session.dispatch(Action::SetLayout(LayoutMode::FreeFlow));
		session.run_pending();
		let ticket = session.begin_load(true);
		session.finish_load(ticket, Ok(datasets()));
		assert_eq!(session.state().layout, LayoutMode::FreeFlow);
	}
}
