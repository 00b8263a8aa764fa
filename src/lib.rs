//! lineage-graph: Interactive data-lineage viewer for table and field relations.
//!
//! This crate provides a WASM application that loads two relation documents
//! (table level and field level), filters them by zone and start table, walks
//! the upstream closure of the selected tables and draws the result either in
//! three zone bands or as a force-directed free-flow layout.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, info};

pub mod components;
pub mod config;
pub mod error;
pub mod lineage;
pub mod loader;
pub mod session;

pub use components::{Controls, DetailsPanel, LineageCanvas};

use config::LineageConfig;
use lineage::{Details, FilterState, SelectorView, describe};
use session::{Outcome, Scene, Session, Status, Task};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("lineage-graph: logging initialized");
}

/// Main application component.
/// Loads both relation documents on startup and wires the controls, the
/// canvas and the details panel to one [`Session`].
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = LineageConfig::from_document();
	let session = StoredValue::new(Session::new());

	let status = RwSignal::new(Status::Loading.to_string());
	let scene = RwSignal::new(None::<Scene>);
	let view_resets = RwSignal::new(0_u64);
	let filter = RwSignal::new(FilterState::default());
	let selectors = RwSignal::new(session.with_value(|s| SelectorView::build(s.state(), s.zones())));
	let details = RwSignal::new(None::<Details>);
	let layout = Signal::derive(move || filter.with(|s| s.layout));

	// Mirrors the session into the signals after every task.
	let apply = move |outcome: Option<Outcome>| {
		session.with_value(|s| {
			filter.set(s.state().clone());
			selectors.set(SelectorView::build(s.state(), s.zones()));
		});
		let Some(outcome) = outcome else {
			return;
		};
		if let Some(next) = outcome.status() {
			status.set(next.to_string());
		}
		match outcome {
			Outcome::Draw(next) => {
				details.set(None);
				scene.set(Some(next));
			}
			Outcome::Relayout(_) => view_resets.update(|n| *n += 1),
			Outcome::LoadFailed { message, .. } => {
				scene.set(None);
				details.set(Some(Details::load_error(message)));
			}
			Outcome::Prompt | Outcome::NoMatches { .. } | Outcome::Loaded { .. } => {
				scene.set(None);
				details.set(None);
			}
		}
	};

	let on_task = Callback::new(move |task: Task| {
		let outcome = session
			.try_update_value(|s| {
				s.dispatch(task);
				s.run_pending()
			})
			.flatten();
		apply(outcome);
	});

	let sources = config.data.clone();
	let load = move |reload: bool| {
		let Some(ticket) = session.try_update_value(|s| s.begin_load(reload)) else {
			return;
		};
		status.set(Status::Loading.to_string());
		let sources = sources.clone();
		spawn_local(async move {
			let result = loader::fetch_datasets(&sources).await;
			let outcome = session
				.try_update_value(|s| s.finish_load(ticket, result))
				.flatten();
			apply(outcome);
		});
	};
	load(false);
	let on_reload = Callback::new(move |_: ()| load(true));

	let on_select = Callback::new(move |id: Option<String>| {
		let next = id.and_then(|id| {
			scene.with_untracked(|s| s.as_ref().and_then(|s| describe(&s.elements, &id)))
		});
		details.set(next);
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Data Lineage" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="lineage-app">
			<header class="lineage-header">
				<h1>"Data Lineage"</h1>
				<Controls state=filter selectors=selectors on_task=on_task on_reload=on_reload />
				<p class="status">{move || status.get()}</p>
			</header>
			<main class="lineage-main">
				<div class="lineage-stage">
					<LineageCanvas
						scene=scene
						layout=layout
						view_resets=view_resets
						metrics=config.layout.clone()
						force=config.force.clone()
						on_select=on_select
					/>
				</div>
				<DetailsPanel details=details />
			</main>
		</div>
	}
}
