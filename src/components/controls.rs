//! Toolbar with the filter selectors and view actions.

use leptos::prelude::*;

use crate::lineage::{Action, Choice, FilterState, LayoutMode, SelectorView, ViewMode};
use crate::session::Task;

fn options(items: Vec<(String, String)>, current: String) -> impl IntoView {
	items
		.into_iter()
		.map(|(value, label)| {
			let selected = value == current;
			view! { <option value=value selected=selected>{label}</option> }
		})
		.collect_view()
}

/// Selectors for level, zone, start table and layout, the two filter
/// checkboxes, and the reset and reload buttons.
///
/// Every change is reported as a [`Task`]; the reload button calls
/// `on_reload` instead because loading is asynchronous.
#[component]
pub fn Controls(
	#[prop(into)] state: Signal<FilterState>,
	#[prop(into)] selectors: Signal<SelectorView>,
	#[prop(into)] on_task: Callback<Task>,
	#[prop(into)] on_reload: Callback<()>,
) -> impl IntoView {
	let send = move |action: Action| on_task.run(action.into());

	let view_modes = move || {
		let current = state.with(|s| s.view_mode);
		[ViewMode::Tables, ViewMode::Fields]
			.into_iter()
			.map(|mode| {
				let label = match mode {
					ViewMode::Tables => "Tables",
					ViewMode::Fields => "Fields",
				};
				view! {
					<option value=mode.as_str() selected={mode == current}>{label}</option>
				}
			})
			.collect_view()
	};

	let layouts = move || {
		let current = state.with(|s| s.layout);
		[LayoutMode::Columns, LayoutMode::FreeFlow]
			.into_iter()
			.map(|mode| {
				view! {
					<option value=mode.as_str() selected={mode == current}>{mode.label()}</option>
				}
			})
			.collect_view()
	};

	view! {
		<div class="lineage-controls">
			<label>
				"Level "
				<select on:change=move |ev| send(Action::SetViewMode(ViewMode::from_value(&event_target_value(&ev))))>
					{view_modes}
				</select>
			</label>
			<label>
				"Zone "
				<select on:change=move |ev| send(Action::SelectZone(Choice::from_value(&event_target_value(&ev))))>
					{move || options(
						selectors.with(|s| s.zones.clone()),
						state.with(|s| s.zone.value().to_string()),
					)}
				</select>
			</label>
			<label>
				"Start table "
				<select
					prop:disabled=move || selectors.with(|s| !s.tables_enabled)
					on:change=move |ev| send(Action::SelectTable(Choice::from_value(&event_target_value(&ev))))
				>
					{move || options(
						selectors.with(|s| s.tables.clone()),
						state.with(|s| s.table.value().to_string()),
					)}
				</select>
			</label>
			<label>
				<input
					type="checkbox"
					prop:checked=move || state.with(|s| s.show_all)
					prop:disabled=move || selectors.with(|s| !s.show_all_enabled)
					on:change=move |ev| send(Action::SetShowAll(event_target_checked(&ev)))
				/>
				" Show whole zone"
			</label>
			<label>
				<input
					type="checkbox"
					prop:checked=move || state.with(|s| s.hide_lz)
					on:change=move |ev| send(Action::SetHideLz(event_target_checked(&ev)))
				/>
				" Hide landing zones"
			</label>
			<label>
				"Layout "
				<select on:change=move |ev| send(Action::SetLayout(LayoutMode::from_value(&event_target_value(&ev))))>
					{layouts}
				</select>
			</label>
			<button on:click=move |_| on_task.run(Task::ResetView)>"Reset view"</button>
			<button on:click=move |_| on_reload.run(())>"Reload data"</button>
		</div>
	}
}
