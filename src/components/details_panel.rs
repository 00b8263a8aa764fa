//! Side panel describing the current selection.

use leptos::prelude::*;

use crate::lineage::{Details, EMPTY_SELECTION_HINT};

/// Shows the rows of `details`, or a hint when nothing is selected.
#[component]
pub fn DetailsPanel(#[prop(into)] details: Signal<Option<Details>>) -> impl IntoView {
	let body = move || match details.get() {
		None => view! { <p class="hint">{EMPTY_SELECTION_HINT}</p> }.into_any(),
		Some(details) => {
			let class = match &details {
				Details::Error { .. } => "details error",
				_ => "details",
			};
			let rows = details
				.rows()
				.into_iter()
				.map(|(label, lines)| {
					let lines = lines
						.into_iter()
						.map(|line| view! { <div>{line}</div> })
						.collect_view();
					view! {
						<dt>{label}</dt>
						<dd>{lines}</dd>
					}
				})
				.collect_view();
			view! {
				<div class=class>
					<h2>{details.title()}</h2>
					<dl>{rows}</dl>
				</div>
			}
			.into_any()
		}
	};

	view! { <aside class="lineage-details">{body}</aside> }
}
