//! Side panels around the graph canvas. They only render what they are given
//! and report clicks through callbacks.

use leptos::prelude::*;

use super::interaction::{NodeDetails, Tooltip};
use super::scale::LegendEntry;
use super::search::SearchHit;
use super::state::StatsView;
use super::types::NodeId;

fn or_dash<T: ToString>(value: Option<T>) -> String {
	value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

#[component]
pub fn StatsPanel(stats: RwSignal<StatsView>) -> impl IntoView {
	view! {
		<div class="network-stats">
			<div>"Nodes: " <span class="stat-value">{move || or_dash(stats.get().node_count)}</span></div>
			<div>"Links: " <span class="stat-value">{move || or_dash(stats.get().link_count)}</span></div>
			<div>"Mean degree: " <span class="stat-value">{move || or_dash(stats.get().mean_degree)}</span></div>
			<div>"Max degree: " <span class="stat-value">{move || or_dash(stats.get().max_degree)}</span></div>
			{move || {
				stats
					.get()
					.min_similarity
					.map(|s| view! { <div>"Min similarity: " <span class="stat-value">{format!("{s:.2}")}</span></div> })
			}}
		</div>
	}
}

#[component]
pub fn LegendPanel(legend: RwSignal<Vec<LegendEntry>>) -> impl IntoView {
	view! {
		<div class="network-legend">
			{move || {
				legend
					.get()
					.into_iter()
					.map(|entry| match entry {
						LegendEntry::Swatch { color, label } => {
							view! {
								<div class="legend-item">
									<div class="legend-color" style=format!("background-color: {color}")></div>
									<span>{label}</span>
								</div>
							}
								.into_any()
						}
						LegendEntry::Gradient { from, to, label } => {
							view! {
								<div class="legend-item">
									<div
										class="legend-color"
										style=format!("background: linear-gradient(to right, {from}, {to})")
									></div>
									<span>{label}</span>
								</div>
							}
								.into_any()
						}
						LegendEntry::Note(text) => {
							view! {
								<div class="legend-item">
									<span>{text}</span>
								</div>
							}
								.into_any()
						}
					})
					.collect_view()
			}}
		</div>
	}
}

/// Floating description of the hovered node, positioned in page coordinates.
#[component]
pub fn NodeTooltip(tooltip: RwSignal<Option<Tooltip>>) -> impl IntoView {
	view! {
		<div
			class="network-tooltip"
			style:position="absolute"
			style:pointer-events="none"
			style:display=move || if tooltip.with(Option::is_some) { "block" } else { "none" }
			style:left=move || tooltip.with(|t| t.as_ref().map(|t| format!("{}px", t.left)).unwrap_or_default())
			style:top=move || tooltip.with(|t| t.as_ref().map(|t| format!("{}px", t.top)).unwrap_or_default())
		>
			{move || {
				tooltip
					.get()
					.map(|t| {
						view! {
							<strong>{t.label}</strong>
							<br />
							{format!("Category: {}", t.group)}
							<br />
							{format!("Connections: {}", t.degree)}
							<br />
							{format!("Summary: {}", t.summary)}
						}
					})
			}}
		</div>
	}
}

#[component]
pub fn DetailsPanel(
	details: RwSignal<Option<NodeDetails>>,
	#[prop(into)] on_highlight: Callback<NodeId>,
	#[prop(into)] on_center: Callback<NodeId>,
) -> impl IntoView {
	view! {
		<div
			class="node-details"
			style:display=move || if details.with(Option::is_some) { "block" } else { "none" }
		>
			{move || {
				details
					.get()
					.map(|d| {
						let id = d.id;
						view! {
							<div class="mb-3">
								<strong>"ID: "</strong>
								{id.to_string()}
								<br />
								<strong>"Title: "</strong>
								{d.label}
							</div>
							<div class="mb-3">
								<strong>"Category: "</strong>
								<span class="badge">{d.group}</span>
								{d.subcategory.map(|s| view! { " " <span class="badge badge-secondary">{s}</span> })}
							</div>
							<div class="mb-3">
								<strong>"Connections: "</strong>
								{d.degree}
							</div>
							<div class="mb-3">
								<strong>"Summary:"</strong>
								<br />
								<small class="text-muted">{d.summary}</small>
							</div>
							<div class="node-actions">
								<button on:click=move |_| on_highlight.run(id)>"Show connections"</button>
								<button on:click=move |_| on_center.run(id)>"Center on node"</button>
							</div>
						}
					})
			}}
		</div>
	}
}

/// Result list under the search box. A blank query shows nothing.
#[component]
pub fn SearchResults(
	query: RwSignal<String>,
	hits: RwSignal<Vec<SearchHit>>,
	#[prop(into)] on_choose: Callback<NodeId>,
) -> impl IntoView {
	view! {
		<div class="search-results">
			{move || {
				if query.with(|q| q.trim().is_empty()) {
					return ().into_any();
				}
				let hits = hits.get();
				if hits.is_empty() {
					return view! { <div class="text-muted">"No matching nodes"</div> }.into_any();
				}
				view! {
					<div class="list-group">
						{hits
							.into_iter()
							.map(|hit| {
								let id = hit.id;
								view! {
									<button class="list-group-item" on:click=move |_| on_choose.run(id)>
										<div class="fw-bold">{hit.label}</div>
										<small class="text-muted">{hit.summary}</small>
									</button>
								}
							})
							.collect_view()}
					</div>
				}
					.into_any()
			}}
		</div>
	}
}
