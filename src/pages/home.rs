use leptos::prelude::*;

use crate::components::network::KnowledgeNetworkView;

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="network-page">
				<header class="page-header">
					<h1>"Knowledge Network"</h1>
					<p class="subtitle">
						"Knowledge points linked by semantic similarity. Drag nodes to reposition, scroll to zoom, drag the background to pan."
					</p>
				</header>
				<KnowledgeNetworkView />
			</div>
		</ErrorBoundary>
	}
}
