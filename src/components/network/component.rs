use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::interaction::{NodeDetails, Tooltip};
use super::layout::{LayoutMode, Point};
use super::loader::{HttpGraphSource, LoadingGuard, NetworkQuery};
use super::panels::{DetailsPanel, LegendPanel, NodeTooltip, SearchResults, StatsPanel};
use super::render::CanvasPainter;
use super::scale::{ColorMode, LegendEntry};
use super::search::SearchHit;
use super::simulation::ForceSimulation;
use super::state::{KnowledgeNetwork, StatsView};
use super::types::NodeId;
use crate::config::NetworkConfig;

type Network = StoredValue<KnowledgeNetwork, LocalStorage>;

fn layout_label(mode: LayoutMode) -> &'static str {
	match mode {
		LayoutMode::Force => "Force-directed",
		LayoutMode::Circular => "Circular",
		LayoutMode::Tree => "Hierarchical",
	}
}

fn color_label(mode: ColorMode) -> &'static str {
	match mode {
		ColorMode::Category => "By category",
		ColorMode::Degree => "By connections",
		ColorMode::Cluster => "By cluster",
		ColorMode::Uniform => "Uniform",
	}
}

/// Reactive mirrors of the network state shown outside the canvas.
#[derive(Clone, Copy)]
struct Panels {
	stats: RwSignal<StatsView>,
	legend: RwSignal<Vec<LegendEntry>>,
	details: RwSignal<Option<NodeDetails>>,
	tooltip: RwSignal<Option<Tooltip>>,
}

impl Panels {
	fn new() -> Self {
		Self {
			stats: RwSignal::new(StatsView::default()),
			legend: RwSignal::new(Vec::new()),
			details: RwSignal::new(None),
			tooltip: RwSignal::new(None),
		}
	}

	fn refresh(self, network: Network) {
		let Some((stats, legend, details, tooltip)) = network.try_with_value(|n| {
			(
				n.stats().clone(),
				n.legend().to_vec(),
				n.selected_details(),
				n.tooltip().cloned(),
			)
		}) else {
			return;
		};
		set_if_changed(self.stats, stats);
		set_if_changed(self.legend, legend);
		set_if_changed(self.details, details);
		set_if_changed(self.tooltip, tooltip);
	}
}

fn set_if_changed<T: PartialEq + Send + Sync + 'static>(signal: RwSignal<T>, value: T) {
	if signal.with_untracked(|current| *current != value) {
		signal.set(value);
	}
}

enum LoadOutcome {
	Shown,
	Failed(String),
	Stale,
}

/// Interactive knowledge-point network: controls, canvas and side panels.
#[component]
pub fn KnowledgeNetworkView(#[prop(optional)] config: NetworkConfig) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let network: Network = StoredValue::new_local(KnowledgeNetwork::new(
		config.clone(),
		Box::new(ForceSimulation::default()),
		800.0,
	));
	let source = StoredValue::new(HttpGraphSource::new(&config));
	let height = config.height;

	let limit = RwSignal::new(config.default_limit);
	let threshold = RwSignal::new(config.default_min_similarity);
	let layout = RwSignal::new(LayoutMode::default());
	let color = RwSignal::new(ColorMode::default());
	let query = RwSignal::new(String::new());
	let hits = RwSignal::new(Vec::<SearchHit>::new());
	let in_flight = RwSignal::new(0usize);
	let load_error = RwSignal::new(None::<String>);
	let panels = Panels::new();

	let load = move || {
		let request = NetworkQuery {
			limit: limit.get_untracked(),
			min_similarity: threshold.get_untracked(),
		};
		let Some(ticket) = network.try_update_value(|n| n.begin_load()) else {
			return;
		};
		let guard = LoadingGuard::new(in_flight);
		let source = source.get_value();
		spawn_local(async move {
			let _guard = guard;
			let result = source.fetch(request).await;
			let outcome = network.try_update_value(|n| match result {
				Ok(payload) => {
					if n.apply_load(ticket, payload) {
						LoadOutcome::Shown
					} else {
						LoadOutcome::Stale
					}
				}
				Err(err) => {
					if n.fail_load(ticket, &err) {
						LoadOutcome::Failed(err.to_string())
					} else {
						LoadOutcome::Stale
					}
				}
			});
			match outcome {
				Some(LoadOutcome::Shown) => {
					load_error.set(None);
					query.set(String::new());
					hits.set(Vec::new());
					panels.refresh(network);
				}
				Some(LoadOutcome::Failed(message)) => load_error.set(Some(message)),
				Some(LoadOutcome::Stale) | None => {}
			}
		});
	};

	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (animate_init, resize_cb_init) = (animate.clone(), resize_cb.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, network view stays blank");
			return;
		};
		let container_width = |canvas: &HtmlCanvasElement| {
			canvas
				.parent_element()
				.map(|p| p.client_width() as f64)
				.filter(|w| *w > 0.0)
				.unwrap_or(800.0)
		};

		let w = container_width(&canvas);
		canvas.set_width(w as u32);
		canvas.set_height(height as u32);
		network.update_value(|n| n.resize(w));

		let ctx: CanvasRenderingContext2d = match canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into().ok())
		{
			Some(ctx) => ctx,
			None => {
				error!("canvas has no 2d context");
				return;
			}
		};

		let canvas_resize = canvas.clone();
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let nw = container_width(&canvas_resize);
			canvas_resize.set_width(nw as u32);
			network.update_value(|n| n.resize(nw));
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let animate_inner = animate_init.clone();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let painted = network.try_update_value(|n| {
				n.tick(js_sys::Date::now());
				n.paint(&mut CanvasPainter::new(&ctx))
			});
			match painted {
				// Component disposed; stop scheduling frames.
				None => return,
				Some(Err(err)) => warn!("paint failed: {err:?}"),
				Some(Ok(())) => {}
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.map(|w: Window| w.request_animation_frame(cb.as_ref().unchecked_ref()));
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}

		load();
	});

	let local_point = move |ev: &MouseEvent| -> Option<Point> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some(Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let on_mousedown = move |ev: MouseEvent| {
		if let Some(p) = local_point(&ev) {
			network.update_value(|n| n.pointer_down(p));
		}
	};

	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_point(&ev) else {
			return;
		};
		let page = Point::new(ev.page_x() as f64, ev.page_y() as f64);
		network.update_value(|n| n.pointer_move(p, page));
		panels.refresh(network);
	};

	let on_mouseup = move |_: MouseEvent| {
		network.update_value(|n| {
			n.pointer_up();
		});
		panels.refresh(network);
	};

	let on_mouseleave = move |_: MouseEvent| {
		network.update_value(|n| n.pointer_leave());
		panels.refresh(network);
	};

	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(p) = local_point(&*ev) {
			network.update_value(|n| n.wheel(p, ev.delta_y()));
		}
	};

	let on_layout = move |ev: web_sys::Event| match event_target_value(&ev).parse::<LayoutMode>() {
		Ok(mode) => {
			layout.set(mode);
			network.update_value(|n| n.set_layout(mode));
			panels.refresh(network);
		}
		Err(err) => warn!("{err}"),
	};

	let on_color = move |ev: web_sys::Event| {
		let mode = ColorMode::from_name(&event_target_value(&ev));
		color.set(mode);
		network.update_value(|n| n.set_color_mode(mode));
		panels.refresh(network);
	};

	let on_search = move |ev: web_sys::Event| {
		let text = event_target_value(&ev);
		let found = network.try_update_value(|n| n.search(&text)).unwrap_or_default();
		panels.refresh(network);
		hits.set(found);
		query.set(text);
	};

	let choose_hit = Callback::new(move |id: NodeId| {
		network.update_value(|n| {
			n.choose_search_hit(id, js_sys::Date::now());
		});
		panels.refresh(network);
	});

	let highlight = Callback::new(move |id: NodeId| {
		network.update_value(|n| {
			n.highlight_connections(id);
		});
	});

	let center = Callback::new(move |id: NodeId| {
		network.update_value(|n| {
			n.center_on(id, js_sys::Date::now());
		});
	});

	let export = move |_: MouseEvent| {
		network.with_value(|n| {
			if let Err(err) = n.export() {
				warn!("export failed: {err}");
			}
		});
	};

	let loading = move || in_flight.get() > 0;

	view! {
		<div class="knowledge-network">
			<div class="network-controls">
				<label>
					"Nodes "
					<input
						type="number"
						min="10"
						max="500"
						prop:value=move || limit.get().to_string()
						on:change=move |ev| match event_target_value(&ev).parse() {
							Ok(v) => limit.set(v),
							Err(err) => warn!("ignoring node limit: {err}"),
						}
					/>
				</label>
				<label>
					"Min similarity "
					<input
						type="range"
						min="0"
						max="1"
						step="0.05"
						prop:value=move || threshold.get().to_string()
						on:input=move |ev| match event_target_value(&ev).parse() {
							Ok(v) => threshold.set(v),
							Err(err) => warn!("ignoring similarity threshold: {err}"),
						}
					/>
					<span class="threshold-value">{move || format!("{:.2}", threshold.get())}</span>
				</label>
				<button on:click=move |_| load()>"Update"</button>
				<select on:change=on_layout prop:value=move || layout.get().as_str()>
					{LayoutMode::ALL
						.into_iter()
						.map(|m| view! { <option value=m.as_str()>{layout_label(m)}</option> })
						.collect_view()}
				</select>
				<select on:change=on_color prop:value=move || color.get().as_str()>
					{ColorMode::SELECTABLE
						.into_iter()
						.map(|m| view! { <option value=m.as_str()>{color_label(m)}</option> })
						.collect_view()}
				</select>
				<button title="Zoom in" on:click=move |_| network.update_value(|n| n.zoom_in(js_sys::Date::now()))>
					"+"
				</button>
				<button title="Zoom out" on:click=move |_| network.update_value(|n| n.zoom_out(js_sys::Date::now()))>
					"-"
				</button>
				<button title="Reset zoom" on:click=move |_| network.update_value(|n| n.reset_zoom(js_sys::Date::now()))>
					"Reset"
				</button>
				<button on:click=export>"Export PNG"</button>
			</div>

			<div class="network-search">
				<input type="search" placeholder="Search knowledge points" prop:value=move || query.get() on:input=on_search />
				<SearchResults query=query hits=hits on_choose=choose_hit />
			</div>

			<div class="network-body">
				<div class="network-graph" style:opacity=move || if loading() { "0.5" } else { "1" }>
					{move || {
						load_error
							.get()
							.map(|message| {
								view! {
									<div class="alert alert-danger">
										{format!("Failed to load network data: {message}")}
									</div>
								}
							})
					}}
					<canvas
						node_ref=canvas_ref
						class="network-canvas"
						on:mousedown=on_mousedown
						on:mousemove=on_mousemove
						on:mouseup=on_mouseup
						on:mouseleave=on_mouseleave
						on:wheel=on_wheel
						style:cursor="grab"
						style:display=move || if load_error.with(Option::is_some) { "none" } else { "block" }
					/>
				</div>
				<div class="loading-spinner" style:display=move || if loading() { "block" } else { "none" }>
					"Loading…"
				</div>
				<aside class="network-sidebar">
					<DetailsPanel details=panels.details on_highlight=highlight on_center=center />
					<LegendPanel legend=panels.legend />
					<StatsPanel stats=panels.stats />
				</aside>
			</div>
			<NodeTooltip tooltip=panels.tooltip />
		</div>
	}
}
