use log::{debug, error, info};

use super::binder;
use super::error::{ExportError, LoadError};
use super::export;
use super::interaction::{Interaction, NodeDetails, Release, Tooltip};
use super::layout::{Body, ForceSet, LayoutMode, Point, Simulation};
use super::loader::{RequestSequencer, Ticket};
use super::scale::{ColorMode, LegendEntry, NodePalette};
use super::scene::{Painter, SceneGraph};
use super::search::{self, SearchHit};
use super::types::{KnowledgeGraph, NetworkPayload, NodeId};
use super::viewport::{
	FOCUS_SCALE, FOCUS_TRANSITION_MS, Viewport, ZOOM_IN_FACTOR, ZOOM_OUT_FACTOR,
	ZOOM_TRANSITION_MS, ZoomTransform,
};
use crate::config::NetworkConfig;

const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Statistics as displayed. `None` fields have never been filled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatsView {
	pub node_count: Option<usize>,
	pub link_count: Option<usize>,
	/// Mean degree, one decimal.
	pub mean_degree: Option<String>,
	pub max_degree: Option<usize>,
	pub min_similarity: Option<f64>,
}

/// One knowledge network view: data, physics, scene and interaction state.
pub struct KnowledgeNetwork {
	config: NetworkConfig,
	graph: KnowledgeGraph,
	simulation: Box<dyn Simulation>,
	scene: SceneGraph,
	palette: NodePalette,
	interaction: Interaction,
	viewport: Viewport,
	sequencer: RequestSequencer,
	layout: LayoutMode,
	color: ColorMode,
	legend: Vec<LegendEntry>,
	stats: StatsView,
}

impl KnowledgeNetwork {
	pub fn new(config: NetworkConfig, simulation: Box<dyn Simulation>, width: f64) -> Self {
		let scene = SceneGraph {
			width,
			height: config.height,
			..Default::default()
		};
		Self {
			config,
			graph: KnowledgeGraph::default(),
			simulation,
			scene,
			palette: NodePalette::default(),
			interaction: Interaction::default(),
			viewport: Viewport::default(),
			sequencer: RequestSequencer::default(),
			layout: LayoutMode::default(),
			color: ColorMode::default(),
			legend: Vec::new(),
			stats: StatsView::default(),
		}
	}

	pub fn config(&self) -> &NetworkConfig {
		&self.config
	}

	pub fn graph(&self) -> &KnowledgeGraph {
		&self.graph
	}

	pub fn scene(&self) -> &SceneGraph {
		&self.scene
	}

	pub fn transform(&self) -> ZoomTransform {
		self.viewport.transform()
	}

	pub fn layout(&self) -> LayoutMode {
		self.layout
	}

	pub fn color_mode(&self) -> ColorMode {
		self.color
	}

	pub fn legend(&self) -> &[LegendEntry] {
		&self.legend
	}

	pub fn stats(&self) -> &StatsView {
		&self.stats
	}

	pub fn tooltip(&self) -> Option<&Tooltip> {
		self.interaction.tooltip()
	}

	pub fn selected_details(&self) -> Option<NodeDetails> {
		let id = self.interaction.selected()?;
		self.graph.node(id).map(Into::into)
	}

	pub fn is_simulating(&self) -> bool {
		self.simulation.is_running()
	}

	pub fn resize(&mut self, width: f64) {
		self.scene.width = width;
	}

	// Loading

	/// Registers a new load; only the newest ticket's result is applied.
	pub fn begin_load(&mut self) -> Ticket {
		self.sequencer.issue()
	}

	/// Replaces the graph with a fetched payload. Returns false, changing
	/// nothing, when a newer load has been issued since `ticket`.
	pub fn apply_load(&mut self, ticket: Ticket, payload: NetworkPayload) -> bool {
		if !self.sequencer.is_current(ticket) {
			debug!("discarding stale graph response");
			return false;
		}
		self.graph = KnowledgeGraph::from_payload(payload);
		info!(
			"loaded {} nodes, {} links",
			self.graph.nodes.len(),
			self.graph.links.len()
		);
		self.update_stats();
		self.interaction.reset();
		self.rebuild(vec![Body::unplaced(); self.graph.nodes.len()]);
		self.legend = self.palette.legend(&self.graph.nodes, self.color);
		true
	}

	/// Records a failed load. Returns whether the failure should be shown.
	pub fn fail_load(&mut self, ticket: Ticket, err: &LoadError) -> bool {
		if !self.sequencer.is_current(ticket) {
			debug!("discarding stale load failure: {err}");
			return false;
		}
		error!("failed to load network data: {err}");
		true
	}

	fn update_stats(&mut self) {
		self.stats.node_count = Some(self.graph.stats.node_count);
		self.stats.link_count = Some(self.graph.stats.link_count);
		self.stats.min_similarity = self.graph.stats.min_similarity;
		if let Some(mean) = self.graph.mean_degree() {
			self.stats.mean_degree = Some(format!("{mean:.1}"));
			self.stats.max_degree = Some(self.graph.max_degree());
		}
	}

	/// Reconfigures the simulation from `bodies` and rebinds the scene.
	fn rebuild(&mut self, bodies: Vec<Body>) {
		let forces = ForceSet::for_mode(self.layout, self.scene.width, self.scene.height);
		self.simulation.configure(bodies, &self.graph.links, forces);
		self.scene = binder::bind(
			&self.graph,
			self.simulation.bodies(),
			&mut self.palette,
			self.color,
			self.scene.width,
			self.scene.height,
		);
		self.interaction.restore(&mut self.scene, &self.graph);
	}

	// Layout and styling

	/// Switches layout, restarting the simulation from the current positions.
	pub fn set_layout(&mut self, mode: LayoutMode) {
		info!("layout mode: {mode}");
		self.layout = mode;
		let bodies = self
			.simulation
			.bodies()
			.iter()
			.map(|b| Body::at(b.x, b.y))
			.collect::<Vec<_>>();
		let bodies = if bodies.len() == self.graph.nodes.len() {
			bodies
		} else {
			vec![Body::unplaced(); self.graph.nodes.len()]
		};
		self.rebuild(bodies);
	}

	pub fn set_color_mode(&mut self, mode: ColorMode) {
		info!("color mode: {mode}");
		self.color = mode;
		binder::recolor(&mut self.scene, &self.graph, &mut self.palette, mode);
		self.legend = self.palette.legend(&self.graph.nodes, mode);
	}

	// Frame loop

	/// Advances the viewport transition and, while it runs, the simulation.
	pub fn tick(&mut self, now_ms: f64) {
		self.viewport.advance(now_ms);
		if self.simulation.is_running() {
			self.simulation.step();
			binder::sync_positions(&mut self.scene, self.simulation.bodies());
		}
	}

	pub fn paint<P: Painter>(&self, painter: &mut P) -> Result<(), P::Error> {
		painter.paint(&self.scene, &self.viewport.transform())
	}

	// Pointer

	fn node_at(&self, screen: Point) -> Option<usize> {
		let p = self.viewport.transform().invert(screen);
		self.scene.circle_at(p.x, p.y)
	}

	pub fn pointer_down(&mut self, screen: Point) {
		let transform = self.viewport.transform();
		match self.node_at(screen) {
			Some(index) => {
				self.interaction
					.begin_drag(&mut *self.simulation, index, screen, &transform)
			}
			None => self.interaction.begin_pan(screen, transform),
		}
	}

	/// `page` positions the tooltip.
	pub fn pointer_move(&mut self, screen: Point, page: Point) {
		let transform = self.viewport.transform();
		if self.interaction.is_dragging() || self.interaction.is_panning() {
			if let Some(panned) =
				self.interaction
					.pointer_move(&mut *self.simulation, screen, &transform)
			{
				self.viewport.set(panned);
			}
			return;
		}
		match self.node_at(screen) {
			Some(index) => self
				.interaction
				.hover(&self.graph.nodes[index], page.x, page.y),
			None => self.interaction.leave(),
		}
	}

	/// Ends a gesture. A press that did not travel selects the node under it.
	pub fn pointer_up(&mut self) -> Option<NodeDetails> {
		match self.interaction.release(&mut *self.simulation) {
			Release::Click(index) => {
				let id = self.graph.nodes.get(index)?.id;
				self.select(id)
			}
			Release::Dragged | Release::Panned | Release::Nothing => None,
		}
	}

	pub fn pointer_leave(&mut self) {
		self.interaction.release(&mut *self.simulation);
		self.interaction.leave();
	}

	pub fn wheel(&mut self, screen: Point, delta_y: f64) {
		let factor = if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		let zoomed = self.viewport.transform().scaled_by(factor, screen);
		self.viewport.set(zoomed);
	}

	// Zoom controls

	fn viewport_center(&self) -> Point {
		Point::new(self.scene.width / 2.0, self.scene.height / 2.0)
	}

	pub fn zoom_in(&mut self, now_ms: f64) {
		let target = self
			.viewport
			.transform()
			.scaled_by(ZOOM_IN_FACTOR, self.viewport_center());
		self.viewport.animate_to(target, now_ms, ZOOM_TRANSITION_MS);
	}

	pub fn zoom_out(&mut self, now_ms: f64) {
		let target = self
			.viewport
			.transform()
			.scaled_by(ZOOM_OUT_FACTOR, self.viewport_center());
		self.viewport.animate_to(target, now_ms, ZOOM_TRANSITION_MS);
	}

	pub fn reset_zoom(&mut self, now_ms: f64) {
		self.viewport
			.animate_to(ZoomTransform::IDENTITY, now_ms, ZOOM_TRANSITION_MS);
	}

	// Selection, highlight, search

	pub fn select(&mut self, id: NodeId) -> Option<NodeDetails> {
		self.interaction.select(&mut self.scene, &self.graph, id)
	}

	pub fn highlight_connections(&mut self, id: NodeId) -> bool {
		self.interaction
			.show_connections(&mut self.scene, &self.graph, id)
	}

	pub fn clear_highlight(&mut self) {
		self.interaction.clear_highlight(&mut self.scene, &self.graph);
	}

	/// Runs a search and highlights its hits; no hits clears the highlight.
	pub fn search(&mut self, query: &str) -> Vec<SearchHit> {
		let hits = search::search(&self.graph.nodes, query, self.config.search_limit);
		if hits.is_empty() {
			self.clear_highlight();
		} else {
			let ids = hits.iter().map(|h| h.id).collect();
			self.interaction.show_matches(&mut self.scene, ids);
		}
		hits
	}

	/// Animates the viewport onto `id`. No-op until the node has a position.
	pub fn center_on(&mut self, id: NodeId, now_ms: f64) -> bool {
		let Some(position) = self
			.graph
			.index_of(id)
			.and_then(|i| self.simulation.bodies().get(i))
			.and_then(Body::position)
		else {
			return false;
		};
		let target = ZoomTransform::centered_on(
			position,
			FOCUS_SCALE,
			self.scene.width,
			self.scene.height,
		);
		self.viewport
			.animate_to(target, now_ms, FOCUS_TRANSITION_MS);
		true
	}

	/// Selects a search hit and centers on it.
	pub fn choose_search_hit(&mut self, id: NodeId, now_ms: f64) -> Option<NodeDetails> {
		let details = self.select(id)?;
		self.center_on(id, now_ms);
		Some(details)
	}

	pub fn export(&self) -> Result<(), ExportError> {
		export::export_png(
			&self.scene,
			&self.viewport.transform(),
			&self.config.export_file_name,
		)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::interaction::{DIM_NODE_OPACITY, FOCUS_LINK_OPACITY};
	use crate::components::network::interaction::tests::RecordingSimulation;
	use crate::components::network::scene::{
		DEFAULT_OUTLINE, FOCUS_OUTLINE, NEIGHBOR_OUTLINE, SEARCH_OUTLINE,
	};
	use crate::components::network::types::tests::{edge, record};
	use crate::components::network::types::{NetworkPayload, Stats};
	use crate::components::network::viewport::{MAX_SCALE, MIN_SCALE};

	fn network() -> KnowledgeNetwork {
		KnowledgeNetwork::new(
			NetworkConfig::default(),
			Box::new(RecordingSimulation::default()),
			800.0,
		)
	}

	fn payload() -> NetworkPayload {
		NetworkPayload {
			nodes: vec![
				record(1, "A", "x"),
				record(2, "B", "x"),
				record(3, "Present perfect", "y"),
			],
			links: vec![edge(1, 2, 0.5)],
			stats: Stats {
				node_count: 3,
				link_count: 1,
				min_similarity: Some(0.8),
			},
		}
	}

	fn loaded() -> KnowledgeNetwork {
		let mut net = network();
		let ticket = net.begin_load();
		assert!(net.apply_load(ticket, payload()));
		net
	}

	#[test]
	fn load_builds_scene_stats_and_legend() {
		let net = loaded();
		assert_eq!(net.scene().circles.len(), 3);
		assert_eq!(net.scene().lines.len(), 1);
		assert_eq!(net.graph().nodes[0].degree, 1);
		let stats = net.stats();
		assert_eq!(stats.node_count, Some(3));
		assert_eq!(stats.link_count, Some(1));
		assert_eq!(stats.mean_degree.as_deref(), Some("0.7"));
		assert_eq!(stats.max_degree, Some(1));
		assert_eq!(net.legend().len(), 2);
		assert!(net.is_simulating());
	}

	#[test]
	fn stale_response_is_ignored() {
		let mut net = network();
		let slow = net.begin_load();
		let fast = net.begin_load();
		assert!(net.apply_load(fast, payload()));
		let mut older = payload();
		older.nodes.truncate(1);
		assert!(!net.apply_load(slow, older));
		assert_eq!(net.graph().nodes.len(), 3);
	}

	#[test]
	fn failed_load_keeps_previous_stats() {
		let mut net = loaded();
		let before = net.stats().clone();
		let ticket = net.begin_load();
		let err = LoadError::Status { status: 500 };
		assert!(net.fail_load(ticket, &err));
		assert_eq!(net.stats(), &before);
		assert_eq!(net.scene().circles.len(), 3);

		let stale = net.begin_load();
		net.begin_load();
		assert!(!net.fail_load(stale, &err));
	}

	#[test]
	fn empty_reload_keeps_degree_stats() {
		let mut net = loaded();
		let ticket = net.begin_load();
		net.apply_load(ticket, NetworkPayload::default());
		assert_eq!(net.stats().node_count, Some(0));
		assert_eq!(net.stats().max_degree, Some(1));
	}

	#[test]
	fn search_highlights_then_empty_query_clears() {
		let mut net = loaded();
		let hits = net.search("present");
		assert_eq!(hits.len(), 1);
		assert_eq!(net.scene().circles[2].outline, SEARCH_OUTLINE);
		assert_eq!(net.scene().circles[0].opacity, DIM_NODE_OPACITY);

		assert!(net.search("").is_empty());
		assert!(net.scene().circles.iter().all(|c| c.opacity == 1.0));
	}

	#[test]
	fn click_selects_node() {
		let mut net = loaded();
		// RecordingSimulation places node i at (10 * i, 0)
		let screen = net.transform().apply(Point::new(10.0, 0.0));
		net.pointer_down(screen);
		let details = net.pointer_up().unwrap();
		assert_eq!(details.id, NodeId(2));
		assert_eq!(net.scene().circles[1].outline, FOCUS_OUTLINE);
		assert_eq!(net.selected_details(), Some(details));
	}

	#[test]
	fn choosing_a_hit_selects_and_centers() {
		let mut net = loaded();
		let details = net.choose_search_hit(NodeId(3), 0.0).unwrap();
		assert_eq!(details.label, "Present perfect");
		net.tick(1_000.0);
		let t = net.transform();
		assert_eq!(t.k, FOCUS_SCALE);
		assert_eq!(t.apply(Point::new(20.0, 0.0)), Point::new(400.0, 300.0));
	}

	#[test]
	fn center_on_unknown_node_is_a_no_op() {
		let mut net = loaded();
		assert!(!net.center_on(NodeId(42), 0.0));
		net.tick(1_000.0);
		assert_eq!(net.transform(), ZoomTransform::IDENTITY);
	}

	#[test]
	fn zoom_controls_stay_in_extent() {
		let mut net = loaded();
		let mut now = 0.0;
		for _ in 0..15 {
			net.zoom_in(now);
			now += 300.0;
			net.tick(now);
			assert!(net.transform().k <= MAX_SCALE);
		}
		assert_eq!(net.transform().k, MAX_SCALE);
		for _ in 0..30 {
			net.zoom_out(now);
			now += 300.0;
			net.tick(now);
			assert!(net.transform().k >= MIN_SCALE);
		}
		assert_eq!(net.transform().k, MIN_SCALE);
		net.wheel(Point::new(10.0, 10.0), 1.0);
		assert_eq!(net.transform().k, MIN_SCALE);
		net.reset_zoom(now);
		net.tick(now + 300.0);
		assert_eq!(net.transform(), ZoomTransform::IDENTITY);
	}

	#[test]
	fn layout_and_color_switches_rebuild() {
		let mut net = loaded();
		net.select(NodeId(1));
		net.set_layout(LayoutMode::Circular);
		assert_eq!(net.layout(), LayoutMode::Circular);
		assert_eq!(net.scene().circles[0].outline, FOCUS_OUTLINE);
		assert_eq!(net.scene().circles[1].outline, DEFAULT_OUTLINE);

		net.set_color_mode(ColorMode::Cluster);
		assert!(matches!(net.legend(), [LegendEntry::Note(_)]));
	}

	#[test]
	fn layout_switch_keeps_active_highlight() {
		let mut net = loaded();
		net.search("present");
		net.set_layout(LayoutMode::Tree);
		assert_eq!(net.scene().circles[2].outline, SEARCH_OUTLINE);
		assert_eq!(net.scene().circles[0].opacity, DIM_NODE_OPACITY);

		assert!(net.highlight_connections(NodeId(1)));
		net.set_layout(LayoutMode::Force);
		assert_eq!(net.scene().circles[0].outline, FOCUS_OUTLINE);
		assert_eq!(net.scene().circles[1].outline, NEIGHBOR_OUTLINE);
		assert_eq!(net.scene().circles[2].opacity, DIM_NODE_OPACITY);
		assert_eq!(net.scene().lines[0].opacity, FOCUS_LINK_OPACITY);

		net.clear_highlight();
		net.set_layout(LayoutMode::Circular);
		assert!(net.scene().circles.iter().all(|c| c.opacity == 1.0));
		assert!(net.scene().lines.iter().all(|l| l.opacity == 1.0));
	}

	#[test]
	fn reload_drops_active_highlight() {
		let mut net = loaded();
		net.search("present");
		let ticket = net.begin_load();
		assert!(net.apply_load(ticket, payload()));
		assert!(net.scene().circles.iter().all(|c| c.opacity == 1.0));
		assert!(net.scene().circles.iter().all(|c| c.outline == DEFAULT_OUTLINE));
	}

	#[test]
	fn hover_sets_tooltip() {
		let mut net = loaded();
		let screen = net.transform().apply(Point::new(0.0, 0.0));
		net.pointer_move(screen, Point::new(50.0, 60.0));
		assert_eq!(net.tooltip().map(|t| t.label.as_str()), Some("A"));
		net.pointer_move(Point::new(500.0, 500.0), Point::new(0.0, 0.0));
		assert!(net.tooltip().is_none());
	}
}
