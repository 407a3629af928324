//! Selection, highlighting, tooltips and pointer gestures.
//!
//! Everything here only touches presentation: scene attributes, the viewport
//! and node pins. The graph itself is never modified.

use super::binder::link_stroke_width;
use super::layout::{Point, Simulation};
use super::scene::{
	DEFAULT_OUTLINE, FOCUS_OUTLINE, LINK_COLOR, LINK_HIGHLIGHT_COLOR, NEIGHBOR_OUTLINE,
	SEARCH_OUTLINE, SceneGraph,
};
use super::types::{KnowledgeGraph, KnowledgeNode, NodeId};
use super::viewport::ZoomTransform;

pub const DIM_NODE_OPACITY: f64 = 0.3;
pub const DIM_LINK_OPACITY: f64 = 0.1;
pub const FOCUS_LINK_OPACITY: f64 = 0.8;
pub const FOCUS_LINK_WIDTH: f64 = 3.0;
/// Temperature held while a node is dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Pointer travel (screen px) below which a press counts as a click.
pub const CLICK_SLOP: f64 = 3.0;
/// Tooltip offset from the pointer.
const TOOLTIP_OFFSET: (f64, f64) = (10.0, -10.0);

/// Floating description of the hovered node.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub label: String,
	pub group: String,
	pub degree: usize,
	pub summary: String,
	/// Page coordinates of the tooltip's corner.
	pub left: f64,
	pub top: f64,
}

/// Contents of the details panel for the selected node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDetails {
	pub id: NodeId,
	pub label: String,
	pub group: String,
	pub subcategory: Option<String>,
	pub degree: usize,
	pub summary: String,
}

impl From<&KnowledgeNode> for NodeDetails {
	fn from(node: &KnowledgeNode) -> Self {
		Self {
			id: node.id,
			label: node.label.clone(),
			group: node.group.clone(),
			subcategory: node.subcategory.clone(),
			degree: node.degree,
			summary: node.title.clone(),
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragGesture {
	index: usize,
	press: Point,
	/// Node position minus pointer position, in graph coordinates.
	grab_offset: Point,
	moved: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PanGesture {
	press: Point,
	origin: ZoomTransform,
}

/// What a finished press turned out to be.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Release {
	Click(usize),
	Dragged,
	Panned,
	Nothing,
}

/// Display filter laid over the bound scene.
#[derive(Clone, Debug, PartialEq)]
enum Highlight {
	Connections(NodeId),
	Matches(Vec<NodeId>),
}

/// Pointer and selection state of one component instance.
#[derive(Clone, Debug, Default)]
pub struct Interaction {
	selected: Option<NodeId>,
	highlight: Option<Highlight>,
	tooltip: Option<Tooltip>,
	drag: Option<DragGesture>,
	pan: Option<PanGesture>,
}

impl Interaction {
	pub fn selected(&self) -> Option<NodeId> {
		self.selected
	}

	pub fn tooltip(&self) -> Option<&Tooltip> {
		self.tooltip.as_ref()
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_some()
	}

	pub fn is_panning(&self) -> bool {
		self.pan.is_some()
	}

	/// Drops all per-graph state; called when the graph is replaced.
	pub fn reset(&mut self) {
		*self = Self::default();
	}

	pub fn hover(&mut self, node: &KnowledgeNode, page_x: f64, page_y: f64) {
		self.tooltip = Some(Tooltip {
			label: node.label.clone(),
			group: node.group.clone(),
			degree: node.degree,
			summary: node.title.clone(),
			left: page_x + TOOLTIP_OFFSET.0,
			top: page_y + TOOLTIP_OFFSET.1,
		});
	}

	pub fn leave(&mut self) {
		self.tooltip = None;
	}

	/// Marks `id` as selected and outlines it. Returns `None` for unknown ids.
	pub fn select(
		&mut self,
		scene: &mut SceneGraph,
		graph: &KnowledgeGraph,
		id: NodeId,
	) -> Option<NodeDetails> {
		let node = graph.node(id)?;
		for circle in &mut scene.circles {
			circle.outline = if circle.id == id {
				FOCUS_OUTLINE
			} else {
				DEFAULT_OUTLINE
			};
		}
		self.selected = Some(id);
		Some(node.into())
	}

	/// Highlights `id` and its neighbours and remembers it as the active
	/// filter. Returns false for unknown ids.
	pub fn show_connections(
		&mut self,
		scene: &mut SceneGraph,
		graph: &KnowledgeGraph,
		id: NodeId,
	) -> bool {
		let shown = highlight_connections(scene, graph, id);
		if shown {
			self.highlight = Some(Highlight::Connections(id));
		}
		shown
	}

	pub fn show_matches(&mut self, scene: &mut SceneGraph, matches: Vec<NodeId>) {
		highlight_matches(scene, &matches);
		self.highlight = Some(Highlight::Matches(matches));
	}

	pub fn clear_highlight(&mut self, scene: &mut SceneGraph, graph: &KnowledgeGraph) {
		clear_highlight(scene, graph);
		self.highlight = None;
	}

	/// Re-applies the selection and the active highlight to a freshly bound
	/// scene.
	pub fn restore(&mut self, scene: &mut SceneGraph, graph: &KnowledgeGraph) {
		if let Some(id) = self.selected {
			self.select(scene, graph, id);
		}
		match &self.highlight {
			Some(Highlight::Connections(id)) => {
				highlight_connections(scene, graph, *id);
			}
			Some(Highlight::Matches(matches)) => highlight_matches(scene, matches),
			None => {}
		}
	}

	/// Starts dragging the node at `index`, pinning it and reheating the
	/// simulation unless another drag is already holding it warm.
	pub fn begin_drag(
		&mut self,
		sim: &mut dyn Simulation,
		index: usize,
		press: Point,
		transform: &ZoomTransform,
	) {
		let Some(body) = sim.bodies().get(index).copied() else {
			return;
		};
		if self.drag.is_none() {
			sim.set_alpha_target(DRAG_ALPHA_TARGET);
			sim.restart();
		}
		let pointer = transform.invert(press);
		self.drag = Some(DragGesture {
			index,
			press,
			grab_offset: Point::new(body.x - pointer.x, body.y - pointer.y),
			moved: false,
		});
		sim.pin(index, body.x, body.y);
	}

	pub fn begin_pan(&mut self, press: Point, transform: ZoomTransform) {
		self.pan = Some(PanGesture {
			press,
			origin: transform,
		});
	}

	/// Follows the pointer. Returns the new transform while panning.
	pub fn pointer_move(
		&mut self,
		sim: &mut dyn Simulation,
		pointer: Point,
		transform: &ZoomTransform,
	) -> Option<ZoomTransform> {
		if let Some(drag) = &mut self.drag {
			let (dx, dy) = (pointer.x - drag.press.x, pointer.y - drag.press.y);
			if !drag.moved && dx.hypot(dy) < CLICK_SLOP {
				return None;
			}
			drag.moved = true;
			let at = transform.invert(pointer);
			sim.pin(drag.index, at.x + drag.grab_offset.x, at.y + drag.grab_offset.y);
			return None;
		}
		let pan = self.pan?;
		Some(ZoomTransform::new(
			pan.origin.x + (pointer.x - pan.press.x),
			pan.origin.y + (pointer.y - pan.press.y),
			pan.origin.k,
		))
	}

	/// Ends the current gesture: unpins a dragged node and lets the
	/// simulation cool back down.
	pub fn release(&mut self, sim: &mut dyn Simulation) -> Release {
		if let Some(drag) = self.drag.take() {
			sim.set_alpha_target(0.0);
			sim.unpin(drag.index);
			return if drag.moved {
				Release::Dragged
			} else {
				Release::Click(drag.index)
			};
		}
		match self.pan.take() {
			Some(_) => Release::Panned,
			None => Release::Nothing,
		}
	}
}

/// Dims everything except `id`, its neighbours and the links touching it.
/// Returns false for unknown ids.
pub fn highlight_connections(scene: &mut SceneGraph, graph: &KnowledgeGraph, id: NodeId) -> bool {
	if graph.node(id).is_none() {
		return false;
	}
	for circle in &mut scene.circles {
		circle.opacity = DIM_NODE_OPACITY;
	}
	for line in &mut scene.lines {
		line.opacity = DIM_LINK_OPACITY;
	}

	let neighbours: Vec<NodeId> = graph
		.links
		.iter()
		.filter_map(|link| {
			if link.source == id {
				Some(link.target)
			} else if link.target == id {
				Some(link.source)
			} else {
				None
			}
		})
		.collect();

	for circle in &mut scene.circles {
		if circle.id == id {
			circle.opacity = 1.0;
			circle.outline = FOCUS_OUTLINE;
		} else if neighbours.contains(&circle.id) {
			circle.opacity = 1.0;
			circle.outline = NEIGHBOR_OUTLINE;
		}
	}
	for (line, link) in scene.lines.iter_mut().zip(&graph.links) {
		if link.touches(id) {
			line.opacity = FOCUS_LINK_OPACITY;
			line.stroke = LINK_HIGHLIGHT_COLOR;
			line.stroke_width = FOCUS_LINK_WIDTH;
		}
	}
	true
}

/// Dims every node except `matches`, which get a search outline.
pub fn highlight_matches(scene: &mut SceneGraph, matches: &[NodeId]) {
	for circle in &mut scene.circles {
		if matches.contains(&circle.id) {
			circle.opacity = 1.0;
			circle.outline = SEARCH_OUTLINE;
		} else {
			circle.opacity = DIM_NODE_OPACITY;
		}
	}
}

/// Restores default node opacity and outline, and default link styling.
pub fn clear_highlight(scene: &mut SceneGraph, graph: &KnowledgeGraph) {
	for circle in &mut scene.circles {
		circle.opacity = 1.0;
		circle.outline = DEFAULT_OUTLINE;
	}
	for (line, link) in scene.lines.iter_mut().zip(&graph.links) {
		line.opacity = 1.0;
		line.stroke = LINK_COLOR;
		line.stroke_width = link_stroke_width(link.weight);
	}
}
