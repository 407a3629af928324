//! Maps graph data onto scene shapes and keeps them in step with the simulation.

use super::layout::Body;
use super::scale::{ColorMode, NodePalette};
use super::scene::{Circle, DEFAULT_OUTLINE, LINK_COLOR, Label, Line, SceneGraph};
use super::types::KnowledgeGraph;

/// Labels sit this far below their node.
pub const LABEL_OFFSET: f64 = 30.0;
const LABEL_MAX_CHARS: usize = 15;

pub fn node_radius(degree: usize) -> f64 {
	((degree as f64).sqrt() * 3.0).max(8.0)
}

pub fn label_font_size(degree: usize) -> f64 {
	((degree as f64).sqrt() + 8.0).max(8.0)
}

pub fn label_text(label: &str) -> String {
	if label.chars().count() > LABEL_MAX_CHARS {
		let head: String = label.chars().take(LABEL_MAX_CHARS).collect();
		format!("{head}...")
	} else {
		label.to_owned()
	}
}

pub fn link_stroke_width(weight: f64) -> f64 {
	(weight.max(0.0) * 5.0).sqrt()
}

pub fn link_opacity(weight: f64) -> f64 {
	weight.max(0.2)
}

/// Builds a fresh scene for `graph`, positioned at `bodies`.
pub fn bind(
	graph: &KnowledgeGraph,
	bodies: &[Body],
	palette: &mut NodePalette,
	mode: ColorMode,
	width: f64,
	height: f64,
) -> SceneGraph {
	palette.fit_degrees(graph.max_degree());

	let lines = graph
		.links
		.iter()
		.map(|link| Line {
			source: link.source_index,
			target: link.target_index,
			x1: 0.0,
			y1: 0.0,
			x2: 0.0,
			y2: 0.0,
			stroke: LINK_COLOR,
			stroke_width: link_stroke_width(link.weight),
			stroke_opacity: link_opacity(link.weight),
			opacity: 1.0,
		})
		.collect();

	let circles = graph
		.nodes
		.iter()
		.map(|node| Circle {
			id: node.id,
			cx: 0.0,
			cy: 0.0,
			r: node_radius(node.degree),
			fill: palette.node_color(node, mode),
			outline: DEFAULT_OUTLINE,
			opacity: 1.0,
		})
		.collect();

	let labels = graph
		.nodes
		.iter()
		.map(|node| Label {
			x: 0.0,
			y: 0.0,
			text: label_text(&node.label),
			font_size: label_font_size(node.degree),
		})
		.collect();

	let mut scene = SceneGraph {
		lines,
		circles,
		labels,
		width,
		height,
	};
	sync_positions(&mut scene, bodies);
	scene
}

/// Copies body positions into circles, line endpoints and labels.
///
/// Runs every tick, so it only writes coordinates.
pub fn sync_positions(scene: &mut SceneGraph, bodies: &[Body]) {
	for ((circle, label), body) in scene
		.circles
		.iter_mut()
		.zip(scene.labels.iter_mut())
		.zip(bodies)
	{
		if !body.is_placed() {
			continue;
		}
		circle.cx = body.x;
		circle.cy = body.y;
		label.x = body.x;
		label.y = body.y + LABEL_OFFSET;
	}
	for line in &mut scene.lines {
		if let (Some(s), Some(t)) = (scene.circles.get(line.source), scene.circles.get(line.target)) {
			line.x1 = s.cx;
			line.y1 = s.cy;
			line.x2 = t.cx;
			line.y2 = t.cy;
		}
	}
}

/// Re-fills every circle for a new color mode.
pub fn recolor(scene: &mut SceneGraph, graph: &KnowledgeGraph, palette: &mut NodePalette, mode: ColorMode) {
	palette.fit_degrees(graph.max_degree());
	for (circle, node) in scene.circles.iter_mut().zip(&graph.nodes) {
		circle.fill = palette.node_color(node, mode);
	}
}
