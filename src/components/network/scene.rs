//! Retained scene: the shapes currently on screen and their attributes.

use super::types::NodeId;
use super::viewport::ZoomTransform;

/// Stroke drawn around a node circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Outline {
	pub color: &'static str,
	pub width: f64,
}

pub const DEFAULT_OUTLINE: Outline = Outline {
	color: "#fff",
	width: 2.0,
};
/// Selected node, and the target of a connection highlight.
pub const FOCUS_OUTLINE: Outline = Outline {
	color: "#ff6b6b",
	width: 4.0,
};
pub const SEARCH_OUTLINE: Outline = Outline {
	color: "#ff6b6b",
	width: 3.0,
};
pub const NEIGHBOR_OUTLINE: Outline = Outline {
	color: "#4ecdc4",
	width: 3.0,
};

pub const LINK_COLOR: &str = "#999";
pub const LINK_HIGHLIGHT_COLOR: &str = "#ff6b6b";
pub const LABEL_COLOR: &str = "#333";

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
	pub id: NodeId,
	pub cx: f64,
	pub cy: f64,
	pub r: f64,
	pub fill: String,
	pub outline: Outline,
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
	/// Index of the source circle.
	pub source: usize,
	/// Index of the target circle.
	pub target: usize,
	pub x1: f64,
	pub y1: f64,
	pub x2: f64,
	pub y2: f64,
	pub stroke: &'static str,
	pub stroke_width: f64,
	/// Weight-derived stroke alpha.
	pub stroke_opacity: f64,
	/// Highlight-driven element alpha, multiplied with `stroke_opacity`.
	pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Label {
	pub x: f64,
	pub y: f64,
	pub text: String,
	pub font_size: f64,
}

/// Every drawable of the current graph, in paint order: lines, circles, labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraph {
	pub lines: Vec<Line>,
	pub circles: Vec<Circle>,
	pub labels: Vec<Label>,
	pub width: f64,
	pub height: f64,
}

impl SceneGraph {
	pub fn circle(&self, id: NodeId) -> Option<&Circle> {
		self.circles.iter().find(|c| c.id == id)
	}

	/// Topmost circle under a point given in graph coordinates.
	pub fn circle_at(&self, x: f64, y: f64) -> Option<usize> {
		self.circles.iter().rposition(|c| {
			let (dx, dy) = (c.cx - x, c.cy - y);
			dx * dx + dy * dy <= c.r * c.r
		})
	}
}

/// A surface a scene can be drawn onto.
pub trait Painter {
	type Error;

	fn paint(&mut self, scene: &SceneGraph, transform: &ZoomTransform) -> Result<(), Self::Error>;
}
