use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{LABEL_COLOR, Painter, SceneGraph};
use super::viewport::ZoomTransform;

const BACKGROUND: &str = "#ffffff";

/// Draws the scene onto a 2d canvas context.
pub struct CanvasPainter<'a> {
	ctx: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasPainter<'a> {
	pub fn new(ctx: &'a CanvasRenderingContext2d) -> Self {
		Self { ctx }
	}

	fn draw_lines(&self, scene: &SceneGraph) {
		let ctx = self.ctx;
		for line in &scene.lines {
			ctx.set_global_alpha(line.stroke_opacity * line.opacity);
			ctx.set_stroke_style_str(line.stroke);
			ctx.set_line_width(line.stroke_width);
			ctx.begin_path();
			ctx.move_to(line.x1, line.y1);
			ctx.line_to(line.x2, line.y2);
			ctx.stroke();
		}
	}

	fn draw_circles(&self, scene: &SceneGraph) -> Result<(), JsValue> {
		let ctx = self.ctx;
		for circle in &scene.circles {
			ctx.set_global_alpha(circle.opacity);
			ctx.begin_path();
			ctx.arc(circle.cx, circle.cy, circle.r, 0.0, 2.0 * PI)?;
			ctx.set_fill_style_str(&circle.fill);
			ctx.fill();
			ctx.set_stroke_style_str(circle.outline.color);
			ctx.set_line_width(circle.outline.width);
			ctx.stroke();
		}
		Ok(())
	}

	fn draw_labels(&self, scene: &SceneGraph) -> Result<(), JsValue> {
		let ctx = self.ctx;
		ctx.set_global_alpha(1.0);
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_text_align("center");
		for label in &scene.labels {
			ctx.set_font(&format!("{}px sans-serif", label.font_size));
			ctx.fill_text(&label.text, label.x, label.y)?;
		}
		Ok(())
	}
}

impl Painter for CanvasPainter<'_> {
	type Error = JsValue;

	fn paint(&mut self, scene: &SceneGraph, t: &ZoomTransform) -> Result<(), JsValue> {
		let ctx = self.ctx;
		ctx.set_global_alpha(1.0);
		ctx.set_fill_style_str(BACKGROUND);
		ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
		ctx.save();
		ctx.translate(t.x, t.y)?;
		ctx.scale(t.k, t.k)?;
		self.draw_lines(scene);
		let drawn = self
			.draw_circles(scene)
			.and_then(|()| self.draw_labels(scene));
		ctx.restore();
		drawn
	}
}
