//! Saving the current scene as a PNG.
//!
//! The scene is written out as SVG markup, rasterized through an off-screen
//! image and canvas, and handed to the browser as a download.

use std::borrow::Cow;
use std::fmt::{self, Write};

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{CanvasRenderingContext2d, HtmlAnchorElement, HtmlCanvasElement, HtmlImageElement};

use super::error::ExportError;
use super::scene::{LABEL_COLOR, Painter, SceneGraph};
use super::viewport::ZoomTransform;

fn escape(text: &str) -> Cow<'_, str> {
	if !text.contains(['&', '<', '>', '"']) {
		return Cow::Borrowed(text);
	}
	let mut out = String::with_capacity(text.len() + 8);
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			c => out.push(c),
		}
	}
	Cow::Owned(out)
}

/// Writes a scene as standalone SVG markup.
#[derive(Debug, Default)]
pub struct SvgWriter {
	out: String,
}

impl SvgWriter {
	pub fn into_string(self) -> String {
		self.out
	}
}

impl Painter for SvgWriter {
	type Error = fmt::Error;

	fn paint(&mut self, scene: &SceneGraph, t: &ZoomTransform) -> fmt::Result {
		let out = &mut self.out;
		write!(
			out,
			r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
			w = scene.width,
			h = scene.height
		)?;
		out.push_str(r##"<rect width="100%" height="100%" fill="#fff"/>"##);
		write!(out, r#"<g transform="translate({},{}) scale({})">"#, t.x, t.y, t.k)?;
		for l in &scene.lines {
			write!(
				out,
				r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-opacity="{}" opacity="{}"/>"#,
				l.x1, l.y1, l.x2, l.y2, l.stroke, l.stroke_width, l.stroke_opacity, l.opacity
			)?;
		}
		for c in &scene.circles {
			write!(
				out,
				r#"<circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="{}" opacity="{}"/>"#,
				c.cx,
				c.cy,
				c.r,
				escape(&c.fill),
				c.outline.color,
				c.outline.width,
				c.opacity
			)?;
		}
		for label in &scene.labels {
			write!(
				out,
				r#"<text x="{}" y="{}" font-size="{}px" font-family="sans-serif" text-anchor="middle" fill="{}">{}</text>"#,
				label.x,
				label.y,
				label.font_size,
				LABEL_COLOR,
				escape(&label.text)
			)?;
		}
		out.push_str("</g></svg>");
		Ok(())
	}
}

pub fn to_svg(scene: &SceneGraph, transform: &ZoomTransform) -> String {
	let mut writer = SvgWriter::default();
	// Writing into a String cannot fail.
	let _ = writer.paint(scene, transform);
	writer.into_string()
}

/// Starts a PNG download of `scene` as currently viewed.
///
/// Rasterization completes asynchronously; a failure there is only logged.
pub fn export_png(
	scene: &SceneGraph,
	transform: &ZoomTransform,
	file_name: &str,
) -> Result<(), ExportError> {
	let svg = to_svg(scene, transform);
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| ExportError::Dom("no document".into()))?;

	let canvas: HtmlCanvasElement = document
		.create_element("canvas")?
		.dyn_into()
		.map_err(|_| ExportError::Dom("not a canvas".into()))?;
	canvas.set_width(scene.width.max(1.0) as u32);
	canvas.set_height(scene.height.max(1.0) as u32);

	let image = HtmlImageElement::new()?;
	let (loaded, file_name) = (image.clone(), file_name.to_owned());
	let onload = Closure::once_into_js(move || {
		match download(&document, &canvas, &loaded, &file_name) {
			Ok(()) => info!("exported {file_name}"),
			Err(err) => warn!("export failed: {err}"),
		}
	});
	let onerror = Closure::once_into_js(|| warn!("export failed: {}", ExportError::Rasterize));
	image.set_onload(Some(onload.unchecked_ref()));
	image.set_onerror(Some(onerror.unchecked_ref()));
	image.set_src(&format!(
		"data:image/svg+xml;charset=utf-8,{}",
		String::from(js_sys::encode_uri_component(&svg))
	));
	Ok(())
}

fn download(
	document: &web_sys::Document,
	canvas: &HtmlCanvasElement,
	image: &HtmlImageElement,
	file_name: &str,
) -> Result<(), ExportError> {
	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")?
		.ok_or_else(|| ExportError::Dom("no 2d context".into()))?
		.dyn_into()
		.map_err(|_| ExportError::Dom("not a 2d context".into()))?;
	ctx.draw_image_with_html_image_element(image, 0.0, 0.0)?;
	let url = canvas.to_data_url()?;

	let anchor: HtmlAnchorElement = document
		.create_element("a")?
		.dyn_into()
		.map_err(|_| ExportError::Dom("not an anchor".into()))?;
	anchor.set_download(file_name);
	anchor.set_href(&url);
	anchor.click();
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::binder::bind;
	use crate::components::network::layout::Body;
	use crate::components::network::scale::{ColorMode, NodePalette};
	use crate::components::network::types::tests::{edge, graph, record};

	#[test]
	fn escapes_markup() {
		assert_eq!(escape("plain"), "plain");
		assert_eq!(escape(r#"a<b & "c">"#), "a&lt;b &amp; &quot;c&quot;&gt;");
	}

	#[test]
	fn svg_contains_every_shape() {
		let g = graph(
			vec![record(1, "if <cond>", "x"), record(2, "B", "y")],
			vec![edge(1, 2, 0.5)],
		);
		let scene = bind(
			&g,
			&[Body::at(0.0, 0.0), Body::at(40.0, 0.0)],
			&mut NodePalette::default(),
			ColorMode::Category,
			800.0,
			600.0,
		);
		let svg = to_svg(&scene, &ZoomTransform::new(10.0, 20.0, 2.0));
		assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\" height=\"600\""));
		assert!(svg.contains(r#"<g transform="translate(10,20) scale(2)">"#));
		assert_eq!(svg.matches("<line ").count(), 1);
		assert_eq!(svg.matches("<circle ").count(), 2);
		assert_eq!(svg.matches("<text ").count(), 2);
		assert!(svg.contains("if &lt;cond&gt;"));
		assert!(svg.contains(r#"stroke-opacity="0.5""#));
		assert!(svg.ends_with("</g></svg>"));
	}
}
