//! Pan/zoom transform and its animated transitions.

use super::layout::Point;

pub const MIN_SCALE: f64 = 0.1;
pub const MAX_SCALE: f64 = 10.0;
pub const ZOOM_IN_FACTOR: f64 = 1.5;
pub const ZOOM_OUT_FACTOR: f64 = 0.67;
/// Duration of the zoom button transitions.
pub const ZOOM_TRANSITION_MS: f64 = 250.0;
pub const FOCUS_TRANSITION_MS: f64 = 750.0;
/// Scale used when centering on a node.
pub const FOCUS_SCALE: f64 = 1.5;

fn clamp_scale(k: f64) -> f64 {
	if k.is_finite() {
		k.clamp(MIN_SCALE, MAX_SCALE)
	} else {
		1.0
	}
}

fn ease_cubic_in_out(t: f64) -> f64 {
	let t = t * 2.0;
	if t <= 1.0 {
		t * t * t / 2.0
	} else {
		let t = t - 2.0;
		(t * t * t + 2.0) / 2.0
	}
}

/// Maps graph coordinates to screen coordinates: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ZoomTransform {
	fn default() -> Self {
		Self::IDENTITY
	}
}

impl ZoomTransform {
	pub const IDENTITY: Self = Self {
		x: 0.0,
		y: 0.0,
		k: 1.0,
	};

	/// Builds a transform with the scale clamped to the zoom extent.
	pub fn new(x: f64, y: f64, k: f64) -> Self {
		Self {
			x,
			y,
			k: clamp_scale(k),
		}
	}

	pub fn apply(&self, p: Point) -> Point {
		Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	pub fn invert(&self, p: Point) -> Point {
		Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
	}

	/// Scales by `factor` keeping the screen point `anchor` fixed.
	pub fn scaled_by(&self, factor: f64, anchor: Point) -> Self {
		let k = clamp_scale(self.k * factor);
		let fixed = self.invert(anchor);
		Self::new(anchor.x - fixed.x * k, anchor.y - fixed.y * k, k)
	}

	/// Transform at scale `k` that puts graph point `p` at the middle of a
	/// `width` x `height` viewport.
	pub fn centered_on(p: Point, k: f64, width: f64, height: f64) -> Self {
		let k = clamp_scale(k);
		Self::new(width / 2.0 - p.x * k, height / 2.0 - p.y * k, k)
	}

	fn lerp(&self, to: &Self, t: f64) -> Self {
		let mix = |a: f64, b: f64| a + (b - a) * t;
		Self::new(mix(self.x, to.x), mix(self.y, to.y), mix(self.k, to.k))
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Transition {
	from: ZoomTransform,
	to: ZoomTransform,
	start_ms: f64,
	duration_ms: f64,
}

/// The current transform, possibly mid-transition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Viewport {
	current: ZoomTransform,
	transition: Option<Transition>,
}

impl Viewport {
	pub fn transform(&self) -> ZoomTransform {
		self.current
	}

	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Jumps to `transform`, interrupting any transition.
	pub fn set(&mut self, transform: ZoomTransform) {
		self.transition = None;
		self.current = ZoomTransform::new(transform.x, transform.y, transform.k);
	}

	/// Starts an eased transition from the current transform.
	pub fn animate_to(&mut self, target: ZoomTransform, now_ms: f64, duration_ms: f64) {
		self.transition = Some(Transition {
			from: self.current,
			to: ZoomTransform::new(target.x, target.y, target.k),
			start_ms: now_ms,
			duration_ms,
		});
	}

	/// Moves a running transition to `now_ms`.
	pub fn advance(&mut self, now_ms: f64) {
		let Some(tr) = self.transition else {
			return;
		};
		let t = if tr.duration_ms <= 0.0 {
			1.0
		} else {
			((now_ms - tr.start_ms) / tr.duration_ms).clamp(0.0, 1.0)
		};
		if t >= 1.0 {
			self.current = tr.to;
			self.transition = None;
		} else {
			self.current = tr.from.lerp(&tr.to, ease_cubic_in_out(t));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scale_is_always_clamped() {
		let mut t = ZoomTransform::IDENTITY;
		let anchor = Point::new(400.0, 300.0);
		for _ in 0..20 {
			t = t.scaled_by(ZOOM_IN_FACTOR, anchor);
			assert!(t.k <= MAX_SCALE);
		}
		assert_eq!(t.k, MAX_SCALE);
		for _ in 0..40 {
			t = t.scaled_by(ZOOM_OUT_FACTOR, anchor);
			assert!(t.k >= MIN_SCALE);
		}
		assert_eq!(t.k, MIN_SCALE);
		assert_eq!(ZoomTransform::new(0.0, 0.0, 55.0).k, MAX_SCALE);
		assert_eq!(ZoomTransform::new(0.0, 0.0, f64::NAN).k, 1.0);
	}

	#[test]
	fn scaling_keeps_anchor_fixed() {
		let t = ZoomTransform::new(30.0, -20.0, 2.0);
		let anchor = Point::new(400.0, 300.0);
		let before = t.invert(anchor);
		let after = t.scaled_by(1.5, anchor).invert(anchor);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);
	}

	#[test]
	fn centered_node_lands_mid_viewport() {
		let node = Point::new(120.0, -40.0);
		let t = ZoomTransform::centered_on(node, FOCUS_SCALE, 800.0, 600.0);
		assert_eq!(t.k, 1.5);
		assert_eq!(t.apply(node), Point::new(400.0, 300.0));
	}

	#[test]
	fn transitions_ease_to_target() {
		let mut vp = Viewport::default();
		let target = ZoomTransform::new(100.0, 50.0, 2.0);
		vp.animate_to(target, 1_000.0, 250.0);
		vp.advance(1_125.0);
		let mid = vp.transform();
		assert!((mid.k - 1.5).abs() < 1e-9);
		assert!(vp.is_animating());
		vp.advance(1_300.0);
		assert_eq!(vp.transform(), target);
		assert!(!vp.is_animating());
	}

	#[test]
	fn set_interrupts_transition() {
		let mut vp = Viewport::default();
		vp.animate_to(ZoomTransform::new(0.0, 0.0, 4.0), 0.0, 250.0);
		vp.set(ZoomTransform::new(5.0, 5.0, 20.0));
		assert!(!vp.is_animating());
		assert_eq!(vp.transform().k, MAX_SCALE);
	}
}
