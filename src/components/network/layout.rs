//! Layout modes and the force configuration each one hands to the simulation.

use std::fmt;
use std::str::FromStr;

use super::error::UnknownMode;
use super::types::Link;

/// Named force configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
	#[default]
	Force,
	Circular,
	Tree,
}

impl LayoutMode {
	pub const ALL: [LayoutMode; 3] = [Self::Force, Self::Circular, Self::Tree];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Force => "force",
			Self::Circular => "circular",
			Self::Tree => "tree",
		}
	}
}

impl fmt::Display for LayoutMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LayoutMode {
	type Err = UnknownMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|mode| mode.as_str() == s)
			.ok_or_else(|| UnknownMode(s.to_owned()))
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A per-link quantity: `intercept + slope * weight`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkMetric {
	pub intercept: f64,
	pub slope: f64,
}

impl LinkMetric {
	pub const fn constant(value: f64) -> Self {
		Self {
			intercept: value,
			slope: 0.0,
		}
	}

	pub fn eval(&self, weight: f64) -> f64 {
		self.intercept + self.slope * weight
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkForce {
	/// Rest length.
	pub distance: LinkMetric,
	pub strength: LinkMetric,
}

/// Attraction towards a ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialForce {
	pub radius: f64,
	pub center: Point,
	pub strength: f64,
}

/// Attraction towards a horizontal line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisForce {
	pub target: f64,
	pub strength: f64,
}

/// The complete set of forces a simulation runs with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceSet {
	pub link: LinkForce,
	/// Many-body strength; negative repels.
	pub charge: f64,
	pub center: Option<Point>,
	/// Minimum separation radius.
	pub collide: Option<f64>,
	pub radial: Option<RadialForce>,
	pub y: Option<AxisForce>,
}

impl ForceSet {
	pub fn for_mode(mode: LayoutMode, width: f64, height: f64) -> Self {
		let center = Point::new(width / 2.0, height / 2.0);
		match mode {
			// Higher similarity pulls harder and sits closer.
			LayoutMode::Force => Self {
				link: LinkForce {
					distance: LinkMetric {
						intercept: 100.0,
						slope: -50.0,
					},
					strength: LinkMetric {
						intercept: 0.0,
						slope: 1.0,
					},
				},
				charge: -300.0,
				center: Some(center),
				collide: Some(25.0),
				radial: None,
				y: None,
			},
			LayoutMode::Circular => Self {
				link: LinkForce {
					distance: LinkMetric::constant(80.0),
					strength: LinkMetric::constant(0.1),
				},
				charge: -100.0,
				center: Some(center),
				collide: None,
				radial: Some(RadialForce {
					radius: 200.0,
					center,
					strength: 0.8,
				}),
				y: None,
			},
			LayoutMode::Tree => Self {
				link: LinkForce {
					distance: LinkMetric::constant(100.0),
					strength: LinkMetric::constant(0.8),
				},
				charge: -200.0,
				center: Some(center),
				collide: None,
				radial: None,
				y: Some(AxisForce {
					target: center.y,
					strength: 0.1,
				}),
			},
		}
	}
}

/// Position and velocity of one node inside a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned coordinates; only set while the node is being dragged.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
}

impl Body {
	/// A body the simulation will place itself.
	pub const fn unplaced() -> Self {
		Self {
			x: f64::NAN,
			y: f64::NAN,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	pub const fn at(x: f64, y: f64) -> Self {
		Self {
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fx: None,
			fy: None,
		}
	}

	pub fn is_placed(&self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}

	pub fn position(&self) -> Option<Point> {
		self.is_placed().then(|| Point::new(self.x, self.y))
	}
}

/// The physics engine driving node positions.
///
/// One call to [`Simulation::step`] is one tick; the host calls it once per
/// animation frame while [`Simulation::is_running`] holds.
pub trait Simulation {
	/// Replaces bodies, links and forces; previous forces are discarded.
	fn configure(&mut self, bodies: Vec<Body>, links: &[Link], forces: ForceSet);
	fn bodies(&self) -> &[Body];
	fn step(&mut self);
	fn is_running(&self) -> bool;
	/// Resumes ticking from the current temperature.
	fn restart(&mut self);
	fn stop(&mut self);
	/// Temperature the simulation settles towards.
	fn set_alpha_target(&mut self, target: f64);
	fn pin(&mut self, index: usize, x: f64, y: f64);
	fn unpin(&mut self, index: usize);
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn mode_names_round_trip() {
		for mode in LayoutMode::ALL {
			assert_eq!(mode.as_str().parse::<LayoutMode>(), Ok(mode));
		}
		assert_eq!(
			"spiral".parse::<LayoutMode>(),
			Err(UnknownMode("spiral".into()))
		);
	}

	#[test]
	fn force_mode_link_metrics() {
		let forces = ForceSet::for_mode(LayoutMode::Force, 800.0, 600.0);
		assert_eq!(forces.link.distance.eval(1.0), 50.0);
		assert_eq!(forces.link.distance.eval(0.0), 100.0);
		assert_eq!(forces.link.strength.eval(0.7), 0.7);
		assert_eq!(forces.charge, -300.0);
		assert_eq!(forces.center, Some(Point::new(400.0, 300.0)));
		assert_eq!(forces.collide, Some(25.0));
	}

	#[test]
	fn circular_and_tree_modes() {
		let circular = ForceSet::for_mode(LayoutMode::Circular, 800.0, 600.0);
		assert_eq!(circular.link.distance.eval(0.3), 80.0);
		assert_eq!(circular.link.strength.eval(0.9), 0.1);
		assert_eq!(circular.charge, -100.0);
		let radial = circular.radial.unwrap();
		assert_eq!((radial.radius, radial.strength), (200.0, 0.8));

		let tree = ForceSet::for_mode(LayoutMode::Tree, 800.0, 600.0);
		assert_eq!(tree.link.strength.eval(0.1), 0.8);
		assert_eq!(tree.charge, -200.0);
		assert_eq!(tree.y.map(|y| y.strength), Some(0.1));
		assert!(tree.radial.is_none() && tree.collide.is_none());
	}
}
