//! Velocity-Verlet force simulation with alpha cooling.
//!
//! Each tick cools `alpha` towards `alpha_target`, lets every configured force
//! nudge body velocities (the center force moves positions directly), then
//! integrates with velocity decay. Pinned bodies snap to their pin. The
//! simulation stops by itself once `alpha` drops below [`ALPHA_MIN`].
//!
//! Follows d3-force semantics: velocity decay 0.4, link strength biased by
//! endpoint degree, forces applied in insertion order (link, charge, center,
//! collide, radial, then y). The layouts need per-link distances and radial,
//! collide and y forces, none of which `force_graph` provides.

use super::layout::{Body, ForceSet, Simulation};
use super::types::Link;

pub const ALPHA_MIN: f64 = 0.001;
/// Fraction of velocity kept after each tick.
const VELOCITY_RETAIN: f64 = 0.6;
const INITIAL_RADIUS: f64 = 10.0;
/// Closest distance (squared) used by the many-body force.
const DISTANCE_MIN2: f64 = 1.0;

/// Deterministic linear congruential generator, used only to break ties
/// between coincident bodies.
#[derive(Clone, Debug)]
struct Lcg(u64);

impl Lcg {
	const A: u64 = 1_664_525;
	const C: u64 = 1_013_904_223;
	const M: u64 = 1 << 32;

	fn next(&mut self) -> f64 {
		self.0 = (Self::A * self.0 + Self::C) % Self::M;
		self.0 as f64 / Self::M as f64
	}

	fn jiggle(&mut self) -> f64 {
		(self.next() - 0.5) * 1e-6
	}
}

#[derive(Clone, Copy, Debug)]
struct Spring {
	source: usize,
	target: usize,
	distance: f64,
	strength: f64,
	/// Share of the correction applied to the target.
	bias: f64,
}

#[derive(Clone, Debug)]
pub struct ForceSimulation {
	bodies: Vec<Body>,
	springs: Vec<Spring>,
	forces: Option<ForceSet>,
	alpha: f64,
	alpha_target: f64,
	alpha_decay: f64,
	running: bool,
	random: Lcg,
}

impl Default for ForceSimulation {
	fn default() -> Self {
		Self {
			bodies: Vec::new(),
			springs: Vec::new(),
			forces: None,
			alpha: 1.0,
			alpha_target: 0.0,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
			running: false,
			random: Lcg(1),
		}
	}
}

impl ForceSimulation {
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Places unplaced bodies on a phyllotaxis spiral around the origin.
	fn place_bodies(&mut self) {
		let initial_angle = std::f64::consts::PI * (3.0 - 5f64.sqrt());
		for (i, body) in self.bodies.iter_mut().enumerate() {
			if let Some(fx) = body.fx {
				body.x = fx;
			}
			if let Some(fy) = body.fy {
				body.y = fy;
			}
			if !body.is_placed() {
				let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
				let angle = i as f64 * initial_angle;
				body.x = radius * angle.cos();
				body.y = radius * angle.sin();
			}
			if !body.vx.is_finite() || !body.vy.is_finite() {
				body.vx = 0.0;
				body.vy = 0.0;
			}
		}
	}

	fn apply_springs(&mut self) {
		let alpha = self.alpha;
		for spring in &self.springs {
			let (s, t) = (self.bodies[spring.source], self.bodies[spring.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			if x == 0.0 {
				x = self.random.jiggle();
			}
			let mut y = t.y + t.vy - s.y - s.vy;
			if y == 0.0 {
				y = self.random.jiggle();
			}
			let len = (x * x + y * y).sqrt();
			let l = (len - spring.distance) / len * alpha * spring.strength;
			let (x, y) = (x * l, y * l);

			let target = &mut self.bodies[spring.target];
			target.vx -= x * spring.bias;
			target.vy -= y * spring.bias;
			let source = &mut self.bodies[spring.source];
			source.vx += x * (1.0 - spring.bias);
			source.vy += y * (1.0 - spring.bias);
		}
	}

	fn apply_charge(&mut self, strength: f64) {
		let alpha = self.alpha;
		let n = self.bodies.len();
		let mut dv = vec![(0.0, 0.0); n];
		for i in 0..n {
			for j in 0..n {
				if i == j {
					continue;
				}
				let (a, b) = (self.bodies[i], self.bodies[j]);
				let (mut x, mut y) = (b.x - a.x, b.y - a.y);
				let mut l = x * x + y * y;
				if x == 0.0 {
					x = self.random.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.random.jiggle();
					l += y * y;
				}
				if l < DISTANCE_MIN2 {
					l = (DISTANCE_MIN2 * l).sqrt();
				}
				let w = strength * alpha / l;
				dv[i].0 += x * w;
				dv[i].1 += y * w;
			}
		}
		for (body, (dx, dy)) in self.bodies.iter_mut().zip(dv) {
			body.vx += dx;
			body.vy += dy;
		}
	}

	fn apply_center(&mut self, cx: f64, cy: f64) {
		if self.bodies.is_empty() {
			return;
		}
		let n = self.bodies.len() as f64;
		let (sx, sy) = self
			.bodies
			.iter()
			.fold((0.0, 0.0), |(sx, sy), b| (sx + b.x, sy + b.y));
		let (dx, dy) = (sx / n - cx, sy / n - cy);
		for body in &mut self.bodies {
			body.x -= dx;
			body.y -= dy;
		}
	}

	fn apply_collide(&mut self, radius: f64) {
		let n = self.bodies.len();
		let r = radius * 2.0;
		for i in 0..n {
			let (xi, yi) = (
				self.bodies[i].x + self.bodies[i].vx,
				self.bodies[i].y + self.bodies[i].vy,
			);
			for j in (i + 1)..n {
				let other = self.bodies[j];
				let (mut x, mut y) = (xi - other.x - other.vx, yi - other.y - other.vy);
				let mut l = x * x + y * y;
				if l >= r * r {
					continue;
				}
				if x == 0.0 {
					x = self.random.jiggle();
					l += x * x;
				}
				if y == 0.0 {
					y = self.random.jiggle();
					l += y * y;
				}
				let d = l.sqrt();
				let k = (r - d) / d;
				let (x, y) = (x * k, y * k);
				// Equal radii split the correction evenly.
				self.bodies[i].vx += x * 0.5;
				self.bodies[i].vy += y * 0.5;
				self.bodies[j].vx -= x * 0.5;
				self.bodies[j].vy -= y * 0.5;
			}
		}
	}

	fn integrate(&mut self) {
		for body in &mut self.bodies {
			match body.fx {
				Some(fx) => {
					body.x = fx;
					body.vx = 0.0;
				}
				None => {
					body.vx *= VELOCITY_RETAIN;
					body.x += body.vx;
				}
			}
			match body.fy {
				Some(fy) => {
					body.y = fy;
					body.vy = 0.0;
				}
				None => {
					body.vy *= VELOCITY_RETAIN;
					body.y += body.vy;
				}
			}
		}
	}
}

impl Simulation for ForceSimulation {
	fn configure(&mut self, bodies: Vec<Body>, links: &[Link], forces: ForceSet) {
		self.bodies = bodies;
		self.place_bodies();

		let mut count = vec![0usize; self.bodies.len()];
		let links: Vec<&Link> = links
			.iter()
			.filter(|l| l.source_index < count.len() && l.target_index < count.len())
			.collect();
		for link in &links {
			count[link.source_index] += 1;
			count[link.target_index] += 1;
		}
		self.springs = links
			.into_iter()
			.map(|link| {
				let (s, t) = (count[link.source_index], count[link.target_index]);
				Spring {
					source: link.source_index,
					target: link.target_index,
					distance: forces.link.distance.eval(link.weight),
					strength: forces.link.strength.eval(link.weight),
					bias: s as f64 / (s + t) as f64,
				}
			})
			.collect();

		self.forces = Some(forces);
		self.alpha = 1.0;
		self.alpha_target = 0.0;
		self.running = true;
	}

	fn bodies(&self) -> &[Body] {
		&self.bodies
	}

	fn step(&mut self) {
		let Some(forces) = self.forces else {
			return;
		};
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

		self.apply_springs();
		self.apply_charge(forces.charge);
		if let Some(center) = forces.center {
			self.apply_center(center.x, center.y);
		}
		if let Some(radius) = forces.collide {
			self.apply_collide(radius);
		}
		if let Some(radial) = forces.radial {
			let alpha = self.alpha;
			for body in &mut self.bodies {
				let (mut dx, mut dy) = (body.x - radial.center.x, body.y - radial.center.y);
				if dx == 0.0 {
					dx = 1e-6;
				}
				if dy == 0.0 {
					dy = 1e-6;
				}
				let r = (dx * dx + dy * dy).sqrt();
				let k = (radial.radius - r) * radial.strength * alpha / r;
				body.vx += dx * k;
				body.vy += dy * k;
			}
		}
		if let Some(axis) = forces.y {
			let alpha = self.alpha;
			for body in &mut self.bodies {
				body.vy += (axis.target - body.y) * axis.strength * alpha;
			}
		}
		self.integrate();

		if self.alpha < ALPHA_MIN {
			self.running = false;
		}
	}

	fn is_running(&self) -> bool {
		self.running
	}

	fn restart(&mut self) {
		self.running = self.forces.is_some();
	}

	fn stop(&mut self) {
		self.running = false;
	}

	fn set_alpha_target(&mut self, target: f64) {
		self.alpha_target = target;
	}

	fn pin(&mut self, index: usize, x: f64, y: f64) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.fx = Some(x);
			body.fy = Some(y);
		}
	}

	fn unpin(&mut self, index: usize) {
		if let Some(body) = self.bodies.get_mut(index) {
			body.fx = None;
			body.fy = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::layout::{LayoutMode, LinkForce, LinkMetric};
	use crate::components::network::types::NodeId;

	fn link(source: usize, target: usize, weight: f64) -> Link {
		Link {
			source: NodeId(source as i64),
			target: NodeId(target as i64),
			weight,
			source_index: source,
			target_index: target,
		}
	}

	fn settle(sim: &mut ForceSimulation) -> usize {
		let mut ticks = 0;
		while sim.is_running() && ticks < 10_000 {
			sim.step();
			ticks += 1;
		}
		ticks
	}

	fn bare_forces() -> ForceSet {
		ForceSet {
			link: LinkForce {
				distance: LinkMetric::constant(30.0),
				strength: LinkMetric::constant(1.0),
			},
			charge: 0.0,
			center: None,
			collide: None,
			radial: None,
			y: None,
		}
	}

	#[test]
	fn places_unplaced_bodies_and_keeps_given_ones() {
		let mut sim = ForceSimulation::default();
		sim.configure(
			vec![Body::unplaced(), Body::at(5.0, 6.0), Body::unplaced()],
			&[],
			bare_forces(),
		);
		assert!(sim.bodies().iter().all(Body::is_placed));
		assert_eq!((sim.bodies()[1].x, sim.bodies()[1].y), (5.0, 6.0));
		assert_ne!(sim.bodies()[0].x, sim.bodies()[2].x);
	}

	#[test]
	fn cools_down_and_stops() {
		let mut sim = ForceSimulation::default();
		sim.configure(
			vec![Body::unplaced(); 4],
			&[link(0, 1, 0.9), link(2, 3, 0.4)],
			ForceSet::for_mode(LayoutMode::Force, 800.0, 600.0),
		);
		assert!(sim.is_running());
		let ticks = settle(&mut sim);
		assert!((295..=305).contains(&ticks), "stopped after {ticks}");
		assert!(sim.alpha() < ALPHA_MIN);
	}

	#[test]
	fn reheated_simulation_does_not_stop() {
		let mut sim = ForceSimulation::default();
		sim.configure(vec![Body::unplaced(); 2], &[], bare_forces());
		sim.set_alpha_target(0.3);
		for _ in 0..2_000 {
			sim.step();
		}
		assert!(sim.is_running());
		assert!((sim.alpha() - 0.3).abs() < 0.01);

		sim.set_alpha_target(0.0);
		settle(&mut sim);
		assert!(!sim.is_running());
		sim.restart();
		assert!(sim.is_running());
	}

	#[test]
	fn center_force_keeps_mean_at_center() {
		let mut sim = ForceSimulation::default();
		sim.configure(
			vec![Body::unplaced(); 2],
			&[link(0, 1, 0.5)],
			ForceSet::for_mode(LayoutMode::Force, 800.0, 600.0),
		);
		settle(&mut sim);
		let b = sim.bodies();
		let (mx, my) = ((b[0].x + b[1].x) / 2.0, (b[0].y + b[1].y) / 2.0);
		assert!((mx - 400.0).abs() < 1e-3, "mean x {mx}");
		assert!((my - 300.0).abs() < 1e-3, "mean y {my}");
	}

	#[test]
	fn circular_mode_forms_a_ring() {
		let mut sim = ForceSimulation::default();
		sim.configure(
			vec![Body::unplaced(); 6],
			&[],
			ForceSet::for_mode(LayoutMode::Circular, 800.0, 600.0),
		);
		settle(&mut sim);
		for body in sim.bodies() {
			let r = ((body.x - 400.0).powi(2) + (body.y - 300.0).powi(2)).sqrt();
			assert!((170.0..240.0).contains(&r), "radius {r}");
		}
	}

	#[test]
	fn collision_separates_overlapping_bodies() {
		let mut sim = ForceSimulation::default();
		let forces = ForceSet {
			collide: Some(25.0),
			..bare_forces()
		};
		sim.configure(vec![Body::at(0.0, 0.0), Body::at(10.0, 0.0)], &[], forces);
		settle(&mut sim);
		let b = sim.bodies();
		let d = ((b[1].x - b[0].x).powi(2) + (b[1].y - b[0].y).powi(2)).sqrt();
		assert!(d >= 49.0, "separation {d}");
	}

	#[test]
	fn springs_pull_towards_rest_length() {
		let mut sim = ForceSimulation::default();
		sim.configure(
			vec![Body::at(0.0, 0.0), Body::at(300.0, 0.0)],
			&[link(0, 1, 1.0)],
			bare_forces(),
		);
		settle(&mut sim);
		let b = sim.bodies();
		let d = (b[1].x - b[0].x).abs();
		assert!((d - 30.0).abs() < 5.0, "length {d}");
	}

	#[test]
	fn pinned_body_follows_pin() {
		let mut sim = ForceSimulation::default();
		sim.configure(
			vec![Body::unplaced(); 3],
			&[link(0, 1, 0.8), link(1, 2, 0.8)],
			ForceSet::for_mode(LayoutMode::Tree, 800.0, 600.0),
		);
		sim.pin(1, 123.0, 45.0);
		for _ in 0..50 {
			sim.step();
		}
		assert_eq!((sim.bodies()[1].x, sim.bodies()[1].y), (123.0, 45.0));
		sim.unpin(1);
		assert_eq!(sim.bodies()[1].fx, None);
		sim.step();
		assert_ne!(sim.bodies()[1].x, 123.0);
	}

	#[test]
	fn step_without_configuration_is_inert() {
		let mut sim = ForceSimulation::default();
		sim.step();
		sim.restart();
		assert!(!sim.is_running());
		assert!(sim.bodies().is_empty());
	}
}
