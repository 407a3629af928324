//! Color modes, color scales and the legend.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use super::error::UnknownMode;
use super::types::{ClusterId, KnowledgeNode};

pub const CATEGORY10: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

pub const SET3: &[&str] = &[
	"#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
	"#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

pub const BLUES: &[&str] = &[
	"#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
	"#08306b",
];

pub const FALLBACK_COLOR: &str = "#1f77b4";

/// Which node attribute drives node color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
	#[default]
	Category,
	Degree,
	Cluster,
	/// Every node gets [`FALLBACK_COLOR`].
	Uniform,
}

impl ColorMode {
	/// Modes offered in the selector.
	pub const SELECTABLE: [ColorMode; 3] = [Self::Category, Self::Degree, Self::Cluster];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Category => "category",
			Self::Degree => "degree",
			Self::Cluster => "cluster",
			Self::Uniform => "uniform",
		}
	}

	/// Lenient parse; unknown names color everything with the fallback.
	pub fn from_name(name: &str) -> Self {
		name.parse().unwrap_or(Self::Uniform)
	}
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ColorMode {
	type Err = UnknownMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::SELECTABLE
			.into_iter()
			.find(|mode| mode.as_str() == s)
			.ok_or_else(|| UnknownMode(s.to_owned()))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Rgb(u8, u8, u8);

impl Rgb {
	fn parse(hex: &str) -> Option<Self> {
		let hex = hex.strip_prefix('#')?;
		let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
		Some(Self(channel(0)?, channel(2)?, channel(4)?))
	}

	fn lerp(self, other: Self, t: f64) -> Self {
		let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
		Self(
			mix(self.0, other.0),
			mix(self.1, other.1),
			mix(self.2, other.2),
		)
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "rgb({}, {}, {})", self.0, self.1, self.2)
	}
}

/// Categorical scale assigning range colors in first-seen key order.
#[derive(Clone, Debug)]
pub struct OrdinalScale<K> {
	range: &'static [&'static str],
	assigned: HashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> OrdinalScale<K> {
	pub fn new(range: &'static [&'static str]) -> Self {
		Self {
			range,
			assigned: HashMap::new(),
		}
	}

	pub fn color(&mut self, key: &K) -> &'static str {
		let next = self.assigned.len();
		let slot = *self.assigned.entry(key.clone()).or_insert(next);
		self.range[slot % self.range.len()]
	}
}

/// Continuous scale from a domain onto a ramp of color stops.
#[derive(Clone, Debug)]
pub struct SequentialScale {
	domain: (f64, f64),
	stops: &'static [&'static str],
}

impl SequentialScale {
	pub fn new(stops: &'static [&'static str]) -> Self {
		Self {
			domain: (0.0, 1.0),
			stops,
		}
	}

	pub fn set_domain(&mut self, lo: f64, hi: f64) {
		self.domain = (lo, hi);
	}

	pub fn color(&self, value: f64) -> String {
		let (lo, hi) = self.domain;
		// A degenerate domain maps everything to the middle of the ramp.
		let t = if hi == lo {
			0.5
		} else {
			((value - lo) / (hi - lo)).clamp(0.0, 1.0)
		};
		self.interpolate(t).to_string()
	}

	fn interpolate(&self, t: f64) -> Rgb {
		let stops: Vec<Rgb> = self.stops.iter().filter_map(|s| Rgb::parse(s)).collect();
		match stops.len() {
			0 => Rgb(0, 0, 0),
			1 => stops[0],
			n => {
				let pos = t * (n - 1) as f64;
				let i = (pos.floor() as usize).min(n - 2);
				stops[i].lerp(stops[i + 1], pos - i as f64)
			}
		}
	}
}

/// All node color scales of one component instance.
///
/// Categorical assignments persist across reloads so a group keeps its color.
#[derive(Clone, Debug)]
pub struct NodePalette {
	category: OrdinalScale<String>,
	cluster: OrdinalScale<ClusterId>,
	degree: SequentialScale,
}

impl Default for NodePalette {
	fn default() -> Self {
		Self {
			category: OrdinalScale::new(CATEGORY10),
			cluster: OrdinalScale::new(SET3),
			degree: SequentialScale::new(BLUES),
		}
	}
}

impl NodePalette {
	/// Fits the degree scale to `[0, max_degree]`.
	pub fn fit_degrees(&mut self, max_degree: usize) {
		self.degree.set_domain(0.0, max_degree as f64);
	}

	pub fn node_color(&mut self, node: &KnowledgeNode, mode: ColorMode) -> String {
		match mode {
			ColorMode::Category => self.category.color(&node.group).into(),
			ColorMode::Degree => self.degree.color(node.degree as f64),
			ColorMode::Cluster => self.cluster.color(&node.cluster.unwrap_or(ClusterId(0.0))).into(),
			ColorMode::Uniform => FALLBACK_COLOR.into(),
		}
	}

	pub fn legend(&mut self, nodes: &[KnowledgeNode], mode: ColorMode) -> Vec<LegendEntry> {
		match mode {
			ColorMode::Category => {
				let mut seen = Vec::<&str>::new();
				for node in nodes {
					if !seen.contains(&node.group.as_str()) {
						seen.push(&node.group);
					}
				}
				seen.into_iter()
					.map(|group| LegendEntry::Swatch {
						color: self.category.color(&group.to_owned()).into(),
						label: group.to_owned(),
					})
					.collect()
			}
			ColorMode::Degree => vec![LegendEntry::Gradient {
				from: BLUES[0],
				to: BLUES[7],
				label: "Connections (low → high)".into(),
			}],
			ColorMode::Cluster => vec![LegendEntry::Note("Colored by cluster".into())],
			ColorMode::Uniform => Vec::new(),
		}
	}
}

/// One row of the color legend.
#[derive(Clone, Debug, PartialEq)]
pub enum LegendEntry {
	Swatch { color: String, label: String },
	Gradient {
		from: &'static str,
		to: &'static str,
		label: String,
	},
	Note(String),
}
