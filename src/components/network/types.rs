//! Graph data as served by the backend and as held by the component.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use log::warn;
use serde::Deserialize;

/// Stable identity of a knowledge point. All lookups key off this.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.0.fmt(f)
	}
}

/// Numeric cluster id. Any JSON number is accepted, and `2` and `2.0` name
/// the same cluster.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(transparent)]
pub struct ClusterId(pub f64);

impl ClusterId {
	fn bits(self) -> u64 {
		// folds -0.0 into 0.0
		(self.0 + 0.0).to_bits()
	}
}

impl PartialEq for ClusterId {
	fn eq(&self, other: &Self) -> bool {
		self.bits() == other.bits()
	}
}

impl Eq for ClusterId {}

impl Hash for ClusterId {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.bits().hash(state);
	}
}

fn uncategorized() -> String {
	"uncategorized".into()
}

/// A node record exactly as it arrives on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeRecord {
	pub id: NodeId,
	pub label: String,
	/// Longer summary text.
	#[serde(default)]
	pub title: String,
	#[serde(default = "uncategorized")]
	pub group: String,
	#[serde(default)]
	pub subcategory: Option<String>,
	#[serde(default)]
	pub cluster: Option<ClusterId>,
}

/// A weighted similarity edge as it arrives on the wire.
#[derive(Clone, Debug, Deserialize)]
pub struct LinkRecord {
	pub source: NodeId,
	pub target: NodeId,
	/// Similarity score, expected in `[0, 1]`.
	pub weight: f64,
}

/// Summary counters computed by the server.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Stats {
	pub node_count: usize,
	pub link_count: usize,
	#[serde(default)]
	pub min_similarity: Option<f64>,
}

/// Body of `GET /admin/api/network-data`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NetworkPayload {
	pub nodes: Vec<NodeRecord>,
	pub links: Vec<LinkRecord>,
	#[serde(default)]
	pub stats: Stats,
}

/// A node of the displayed graph, annotated with its connectivity.
#[derive(Clone, Debug, PartialEq)]
pub struct KnowledgeNode {
	pub id: NodeId,
	pub label: String,
	pub title: String,
	pub group: String,
	pub subcategory: Option<String>,
	pub cluster: Option<ClusterId>,
	/// Number of links touching this node.
	pub degree: usize,
	/// Adjacent nodes, one entry per touching link.
	pub connections: Vec<NodeId>,
}

impl From<NodeRecord> for KnowledgeNode {
	fn from(record: NodeRecord) -> Self {
		Self {
			id: record.id,
			label: record.label,
			title: record.title,
			group: record.group,
			subcategory: record.subcategory,
			cluster: record.cluster,
			degree: 0,
			connections: Vec::new(),
		}
	}
}

/// An edge whose endpoints are known to exist in the node set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
	pub source: NodeId,
	pub target: NodeId,
	pub weight: f64,
	/// Position of `source` in [`KnowledgeGraph::nodes`].
	pub source_index: usize,
	/// Position of `target` in [`KnowledgeGraph::nodes`].
	pub target_index: usize,
}

impl Link {
	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}
}

/// The full node/edge set of one load. Replaced wholesale on every reload.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeGraph {
	pub nodes: Vec<KnowledgeNode>,
	pub links: Vec<Link>,
	pub stats: Stats,
	index: HashMap<NodeId, usize>,
}

impl KnowledgeGraph {
	/// Builds the graph from a payload, dropping links with an unknown endpoint.
	pub fn from_payload(payload: NetworkPayload) -> Self {
		let nodes: Vec<KnowledgeNode> = payload.nodes.into_iter().map(Into::into).collect();
		let index: HashMap<NodeId, usize> =
			nodes.iter().enumerate().map(|(i, n)| (n.id, i)).collect();

		let total = payload.links.len();
		let links: Vec<Link> = payload
			.links
			.into_iter()
			.filter_map(|record| {
				let (&source_index, &target_index) =
					(index.get(&record.source)?, index.get(&record.target)?);
				Some(Link {
					source: record.source,
					target: record.target,
					weight: record.weight,
					source_index,
					target_index,
				})
			})
			.collect();
		if links.len() < total {
			warn!(
				"dropped {} link(s) referencing unknown nodes",
				total - links.len()
			);
		}

		let mut graph = Self {
			nodes,
			links,
			stats: payload.stats,
			index,
		};
		super::degree::compute_degrees(&mut graph.nodes, &graph.links);
		graph
	}

	pub fn index_of(&self, id: NodeId) -> Option<usize> {
		self.index.get(&id).copied()
	}

	pub fn node(&self, id: NodeId) -> Option<&KnowledgeNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	pub fn max_degree(&self) -> usize {
		self.nodes.iter().map(|n| n.degree).max().unwrap_or(0)
	}

	/// Mean degree, `None` for an empty node set.
	pub fn mean_degree(&self) -> Option<f64> {
		if self.nodes.is_empty() {
			return None;
		}
		let total: usize = self.nodes.iter().map(|n| n.degree).sum();
		Some(total as f64 / self.nodes.len() as f64)
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;

	pub(crate) fn record(id: i64, label: &str, group: &str) -> NodeRecord {
		NodeRecord {
			id: NodeId(id),
			label: label.into(),
			title: format!("summary of {label}"),
			group: group.into(),
			subcategory: None,
			cluster: None,
		}
	}

	pub(crate) fn edge(source: i64, target: i64, weight: f64) -> LinkRecord {
		LinkRecord {
			source: NodeId(source),
			target: NodeId(target),
			weight,
		}
	}

	pub(crate) fn graph(nodes: Vec<NodeRecord>, links: Vec<LinkRecord>) -> KnowledgeGraph {
		KnowledgeGraph::from_payload(NetworkPayload {
			stats: Stats {
				node_count: nodes.len(),
				link_count: links.len(),
				min_similarity: None,
			},
			nodes,
			links,
		})
	}

	#[test]
	fn decodes_backend_payload() {
		let json = r#"{
			"nodes": [
				{"id": 7, "label": "present perfect", "title": "have + p.p.", "group": "grammar", "subcategory": "tense"},
				{"id": 9, "label": "make vs do", "title": "collocations", "group": "vocabulary"}
			],
			"links": [{"source": 7, "target": 9, "weight": 0.83}],
			"stats": {"node_count": 2, "link_count": 1, "min_similarity": 0.8}
		}"#;
		let payload: NetworkPayload = serde_json::from_str(json).unwrap();
		assert_eq!(payload.nodes[0].id, NodeId(7));
		assert_eq!(payload.nodes[0].subcategory.as_deref(), Some("tense"));
		assert_eq!(payload.nodes[1].cluster, None);
		assert_eq!(payload.stats.min_similarity, Some(0.8));
	}

	#[test]
	fn cluster_accepts_any_number() {
		let json = r#"{
			"nodes": [
				{"id": 1, "label": "a", "cluster": -1},
				{"id": 2, "label": "b", "cluster": 2.0},
				{"id": 3, "label": "c", "cluster": 2},
				{"id": 4, "label": "d", "cluster": null}
			],
			"links": []
		}"#;
		let payload: NetworkPayload = serde_json::from_str(json).unwrap();
		assert_eq!(payload.nodes[0].cluster, Some(ClusterId(-1.0)));
		assert_eq!(payload.nodes[1].cluster, Some(ClusterId(2.0)));
		assert_eq!(payload.nodes[1].cluster, payload.nodes[2].cluster);
		assert_eq!(payload.nodes[3].cluster, None);
		assert_eq!(ClusterId(-0.0), ClusterId(0.0));
	}

	#[test]
	fn missing_optional_fields_fall_back() {
		let json = r#"{"nodes": [{"id": 1, "label": "x"}], "links": []}"#;
		let payload: NetworkPayload = serde_json::from_str(json).unwrap();
		assert_eq!(payload.nodes[0].group, "uncategorized");
		assert_eq!(payload.nodes[0].title, "");
		assert_eq!(payload.stats, Stats::default());
	}

	#[test]
	fn dangling_links_are_dropped_at_load() {
		let g = graph(
			vec![record(1, "A", "x"), record(2, "B", "x")],
			vec![edge(1, 2, 0.5), edge(1, 99, 0.9), edge(42, 2, 0.9)],
		);
		assert_eq!(g.links.len(), 1);
		assert_eq!(g.links[0].source_index, 0);
		assert_eq!(g.links[0].target_index, 1);
		// server counters are kept verbatim
		assert_eq!(g.stats.link_count, 3);
	}

	#[test]
	fn degree_summary() {
		let g = graph(
			vec![record(1, "A", "x"), record(2, "B", "x"), record(3, "C", "y")],
			vec![edge(1, 2, 0.5), edge(1, 3, 0.5)],
		);
		assert_eq!(g.max_degree(), 2);
		let mean = g.mean_degree().unwrap();
		assert!((mean - 4.0 / 3.0).abs() < 1e-9);
		assert_eq!(KnowledgeGraph::default().mean_degree(), None);
	}
}
