use std::collections::HashMap;

use super::types::{KnowledgeNode, Link, LinkRecord, NodeId};

/// Anything that names two node ids.
pub trait Endpoints {
	fn endpoints(&self) -> (NodeId, NodeId);
}

impl Endpoints for Link {
	fn endpoints(&self) -> (NodeId, NodeId) {
		(self.source, self.target)
	}
}

impl Endpoints for LinkRecord {
	fn endpoints(&self) -> (NodeId, NodeId) {
		(self.source, self.target)
	}
}

/// Annotates every node with its degree and adjacency list.
///
/// Prior annotations are reset first, so applying this twice is the same as
/// applying it once. Links with an endpoint missing from `nodes` are skipped.
pub fn compute_degrees<L: Endpoints>(nodes: &mut [KnowledgeNode], links: &[L]) {
	let mut index = HashMap::with_capacity(nodes.len());
	for (i, node) in nodes.iter_mut().enumerate() {
		node.degree = 0;
		node.connections.clear();
		index.insert(node.id, i);
	}

	for link in links {
		let (source, target) = link.endpoints();
		let (Some(&s), Some(&t)) = (index.get(&source), index.get(&target)) else {
			continue;
		};
		nodes[s].degree += 1;
		nodes[t].degree += 1;
		nodes[s].connections.push(target);
		nodes[t].connections.push(source);
	}
}
