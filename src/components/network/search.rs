use super::types::{KnowledgeNode, NodeId};

/// One entry of the search results list.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
	pub id: NodeId,
	pub label: String,
	pub summary: String,
}

/// Case-insensitive substring search over label and summary.
///
/// Hits keep the nodes' order and are capped at `limit`. A blank query
/// matches nothing.
pub fn search(nodes: &[KnowledgeNode], query: &str, limit: usize) -> Vec<SearchHit> {
	let needle = query.trim().to_lowercase();
	if needle.is_empty() {
		return Vec::new();
	}
	nodes
		.iter()
		.filter(|node| {
			node.label.to_lowercase().contains(&needle) || node.title.to_lowercase().contains(&needle)
		})
		.take(limit)
		.map(|node| SearchHit {
			id: node.id,
			label: node.label.clone(),
			summary: node.title.clone(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::types::tests::record;

	fn nodes() -> Vec<KnowledgeNode> {
		let mut ns: Vec<KnowledgeNode> = (0..30)
			.map(|i| record(i, &format!("Phrase {i}"), "g").into())
			.collect();
		ns[3].title = "Uses the PRESENT perfect".into();
		ns[4].label = "present simple".into();
		ns
	}

	#[test]
	fn matches_label_or_summary_case_insensitively() {
		let hits = search(&nodes(), "Present", 10);
		let ids: Vec<i64> = hits.iter().map(|h| h.id.0).collect();
		assert_eq!(ids, vec![3, 4]);
	}

	#[test]
	fn at_most_limit_in_node_order() {
		let hits = search(&nodes(), "phrase", 10);
		assert_eq!(hits.len(), 10);
		let ids: Vec<i64> = hits.iter().map(|h| h.id.0).collect();
		assert_eq!(ids, (0..10).collect::<Vec<_>>());
		for hit in &hits {
			let hay = format!("{} {}", hit.label, hit.summary).to_lowercase();
			assert!(hay.contains("phrase"));
		}
	}

	#[test]
	fn blank_query_matches_nothing() {
		assert!(search(&nodes(), "", 10).is_empty());
		assert!(search(&nodes(), "   ", 10).is_empty());
		assert!(search(&nodes(), "zzz", 10).is_empty());
	}
}
