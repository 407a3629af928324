//! Component configuration.

/// Settings for a knowledge network view.
#[derive(Clone, Debug, PartialEq)]
pub struct NetworkConfig {
	/// Graph-data endpoint, queried with `limit` and `min_similarity`.
	pub endpoint: String,
	/// `localStorage` key holding the bearer token.
	pub token_key: String,
	pub default_limit: u32,
	pub default_min_similarity: f64,
	/// Canvas height in CSS pixels. Width follows the container.
	pub height: f64,
	pub export_file_name: String,
	/// Maximum number of search hits listed.
	pub search_limit: usize,
}

impl Default for NetworkConfig {
	fn default() -> Self {
		Self {
			endpoint: "/admin/api/network-data".into(),
			token_key: "jwt_token".into(),
			default_limit: 50,
			default_min_similarity: 0.8,
			height: 600.0,
			export_file_name: "knowledge-network.png".into(),
			search_limit: 10,
		}
	}
}
