//! Fetching graph data from the backend.

use gloo_net::http::Request;
use leptos::prelude::*;
use log::{debug, warn};

use super::error::LoadError;
use super::types::NetworkPayload;
use crate::config::NetworkConfig;

/// Parameters of one graph-data request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NetworkQuery {
	/// Maximum number of nodes returned.
	pub limit: u32,
	/// Edges below this similarity are not returned.
	pub min_similarity: f64,
}

impl NetworkQuery {
	pub fn url(&self, endpoint: &str) -> String {
		format!(
			"{endpoint}?limit={}&min_similarity={}",
			self.limit,
			self.min_similarity.clamp(0.0, 1.0)
		)
	}
}

/// Decodes a response body.
pub fn parse_payload(body: &str) -> Result<NetworkPayload, LoadError> {
	Ok(serde_json::from_str(body)?)
}

/// Identifies one issued load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket(u64);

/// Hands out increasing tickets so responses of superseded loads can be dropped.
#[derive(Debug, Default)]
pub struct RequestSequencer {
	latest: u64,
}

impl RequestSequencer {
	pub fn issue(&mut self) -> Ticket {
		self.latest += 1;
		Ticket(self.latest)
	}

	/// True when no newer ticket has been issued since `ticket`.
	pub fn is_current(&self, ticket: Ticket) -> bool {
		ticket.0 == self.latest
	}
}

/// Authenticated client for the graph-data endpoint.
#[derive(Clone, Debug)]
pub struct HttpGraphSource {
	endpoint: String,
	token_key: String,
}

impl HttpGraphSource {
	pub fn new(config: &NetworkConfig) -> Self {
		Self {
			endpoint: config.endpoint.clone(),
			token_key: config.token_key.clone(),
		}
	}

	pub async fn fetch(&self, query: NetworkQuery) -> Result<NetworkPayload, LoadError> {
		let url = query.url(&self.endpoint);
		debug!("fetching {url}");

		let mut request = Request::get(&url);
		match bearer_token(&self.token_key) {
			Some(token) => request = request.header("Authorization", &format!("Bearer {token}")),
			None => warn!("no `{}` in local storage, sending unauthenticated", self.token_key),
		}

		let response = request.send().await.map_err(LoadError::Transport)?;
		if !response.ok() {
			return Err(LoadError::Status {
				status: response.status(),
			});
		}
		let body = response.text().await.map_err(LoadError::Transport)?;
		parse_payload(&body)
	}
}

fn bearer_token(key: &str) -> Option<String> {
	web_sys::window()?
		.local_storage()
		.ok()??
		.get_item(key)
		.ok()?
}

/// Counts a load as in flight for as long as it lives.
///
/// The counter is decremented on drop, so the loading indicator clears on
/// every exit path of a load.
pub struct LoadingGuard {
	in_flight: RwSignal<usize>,
}

impl LoadingGuard {
	pub fn new(in_flight: RwSignal<usize>) -> Self {
		in_flight.update(|n| *n += 1);
		Self { in_flight }
	}
}

impl Drop for LoadingGuard {
	fn drop(&mut self) {
		self.in_flight.try_update(|n| *n = n.saturating_sub(1));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn query_url() {
		let q = NetworkQuery {
			limit: 50,
			min_similarity: 0.8,
		};
		assert_eq!(
			q.url("/admin/api/network-data"),
			"/admin/api/network-data?limit=50&min_similarity=0.8"
		);
		let q = NetworkQuery {
			limit: 10,
			min_similarity: 1.7,
		};
		assert_eq!(q.url("/x"), "/x?limit=10&min_similarity=1");
	}

	#[test]
	fn loading_guard_clears_on_every_exit() {
		let in_flight = RwSignal::new(0usize);
		{
			let _first = LoadingGuard::new(in_flight);
			let second = LoadingGuard::new(in_flight);
			assert_eq!(in_flight.get_untracked(), 2);
			// a failed load drops its guard before the other settles
			drop(second);
			assert_eq!(in_flight.get_untracked(), 1);
		}
		assert_eq!(in_flight.get_untracked(), 0);

		let failing = || -> Result<(), LoadError> {
			let _guard = LoadingGuard::new(in_flight);
			Err(LoadError::Status { status: 503 })
		};
		assert!(failing().is_err());
		assert_eq!(in_flight.get_untracked(), 0);
	}

	#[test]
	fn stale_tickets_are_not_current() {
		let mut seq = RequestSequencer::default();
		let first = seq.issue();
		assert!(seq.is_current(first));
		let second = seq.issue();
		assert!(!seq.is_current(first));
		assert!(seq.is_current(second));
	}

	#[test]
	fn bad_body_is_a_decode_error() {
		assert!(matches!(
			parse_payload("<html>login</html>"),
			Err(LoadError::Decode(_))
		));
		assert!(matches!(
			parse_payload(r#"{"nodes": [{"id": "x"}], "links": []}"#),
			Err(LoadError::Decode(_))
		));
		let ok = parse_payload(r#"{"nodes": [], "links": [], "stats": {"node_count": 0, "link_count": 0}}"#);
		assert!(ok.is_ok());
	}
}
