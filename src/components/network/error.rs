use thiserror::Error;

/// Why the graph data could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("request did not complete: {0}")]
	Transport(#[source] gloo_net::Error),
	#[error("server responded with status {status}")]
	Status { status: u16 },
	#[error("malformed graph payload: {0}")]
	Decode(#[from] serde_json::Error),
}

/// Why an image export did not produce a download.
#[derive(Debug, Error)]
pub enum ExportError {
	#[error("browser API unavailable: {0}")]
	Dom(String),
	#[error("scene could not be rasterized")]
	Rasterize,
}

impl From<wasm_bindgen::JsValue> for ExportError {
	fn from(value: wasm_bindgen::JsValue) -> Self {
		Self::Dom(format!("{value:?}"))
	}
}

/// A layout or color mode name that is not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown mode `{0}`")]
pub struct UnknownMode(pub String);
