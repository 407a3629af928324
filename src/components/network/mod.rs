//! Knowledge-point network view.
//!
//! Loads a similarity graph from the backend, lays it out with a force
//! simulation and draws it on a canvas with zoom, pan, drag, search, focus
//! and PNG export.

pub mod binder;
mod component;
pub mod degree;
pub mod error;
pub mod export;
pub mod interaction;
pub mod layout;
pub mod loader;
mod panels;
mod render;
pub mod scale;
pub mod scene;
pub mod search;
pub mod simulation;
pub mod state;
pub mod types;
pub mod viewport;

pub use component::KnowledgeNetworkView;
pub use state::KnowledgeNetwork;
pub use types::{KnowledgeGraph, NetworkPayload, NodeId};
