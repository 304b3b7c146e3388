//! Server crate for the MoviePulse recommendation engine.
//!
//! This crate contains the orchestrator that wires the catalog, the movie
//! provider, the strategy pipeline and the user stores together, plus the
//! environment-driven settings it is built from.

pub mod orchestrator;
pub mod settings;

pub use orchestrator::{RecommendationOrchestrator, RecommendationResponse, ResponseMetadata};
pub use settings::Settings;
