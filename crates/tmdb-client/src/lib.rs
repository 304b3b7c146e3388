//! TMDB client for MoviePulse.
//!
//! Async REST client for The Movie Database. It handles:
//! - API-key authentication via query parameter
//! - Per-request timeout and bounded retries with exponential backoff
//! - Null-safe mapping of TMDB JSON onto catalog types
//! - The `MovieProvider` implementation used by the recommendation strategies
//!
//! Endpoints: `movie/{id}?append_to_response=credits`, `movie/popular`,
//! `discover/movie`, `person/{id}/movie_credits`, `genre/movie/list`,
//! `search/movie`.

pub mod client;
pub mod error;
pub mod models;

pub use client::{DEFAULT_BASE_URL, TmdbClient, TmdbConfig};
pub use error::{Result, TmdbError};
