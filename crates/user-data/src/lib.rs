//! # User Data Crate
//!
//! Flat-file stores for per-user state:
//! - **WatchHistory**: `watch_history.jsonl` log and `user_affinity.json` summaries
//! - **ProfileStore**: `user_profiles.json` explicit preferences
//! - **Watchlist**: `watchlist.json`
//! - **FeedbackLogger**: `recommendation_analytics.jsonl` analytics events
//!
//! Stores read and rewrite their files on every call and do no cross-process
//! locking; concurrent writers may lose updates.

pub mod error;
pub mod feedback;
mod files;
pub mod profile;
pub mod watch_history;
pub mod watchlist;

pub use error::{Result, StoreError};
pub use feedback::{ContextSummary, FeedbackEvent, FeedbackLogger};
pub use profile::{ProfileStore, UserProfile};
pub use watch_history::{
    SOURCE_ORGANIC, SOURCE_RECOMMENDATION, UNKNOWN_GENRE, UserAffinity, WatchEntry, WatchHistory,
};
pub use watchlist::{Watchlist, WatchlistItem};
