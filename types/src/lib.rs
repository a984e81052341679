//! Fundamental types for the governance cache.
//!
//! This crate defines the small value types shared across every other crate
//! in the workspace: proposal tokens, timestamps, record statuses, and the
//! identity of the governance plugin whose tables the cache maintains.

pub mod action;
pub mod plugin;
pub mod status;
pub mod time;
pub mod token;

pub use action::{AuthorizeAction, LikeAction};
pub use plugin::{PLUGIN_CACHE_VERSION, PLUGIN_ID};
pub use status::RecordStatus;
pub use time::Timestamp;
pub use token::Token;
