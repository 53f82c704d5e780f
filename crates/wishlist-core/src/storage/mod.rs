//! Local cache layer
//!
//! The per-device cache used as the offline/fallback copy of the
//! collection. The collection is stored under a single key as a
//! JSON-serialized array of gifts.

pub mod cache;
pub mod error;

pub use cache::{FileCache, LocalCache, MemoryCache};
pub use error::{StorageError, StorageResult};

/// Cache key holding the JSON-serialized gift collection
pub const GIFTS_KEY: &str = "wishlist-gifts";
