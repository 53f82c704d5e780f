//! Wishlist Core Library
//!
//! This crate provides the core functionality for the gift wishlist:
//! guests browse gifts and reserve one, an administrator adds, edits and
//! deletes entries, and the whole collection is shared across devices
//! through one remote JSON document with a local cache as fallback.
//!
//! # Architecture
//!
//! - **Remote document**: shared source of truth (a GitHub gist file)
//! - **Local cache**: per-device copy used offline and on any remote failure
//!
//! `SyncedCollectionStore` reads through the remote and writes through
//! both. Every mutation persists the entire collection.
//!
//! # Quick Start
//!
//! ```text
//! let store = SyncedCollectionStore::from_config(&Config::load()?)?;
//!
//! let gifts = store.load().await;
//! let (gifts, _book) = wishlist::add(&gifts, GiftDraft::new("Book"))?;
//! store.save(&gifts).await;
//! ```
//!
//! # Modules
//!
//! - `store`: Synchronized collection store (main entry point)
//! - `models`: Gift record and schema validation
//! - `wishlist`: Operations over the whole collection
//! - `storage`: Local cache backends
//! - `remote`: Remote document backend
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;
pub mod wishlist;

pub use config::{Config, RemoteConfig};
pub use models::{price_from_f64, Gift, GiftDraft, Priority, ValidationError};
pub use remote::{Document, GistClient, RemoteDocumentStore, RemoteError};
pub use storage::{FileCache, LocalCache, MemoryCache, StorageError};
pub use store::{SaveOutcome, SyncedCollectionStore};
pub use wishlist::WishlistError;
