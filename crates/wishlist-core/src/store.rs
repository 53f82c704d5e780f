//! Synchronized collection store
//!
//! `SyncedCollectionStore` keeps the local cache and the remote document
//! eventually consistent for the gift collection, and always hands back
//! usable data even when the remote is unreachable or unconfigured.
//!
//! ## Read path (`load`)
//!
//! - Remote unconfigured: read the local cache.
//! - Otherwise GET the remote document and return its `gifts` field.
//!   The local cache is not touched.
//! - Any remote failure (transport, non-2xx, malformed JSON): fall back
//!   to the local cache.
//!
//! ## Write path (`save`)
//!
//! 1. Write the whole collection to the local cache. If that fails the
//!    save stops here. Schema violations are logged, never blocking: the
//!    collection operations already check what the caller changed.
//! 2. Remote unconfigured: done, persisted locally only.
//! 3. Read-modify-write: GET the remote document (seed document on any
//!    failure), replace only `gifts`, PATCH the whole document back.
//!
//! ## Consistency
//!
//! Last write wins. Nothing guards the gap between the GET and the PATCH,
//! so two writers racing can silently drop one another's changes, and
//! overlapping `save` calls in one process race the same way. Callers
//! adopt the collection they saved as their new state regardless of the
//! outcome.

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::{decode_gifts, Gift};
use crate::remote::{Document, GistClient, RemoteDocumentStore};
use crate::storage::{FileCache, LocalCache, StorageError, GIFTS_KEY};
use crate::wishlist::validate_collection;

/// What happened to a collection passed to `save`
#[derive(Debug)]
pub enum SaveOutcome {
    /// Written to the local cache and the remote document
    Synced,
    /// Written to the local cache only; the reason the remote half did not happen
    LocalOnly(String),
    /// The local cache write failed; no remote write was attempted
    LocalWriteFailed(StorageError),
}

impl SaveOutcome {
    /// Whether the remote document now holds the collection
    pub fn is_synced(&self) -> bool {
        matches!(self, SaveOutcome::Synced)
    }

    /// Whether the local cache now holds the collection
    pub fn is_persisted_locally(&self) -> bool {
        matches!(self, SaveOutcome::Synced | SaveOutcome::LocalOnly(_))
    }
}

/// Read-through / write-through store for the gift collection
pub struct SyncedCollectionStore {
    cache: Box<dyn LocalCache>,
    remote: Option<Box<dyn RemoteDocumentStore>>,
    key: String,
}

impl SyncedCollectionStore {
    /// Create a local-only store over `cache`
    pub fn new(cache: impl LocalCache + 'static) -> Self {
        Self {
            cache: Box::new(cache),
            remote: None,
            key: GIFTS_KEY.to_string(),
        }
    }

    /// Attach a remote document backend
    pub fn with_remote(mut self, remote: impl RemoteDocumentStore + 'static) -> Self {
        self.remote = Some(Box::new(remote));
        self
    }

    /// Build the store described by `config`
    ///
    /// Uses a file cache under `data_dir`, plus a gist backend when the
    /// remote is enabled and both credential and document id are set.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache = FileCache::open(&config.data_dir)?;
        let mut store = Self::new(cache);

        match config.remote() {
            Some(remote) => {
                let client = GistClient::new(&remote)?;
                info!("Remote sync enabled: {}", client.describe());
                store = store.with_remote(client);
            }
            None => info!("Remote sync not configured, using local cache only"),
        }

        Ok(store)
    }

    /// Whether a remote backend is attached
    pub fn is_remote_configured(&self) -> bool {
        self.remote.is_some()
    }

    /// Description of the remote backend, if any
    pub fn remote_description(&self) -> Option<String> {
        self.remote.as_ref().map(|r| r.describe())
    }

    /// Where the local cache keeps its data
    pub fn cache_location(&self) -> String {
        self.cache.location()
    }

    /// Load the collection
    ///
    /// Never fails: remote problems fall back to the local cache, and an
    /// empty or unreadable cache yields an empty collection.
    pub async fn load(&self) -> Vec<Gift> {
        let Some(remote) = &self.remote else {
            debug!("Remote not configured, loading from local cache");
            return self.load_local();
        };

        let gifts = match remote.fetch().await {
            Ok(Some(document)) => document.gifts(),
            Ok(None) => Ok(Vec::new()),
            Err(e) => Err(e),
        };

        match gifts {
            Ok(gifts) => {
                debug!("Loaded {} gift(s) from remote", gifts.len());
                warn_on_invalid(&gifts, "Remote");
                gifts
            }
            Err(e) => {
                warn!("Failed to load from remote, using local cache: {}", e);
                self.load_local()
            }
        }
    }

    /// Load the collection from the local cache only
    pub fn load_local(&self) -> Vec<Gift> {
        match self.read_cache() {
            Ok(gifts) => {
                debug!("Loaded {} gift(s) from local cache", gifts.len());
                warn_on_invalid(&gifts, "Cached");
                gifts
            }
            Err(e) => {
                error!("Local cache unreadable, treating as empty: {}", e);
                Vec::new()
            }
        }
    }

    fn read_cache(&self) -> Result<Vec<Gift>, StorageError> {
        let Some(raw) = self.cache.get(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let records: Vec<serde_json::Value> =
            serde_json::from_str(&raw).map_err(|e| StorageError::CorruptEntry {
                key: self.key.clone(),
                details: e.to_string(),
            })?;

        let (gifts, unreadable) = decode_gifts(records);
        if !unreadable.is_empty() {
            warn!(
                "Skipping {} unreadable gift record(s) in local cache",
                unreadable.len()
            );
        }
        Ok(gifts)
    }

    /// Save the collection; `true` only if the remote document was updated
    ///
    /// `false` covers local-only persistence as well as failures. See
    /// `save_with_outcome` for the distinction.
    pub async fn save(&self, gifts: &[Gift]) -> bool {
        self.save_with_outcome(gifts).await.is_synced()
    }

    /// Save the collection and report exactly where it was persisted
    pub async fn save_with_outcome(&self, gifts: &[Gift]) -> SaveOutcome {
        warn_on_invalid(gifts, "Saved");

        if let Err(e) = self.write_cache(gifts) {
            error!("Failed to write local cache, skipping remote save: {}", e);
            return SaveOutcome::LocalWriteFailed(e);
        }
        debug!("Saved {} gift(s) to local cache", gifts.len());

        let Some(remote) = &self.remote else {
            info!("Remote not configured, data saved locally only");
            return SaveOutcome::LocalOnly("remote not configured".to_string());
        };

        let current = match remote.fetch().await {
            Ok(Some(document)) => document,
            Ok(None) => Document::seed(),
            Err(e) => {
                warn!("Could not read remote document before write, starting from empty: {}", e);
                Document::seed()
            }
        };

        let merged = match current.with_gifts(gifts) {
            Ok(document) => document,
            Err(e) => {
                warn!("Failed to merge collection into remote document: {}", e);
                return SaveOutcome::LocalOnly(e.to_string());
            }
        };

        match remote.replace(&merged).await {
            Ok(()) => {
                info!("Saved {} gift(s) to remote", gifts.len());
                SaveOutcome::Synced
            }
            Err(e) => {
                warn!("Failed to save to remote, data saved locally only: {}", e);
                SaveOutcome::LocalOnly(e.to_string())
            }
        }
    }

    fn write_cache(&self, gifts: &[Gift]) -> Result<(), StorageError> {
        let json = serde_json::to_string(gifts)?;
        self.cache.set(&self.key, &json)
    }
}

fn warn_on_invalid(gifts: &[Gift], source: &str) {
    if let Err(e) = validate_collection(gifts) {
        warn!("{} collection violates the gift schema: {}", source, e);
    }
}
