//! Remote document backend
//!
//! The shared source of truth across devices is a single JSON document
//! addressed by one identifier. Only its `gifts` field belongs to us;
//! every other top-level field is carried through untouched on write.
//!
//! ## Document shape
//!
//! ```text
//! { "gifts": [Gift, ...], "users": [...], ...other fields }
//! ```
//!
//! Gift records are decoded one by one. A record that cannot be read as a
//! `Gift` is hidden from callers but written back unchanged on the next
//! save, so one odd entry never costs the rest of the list.

mod gist;

use std::collections::HashSet;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::models::{decode_gifts, Gift};

pub use gist::GistClient;

/// Top-level field holding the gift collection
pub const GIFTS_FIELD: &str = "gifts";

/// Errors talking to the remote document backend
///
/// None of these cross the `SyncedCollectionStore` boundary; they are
/// logged and turned into a fallback read or a non-synced save.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request never produced a response (DNS, connect, timeout, ...)
    #[error("Remote unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Remote rejected request with status {status}")]
    Rejected { status: u16 },

    /// Document body could not be decoded
    #[error("Malformed remote document: {0}")]
    Malformed(String),

    /// Collection could not be encoded into the document
    #[error("Failed to encode remote document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RemoteError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Unreachable(e) if e.is_timeout())
    }
}

/// A remote JSON document: an object with named top-level fields
#[derive(Debug, Clone, PartialEq)]
pub struct Document(Map<String, Value>);

impl Document {
    /// The document assumed when the remote copy is missing or unreadable
    pub fn seed() -> Self {
        let mut fields = Map::new();
        fields.insert(GIFTS_FIELD.to_string(), Value::Array(Vec::new()));
        fields.insert("users".to_string(), Value::Array(Vec::new()));
        Self(fields)
    }

    /// Parse document text; the top level must be a JSON object
    pub fn parse(content: &str) -> Result<Self, RemoteError> {
        let value: Value =
            serde_json::from_str(content).map_err(|e| RemoteError::Malformed(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, RemoteError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(RemoteError::Malformed(format!(
                "expected a JSON object at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Decode the gift collection; absent or `null` means empty
    ///
    /// Only a `gifts` field that is not an array is malformed. Individual
    /// records that do not decode are skipped; see `unreadable_gifts`.
    pub fn gifts(&self) -> Result<Vec<Gift>, RemoteError> {
        let (gifts, unreadable) = decode_gifts(self.gift_records()?);
        if !unreadable.is_empty() {
            warn!(
                "Skipping {} unreadable gift record(s) in remote document",
                unreadable.len()
            );
        }
        Ok(gifts)
    }

    /// Gift records that could not be decoded, exactly as stored
    pub fn unreadable_gifts(&self) -> Result<Vec<Value>, RemoteError> {
        let (_, unreadable) = decode_gifts(self.gift_records()?);
        Ok(unreadable)
    }

    fn gift_records(&self) -> Result<Vec<Value>, RemoteError> {
        match self.0.get(GIFTS_FIELD) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(records)) => Ok(records.clone()),
            Some(other) => Err(RemoteError::Malformed(format!(
                "invalid '{}': expected an array, found {}",
                GIFTS_FIELD,
                json_kind(other)
            ))),
        }
    }

    /// Replace only the gift collection, keeping every other field
    ///
    /// Records in the current collection that could not be decoded are
    /// appended unchanged, unless `gifts` holds a record with the same id.
    pub fn with_gifts(mut self, gifts: &[Gift]) -> Result<Self, RemoteError> {
        let carried = self.unreadable_gifts().unwrap_or_default();
        let ids: HashSet<&str> = gifts.iter().map(|g| g.id.as_str()).collect();

        let mut records = Vec::with_capacity(gifts.len() + carried.len());
        for gift in gifts {
            records.push(serde_json::to_value(gift)?);
        }
        records.extend(carried.into_iter().filter(|record| {
            record
                .get("id")
                .and_then(Value::as_str)
                .map_or(true, |id| !ids.contains(id))
        }));

        self.0.insert(GIFTS_FIELD.to_string(), Value::Array(records));
        Ok(self)
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Pretty-printed JSON text, as written back to the backend
    pub fn to_pretty_string(&self) -> Result<String, RemoteError> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Whole-document GET/replace access to the remote backend
///
/// There is no version check between `fetch` and `replace`: the last
/// `replace` to land wins.
#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Fetch the current document
    ///
    /// Returns `Ok(None)` when the backend holds no document content yet.
    async fn fetch(&self) -> Result<Option<Document>, RemoteError>;

    /// Overwrite the document with `document`
    async fn replace(&self, document: &Document) -> Result<(), RemoteError>;

    /// Human-readable identity of the remote, for status output
    fn describe(&self) -> String;
}
