//! Data models for the wishlist
//!
//! Defines the only domain entity, `Gift`, together with its `Priority`
//! and the admin-editable subset of fields (`GiftDraft`).
//!
//! Field names serialize exactly as they appear in the shared remote
//! document, so records written by other clients round-trip untouched.
//! Decoding is lenient: values this model does not recognise (an unknown
//! priority, a free-form timestamp, an integer price) are kept as written.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Last id handed out by `next_gift_id` in this process
static LAST_GIFT_ID: AtomicI64 = AtomicI64::new(0);

/// Largest integer an `f64` holds exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// How much the wishlist owner wants a gift
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "Option<String>", into = "String")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    /// A value written by another client, kept verbatim
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
            Priority::Other(value) => value,
        }
    }
}

impl From<Option<String>> for Priority {
    fn from(value: Option<String>) -> Self {
        let Some(value) = value else {
            return Priority::Medium;
        };
        match value.as_str() {
            "high" => Priority::High,
            "medium" => Priority::Medium,
            "low" => Priority::Low,
            _ => Priority::Other(value),
        }
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        match priority {
            Priority::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strict parsing for user input; only the three known levels are accepted
impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!(
                "Invalid priority '{}'. Use high, medium, or low.",
                other
            )),
        }
    }
}

/// A gift on the wishlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gift {
    /// Unique identifier (millisecond timestamp string)
    #[serde(default)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price exactly as written; `1500` stays an integer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Where the gift can be bought
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_reserved: bool,
    /// Who reserved the gift
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_by: Option<String>,
    /// When the gift was reserved, as an ISO 8601 string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserved_at: Option<String>,
    /// Fields written by other clients that this model does not know about
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Gift {
    /// Create a new, unreserved gift with a freshly generated id
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(next_gift_id(), name)
    }

    /// Create a gift with a specific ID (for loading from storage)
    pub fn with_id(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price: None,
            image_url: None,
            link: None,
            priority: Priority::default(),
            is_reserved: false,
            reserved_by: None,
            reserved_at: None,
            extra: Map::new(),
        }
    }

    /// Create a gift from admin-entered fields
    pub fn from_draft(draft: GiftDraft) -> Self {
        let mut gift = Self::new(String::new());
        gift.apply_draft(draft);
        gift
    }

    /// Replace every admin-editable field, leaving id and reservation alone
    pub fn apply_draft(&mut self, draft: GiftDraft) {
        self.name = draft.name;
        self.description = draft.description;
        self.price = draft.price;
        self.image_url = draft.image_url;
        self.link = draft.link;
        self.priority = draft.priority;
    }

    /// The admin-editable fields of this gift
    pub fn draft(&self) -> GiftDraft {
        GiftDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price.clone(),
            image_url: self.image_url.clone(),
            link: self.link.clone(),
            priority: self.priority.clone(),
        }
    }

    /// Price as a float, for display and comparison
    pub fn price_amount(&self) -> Option<f64> {
        self.price.as_ref().and_then(Number::as_f64)
    }

    /// Parsed reservation time, if `reserved_at` is a valid RFC 3339 timestamp
    pub fn reserved_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.reserved_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }

    /// Mark the gift as reserved by `name` at `at`
    ///
    /// Sets all three reservation fields together. There is no inverse.
    pub fn reserve(&mut self, name: impl Into<String>, at: DateTime<Utc>) {
        self.is_reserved = true;
        self.reserved_by = Some(name.into());
        self.reserved_at = Some(at.to_rfc3339_opts(SecondsFormat::Millis, true));
    }

    /// Check the record against the gift schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        check_editable(&self.id, &self.name, self.price.as_ref())?;

        let has_reservation = self.reserved_by.is_some() && self.reserved_at.is_some();
        let has_any_reservation_field = self.reserved_by.is_some() || self.reserved_at.is_some();
        if self.is_reserved != has_reservation
            || (!self.is_reserved && has_any_reservation_field)
        {
            return Err(ValidationError::InconsistentReservation {
                id: self.id.clone(),
            });
        }
        if let Some(raw) = &self.reserved_at {
            if self.reserved_time().is_none() {
                return Err(ValidationError::InvalidReservationTime {
                    id: self.id.clone(),
                    value: raw.clone(),
                });
            }
        }

        Ok(())
    }
}

fn check_editable(id: &str, name: &str, price: Option<&Number>) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName { id: id.to_string() });
    }
    if let Some(price) = price {
        if price.as_f64().map_or(true, |p| !p.is_finite() || p < 0.0) {
            return Err(ValidationError::InvalidPrice {
                id: id.to_string(),
                price: price.to_string(),
            });
        }
    }
    Ok(())
}

/// The fields an administrator may set on a gift
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GiftDraft {
    pub name: String,
    pub description: Option<String>,
    pub price: Option<Number>,
    pub image_url: Option<String>,
    pub link: Option<String>,
    pub priority: Priority,
}

impl GiftDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Check the draft before it is applied to the gift with `id`
    pub fn validate(&self, id: &str) -> Result<(), ValidationError> {
        check_editable(id, &self.name, self.price.as_ref())
    }
}

/// Convert a user-entered price to a JSON number
///
/// Whole amounts become integers. Returns `None` for NaN and infinities.
pub fn price_from_f64(value: f64) -> Option<Number> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

/// Decode gift records one at a time
///
/// Records that do not fit `Gift` at all (not an object, a price written
/// as text, ...) are returned unchanged in the second list.
pub fn decode_gifts(records: Vec<Value>) -> (Vec<Gift>, Vec<Value>) {
    let mut gifts = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    for record in records {
        match Gift::deserialize(&record) {
            Ok(gift) => gifts.push(gift),
            Err(_) => unreadable.push(record),
        }
    }
    (gifts, unreadable)
}

/// Schema violations in a gift or a collection of gifts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Gift id must not be empty")]
    EmptyId,

    #[error("Gift '{id}' has an empty name")]
    EmptyName { id: String },

    #[error("Gift '{id}' has an invalid price {price}; prices must be non-negative")]
    InvalidPrice { id: String, price: String },

    /// `is_reserved` disagrees with `reserved_by`/`reserved_at`
    #[error("Gift '{id}' has inconsistent reservation fields")]
    InconsistentReservation { id: String },

    #[error("Gift '{id}' has an unreadable reservation time '{value}'")]
    InvalidReservationTime { id: String, value: String },

    #[error("Duplicate gift id '{id}' in collection")]
    DuplicateId { id: String },
}

/// Generate a gift id from the current time in milliseconds
///
/// Ids are strictly increasing within one process even when called
/// several times in the same millisecond.
pub fn next_gift_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut last = LAST_GIFT_ID.load(Ordering::Relaxed);
    loop {
        let candidate = now.max(last + 1);
        match LAST_GIFT_ID.compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return candidate.to_string(),
            Err(actual) => last = actual,
        }
    }
}
