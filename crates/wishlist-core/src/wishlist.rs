//! Collection operations
//!
//! The whole gift collection is the unit of persistence, so every
//! mutation here takes the current collection and returns the next one.
//! Callers hand the result to `SyncedCollectionStore::save` and adopt it
//! as their new state whether or not the remote sync succeeded.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::{Gift, GiftDraft, ValidationError};

/// Errors from collection operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WishlistError {
    #[error("Gift not found: {0}")]
    NotFound(String),

    #[error("Gift '{name}' is already reserved")]
    AlreadyReserved { name: String },

    #[error("A name is required to reserve a gift")]
    MissingReserverName,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Add a new gift built from `draft`
///
/// Returns the new collection and the created gift.
pub fn add(gifts: &[Gift], draft: GiftDraft) -> Result<(Vec<Gift>, Gift), WishlistError> {
    let gift = Gift::from_draft(draft);
    gift.validate()?;

    let mut next = gifts.to_vec();
    next.push(gift.clone());
    Ok((next, gift))
}

/// Replace the admin-editable fields of the gift with `id`
///
/// Only the new field values are checked, so a record that already
/// carries a bad reservation from another client can still be edited.
pub fn update(gifts: &[Gift], id: &str, draft: GiftDraft) -> Result<Vec<Gift>, WishlistError> {
    let mut next = gifts.to_vec();
    let gift = next
        .iter_mut()
        .find(|g| g.id == id)
        .ok_or_else(|| WishlistError::NotFound(id.to_string()))?;

    draft.validate(id)?;
    gift.apply_draft(draft);
    Ok(next)
}

/// Remove the gift with `id`
pub fn remove(gifts: &[Gift], id: &str) -> Result<Vec<Gift>, WishlistError> {
    if !gifts.iter().any(|g| g.id == id) {
        return Err(WishlistError::NotFound(id.to_string()));
    }
    Ok(gifts.iter().filter(|g| g.id != id).cloned().collect())
}

/// Reserve the gift with `id` for `name`
pub fn reserve(
    gifts: &[Gift],
    id: &str,
    name: &str,
    at: DateTime<Utc>,
) -> Result<Vec<Gift>, WishlistError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(WishlistError::MissingReserverName);
    }

    let mut next = gifts.to_vec();
    let gift = next
        .iter_mut()
        .find(|g| g.id == id)
        .ok_or_else(|| WishlistError::NotFound(id.to_string()))?;

    if gift.is_reserved {
        return Err(WishlistError::AlreadyReserved {
            name: gift.name.clone(),
        });
    }

    gift.reserve(name, at);
    Ok(next)
}

/// Gifts still open for reservation, in collection order
pub fn available(gifts: &[Gift]) -> Vec<&Gift> {
    gifts.iter().filter(|g| !g.is_reserved).collect()
}

/// Gifts someone has already reserved, in collection order
pub fn reserved(gifts: &[Gift]) -> Vec<&Gift> {
    gifts.iter().filter(|g| g.is_reserved).collect()
}

/// Find a gift by exact id
pub fn find<'a>(gifts: &'a [Gift], id: &str) -> Option<&'a Gift> {
    gifts.iter().find(|g| g.id == id)
}

/// Check every record and id uniqueness across the collection
pub fn validate_collection(gifts: &[Gift]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(gifts.len());
    for gift in gifts {
        gift.validate()?;
        if !seen.insert(gift.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: gift.id.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{price_from_f64, Priority};
    use chrono::TimeZone;

    fn sample() -> Vec<Gift> {
        vec![Gift::with_id("1", "Book"), Gift::with_id("2", "Scarf")]
    }

    #[test]
    fn test_add_appends_unreserved_gift() {
        let gifts = sample();
        let mut draft = GiftDraft::new("Headphones");
        draft.price = price_from_f64(120.5);

        let (next, gift) = add(&gifts, draft).unwrap();
        assert_eq!(next.len(), 3);
        assert_eq!(next[2], gift);
        assert!(!gift.is_reserved);
        assert_ne!(gift.id, "1");
        assert_ne!(gift.id, "2");
        // Input is untouched
        assert_eq!(gifts.len(), 2);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let result = add(&sample(), GiftDraft::new(""));
        assert!(matches!(result, Err(WishlistError::Invalid(_))));
    }

    #[test]
    fn test_update_preserves_id_and_position() {
        let mut draft = GiftDraft::new("Wool scarf");
        draft.priority = Priority::Low;

        let next = update(&sample(), "2", draft).unwrap();
        assert_eq!(next[1].id, "2");
        assert_eq!(next[1].name, "Wool scarf");
        assert_eq!(next[1].priority, Priority::Low);
        assert_eq!(next[0], Gift::with_id("1", "Book"));
    }

    #[test]
    fn test_update_unknown_id() {
        let result = update(&sample(), "99", GiftDraft::new("X"));
        assert_eq!(result, Err(WishlistError::NotFound("99".into())));
    }

    #[test]
    fn test_remove() {
        let next = remove(&sample(), "1").unwrap();
        assert_eq!(next.len(), 1);
        assert_eq!(next[0].id, "2");

        assert!(matches!(
            remove(&next, "1"),
            Err(WishlistError::NotFound(_))
        ));
    }

    #[test]
    fn test_reserve_sets_all_fields() {
        let at = Utc.with_ymd_and_hms(2024, 12, 1, 10, 15, 30).unwrap();
        let next = reserve(&sample(), "1", "  Anna ", at).unwrap();

        let gift = find(&next, "1").unwrap();
        assert!(gift.is_reserved);
        assert_eq!(gift.reserved_by.as_deref(), Some("Anna"));
        assert_eq!(gift.reserved_time(), Some(at));
        assert!(validate_collection(&next).is_ok());
    }

    #[test]
    fn test_reserve_is_one_way() {
        let next = reserve(&sample(), "1", "Anna", Utc::now()).unwrap();
        let again = reserve(&next, "1", "Boris", Utc::now());
        assert_eq!(
            again,
            Err(WishlistError::AlreadyReserved {
                name: "Book".into()
            })
        );
    }

    #[test]
    fn test_reserve_requires_name() {
        let result = reserve(&sample(), "1", "   ", Utc::now());
        assert_eq!(result, Err(WishlistError::MissingReserverName));
    }

    #[test]
    fn test_partitions() {
        let next = reserve(&sample(), "2", "Anna", Utc::now()).unwrap();
        let open: Vec<_> = available(&next).iter().map(|g| g.id.as_str()).collect();
        let taken: Vec<_> = reserved(&next).iter().map(|g| g.id.as_str()).collect();
        assert_eq!(open, vec!["1"]);
        assert_eq!(taken, vec!["2"]);
    }

    #[test]
    fn test_validate_collection_duplicate_ids() {
        let gifts = vec![Gift::with_id("1", "Book"), Gift::with_id("1", "Pen")];
        assert_eq!(
            validate_collection(&gifts),
            Err(ValidationError::DuplicateId { id: "1".into() })
        );
        assert!(validate_collection(&[]).is_ok());
    }

    #[test]
    fn test_update_and_reserve_beside_invalid_record() {
        let mut broken = Gift::with_id("2", "Scarf");
        broken.is_reserved = true;
        let gifts = vec![Gift::with_id("1", "Book"), broken.clone()];

        let next = reserve(&gifts, "1", "Anna", Utc::now()).unwrap();
        assert!(find(&next, "1").unwrap().is_reserved);
        assert_eq!(find(&next, "2"), Some(&broken));

        // Editing the broken record itself only checks the edited fields
        let next = update(&next, "2", GiftDraft::new("Wool scarf")).unwrap();
        assert_eq!(find(&next, "2").unwrap().name, "Wool scarf");
        assert!(update(&next, "2", GiftDraft::new("")).is_err());
    }
}
