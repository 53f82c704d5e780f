//! Gift command handlers
//!
//! Every mutation loads the current collection, applies one collection
//! operation, and saves the whole result. The new collection is what we
//! report back even when the remote half of the save did not happen.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;

use wishlist_core::{
    price_from_f64, wishlist, Gift, GiftDraft, Priority, SaveOutcome, SyncedCollectionStore,
};

use crate::output::{ListFilter, Output};
use crate::prompt::confirm;

/// Admin-editable gift fields shared by `add` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub struct GiftFields {
    /// Description (empty string clears it on edit)
    #[arg(short, long)]
    pub description: Option<String>,
    /// Price
    #[arg(short, long)]
    pub price: Option<f64>,
    /// Image URL (empty string clears it on edit)
    #[arg(long)]
    pub image_url: Option<String>,
    /// Shop link (empty string clears it on edit)
    #[arg(short, long)]
    pub link: Option<String>,
    /// Priority: high, medium, or low
    #[arg(short = 'P', long)]
    pub priority: Option<Priority>,
}

impl GiftFields {
    /// Overlay these fields on `draft`; unset fields keep their value
    fn apply_to(self, draft: &mut GiftDraft) -> Result<()> {
        if let Some(description) = self.description {
            draft.description = non_empty(description);
        }
        if let Some(price) = self.price {
            draft.price =
                Some(price_from_f64(price).with_context(|| format!("Invalid price: {}", price))?);
        }
        if let Some(image_url) = self.image_url {
            draft.image_url = non_empty(image_url);
        }
        if let Some(link) = self.link {
            draft.link = non_empty(link);
        }
        if let Some(priority) = self.priority {
            draft.priority = priority;
        }
        Ok(())
    }
}

/// List gifts
pub async fn list(store: &SyncedCollectionStore, filter: ListFilter, output: &Output) -> Result<()> {
    let gifts = store.load().await;
    output.print_gifts(&gifts, filter);
    Ok(())
}

/// Show a single gift
pub async fn show(store: &SyncedCollectionStore, id: String, output: &Output) -> Result<()> {
    let gifts = store.load().await;
    let id = resolve_gift_id(&gifts, &id)?;

    let gift = wishlist::find(&gifts, &id).context("Gift disappeared while resolving id")?;
    output.print_gift(gift);
    Ok(())
}

/// Add a new gift
pub async fn add(
    store: &SyncedCollectionStore,
    name: String,
    fields: GiftFields,
    output: &Output,
) -> Result<Gift> {
    let gifts = store.load().await;

    let mut draft = GiftDraft::new(name.trim());
    fields.apply_to(&mut draft)?;

    let (next, gift) = wishlist::add(&gifts, draft).context("Failed to add gift")?;
    let outcome = store.save_with_outcome(&next).await;
    ensure_persisted(&outcome, output)?;

    output.success(&format!("Added gift: {}", gift.id));
    output.print_gift(&gift);
    Ok(gift)
}

/// Edit a gift's admin fields
pub async fn edit(
    store: &SyncedCollectionStore,
    id: String,
    name: Option<String>,
    fields: GiftFields,
    clear_price: bool,
    output: &Output,
) -> Result<Gift> {
    let gifts = store.load().await;
    let id = resolve_gift_id(&gifts, &id)?;
    let current = wishlist::find(&gifts, &id).context("Gift disappeared while resolving id")?;

    let mut draft = current.draft();
    if let Some(name) = name {
        draft.name = name.trim().to_string();
    }
    if clear_price {
        draft.price = None;
    }
    fields.apply_to(&mut draft)?;

    let next = wishlist::update(&gifts, &id, draft).context("Failed to update gift")?;
    let outcome = store.save_with_outcome(&next).await;
    ensure_persisted(&outcome, output)?;

    let gift = wishlist::find(&next, &id)
        .cloned()
        .context("Updated gift missing from collection")?;
    output.success("Gift updated");
    output.print_gift(&gift);
    Ok(gift)
}

/// Delete a gift
pub async fn delete(
    store: &SyncedCollectionStore,
    id: String,
    skip_confirm: bool,
    output: &Output,
) -> Result<()> {
    let gifts = store.load().await;
    let id = resolve_gift_id(&gifts, &id)?;
    let gift = wishlist::find(&gifts, &id).context("Gift disappeared while resolving id")?;

    if !skip_confirm && output.should_prompt() {
        println!("Delete gift: {} - {}", gift.id, gift.name);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let next = wishlist::remove(&gifts, &id)?;
    let outcome = store.save_with_outcome(&next).await;
    ensure_persisted(&outcome, output)?;

    output.success(&format!("Deleted gift: {}", id));
    Ok(())
}

/// Reserve a gift for a guest
pub async fn reserve(
    store: &SyncedCollectionStore,
    id: String,
    name: String,
    output: &Output,
) -> Result<Gift> {
    let gifts = store.load().await;
    let id = resolve_gift_id(&gifts, &id)?;

    let next = wishlist::reserve(&gifts, &id, &name, Utc::now())?;
    let outcome = store.save_with_outcome(&next).await;
    ensure_persisted(&outcome, output)?;

    let gift = wishlist::find(&next, &id)
        .cloned()
        .context("Reserved gift missing from collection")?;
    output.success(&format!("Reserved '{}' for {}", gift.name, name.trim()));
    Ok(gift)
}

/// Report the save outcome; fail only if nothing was persisted
fn ensure_persisted(outcome: &SaveOutcome, output: &Output) -> Result<()> {
    output.print_save_outcome(outcome);
    match outcome {
        SaveOutcome::Synced | SaveOutcome::LocalOnly(_) => Ok(()),
        SaveOutcome::LocalWriteFailed(err) => match err.recovery_suggestion() {
            Some(hint) => bail!("Could not write local cache: {}\n{}", err, hint),
            None => bail!("Could not write local cache: {}", err),
        },
    }
}

/// Resolve a gift id (supports full id or unique suffix/prefix)
fn resolve_gift_id(gifts: &[Gift], id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() {
        bail!("Gift id must not be empty");
    }

    if wishlist::find(gifts, id).is_some() {
        return Ok(id.to_string());
    }

    // Timestamp ids share their leading digits, so accept suffixes too
    let matches: Vec<&Gift> = gifts
        .iter()
        .filter(|g| g.id.starts_with(id) || g.id.ends_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No gift found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple gifts match '{}':", id);
            for gift in &matches {
                eprintln!("  {} - {}", gift.id, gift.name);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
