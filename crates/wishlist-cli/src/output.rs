//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use wishlist_core::{wishlist, Gift, SaveOutcome};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Which part of the wishlist to list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Available,
    Reserved,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print a single gift
    pub fn print_gift(&self, gift: &Gift) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", gift.id);
                println!("Name:        {}", gift.name);
                if let Some(ref desc) = gift.description {
                    println!("Description: {}", desc);
                }
                if let Some(price) = gift.price_amount() {
                    println!("Price:       {}", format_price(price));
                }
                if let Some(ref link) = gift.link {
                    println!("Link:        {}", link);
                }
                if let Some(ref image) = gift.image_url {
                    println!("Image:       {}", image);
                }
                println!("Priority:    {}", gift.priority);
                match (&gift.reserved_by, &gift.reserved_at) {
                    (Some(by), Some(raw)) if gift.is_reserved => {
                        let when = gift
                            .reserved_time()
                            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_else(|| raw.clone());
                        println!("Reserved:    by {} on {}", by, when);
                    }
                    _ => println!("Reserved:    no"),
                }
            }
            OutputFormat::Json => {
                println!("{}", to_json(gift));
            }
            OutputFormat::Quiet => {
                println!("{}", gift.id);
            }
        }
    }

    /// Print the wishlist, split into available and reserved sections
    pub fn print_gifts(&self, gifts: &[Gift], filter: ListFilter) {
        let available = wishlist::available(gifts);
        let reserved = wishlist::reserved(gifts);
        let (show_available, show_reserved) = match filter {
            ListFilter::All => (true, true),
            ListFilter::Available => (true, false),
            ListFilter::Reserved => (false, true),
        };

        match self.format {
            OutputFormat::Human => {
                if gifts.is_empty() {
                    println!("The wishlist is empty.");
                    return;
                }
                if show_available {
                    println!("── Available ({}) ──", available.len());
                    for gift in &available {
                        println!("{}", gift_line(gift));
                    }
                }
                if show_reserved && !reserved.is_empty() {
                    if show_available {
                        println!();
                    }
                    println!("── Reserved ({}) ──", reserved.len());
                    for gift in &reserved {
                        let by = gift.reserved_by.as_deref().unwrap_or("?");
                        println!("{} | reserved by {}", gift_line(gift), truncate(by, 20));
                    }
                }
                println!("\n{} gift(s)", gifts.len());
            }
            OutputFormat::Json => {
                let selected: Vec<&Gift> = gifts
                    .iter()
                    .filter(|g| (g.is_reserved && show_reserved) || (!g.is_reserved && show_available))
                    .collect();
                println!("{}", to_json(&selected));
            }
            OutputFormat::Quiet => {
                for gift in gifts {
                    if (gift.is_reserved && show_reserved) || (!gift.is_reserved && show_available) {
                        println!("{}", gift.id);
                    }
                }
            }
        }
    }

    /// Report where a save ended up
    pub fn print_save_outcome(&self, outcome: &SaveOutcome) {
        match self.format {
            OutputFormat::Human => match outcome {
                SaveOutcome::Synced => println!("✓ Synced to remote"),
                SaveOutcome::LocalOnly(reason) => {
                    println!("⚠ Saved locally only ({})", reason)
                }
                SaveOutcome::LocalWriteFailed(err) => {
                    eprintln!("✗ Local save failed: {}", err);
                    if let Some(hint) = err.recovery_suggestion() {
                        eprintln!("  {}", hint);
                    }
                }
            },
            OutputFormat::Json => {
                let (status, reason) = match outcome {
                    SaveOutcome::Synced => ("synced", None),
                    SaveOutcome::LocalOnly(r) => ("local_only", Some(r.clone())),
                    SaveOutcome::LocalWriteFailed(e) => ("local_write_failed", Some(e.to_string())),
                };
                println!(
                    "{}",
                    serde_json::json!({"sync": status, "reason": reason})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        serde_json::json!({"status": "error", "message": e.to_string()}).to_string()
    })
}

/// One-line summary of a gift for list output
fn gift_line(gift: &Gift) -> String {
    let price = gift.price_amount().map(format_price).unwrap_or_default();
    format!(
        "{} | {:<6} | {} {}",
        short_id(&gift.id),
        gift.priority.as_str(),
        truncate(&gift.name, 40),
        price
    )
    .trim_end()
    .to_string()
}

/// Last characters of an id; timestamp ids differ at the end
fn short_id(id: &str) -> &str {
    let chars = id.char_indices().rev().nth(5);
    match chars {
        Some((idx, _)) => &id[idx..],
        None => id,
    }
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{:.0}", price)
    } else {
        format!("{:.2}", price)
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
