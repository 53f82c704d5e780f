//! Status command handler

use anyhow::Result;

use wishlist_core::{wishlist, Config, SyncedCollectionStore};

use crate::output::{Output, OutputFormat};

/// Show where data lives and how many gifts each copy holds
pub async fn show(store: &SyncedCollectionStore, config: &Config, output: &Output) -> Result<()> {
    let local = store.load_local();
    let current = store.load().await;
    let remote = store.remote_description();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "mode": if remote.is_some() { "remote" } else { "local" },
                    "remote": remote,
                    "remote_enabled": config.remote_enabled,
                    "cache": store.cache_location(),
                    "counts": {
                        "gifts": current.len(),
                        "available": wishlist::available(&current).len(),
                        "reserved": wishlist::reserved(&current).len(),
                        "local_cache": local.len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", if remote.is_some() { "remote" } else { "local" });
        }
        OutputFormat::Human => {
            println!("Wishlist Status");
            println!("===============");
            println!();
            println!("Sync:");
            match remote {
                Some(ref remote) => {
                    println!("  Mode:   remote + local cache");
                    println!("  Remote: {}", remote);
                }
                None if !config.remote_enabled => println!("  Mode:   local only (remote disabled)"),
                None => println!("  Mode:   local only (gist_token/gist_id not set)"),
            }
            println!();
            println!("Storage:");
            println!("  Cache: {}", store.cache_location());
            println!();
            println!("Contents:");
            println!("  Gifts:       {}", current.len());
            println!("  Available:   {}", wishlist::available(&current).len());
            println!("  Reserved:    {}", wishlist::reserved(&current).len());
            println!("  Local cache: {}", local.len());
        }
    }

    Ok(())
}
