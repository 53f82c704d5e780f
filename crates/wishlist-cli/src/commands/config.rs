//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use wishlist_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let token = config.gist_token.as_deref().map(mask_token);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "gist_id": config.gist_id,
                    "gist_token": token,
                    "remote_enabled": config.remote_enabled,
                    "api_url": config.api_url,
                    "gist_filename": config.gist_filename,
                    "timeout_secs": config.timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.data_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:       {}", config.data_dir.display());
            println!(
                "  gist_id:        {}",
                config.gist_id.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  gist_token:     {}",
                token.as_deref().unwrap_or("(not set)")
            );
            println!("  remote_enabled: {}", config.remote_enabled);
            println!("  api_url:        {}", config.api_url);
            println!("  gist_filename:  {}", config.gist_filename);
            println!("  timeout_secs:   {}", config.timeout_secs);
            println!(
                "  log_file:       {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    match config_path {
        Some(path) => config.save_to_path(path),
        None => config.save(),
    }
    .context("Failed to save configuration")?;

    let shown = if key == "gist_token" {
        mask_token(&value)
    } else {
        value
    };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

/// Apply one `key = value` assignment to `config`
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => {
            config.data_dir = value.into();
        }
        "gist_id" => {
            config.gist_id = optional(value);
        }
        "gist_token" => {
            config.gist_token = optional(value);
        }
        "remote_enabled" => {
            config.remote_enabled = value
                .parse()
                .context("Invalid value for remote_enabled. Use 'true' or 'false'.")?;
        }
        "api_url" => {
            if value.is_empty() {
                bail!("api_url must not be empty");
            }
            config.api_url = value.to_string();
        }
        "gist_filename" => {
            if value.is_empty() {
                bail!("gist_filename must not be empty");
            }
            config.gist_filename = value.to_string();
        }
        "timeout_secs" => {
            config.timeout_secs = value
                .parse()
                .context("Invalid value for timeout_secs. Use a whole number of seconds.")?;
        }
        "log_file" => {
            config.log_file = optional(value).map(Into::into);
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, gist_id, gist_token, remote_enabled, api_url, \
                 gist_filename, timeout_secs, log_file",
                key
            );
        }
    }
    Ok(())
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

/// Show only the last four characters of a credential
fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = token.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(8), tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use tempfile::TempDir;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("ghp_abcdef1234"), "********1234");
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token(""), "");
    }

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();
        apply(&mut config, "gist_id", "abc123").unwrap();
        apply(&mut config, "gist_token", "secret").unwrap();
        apply(&mut config, "timeout_secs", "9").unwrap();
        apply(&mut config, "remote_enabled", "false").unwrap();

        assert_eq!(config.gist_id.as_deref(), Some("abc123"));
        assert_eq!(config.gist_token.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 9);
        assert!(!config.remote_enabled);

        apply(&mut config, "gist_id", "none").unwrap();
        assert!(config.gist_id.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "colour", "pink").is_err());
        assert!(apply(&mut config, "remote_enabled", "maybe").is_err());
        assert!(apply(&mut config, "timeout_secs", "-1").is_err());
        assert!(apply(&mut config, "api_url", "").is_err());
    }

    #[test]
    fn test_set_writes_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set("gist_id".into(), "g1".into(), Some(&path), &output).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("gist_id = \"g1\""));
    }
}
