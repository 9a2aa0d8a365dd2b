//! Settings store inspection commands

use colored::Colorize;
use dialoguer::{Confirm, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use crate::cli::context::{load_config, resolve_format};
use crate::models::SettingDisplay;
use crate::output;
use photoop::auth::CREDENTIAL_KEY;
use photoop::error::Result;
use photoop::store::SettingsStore;

fn open_store(opts: &GlobalOptions) -> Result<(SettingsStore, crate::cli::OutputFormat)> {
    let config = load_config(opts)?;
    let store = SettingsStore::open_in(&config.settings_dir()?)?;
    Ok((store, resolve_format(opts, &config)))
}

/// List every stored key with its JSON value
pub fn list(opts: &GlobalOptions) -> Result<()> {
    let (store, format) = open_store(opts)?;

    let rows: Vec<SettingDisplay> = store
        .entries()?
        .into_iter()
        .map(|(key, raw)| {
            let secret = key == CREDENTIAL_KEY;
            SettingDisplay::new(key, raw, secret)
        })
        .collect();

    output::print_rows(&rows, format)
}

/// Remove one key
pub fn unset(opts: &GlobalOptions, key: &str) -> Result<()> {
    let (store, _) = open_store(opts)?;

    if store.remove(key)? {
        println!("{} Removed {}", "✓".green(), key.bold());
    } else {
        println!("{} {} was not set", "○".dimmed(), key);
    }
    Ok(())
}

/// Remove every key, the session included
pub fn clear(opts: &GlobalOptions, yes: bool) -> Result<()> {
    let (store, _) = open_store(opts)?;

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Remove all stored settings? You will be logged out")
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let removed = store.remove_all()?;
    println!("{} Removed {} settings", "✓".green(), removed);
    Ok(())
}
