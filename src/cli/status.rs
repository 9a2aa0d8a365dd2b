//! Status command implementation

use colored::Colorize;

use crate::cli::args::GlobalOptions;
use crate::cli::context::load_config;
use photoop::auth::{CREDENTIAL_KEY, Credential};
use photoop::config::Config;
use photoop::error::Result;
use photoop::store::SettingsStore;

/// Run the status command to display configuration and session status.
///
/// Makes no network calls.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}\n", "photoop Configuration Status".bold());

    let config = match load_config(opts) {
        Ok(config) => config,
        Err(_) => {
            println!("{} Configuration not found", "✗".red());
            println!();
            println!(
                "Run {} to create a configuration file.",
                "photoop init".cyan()
            );
            println!();
            return Ok(());
        }
    };

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!("Config file: {}", config_path.display().to_string().cyan());
    println!();

    if config.validate_consumer().is_ok() {
        println!("{} Consumer key configured", "✓".green());
    } else {
        println!("{} Consumer key not configured", "✗".red());
        println!("  → Run 'photoop init' to configure");
    }

    println!(
        "{} Login permission: {}",
        "○".dimmed(),
        config.permission.as_str()
    );

    if let Some(ref host) = config.api_host {
        println!("{} Custom API host: {}", "○".dimmed(), host.cyan());
    }

    let settings_dir = config.settings_dir()?;
    println!(
        "{} Settings: {}",
        "○".dimmed(),
        settings_dir.display().to_string().dimmed()
    );

    let store = SettingsStore::open_in(&settings_dir)?;
    match store.get::<Option<Credential>>(CREDENTIAL_KEY, None) {
        Some(credential) => {
            println!(
                "{} Logged in as {} (since {})",
                "✓".green(),
                credential.display_name().bold(),
                credential.obtained_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        None => {
            println!("{} Not logged in", "○".dimmed());
            println!("  → Run 'photoop login' to sign in");
        }
    }

    println!();
    Ok(())
}
