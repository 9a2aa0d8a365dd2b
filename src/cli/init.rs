//! Init command implementation

use colored::Colorize;
use dialoguer::{Input, Password, Select, theme::ColorfulTheme};

use crate::cli::args::GlobalOptions;
use photoop::config::{Config, Permission};
use photoop::error::Result;

/// Run the init command
///
/// Prompts for the application's consumer key and secret and the permission
/// level to request at login. Existing settings in the file are kept.
pub fn run(opts: &GlobalOptions) -> Result<()> {
    println!("{}", "Welcome to photoop!".bold().green());
    println!("Let's set up your API application credentials.\n");

    let mut config = Config::load_at(opts.config_ref()).unwrap_or_default();
    let theme = ColorfulTheme::default();

    let mut key_prompt = Input::<String>::with_theme(&theme).with_prompt("Consumer key");
    if let Some(existing) = &config.consumer_key {
        key_prompt = key_prompt.default(existing.clone());
    }
    let consumer_key = key_prompt.interact_text()?;

    let consumer_secret: String = Password::with_theme(&theme)
        .with_prompt("Consumer secret")
        .interact()?;

    let levels = [Permission::Read, Permission::Write, Permission::Delete];
    let labels: Vec<&str> = levels.iter().map(Permission::as_str).collect();
    let current = levels
        .iter()
        .position(|p| *p == config.permission)
        .unwrap_or(1);
    let selection = Select::with_theme(&theme)
        .with_prompt("Permission to request at login")
        .items(&labels)
        .default(current)
        .interact()?;

    config.consumer_key = Some(consumer_key.trim().to_string());
    config.consumer_secret = Some(consumer_secret.trim().to_string());
    config.permission = levels[selection];
    if let Some(host) = opts.api_host_ref() {
        config.api_host = Some(host.to_string());
    }

    config.save_at(opts.config_ref())?;

    let config_path = Config::resolve_path(opts.config_ref())?;
    println!(
        "\n{} Configuration saved to: {}",
        "✓".green(),
        config_path.display()
    );

    println!("\n{}", "You're all set! Try running:".bold());
    println!("  {} - Sign in", "photoop login".cyan());
    println!("  {} - Show configuration status", "photoop status".cyan());

    Ok(())
}
