//! Login, logout and signup commands

use std::sync::Arc;

use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};
use log::debug;
use tokio::sync::mpsc;

use crate::cli::CommandContext;
use photoop::auth::{AuthorizationService, AuthorizationSurface};
use photoop::error::{AuthError, Result};

/// Authorization surface for a terminal: the page URL is printed for the
/// user to open in any browser.
pub struct TerminalSurface {
    presented: mpsc::UnboundedSender<String>,
}

impl TerminalSurface {
    /// Surface plus a stream of the pages it has shown
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (presented, rx) = mpsc::unbounded_channel();
        (Self { presented }, rx)
    }
}

impl AuthorizationSurface for TerminalSurface {
    fn present(&self, url: &str) -> std::result::Result<(), AuthError> {
        println!("\nOpen this page in your browser:\n");
        println!("  {}\n", url.cyan().underline());
        // Nobody may be listening (signup)
        let _ = self.presented.send(url.to_string());
        Ok(())
    }

    fn dismiss(&self) {
        debug!("Authorization page no longer needed");
    }
}

/// Run the OAuth handshake interactively
pub async fn login(ctx: &CommandContext) -> Result<()> {
    if let Some(credential) = ctx.auth.credential() {
        println!(
            "Currently logged in as {}; authorizing again.",
            credential.display_name().bold()
        );
    }

    let (surface, mut pages) = TerminalSurface::new();

    let handshake = {
        let auth = Arc::clone(&ctx.auth);
        async move {
            let outcome = auth.login(&surface).await;
            // Closes the page stream so the prompt side finishes
            drop(surface);
            outcome
        }
    };

    let prompt = {
        let auth = Arc::clone(&ctx.auth);
        let callback_url = ctx.config.callback_url.clone();
        async move {
            while pages.recv().await.is_some() {
                route_redirect(&auth, &callback_url).await;
            }
        }
    };

    let (outcome, ()) = tokio::join!(handshake, prompt);
    let credential = outcome?;

    println!(
        "{} Logged in as {}",
        "✓".green(),
        credential.display_name().bold()
    );
    Ok(())
}

/// Ask for the redirect URL until one is accepted or the user gives up
async fn route_redirect(auth: &AuthorizationService, callback_url: &str) {
    println!(
        "After approving access you will be redirected to {}.",
        callback_url.dimmed()
    );

    loop {
        let answer = tokio::task::spawn_blocking(|| {
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("Paste the redirect URL (empty to cancel)")
                .allow_empty(true)
                .interact_text()
        })
        .await;

        let line = match answer {
            Ok(Ok(line)) if !line.trim().is_empty() => line,
            _ => {
                auth.cancel_login();
                return;
            }
        };

        if auth.handle_callback(line.trim()) {
            return;
        }
        println!(
            "{} That is not a redirect to {}. Try again.",
            "⚠".yellow(),
            callback_url
        );
    }
}

pub fn logout(ctx: &CommandContext) -> Result<()> {
    let was_logged_in = ctx.auth.is_logged_in();
    ctx.auth.logout()?;

    if was_logged_in {
        println!("{} Logged out", "✓".green());
    } else {
        println!("{} Not logged in", "○".dimmed());
    }
    Ok(())
}

pub fn signup(ctx: &CommandContext) -> Result<()> {
    let (surface, _pages) = TerminalSurface::new();
    ctx.auth.signup(&surface)?;
    println!(
        "After registering, run {} to sign in.",
        "photoop login".cyan()
    );
    Ok(())
}
