//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
pub use clap_complete::Shell;

pub mod args;
pub mod call;
pub mod context;
pub mod init;
pub mod photos;
pub mod session;
pub mod settings;
pub mod status;
pub mod upload;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// Photoop - command-line companion for Flickr-compatible photo APIs
#[derive(Parser, Debug)]
#[command(name = "photoop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "PHOTOOP_FORMAT",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: Option<OutputFormat>,

    /// Override config file location
    #[arg(long, global = true, env = "PHOTOOP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Serve every endpoint from this host (development/testing)
    #[arg(long, global = true, env = "PHOTOOP_API_HOST", hide_env = true)]
    pub api_host: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "PHOTOOP_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize photoop configuration
    Init,

    /// Show configuration and session status
    Status,

    /// Sign in through the provider's authorization page
    Login,

    /// Sign out and forget the stored credential
    Logout,

    /// Open the provider's registration page
    Signup,

    /// Browse your photos
    #[command(subcommand)]
    Photos(PhotosCommands),

    /// Upload one or more photos
    Upload(UploadArgs),

    /// Replace the image of an existing photo
    Replace {
        /// Photo to replace
        photo_id: String,

        /// New image file
        file: PathBuf,
    },

    /// Delete a photo
    Delete {
        /// Photo to delete
        photo_id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Call any REST method and print the response
    Call(CallArgs),

    /// Inspect and manage locally stored settings
    #[command(subcommand)]
    Settings(SettingsCommands),

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   photoop completion bash > /etc/bash_completion.d/photoop
  zsh:    photoop completion zsh > \"${fpath[1]}/_photoop\"
  fish:   photoop completion fish > ~/.config/fish/completions/photoop.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

/// Photo browsing subcommands
#[derive(Subcommand, Debug)]
pub enum PhotosCommands {
    /// List your photos
    List {
        /// Page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Photos per page (max 500)
        #[arg(long, default_value_t = 50)]
        per_page: u32,
    },

    /// Show details of one or more photos
    Info {
        /// Photo IDs (duplicates are fetched once)
        #[arg(required = true)]
        photo_ids: Vec<String>,
    },
}

/// Upload options
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Image files to upload
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Title (defaults to the file name)
    #[arg(long)]
    pub title: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Space-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Make the photos public
    #[arg(long)]
    pub public: bool,
}

/// Raw REST call options
#[derive(Args, Debug)]
pub struct CallArgs {
    /// REST method name, e.g. flickr.test.echo
    pub method: String,

    /// Parameters as KEY=VALUE
    #[arg(value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Print the raw response body instead of parsed JSON
    #[arg(long)]
    pub text: bool,

    /// Send as a form-encoded POST
    #[arg(long)]
    pub post: bool,

    /// Send without signing
    #[arg(long)]
    pub no_auth: bool,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// List stored settings
    List,

    /// Remove one stored setting
    Unset {
        /// Setting key
        key: String,
    },

    /// Remove every stored setting (including the session)
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}
