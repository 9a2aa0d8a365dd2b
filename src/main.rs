//! photoop CLI - command-line companion for Flickr-compatible photo APIs

use clap::{CommandFactory, Parser};
use colored::Colorize;

mod cli;
mod models;
mod output;

use cli::{Cli, CommandContext, Commands, GlobalOptions, PhotosCommands, SettingsCommands};
use photoop::error::Result;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli).await {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins; otherwise warnings, or debug output with `--debug`
fn init_logging(debug: bool) {
    let default_filter = if debug { "photoop=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let opts = GlobalOptions::from_cli(&cli);

    match cli.command {
        Commands::Init => cli::init::run(&opts),
        Commands::Status => cli::status::run(&opts),
        Commands::Version => {
            println!("photoop version {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "photoop", &mut std::io::stdout());
            Ok(())
        }
        Commands::Settings(cmd) => match cmd {
            SettingsCommands::List => cli::settings::list(&opts),
            SettingsCommands::Unset { key } => cli::settings::unset(&opts, &key),
            SettingsCommands::Clear { yes } => cli::settings::clear(&opts, yes),
        },
        Commands::Login => cli::session::login(&CommandContext::new(&opts)?).await,
        Commands::Logout => cli::session::logout(&CommandContext::new(&opts)?),
        Commands::Signup => cli::session::signup(&CommandContext::new(&opts)?),
        Commands::Photos(cmd) => {
            let ctx = CommandContext::new(&opts)?;
            match cmd {
                PhotosCommands::List { page, per_page } => {
                    cli::photos::list(&ctx, page, per_page).await
                }
                PhotosCommands::Info { photo_ids } => cli::photos::info(&ctx, &photo_ids).await,
            }
        }
        Commands::Upload(args) => cli::upload::run(&CommandContext::new(&opts)?, &args).await,
        Commands::Replace { photo_id, file } => {
            cli::upload::replace(&CommandContext::new(&opts)?, &photo_id, &file).await
        }
        Commands::Delete { photo_id, yes } => {
            cli::photos::delete(&CommandContext::new(&opts)?, &photo_id, yes).await
        }
        Commands::Call(args) => cli::call::run(&CommandContext::new(&opts)?, &args).await,
    }
}
