//! Global CLI options shared across all commands

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// Captures the flag/environment layer; config file defaults are resolved
/// later in `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format from `--format`, if given
    pub format: Option<OutputFormat>,

    /// Custom config file path (defaults to ~/.photoop/config.yaml)
    pub config: Option<String>,

    /// Custom API host for development/testing
    pub api_host: Option<String>,
}

impl GlobalOptions {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            api_host: cli.api_host.clone(),
        }
    }

    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }

    pub fn api_host_ref(&self) -> Option<&str> {
        self.api_host.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli() {
        let cli = Cli::parse_from([
            "photoop",
            "--format",
            "json",
            "--config",
            "/custom/path",
            "--api-host",
            "http://localhost:8080",
            "status",
        ]);
        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, Some(OutputFormat::Json));
        assert_eq!(opts.config_ref(), Some("/custom/path"));
        assert_eq!(opts.api_host_ref(), Some("http://localhost:8080"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["photoop", "version"]);
        let opts = GlobalOptions::from_cli(&cli);

        assert_eq!(opts.format, None);
        assert_eq!(opts.config_ref(), None);
        assert_eq!(opts.api_host_ref(), None);
    }
}
