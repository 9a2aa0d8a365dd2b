//! Common CLI types shared across commands

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table format - one row per entry (default)
    #[default]
    Table,
    /// JSON format - structured for scripts
    Json,
}

impl OutputFormat {
    /// Parse a stored preference, ignoring unknown values
    pub fn from_preference(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}
