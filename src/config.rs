//! Command-line arguments and resolved settings.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "epos-portal")]
#[command(about = "Browse and configure EPOS data distributions in the terminal", long_about = None)]
pub struct Args {
    /// Path to the catalog JSON file
    pub catalog: PathBuf,

    /// Enable logging to specified file
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Where selections and configured distributions are kept
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Print the facet tree of the catalog and exit
    #[arg(long)]
    pub print_tree: bool,

    /// Initial free-text search
    #[arg(long)]
    pub query: Option<String>,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Catalog file.
    pub catalog: PathBuf,
    /// Log file, when logging is on.
    pub log: Option<PathBuf>,
    /// State file; `None` keeps state in memory only.
    pub state: Option<PathBuf>,
    /// Initial search text.
    pub query: String,
}

impl PortalConfig {
    /// Default state file under the platform's local data directory.
    pub fn default_state_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("epos-portal").join("state.json"))
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("catalog.json"),
            log: None,
            state: Self::default_state_path(),
            query: String::new(),
        }
    }
}

impl From<Args> for PortalConfig {
    fn from(args: Args) -> Self {
        Self {
            catalog: args.catalog,
            log: args.log,
            state: args.state.or_else(Self::default_state_path),
            query: args.query.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn arguments_resolve_into_config() {
        let args = Args::try_parse_from([
            "epos-portal",
            "catalog.json",
            "--state",
            "/tmp/state.json",
            "--query",
            "gnss",
        ])
        .unwrap();
        assert!(!args.print_tree);

        let config = PortalConfig::from(args);
        assert_eq!(config.catalog, PathBuf::from("catalog.json"));
        assert_eq!(config.state, Some(PathBuf::from("/tmp/state.json")));
        assert_eq!(config.query, "gnss");
    }

    #[test]
    fn catalog_is_required() {
        assert!(Args::try_parse_from(["epos-portal", "--print-tree"]).is_err());
    }
}
