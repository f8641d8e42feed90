//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "lookup", version, about = "Search several people-search sources at once")]
pub struct Cli {
    /// Config file (defaults to ~/.config/lookup/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory of source definitions
    #[arg(long, global = true)]
    pub sources: Option<PathBuf>,

    /// Print a per-source outcome report next to the merged result
    #[arg(long, global = true)]
    pub report: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search by full name
    Name {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Search by postal address
    Address {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Search by phone number
    Phone { query: String },
    /// Search by email address
    Email { query: String },
    /// Look a record up by its source id
    Person { id: String },
    /// List the loaded source definitions
    Sources,
    /// Print the effective configuration
    Config {
        /// Write it to the default config path
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_multi_word_name() {
        let cli = Cli::try_parse_from(["lookup", "name", "John", "Smith"]).unwrap();
        match cli.command {
            Command::Name { query } => assert_eq!(query.join(" "), "John Smith"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["lookup", "phone", "555-0100", "--report", "--sources", "defs"])
                .unwrap();
        assert!(cli.report);
        assert_eq!(cli.sources, Some(PathBuf::from("defs")));
    }

    #[test]
    fn test_name_requires_query() {
        assert!(Cli::try_parse_from(["lookup", "name"]).is_err());
    }
}
