//! CLI argument definitions using clap derive macros.

use clap::{Args, Parser, Subcommand};

/// Recollect CLI
///
/// Save prompt-enhancement exchanges and search them by similarity.
#[derive(Parser, Debug)]
#[command(name = "recollect")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save an exchange (record first, then its embedding)
    Save(SaveArgs),

    /// Find past exchanges similar to a query
    Similar(SimilarArgs),

    /// Show one exchange by id
    Show {
        /// Exchange ID
        id: String,
    },

    /// List the exchanges of a session, oldest first
    Session(SessionArgs),

    /// Record and vector counts
    Stats,

    /// Print the effective configuration
    Config,

    /// Show version
    Version,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Session ID
    pub session_id: String,

    /// The user's original prompt
    pub user_prompt: String,

    /// Enhanced prompt; only exchanges with one are searchable
    #[arg(short, long)]
    pub enhanced: Option<String>,
}

#[derive(Args, Debug)]
pub struct SimilarArgs {
    /// Text to search for
    pub query: String,

    /// Maximum results (zero or negative returns nothing; default from config)
    #[arg(short, long, allow_negative_numbers = true)]
    pub k: Option<i64>,

    /// Restrict to one session
    #[arg(short, long)]
    pub session: Option<String>,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Session ID
    pub session_id: String,

    /// Maximum exchanges to list
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_similar_negative_k() {
        let cli = Cli::try_parse_from(["recollect", "similar", "castle", "-k", "-2"]).unwrap();
        match cli.command {
            Commands::Similar(args) => {
                assert_eq!(args.query, "castle");
                assert_eq!(args.k, Some(-2));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_save_with_global_json() {
        let cli = Cli::try_parse_from([
            "recollect",
            "save",
            "s1",
            "a red castle",
            "--enhanced",
            "A crimson castle",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Save(args) => assert_eq!(args.enhanced.as_deref(), Some("A crimson castle")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
