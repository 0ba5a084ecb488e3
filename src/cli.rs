use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use keyset::BackendKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kdbkey")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declare and enforce keys in a hierarchical key database", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Manifest file (default: keys.toml or keys.json in the config directory)
    #[arg(short, long, global = true, env = "KDBKEY_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Store backend, overriding the manifest
    #[arg(short, long, global = true, value_enum)]
    pub backend: Option<BackendArg>,

    /// File store location, overriding the manifest
    #[arg(long, global = true)]
    pub store_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show which managed keys are in sync
    Status(TargetArgs),

    /// Preview what apply would change
    Diff(TargetArgs),

    /// Make the store match the manifest
    Apply(ApplyArgs),

    /// Print a key as stored, with comments and checks decoded
    Show {
        /// Full key name, e.g. user/app/port
        name: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser)]
pub struct TargetArgs {
    /// Only keys at or below this path (e.g. user/app), or a resource type
    pub target: Option<String>,

    /// Number of threads used to read current state
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only keys at or below this path (e.g. user/app), or a resource type
    pub target: Option<String>,

    /// Dry run - show what would be done
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of threads used to read current state
    #[arg(short, long, default_value = "4")]
    pub jobs: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    Auto,
    Kdb,
    File,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => BackendKind::Auto,
            BackendArg::Kdb => BackendKind::Kdb,
            BackendArg::File => BackendKind::File,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply_with_globals() {
        let cli = Cli::try_parse_from([
            "kdbkey", "-vv", "--backend", "file", "apply", "user/app", "--dry-run", "-y",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.backend.map(BackendKind::from), Some(BackendKind::File)));
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.target.as_deref(), Some("user/app"));
                assert!(args.dry_run);
                assert!(args.yes);
                assert_eq!(args.jobs, 4);
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_show_json() {
        let cli = Cli::try_parse_from(["kdbkey", "show", "user/app/port", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Show { json: true, .. }));
    }
}
