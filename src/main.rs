mod cli;
mod commands;
mod config;
mod engine;
mod paths;
mod progress;
mod resource;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use keyset::BackendKind;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub manifest: Option<PathBuf>,
    pub backend: Option<BackendKind>,
    pub store_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        manifest: cli.manifest,
        backend: cli.backend.map(BackendKind::from),
        store_file: cli.store_file,
    };

    match cli.command {
        Command::Status(args) => commands::declarative::status(&ctx, args.target.as_deref(), args.jobs),
        Command::Diff(args) => commands::declarative::diff(&ctx, args.target.as_deref(), args.jobs),
        Command::Apply(args) => {
            commands::declarative::apply(&ctx, args.target.as_deref(), args.dry_run, args.yes, args.jobs)
        }
        Command::Show { name, json } => commands::show::run(&ctx, &name, json),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "kdbkey", &mut io::stdout());
            Ok(())
        }
    }
}
