use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use folio_lib::{Error, Repository, Store, config::CoreConfig, export, repository, store};
use sysexits::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod edit;
mod library;
mod pdf;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use this database file instead of the configured one
    #[arg(short, long, global = true)]
    storage: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// List saved portfolios
    List,
    /// Print a portfolio, making it the current one when INDEX is given
    Show { index: Option<usize> },
    /// Create a new portfolio
    Create(edit::EditArgs),
    /// Edit the current portfolio, or the one at INDEX
    Edit {
        index: Option<usize>,
        #[command(flatten)]
        args: edit::EditArgs,
    },
    /// Delete the portfolio at INDEX
    Delete { index: usize },
    /// Attach an exported PDF to the current portfolio
    AttachPdf { file: PathBuf },
    /// Write the current portfolio's attached PDF to disk
    SavePdf {
        /// Directory to write to, defaults to the configured export directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let mut cfg = match CoreConfig::load() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            return ExitCode::Config;
        }
    };
    if let Some(storage) = cli.storage {
        cfg.storage_path = Some(storage);
    }

    // Logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");

    match run(cli.command, cfg) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            exit_code(&err)
        }
    }
}

fn run(command: Command, cfg: CoreConfig) -> Result<ExitCode, Error> {
    let repo = Repository::with_config(cfg)?;
    let store = Store::open(repo)?;

    for warning in store.repository().take_warnings() {
        eprintln!("{} {warning}", "warning:".yellow().bold());
    }

    match &command {
        Command::List => library::list(&store),
        Command::Show { index } => library::show(&store, *index),
        Command::Create(args) => edit::create(&store, args),
        Command::Edit { index, args } => edit::edit(&store, *index, args),
        Command::Delete { index } => library::delete(&store, *index),
        Command::AttachPdf { file } => pdf::attach(&store, file),
        Command::SavePdf { out } => pdf::save(&store, out.as_deref()),
    }
}

fn exit_code(err: &Error) -> ExitCode {
    match err {
        Error::Config(_) => ExitCode::Config,
        Error::Repository(err) | Error::Store(store::Error::Repository(err)) => match err {
            repository::Error::NoSuchIndex { .. } | repository::Error::NoSuchDocument(_) => {
                ExitCode::NoInput
            }
            repository::Error::Io(_) | repository::Error::InvalidPath(_) => ExitCode::IoErr,
            repository::Error::Config(_) => ExitCode::Config,
            _ => ExitCode::Software,
        },
        Error::Store(_) => ExitCode::Software,
        Error::Edit(_) => ExitCode::DataErr,
        Error::Export(err) => match err {
            export::Error::NoArtifact => ExitCode::NoInput,
            export::Error::Io(_) => ExitCode::IoErr,
            export::Error::InvalidDataUri | export::Error::Decode(_) => ExitCode::DataErr,
            _ => ExitCode::Software,
        },
    }
}
