use std::{fs::File, io, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing::{error, info, span, Level};
use tracing_subscriber::EnvFilter;

use crate::{
    directory::DirectoryManager,
    model::object::{BatchOutcome, ObjectError},
};

mod adapters;
mod config;
mod directory;
mod lister;
mod model;
mod util;

#[derive(Parser)]
#[command(name = "objectdir", version, about = "Directory operations on an S3 bucket")]
struct Cli {
    /// Bucket name or s3:// URI, defaults to $OBJECTDIR_BUCKET
    #[arg(long, global = true)]
    bucket: Option<String>,

    #[arg(long, global = true, default_value = directory::DEFAULT_SEPARATOR)]
    separator: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a directory placeholder
    Mkdir { name: String },

    /// Rename a directory and everything under it
    Mv {
        old_name: String,
        new_name: String,

        /// Move only the placeholder object
        #[arg(long)]
        single: bool,
    },

    /// Delete a directory and everything under it
    Rm {
        name: String,

        /// Delete only the placeholder object
        #[arg(long)]
        single: bool,
    },

    /// Upload a file, or stdin when no file is given
    Put { key: String, file: Option<PathBuf> },

    /// List keys by prefix and suffix
    Ls {
        #[arg(long, default_value = "")]
        prefix: String,

        #[arg(long, default_value = "")]
        suffix: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let span = span!(Level::INFO, "main", context = "main");
    let _e = span.enter();
    info!("called");

    let cli = Cli::parse();

    let config = match config::Config::from_env(cli.bucket, cli.separator) {
        Err(err) => {
            error!(error_message=%err, error_group="config");
            return ExitCode::FAILURE;
        }
        Ok(config) => config,
    };
    info!(
        bucket = config.bucket.as_str(),
        separator = config.separator.as_str(),
        "args"
    );

    let aws_config = util::poll::poll_until_ready(aws_config::load_from_env());
    let client = aws_sdk_s3::Client::new(&aws_config);
    let dm = DirectoryManager::new(Box::new(client), &config.bucket);

    match run(&dm, &config.separator, cli.command) {
        Err(err) => {
            error!(error_message=%err, error_group="command");
            ExitCode::FAILURE
        }
        Ok(false) => ExitCode::FAILURE,
        Ok(true) => ExitCode::SUCCESS,
    }
}

/// Returns `Ok(false)` when a multi-object command left some keys behind.
fn run(dm: &DirectoryManager, separator: &str, command: Command) -> Result<bool, ObjectError> {
    match command {
        Command::Mkdir { name } => {
            println!("{}", dm.create_directory(&name, separator)?);
            Ok(true)
        }
        Command::Mv {
            old_name,
            new_name,
            single: true,
        } => {
            dm.rename_directory_object(&old_name, &new_name, separator)?;
            Ok(true)
        }
        Command::Mv {
            old_name,
            new_name,
            single: false,
        } => Ok(report(&dm.rename_directory(&old_name, &new_name, separator)?)),
        Command::Rm { name, single: true } => {
            dm.delete_directory_object(&name, separator)?;
            Ok(true)
        }
        Command::Rm { name, single: false } => Ok(report(&dm.delete_directory(&name, separator)?)),
        Command::Put { key, file } => {
            let size = match file {
                Some(path) => {
                    let mut file = File::open(&path).map_err(|source| ObjectError::Io {
                        key: key.clone(),
                        source,
                    })?;
                    dm.save_file(&key, &mut file)?
                }
                None => dm.save_file(&key, &mut io::stdin().lock())?,
            };
            println!("{}\t{}", key, size);
            Ok(true)
        }
        Command::Ls { prefix, suffix } => {
            for key in dm.list_keys(&prefix, &suffix) {
                println!("{}", key?);
            }
            Ok(true)
        }
    }
}

fn report(outcome: &BatchOutcome) -> bool {
    for key in &outcome.succeeded {
        println!("ok\t{}", key);
    }
    for failure in &outcome.failed {
        println!("failed\t{}\t{}", failure.key, failure.error);
    }
    if let Some(err) = &outcome.listing_error {
        println!("stopped\t{}", err);
    }

    outcome.is_complete()
}
