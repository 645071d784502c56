use std::{fs::OpenOptions, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use clap::Parser;
use console::style;
use praline::{
    cli::{Cli, Commands},
    constants::{COMPLETE_EMOJI, ERROR_EMOJI},
    mint::{process_mint, MintArgs},
    show::{process_show, ShowArgs},
};
use tracing::subscriber::set_global_default;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{self, filter::LevelFilter, prelude::*, EnvFilter};

fn setup_logging(level: Option<EnvFilter>) -> Result<()> {
    // Log path; change this to be dynamic for multiple OSes.
    // Log in current directory for now.
    let log_path = PathBuf::from("praline.log");

    let file = OpenOptions::new().write(true).create(true).open(&log_path)?;

    // Prioritize user-provided level, otherwise read from RUST_LOG env var for log level, fall back to "trace" if not set.
    let env_filter = if let Some(filter) = level {
        filter
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("trace"))
    };

    let formatting_layer = BunyanFormattingLayer::new("praline".into(), file);
    let level_filter = LevelFilter::from_str(&env_filter.to_string())?;

    let subscriber = tracing_subscriber::registry()
        .with(formatting_layer.with_filter(level_filter))
        .with(JsonStorageLayer);

    set_global_default(subscriber).expect("Failed to set global default subscriber");

    Ok(())
}

#[tokio::main(worker_threads = 4)]
async fn main() {
    match run().await {
        Ok(()) => {
            println!(
                "\n{}{}",
                COMPLETE_EMOJI,
                style("Command successful.").green().bold().dim()
            );
        }
        Err(err) => {
            println!(
                "\n{}{} {}",
                ERROR_EMOJI,
                style("Error running command (re-run needed):").red(),
                err,
            );
            // finished the program with an error code to the OS
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<()> {
    solana_logger::setup_with_default("solana=off");

    let cli = Cli::parse();

    let log_level_error: Result<()> = Err(anyhow!(
        "Invalid log level: {:?}.\n Valid levels are: trace, debug, info, warn, error.",
        cli.log_level
    ));

    if let Some(user_filter) = cli.log_level {
        let filter = match EnvFilter::from_str(&user_filter) {
            Ok(filter) => filter,
            Err(_) => return log_level_error,
        };
        setup_logging(Some(filter))?;
    } else {
        setup_logging(None)?;
    }

    tracing::info!("Candy is dandy.");

    ctrlc::set_handler(|| {
        println!(
            "\n\n{}{} Operation aborted.",
            ERROR_EMOJI,
            style("Error running command (re-run needed):").red(),
        );
        // finished the program with an error code to the OS
        std::process::exit(1);
    })?;

    match cli.command {
        Commands::Mint {
            keypair,
            rpc_url,
            number,
            candy_machine,
        } => {
            process_mint(MintArgs {
                keypair,
                rpc_url,
                number,
                candy_machine,
            })
            .await?
        }
        Commands::Show {
            keypair,
            rpc_url,
            candy_machine,
        } => {
            process_show(ShowArgs {
                keypair,
                rpc_url,
                candy_machine,
            })
            .await?
        }
    }

    Ok(())
}
