mod cli;
mod commands;
mod config;
mod error;
mod logging;

use std::process;

use clap::Parser;
use reel_ingest::IngestOutcome;
use reel_inventory::{Inventory, Layout};
use tracing::error;

use crate::cli::{Args, Commands};
use crate::config::AppConfig;
use crate::error::Result;

/// Exit code when a mark-posted/mark-failed target does not exist.
const NOT_FOUND_EXIT: i32 = 2;

fn main() {
    let args = Args::parse();
    match run(args) {
        Ok(code) => process::exit(code),
        Err(err) => {
            error!("{err}");
            eprintln!("Error: {err}");
            process::exit(1);
        }
    }
}

fn run(args: Args) -> Result<i32> {
    let layout = Layout::new(&args.base_dir);
    let _log_guard = logging::init(&layout, args.verbose, args.quiet)?;

    let config = AppConfig::load(args.config.as_deref(), &args.base_dir)?;
    let inventory = Inventory::with_config(layout, config.store_config());

    match args.command {
        Commands::Init => {
            commands::init(&inventory)?;
            Ok(0)
        }
        Commands::Ingest { url } => {
            match commands::ingest(&inventory, &config, &url)? {
                IngestOutcome::Downloaded { video_id } => println!("{video_id}"),
                IngestOutcome::NothingNew => println!(),
            }
            Ok(0)
        }
        Commands::Edit => {
            let processed = commands::edit(&inventory, &config)?;
            println!("Processed {processed} videos");
            Ok(0)
        }
        Commands::GetNext => {
            match commands::get_next(&inventory)? {
                Some(path) => println!("{path}"),
                None => println!(),
            }
            Ok(0)
        }
        Commands::MarkPosted { video_id } => {
            if commands::mark_posted(&inventory, &video_id)? {
                Ok(0)
            } else {
                Ok(NOT_FOUND_EXIT)
            }
        }
        Commands::MarkFailed { video_id } => {
            if commands::mark_failed(&inventory, &video_id)? {
                Ok(0)
            } else {
                Ok(NOT_FOUND_EXIT)
            }
        }
    }
}
