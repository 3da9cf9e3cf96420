use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use qbxml_export::bridge::command::{CommandBridge, DEFAULT_PROGRAM};
use qbxml_export::bridge::replay::ReplayBridge;
use qbxml_export::bridge::{self, Bridge};
use qbxml_export::config::{self, DEFAULT_CONFIG};
use qbxml_export::export;
use qbxml_export::qbxml::request::build_request;
use qbxml_export::qbxml::ErrorMode;

#[derive(Parser)]
#[command(version, about = "Export QuickBooks query results to CSV files.")]
struct Cli {
    /// Config file listing the queries to run.
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Let QuickBooks continue with the remaining queries when one fails.
    #[arg(long)]
    continue_on_error: bool,

    /// Helper program that forwards requests to QuickBooks.
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    bridge: String,

    /// Argument placed before the session arguments of the helper, e.g. a
    /// script path. Repeatable.
    #[arg(long = "bridge-arg", conflicts_with = "replay")]
    bridge_args: Vec<String>,

    /// Read the response from this file instead of asking QuickBooks.
    #[arg(long, conflicts_with = "bridge")]
    replay: Option<PathBuf>,

    /// Directory the CSV files are written to.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Exit without waiting for Enter.
    #[arg(long)]
    no_wait: bool,

    /// -v traces progress, -vv also dumps queries and extracted fields.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let queries = config::load_queries(&cli.config)?;

    let mode = if cli.continue_on_error {
        ErrorMode::ContinueOnError
    } else {
        ErrorMode::StopOnError
    };
    let request = build_request(&queries, mode)?;

    let mut processor: Bridge = match &cli.replay {
        Some(path) => ReplayBridge::new(path).into(),
        None => CommandBridge::with_args(cli.bridge.as_str(), cli.bridge_args.clone()).into(),
    };
    let response = bridge::query_quickbooks(&mut processor, &request);

    let written = export::write_results(&queries, &response, &cli.output_dir)?;

    println!("Wrote to files: ");
    for name in &written {
        println!("{}", name);
    }

    if !cli.no_wait {
        print!("Press Enter to exit...");
        io::stdout().flush()?;
        io::stdin().lock().read_line(&mut String::new())?;
    }

    Ok(())
}
