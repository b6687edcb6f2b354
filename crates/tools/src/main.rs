use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::Millis;
use tools::{PagePreset, Scenario};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Replays page scenarios against a headless site controller")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario file and print effects and map calls as JSON lines
    Run {
        /// Scenario JSON file
        scenario: PathBuf,

        /// Config overrides (SiteConfig JSON); replaces the scenario's config
        #[arg(long)]
        config: Option<PathBuf>,

        /// Page layout when the scenario names none
        #[arg(long, value_enum)]
        page: Option<PagePreset>,

        /// Simulated time to keep running after the last step, in ms
        #[arg(long, default_value_t = 10_000)]
        tail: u64,

        /// Pretend the map library failed to load
        #[arg(long)]
        map_unavailable: bool,
    },

    /// Validate the built-in catalogs and print a summary
    Catalog,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match args.command {
        Command::Run {
            scenario,
            config,
            page,
            tail,
            map_unavailable,
        } => {
            let mut scenario = Scenario::load(&scenario)?;
            if let Some(path) = config {
                scenario.config = site::SiteConfig::from_json_str(&std::fs::read_to_string(path)?)?;
            }
            if scenario.page.is_none() {
                scenario.page = page;
            }
            scenario.map_unavailable |= map_unavailable;

            for line in tools::run(&scenario, Millis(tail))? {
                serde_json::to_writer(&mut out, &line)?;
                writeln!(out)?;
            }
        }
        Command::Catalog => {
            let summary = tools::catalog_summary()?;
            serde_json::to_writer_pretty(&mut out, &summary)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}
