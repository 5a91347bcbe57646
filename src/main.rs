use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use frenet_planner::{Config, Planner, WaypointMap};
use log::{info, LevelFilter};

#[derive(Parser, Debug)]
#[command(author, version, long_about = None)]
struct CliArgs {
    /// The waypoint map, one `x y s dx dy` row per waypoint.
    #[arg(short = 'm', long, value_name = "MAP_FILE")]
    map: PathBuf,

    /// Planner parameters in TOML. Defaults are used when omitted.
    #[arg(short = 'c', long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increases log verbosity, may be repeated.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = CliArgs::parse();
    init_logger(args.verbose)?;

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.validate()?;
    let map = WaypointMap::load(&args.map, config.max_s)?;
    let mut planner = Planner::new(&map, config.planner);

    info!("Reading telemetry from stdin");
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let msg = planner.on_message(&line);
        serde_json::to_writer(&mut stdout, &msg)?;
        writeln!(stdout)?;
        stdout.flush()?;
    }

    info!("Telemetry stream closed");
    Ok(())
}

/// Sends log records to stderr, keeping stdout free for path messages.
fn init_logger(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let start = Instant::now();
    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{:10.6} {:5}] {}: {}",
                start.elapsed().as_secs_f64(),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(io::stderr())
        .apply()
}
