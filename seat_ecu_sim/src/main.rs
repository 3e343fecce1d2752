//! # Seat ECU Simulator Binary
//!
//! Runs one simulated seat ECU: writes the given command frames, then polls
//! status frames the way a driver would.
//!
//! # Usage
//!
//! ```bash
//! # Drive fore/aft INC at speed 80 and watch 200 status frames
//! seat_ecu_sim --send 707#01.50.00.00.00.00.00.00 --reads 200
//!
//! # Config file + env overrides, run until Ctrl-C
//! SAE_POS=80 seat_ecu_sim -c sim.toml -n 0 -vv
//! ```

#![deny(warnings)]

use clap::{ArgAction, Parser};
use seat_common::config::{LogLevel, load_sim_config};
use seat_common::consts::{FRAME_LEN, SIM_SERVICE_NAME};
use seat_common::error::SimError;
use seat_common::frame::CanFrame;
use seat_ecu_sim::status::StatusFrame;
use seat_ecu_sim::{SimContext, SocketCallbacks, TransportHandle};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

/// Handle the CLI binds the simulator to.
const CLI_HANDLE: TransportHandle = TransportHandle(0);

/// Seat ECU simulator - CAN seat motor test double
#[derive(Parser, Debug)]
#[command(name = "seat_ecu_sim")]
#[command(version)]
#[command(about = "Simulated seat adjustment ECU answering on a mocked CAN socket")]
#[command(long_about = None)]
struct Args {
    /// Path to a TOML configuration file. SAE_* environment variables override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Command frame to write after start, in ID#DATA notation (repeatable)
    #[arg(short, long = "send", value_name = "ID#DATA", action = ArgAction::Append)]
    sends: Vec<CanFrame>,

    /// Number of status frames to read (0 = until Ctrl-C)
    #[arg(short = 'n', long, default_value_t = 20)]
    reads: u64,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        // Tracing may not be installed yet when config loading fails.
        eprintln!("Simulator failed: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let file_config = load_sim_config(args.config.as_deref())?;

    setup_tracing(file_config.log_level, args.verbose, args.json);
    info!("{} v{} starting...", SIM_SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    let mut ctx = SimContext::new(file_config.sim);
    ctx.start(CLI_HANDLE);
    let result = run_session(&mut ctx, &args.sends, args.reads, &running);
    ctx.close();
    result?;

    info!("Seat ECU simulator shutdown complete");
    Ok(())
}

/// Write `sends`, then read `reads` status frames (0 = until `running` clears).
fn run_session<S: SocketCallbacks>(
    sim: &mut S,
    sends: &[CanFrame],
    reads: u64,
    running: &AtomicBool,
) -> Result<(), SimError> {
    for frame in sends {
        match sim.on_write(frame, usize::from(frame.dlc)) {
            Ok(_) => info!("Sent {}", frame),
            Err(e) => warn!("Write of {} rejected: {}", frame, e),
        }
    }

    let mut count = 0u64;
    while running.load(Ordering::SeqCst) && (reads == 0 || count < reads) {
        let mut frame = CanFrame::default();
        match sim.on_read(&mut frame, FRAME_LEN) {
            Ok(_) => {
                count += 1;
                match StatusFrame::decode(&frame) {
                    Some(status) => println!("{frame}  {status}"),
                    None => println!("{frame}"),
                }
            }
            Err(e) if e.is_retryable() => warn!("Read failed, retrying: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Setup tracing subscriber from the configured level and CLI verbosity.
fn setup_tracing(log_level: LogLevel, verbose: u8, json: bool) {
    let level = match verbose {
        0 => log_level.as_directive().parse().unwrap_or(Level::INFO),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
