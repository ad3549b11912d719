use std::process;

use clap::Parser;

use presence_server::http::{serve, AttendanceApi};
use presence_server::store::AttendanceStore;

/// Attendance ledger path, relative to the working directory.
const LEDGER_FILE: &str = "attendance.json";
/// Static assets are served from the working directory.
const ASSETS_DIR: &str = ".";

/// Minimal attendance API and static asset server.
#[derive(Parser)]
#[command(name = "presence-server")]
struct Cli {
    /// Listening port.
    #[arg(long, env = "PORT", default_value = "8000")]
    port: u16,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let store = AttendanceStore::open(LEDGER_FILE)?;
    let api = AttendanceApi::new(store, ASSETS_DIR);
    serve(cli.port, &api)?;
    Ok(())
}
