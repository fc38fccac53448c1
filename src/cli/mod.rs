//! Command-line interface.

pub mod commands;
pub mod output;
mod types;

pub use types::{Cli, Commands, SimulateArgs};

use serde_json::json;

/// Print a command error and exit with a failure status.
pub fn handle_error(err: anyhow::Error, json: bool) -> ! {
    if json {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = json!({ "error": err.to_string(), "causes": chain });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}
