use anyhow::Result;

use crate::cli::output::format_config_table;
use crate::domain::models::Config;

/// Handle the config command
pub fn execute(config: &Config, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Effective configuration:");
        println!("{}", format_config_table(config));
    }
    Ok(())
}
