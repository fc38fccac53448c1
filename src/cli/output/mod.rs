//! Output formatting for CLI commands.

pub mod table;

pub use table::{format_attempts_table, format_config_table, format_metrics_table};
