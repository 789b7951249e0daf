//! Configuration command handler.
//!
//! Prints the resolved configuration as JSON, one `{value, source}` object
//! per key:
//!
//! ```json
//! {
//!   "buy_in": {
//!     "value": 1000,
//!     "source": "default"
//!   },
//!   ...
//! }
//! ```

use crate::config::{self, ConfigError, ConfigResolved};
use crate::error::CliError;
use crate::ui;
use std::io::Write;

pub fn handle_cfg_command(out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    write_resolved(config::load_with_sources(), out, err)
}

fn write_resolved(
    resolved: Result<ConfigResolved, ConfigError>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let ConfigResolved { config, sources } = resolved.map_err(|e| CliError::Config(e.to_string()))?;
    if config.seed.is_none() {
        ui::display_warning(err, "no seed configured; deal and sim will draw one from entropy")?;
    }

    let display = serde_json::json!({
        "commission_rate": {
            "value": config.commission_rate,
            "source": sources.commission_rate,
        },
        "action_timeout_secs": {
            "value": config.action_timeout_secs,
            "source": sources.action_timeout_secs,
        },
        "randomness_timeout_secs": {
            "value": config.randomness_timeout_secs,
            "source": sources.randomness_timeout_secs,
        },
        "min_buy_in_big_blinds": {
            "value": config.min_buy_in_big_blinds,
            "source": sources.min_buy_in_big_blinds,
        },
        "buy_in": {
            "value": config.buy_in,
            "source": sources.buy_in,
        },
        "small_blind": {
            "value": config.small_blind,
            "source": sources.small_blind,
        },
        "seed": {
            "value": config.seed.map(|s| s.to_hex()),
            "source": sources.seed,
        }
    });
    let json_str = serde_json::to_string_pretty(&display).map_err(std::io::Error::other)?;
    writeln!(out, "{}", json_str)?;
    Ok(())
}
