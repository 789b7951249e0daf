//! Command handler modules for the CLI.
//!
//! Each command lives in its own module with the same shape:
//!
//! - Public handler: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) passed in, never taken from the process
//! - Errors propagated via the `CliError` enum; [`crate::run`] maps them to exit codes

pub mod cfg;
pub mod deal;
pub mod eval;
pub mod sim;
pub mod verify;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use eval::handle_eval_command;
pub use sim::handle_sim_command;
pub use verify::handle_verify_command;
