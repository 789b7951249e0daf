//! # axiomind-holdem CLI
//!
//! Command-line harness around the `axiomind_holdem` engine: deterministic
//! dealing, hand evaluation, engine-driven simulation and replay
//! verification of hand histories.
//!
//! ## Example Usage
//!
//! ```
//! let args = ["axiomind-holdem", "deal", "--seed", "42", "--seats", "3"];
//! let mut out = Vec::new();
//! let mut err = Vec::new();
//! let code = axiomind_holdem_cli::run(args, &mut out, &mut err);
//! assert_eq!(code, 0);
//! assert!(String::from_utf8(out).unwrap().contains("Seat 2: "));
//! ```
//!
//! ## Available Subcommands
//!
//! - `cfg`: Resolved configuration with the source of each value
//! - `deal --seed S --seats N`: Deck, hole cards, commitments and board for a seed
//! - `eval CARDS...`: Category and tiebreak of seven cards
//! - `sim --games N --seats K --seed S --output FILE`: Full games through the engine
//! - `verify --input FILE`: Replay hand records and check them against their seeds

use clap::Parser;
use std::io::Write;

pub mod cli;
pub mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod logging;
pub mod ui;

use cli::{AxiomindHoldemCli, Commands};
use commands::{
    handle_cfg_command, handle_deal_command, handle_eval_command, handle_sim_command,
    handle_verify_command,
};

pub use error::{BatchValidationError, CliError};

const COMMANDS: &[&str] = &["cfg", "deal", "eval", "sim", "verify"];

/// Parses `args` and runs the selected subcommand.
///
/// Returns [`exit_code::SUCCESS`] or [`exit_code::ERROR`]. Help and version
/// output go to `out`; parse errors and command failures go to `err`.
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match AxiomindHoldemCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    if write!(out, "{}", e).is_err() {
                        return exit_code::ERROR;
                    }
                    exit_code::SUCCESS
                }
                _ => {
                    let _ = write_usage(&e, err);
                    exit_code::ERROR
                }
            };
        }
    };

    let result = match cli.cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Deal { seed, seats } => handle_deal_command(seed, seats as usize, out),
        Commands::Eval { cards } => handle_eval_command(&cards, out),
        Commands::Sim {
            games,
            seats,
            seed,
            output,
        } => handle_sim_command(games, seats as usize, seed, output, out, err),
        Commands::Verify { input } => handle_verify_command(&input, out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn write_usage(e: &clap::Error, err: &mut dyn Write) -> std::io::Result<()> {
    writeln!(err, "{}", e)?;
    writeln!(err)?;
    writeln!(err, "axiomind-holdem: seeded Texas Hold'em engine")?;
    writeln!(err, "Usage: axiomind-holdem <command> [options]\n")?;
    writeln!(err, "Commands:")?;
    for c in COMMANDS {
        writeln!(err, "  {}", c)?;
    }
    writeln!(err, "\nFor full help, run: axiomind-holdem --help")
}
