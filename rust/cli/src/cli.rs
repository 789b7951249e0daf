use axiomind_holdem::config::MAX_SEATS;
use axiomind_holdem::deck::Seed;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "axiomind-holdem",
    version,
    about = "Seeded multi-seat Texas Hold'em engine"
)]
pub struct AxiomindHoldemCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved configuration and where each value came from
    Cfg,
    /// Shuffle from a seed and show every seat's hole cards, commitments and the board
    Deal {
        /// Decimal u64, `0x` hex, or 64 hex digits; falls back to the configured seed
        #[arg(long)]
        seed: Option<Seed>,
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(2..=MAX_SEATS as u64))]
        seats: u64,
    },
    /// Evaluate seven cards, e.g. `eval As Ks Qs Js Ts 2c 3d`
    Eval {
        #[arg(required = true, num_args = 1..)]
        cards: Vec<String>,
    },
    /// Play complete games through the engine with a seeded random policy
    Sim {
        #[arg(long, default_value_t = 100)]
        games: usize,
        #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(2..=MAX_SEATS as u64))]
        seats: u64,
        #[arg(long)]
        seed: Option<u64>,
        /// Write one JSONL hand record per finished game
        #[arg(long)]
        output: Option<String>,
    },
    /// Replay hand records from their seeds and check cards, commitments and chips
    Verify {
        #[arg(long)]
        input: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        AxiomindHoldemCli::command().debug_assert();
    }

    #[test]
    fn seat_count_is_bounded() {
        assert!(AxiomindHoldemCli::try_parse_from(["axiomind-holdem", "deal", "--seats", "7"]).is_err());
        assert!(AxiomindHoldemCli::try_parse_from(["axiomind-holdem", "sim", "--seats", "1"]).is_err());
        assert!(AxiomindHoldemCli::try_parse_from(["axiomind-holdem", "sim", "--seats", "6"]).is_ok());
        let cli = AxiomindHoldemCli::try_parse_from(["axiomind-holdem", "deal", "--seats", "6", "--seed", "0x2a"]).unwrap();
        match cli.cmd {
            Commands::Deal { seed, seats } => {
                assert_eq!(seats, 6);
                assert_eq!(seed, Some(Seed::from_u64(42)));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn bad_seed_is_a_parse_error() {
        assert!(AxiomindHoldemCli::try_parse_from(["axiomind-holdem", "deal", "--seed", "zz"]).is_err());
    }
}
