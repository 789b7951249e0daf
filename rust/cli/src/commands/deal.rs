//! Deal command: shuffles a deck from a seed and shows every card of the hand.
//!
//! Seat `i` is dealt under the identity `seat{i}` with the dealer button on
//! seat 0, the same order a fresh table uses. Passing the same seed always
//! prints the same hand.

use crate::config;
use crate::error::CliError;
use crate::ui::format_cards;
use axiomind_holdem::deck::{Commitment, Deck, Seed, deal_hand};
use axiomind_holdem::player::PlayerId;
use std::io::Write;

pub fn handle_deal_command(seed: Option<Seed>, seats: usize, out: &mut dyn Write) -> Result<(), CliError> {
    let seed = match seed {
        Some(s) => s,
        None => config::load_with_sources()
            .map_err(|e| CliError::Config(e.to_string()))?
            .config
            .seed
            .unwrap_or_else(|| Seed::from_bytes(rand::random())),
    };
    write_deal(&seed, seats, out)
}

fn write_deal(seed: &Seed, seats: usize, out: &mut dyn Write) -> Result<(), CliError> {
    let mut deck = Deck::from_seed(seed);
    let dealt = deal_hand(&mut deck, 0, &vec![true; seats])?;

    writeln!(out, "Seed: {}", seed)?;
    for (seat, hole) in dealt.hole_cards.iter().enumerate() {
        let hole = hole.ok_or_else(|| CliError::InvalidInput(format!("seat {} was not dealt", seat)))?;
        let identity = PlayerId::new(format!("seat{}", seat));
        let commitment = Commitment::compute(hole, seed, &identity);
        writeln!(
            out,
            "Seat {}: {}  commitment {}",
            seat,
            format_cards(&hole),
            commitment.to_hex()
        )?;
    }
    let board = dealt.community;
    writeln!(
        out,
        "Board: {} | {} | {}",
        format_cards(&board[..3]),
        board[3],
        board[4]
    )?;
    writeln!(out, "Cards used: {} of 52", deck.position())?;
    Ok(())
}
