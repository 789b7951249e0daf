//! Verify command: replays JSONL hand records from their seeds.
//!
//! For every record the deck is rebuilt from the stored seed and dealt the
//! way a table deals it (button on seat 0, every seat in the hand). The
//! replay must reproduce each seat's hole cards, every commitment, the
//! revealed board and the showdown winners. Chips plus commission must add
//! up to the buy-ins.

use crate::error::{BatchValidationError, CliError};
use axiomind_holdem::deck::{Deck, deal_hand};
use axiomind_holdem::game::Outcome;
use axiomind_holdem::hand::{evaluate, winning_seats};
use axiomind_holdem::logger::{HandRecord, read_records};
use std::fs::File;
use std::io::{BufReader, Write};

pub fn handle_verify_command(input: &str, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    let file = File::open(input)?;
    let records = read_records(BufReader::new(file))
        .map_err(|e| CliError::InvalidInput(format!("{}: {}", input, e)))?;
    if records.is_empty() {
        return Err(CliError::InvalidInput(format!("{}: no hand records", input)));
    }

    let mut failures = Vec::new();
    let mut cancelled = 0usize;
    for (i, record) in records.iter().enumerate() {
        if record.seed.is_none() {
            cancelled += 1;
        }
        if let Err(message) = verify_record(record) {
            failures.push(BatchValidationError {
                item_context: format!("record {} (game {})", i + 1, record.game_id),
                message,
            });
        }
    }

    for failure in &failures {
        writeln!(err, "{}", failure)?;
    }
    if !failures.is_empty() {
        return Err(CliError::Verification(format!(
            "{} of {} hand records failed",
            failures.len(),
            records.len()
        )));
    }
    writeln!(
        out,
        "Verified {} hand records ({} cancelled before dealing)",
        records.len(),
        cancelled
    )?;
    Ok(())
}

/// Checks one record; the error names the first inconsistency found.
pub fn verify_record(record: &HandRecord) -> Result<(), String> {
    let seat_count = record.seats.len();
    let chips: u64 = record.seats.iter().map(|s| s.final_chips).sum();
    let expected = record.stakes.buy_in.saturating_mul(seat_count as u64);
    if chips + record.commission != expected {
        return Err(format!(
            "chips {} plus commission {} do not match buy-ins {}",
            chips, record.commission, expected
        ));
    }
    if let Some(action) = record.actions.iter().find(|a| a.seat >= seat_count) {
        return Err(format!("action by unknown seat {}", action.seat));
    }

    let Some(seed) = record.seed else {
        return match record.outcome {
            Some(Outcome::Cancelled) if record.board.is_empty() && record.commission == 0 => Ok(()),
            _ => Err("record without a seed was not cancelled before dealing".to_string()),
        };
    };

    let mut deck = Deck::from_seed(&seed);
    let dealt = deal_hand(&mut deck, 0, &vec![true; seat_count]).map_err(|e| e.to_string())?;

    for (seat, (recorded, replayed)) in record.seats.iter().zip(&dealt.hole_cards).enumerate() {
        let Some(replayed) = *replayed else {
            return Err(format!("seat {} was not dealt on replay", seat));
        };
        if let Some(hole) = recorded.hole
            && hole != replayed
        {
            return Err(format!("seat {} hole cards differ from the seed", seat));
        }
        match recorded.commitment {
            Some(c) if c.verify(replayed, &seed, &recorded.player) => {}
            Some(_) => return Err(format!("commitment mismatch at seat {}", seat)),
            None => return Err(format!("seat {} has no commitment", seat)),
        }
    }

    if !matches!(record.board.len(), 0 | 3 | 4 | 5) || record.board[..] != dealt.community[..record.board.len()] {
        return Err("board differs from the seed".to_string());
    }

    let contenders: Vec<usize> = (0..seat_count).filter(|&s| !record.seats[s].folded).collect();
    if record.board.len() == 5 && contenders.len() >= 2 {
        let evaluations: Vec<_> = contenders
            .iter()
            .filter_map(|&s| dealt.hole_cards[s].map(|hole| (s, evaluate(hole, &dealt.community))))
            .collect();
        let best = winning_seats(&evaluations);
        let paid: Vec<usize> = match &record.outcome {
            Some(Outcome::Winner { seat, .. }) => vec![*seat],
            Some(Outcome::Split { shares }) => shares.iter().map(|(s, _)| *s).collect(),
            other => return Err(format!("showdown ended with outcome {:?}", other)),
        };
        if paid != best {
            return Err(format!("showdown paid seats {:?}, best hands are {:?}", paid, best));
        }
    }
    Ok(())
}
