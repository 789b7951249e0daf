//! Eval command: ranks seven cards with the engine's hand evaluator.

use crate::error::CliError;
use crate::ui::format_cards;
use axiomind_holdem::cards::{Card, parse_cards};
use axiomind_holdem::hand::evaluate_hand;
use std::collections::HashSet;
use std::io::Write;

/// Accepts cards spread over any number of arguments, separated by spaces
/// or commas.
pub fn handle_eval_command(cards: &[String], out: &mut dyn Write) -> Result<(), CliError> {
    let parsed = parse_cards(&cards.join(" ")).map_err(|e| CliError::InvalidInput(e.to_string()))?;
    let cards: [Card; 7] = parsed
        .try_into()
        .map_err(|v: Vec<Card>| CliError::InvalidInput(format!("expected 7 cards, got {}", v.len())))?;

    let mut seen = HashSet::new();
    if let Some(dup) = cards.iter().find(|c| !seen.insert(**c)) {
        return Err(CliError::InvalidInput(format!("duplicate card {}", dup)));
    }

    let eval = evaluate_hand(&cards);
    writeln!(out, "Cards: {}", format_cards(&cards))?;
    writeln!(out, "Category: {:?}", eval.category)?;
    writeln!(out, "Tiebreak: {:#07x}", eval.tiebreak)?;
    Ok(())
}
