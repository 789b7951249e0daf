use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cards::Card;
use crate::clock::Timestamp;
use crate::deck::Commitment;

/// Identity of a participant as seen by custody and the registry.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_string())
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a player action during a betting round.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Fold and forfeit the hand
    Fold,
    /// Check (only valid when nothing is owed this round)
    Check,
    /// Match the table's current bet
    Call,
    /// Call, then raise the table bet by the given amount
    Raise(u64),
    /// Commit every remaining chip
    AllIn,
}

/// A seat at a table: identity, stack and per-hand betting state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    /// Chips behind (not yet committed to the pot)
    chips: u64,
    /// Committed in the current betting round
    current_bet: u64,
    /// Committed over the whole hand
    total_bet: u64,
    hole: [Option<Card>; 2],
    commitment: Option<Commitment>,
    folded: bool,
    cards_revealed: bool,
    last_action_at: Timestamp,
}

impl Player {
    pub fn new(id: PlayerId, chips: u64, seated_at: Timestamp) -> Self {
        Self {
            id,
            chips,
            last_action_at: seated_at,
            ..Self::default()
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.id
    }
    pub fn chips(&self) -> u64 {
        self.chips
    }
    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }
    pub fn total_bet(&self) -> u64 {
        self.total_bet
    }
    pub fn hole_cards(&self) -> [Option<Card>; 2] {
        self.hole
    }
    pub fn commitment(&self) -> Option<Commitment> {
        self.commitment
    }
    pub fn is_folded(&self) -> bool {
        self.folded
    }
    pub fn cards_revealed(&self) -> bool {
        self.cards_revealed
    }
    pub fn last_action_at(&self) -> Timestamp {
        self.last_action_at
    }

    /// Still in the hand and able to put chips in.
    pub fn can_act(&self) -> bool {
        !self.folded && self.chips > 0
    }

    /// Assigns both hole cards and their commitment. Only the first deal sticks.
    pub fn give_cards(&mut self, hole: [Card; 2], commitment: Commitment) -> Result<(), String> {
        if self.hole.iter().any(Option::is_some) {
            return Err("Hole cards already dealt".to_string());
        }
        self.hole = [Some(hole[0]), Some(hole[1])];
        self.commitment = Some(commitment);
        Ok(())
    }

    /// Moves up to `amount` from chips into this round's bet and returns
    /// what was actually committed.
    pub fn commit(&mut self, amount: u64) -> u64 {
        let moved = amount.min(self.chips);
        self.chips -= moved;
        self.current_bet += moved;
        self.total_bet += moved;
        moved
    }

    pub fn add_chips(&mut self, amount: u64) {
        self.chips = self.chips.saturating_add(amount);
    }

    pub fn fold(&mut self) {
        self.folded = true;
    }

    pub fn reveal(&mut self) {
        if !self.folded {
            self.cards_revealed = true;
        }
    }

    pub fn reset_round(&mut self) {
        self.current_bet = 0;
    }

    pub fn touch(&mut self, now: Timestamp) {
        self.last_action_at = now;
    }
}
