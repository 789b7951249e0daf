use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::cards::{full_deck, Card};
use crate::errors::GameError;
use crate::player::PlayerId;

/// The single unpredictable value delivered by the randomness collaborator
/// for one hand. Treated as a 256-bit big-endian integer.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Seed([u8; 32]);

impl Seed {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Seed(bytes)
    }

    /// Widens a `u64` into the low bytes of the 256-bit value.
    pub fn from_u64(v: u64) -> Self {
        let mut bytes = [0u8; 32];
        bytes[24..].copy_from_slice(&v.to_be_bytes());
        Seed(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({})", self.to_hex())
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Accepts 64 hex digits (optionally `0x`-prefixed) or a decimal `u64`.
impl FromStr for Seed {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix("0x").or_else(|| (s.len() == 64).then_some(s)) {
            let padded = format!("{:0>64}", hex);
            return blake3::Hash::from_hex(padded.as_bytes())
                .map(|h| Seed(*h.as_bytes()))
                .map_err(|_| GameError::InvalidSeed(s.to_string()));
        }
        s.parse::<u64>()
            .map(Seed::from_u64)
            .map_err(|_| GameError::InvalidSeed(s.to_string()))
    }
}

impl From<Seed> for String {
    fn from(seed: Seed) -> String {
        seed.to_hex()
    }
}

impl TryFrom<String> for Seed {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Index draw for position `i` of the shuffle: `blake3(seed ‖ i) mod (i + 1)`,
/// reduced over the full 256-bit digest.
fn draw_index(seed: &Seed, i: usize) -> usize {
    let mut hasher = blake3::Hasher::new();
    hasher.update(seed.as_bytes());
    hasher.update(&(i as u32).to_le_bytes());
    let digest = hasher.finalize();
    let modulus = (i + 1) as u32;
    digest
        .as_bytes()
        .iter()
        .fold(0u32, |acc, &b| (acc * 256 + b as u32) % modulus) as usize
}

/// Deterministic Fisher-Yates permutation of the 52 card codes.
pub fn shuffled_cards(seed: &Seed) -> [Card; 52] {
    let mut cards = full_deck();
    for i in (1..cards.len()).rev() {
        let j = draw_index(seed, i);
        cards.swap(i, j);
    }
    cards
}

/// A deck generated once from a seed and consumed front to back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: [Card; 52],
    position: usize,
}

impl Deck {
    pub fn from_seed(seed: &Seed) -> Self {
        Self {
            cards: shuffled_cards(seed),
            position: 0,
        }
    }

    pub fn cards(&self) -> &[Card; 52] {
        &self.cards
    }

    pub fn deal_card(&mut self) -> Option<Card> {
        let c = self.cards.get(self.position).copied()?;
        self.position += 1;
        Some(c)
    }

    pub fn burn_card(&mut self) {
        let _ = self.deal_card();
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}

/// Every card of a hand, assigned up front right after the deck exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealtHand {
    /// Hole cards by seat index; `None` for seats skipped by the deal.
    pub hole_cards: Vec<Option<[Card; 2]>>,
    /// Flop (0..3), turn (3) and river (4).
    pub community: [Card; 5],
}

/// Seat order for dealing: starts left of the dealer and wraps.
pub fn seats_from_left_of(dealer: usize, seat_count: usize) -> impl Iterator<Item = usize> {
    (1..=seat_count).map(move |offset| (dealer + offset) % seat_count)
}

/// Deals two passes of hole cards to every seat flagged in `in_hand`, then
/// burns and draws the flop, turn and river.
pub fn deal_hand(deck: &mut Deck, dealer: usize, in_hand: &[bool]) -> Result<DealtHand, GameError> {
    let seat_count = in_hand.len();
    let mut first = vec![None; seat_count];
    let mut hole_cards = vec![None; seat_count];

    for pass in 0..2 {
        for seat in seats_from_left_of(dealer, seat_count) {
            if !in_hand[seat] {
                continue;
            }
            let c = deck.deal_card().ok_or(GameError::DeckExhausted)?;
            if pass == 0 {
                first[seat] = Some(c);
            } else if let Some(c1) = first[seat] {
                hole_cards[seat] = Some([c1, c]);
            }
        }
    }

    let mut community = Vec::with_capacity(5);
    for street_len in [3usize, 1, 1] {
        deck.burn_card();
        for _ in 0..street_len {
            community.push(deck.deal_card().ok_or(GameError::DeckExhausted)?);
        }
    }
    let community: [Card; 5] = community
        .try_into()
        .map_err(|_| GameError::DeckExhausted)?;

    Ok(DealtHand {
        hole_cards,
        community,
    })
}

/// Binding of a seat's hole cards to the hand's seed and the seat's identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Commitment([u8; 32]);

impl Commitment {
    pub fn compute(hole: [Card; 2], seed: &Seed, identity: &PlayerId) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[hole[0].code(), hole[1].code()]);
        hasher.update(seed.as_bytes());
        hasher.update(identity.as_str().as_bytes());
        Commitment(*hasher.finalize().as_bytes())
    }

    pub fn verify(&self, hole: [Card; 2], seed: &Seed, identity: &PlayerId) -> bool {
        // blake3::Hash equality is constant time
        blake3::Hash::from_bytes(self.0) == blake3::Hash::from_bytes(Self::compute(hole, seed, identity).0)
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", self.to_hex())
    }
}

impl From<Commitment> for String {
    fn from(c: Commitment) -> String {
        c.to_hex()
    }
}

impl TryFrom<String> for Commitment {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        blake3::Hash::from_hex(s.as_bytes())
            .map(|h| Commitment(*h.as_bytes()))
            .map_err(|_| GameError::InvalidCommitment(s))
    }
}
