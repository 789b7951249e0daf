//! Randomness collaborator.
//!
//! A hand's seed arrives through an explicit two-phase protocol: the engine
//! calls [`RandomnessSource::request`] and stores the returned token on the
//! game; later, whoever holds the value calls
//! [`Engine::fulfill_randomness`](crate::engine::Engine::fulfill_randomness)
//! with that token. Nothing here assumes how the value travels between the
//! two calls.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::deck::Seed;
use crate::errors::GameError;
use crate::game::GameId;

/// Identifies one outstanding randomness request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub trait RandomnessSource {
    /// Registers a request for one unpredictable value on behalf of `game_id`.
    fn request(&mut self, game_id: GameId) -> Result<RequestToken, GameError>;
}

/// Local ChaCha20-backed source.
///
/// Requests queue up until [`LocalRandomness::next_fulfillment`] produces
/// the value for the oldest one. Seeding the generator makes whole sessions
/// reproducible.
#[derive(Debug)]
pub struct LocalRandomness {
    rng: ChaCha20Rng,
    next_token: u64,
    pending: VecDeque<(RequestToken, GameId)>,
}

impl LocalRandomness {
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            next_token: 1,
            pending: VecDeque::new(),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new_with_seed(rand::random())
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Pops the oldest request and draws its value.
    pub fn next_fulfillment(&mut self) -> Option<(RequestToken, GameId, Seed)> {
        let (token, game_id) = self.pending.pop_front()?;
        let mut bytes = [0u8; 32];
        self.rng.fill_bytes(&mut bytes);
        Some((token, game_id, Seed::from_bytes(bytes)))
    }

    /// Forgets the oldest request without answering it.
    pub fn drop_next(&mut self) -> Option<(RequestToken, GameId)> {
        self.pending.pop_front()
    }
}

impl RandomnessSource for LocalRandomness {
    fn request(&mut self, game_id: GameId) -> Result<RequestToken, GameError> {
        let token = RequestToken(self.next_token);
        self.next_token += 1;
        self.pending.push_back((token, game_id));
        Ok(token)
    }
}
