use thiserror::Error;

use crate::custody::TransferError;
use crate::game::{GameId, Phase};
use crate::randomness::RequestToken;

/// Coarse classification of a [`GameError`], matching how callers are
/// expected to react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input or wrong state; nothing changed, retry with corrected input.
    Validation,
    /// A time threshold guard: either not reached yet or already elapsed.
    Timeout,
    /// Custody refused a transfer; the whole operation was rolled back.
    Transfer,
    /// A randomness fulfillment that does not match any pending request.
    UnknownRequest,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Game {0} does not exist")]
    GameNotFound(GameId),
    #[error("Invalid stakes: small blind {small_blind}, big blind {big_blind} (big blind must be twice the small blind)")]
    InvalidBlinds { small_blind: u64, big_blind: u64 },
    #[error("Buy-in {buy_in} is below the minimum of {minimum}")]
    BuyInTooSmall { buy_in: u64, minimum: u64 },
    #[error("Buy-in {buy_in} is above the maximum of {maximum}")]
    BuyInTooLarge { buy_in: u64, maximum: u64 },
    #[error("Deposit of {deposit} would overflow the escrowed total of {deposited}")]
    DepositOverflow { deposited: u64, deposit: u64 },
    #[error("Deposit {actual} does not match the buy-in of {expected}")]
    WrongBuyIn { expected: u64, actual: u64 },
    #[error("Game {0} is full")]
    GameFull(GameId),
    #[error("Player {player} is already seated in game {game_id}")]
    AlreadySeated { game_id: GameId, player: String },
    #[error("Player {player} is not seated in game {game_id}")]
    NotSeated { game_id: GameId, player: String },
    #[error("Seat {0} does not exist")]
    NoSuchSeat(usize),
    #[error("Not enough players: {seated} seated, {minimum} required")]
    NotEnoughPlayers { seated: usize, minimum: usize },
    #[error("Operation not allowed in phase {0:?}")]
    WrongPhase(Phase),
    #[error("It's not seat {actual}'s turn (expected seat {expected})")]
    NotPlayersTurn { expected: usize, actual: usize },
    #[error("Action window closed at {deadline}")]
    ActionTimedOut { deadline: i64 },
    #[error("Cannot check while facing a bet of {to_call}")]
    CannotCheck { to_call: u64 },
    #[error("Raise of {amount} is below the minimum of {minimum}")]
    RaiseTooSmall { amount: u64, minimum: u64 },
    #[error("Insufficient chips: {needed} needed, {available} available")]
    InsufficientChips { needed: u64, available: u64 },
    #[error("Timeout not reached (deadline {deadline}, now {now})")]
    TimeoutNotReached { deadline: i64, now: i64 },
    #[error("Unknown randomness request {0}")]
    UnknownRequest(RequestToken),
    #[error("Randomness request {token} is stale for game {game_id}")]
    StaleRequest { game_id: GameId, token: RequestToken },
    #[error("Deck has not been generated yet")]
    DeckNotGenerated,
    #[error("Deck exhausted")]
    DeckExhausted,
    #[error("Seat {0} already holds cards")]
    CardsAlreadyDealt(usize),
    #[error("Cards of seat {0} have not been revealed")]
    CardsNotRevealed(usize),
    #[error("Caller is not the owner")]
    NotOwner,
    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
    #[error("Invalid commitment: {0}")]
    InvalidCommitment(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Randomness source failed: {0}")]
    Randomness(String),
    #[error(transparent)]
    Transfer(#[from] TransferError),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::ActionTimedOut { .. } | GameError::TimeoutNotReached { .. } => {
                ErrorKind::Timeout
            }
            GameError::Transfer(_) => ErrorKind::Transfer,
            GameError::UnknownRequest(_) | GameError::StaleRequest { .. } => {
                ErrorKind::UnknownRequest
            }
            _ => ErrorKind::Validation,
        }
    }
}
