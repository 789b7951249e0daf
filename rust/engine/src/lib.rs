//! # axiomind-holdem: Seeded Multi-Seat Hold'em Engine
//!
//! A Texas Hold'em engine for 2 to 6 seats whose fairness rests on one
//! unpredictable seed delivered per hand by an external randomness source.
//! The deck is derived deterministically from that seed, every card of the
//! hand is assigned and committed up front, and betting runs as a turn-based
//! state machine with timeouts.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card codes 0-51, ranks, suits and notation
//! - [`deck`] - Seed-driven shuffle, dealing and hole-card commitments
//! - [`hand`] - 7-card evaluation into a totally ordered strength
//! - [`rules`] - Action validation and round completion
//! - [`game`] - Per-table state machine and views
//! - [`pot`] - Commission and winner shares
//! - [`engine`] - Registry of games and the public API
//! - [`randomness`] - Request/fulfill randomness protocol
//! - [`custody`] - Value custody boundary
//! - [`clock`] - Time source for timeouts
//! - [`config`] - Table rules shared by every game
//! - [`logger`] - HandRecord serialization (JSONL)
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use axiomind_holdem::cards::parse_cards;
//! use axiomind_holdem::hand::{evaluate_hand, Category};
//!
//! let cards: [_; 7] = parse_cards("As Ks Qs Js Ts 2c 3d")
//!     .unwrap()
//!     .try_into()
//!     .unwrap();
//! assert_eq!(evaluate_hand(&cards).category, Category::RoyalFlush);
//! ```
//!
//! ## Deterministic Dealing
//!
//! ```rust
//! use axiomind_holdem::deck::{shuffled_cards, Seed};
//!
//! let seed: Seed = "42".parse().unwrap();
//! assert_eq!(shuffled_cards(&seed), shuffled_cards(&seed));
//! ```

pub mod cards;
pub mod clock;
pub mod config;
pub mod custody;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod hand;
pub mod logger;
pub mod player;
pub mod pot;
pub mod randomness;
pub mod rules;
