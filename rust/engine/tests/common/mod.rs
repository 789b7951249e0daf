#![allow(dead_code)]

use std::sync::Arc;

use axiomind_holdem::clock::ManualClock;
use axiomind_holdem::config::TableConfig;
use axiomind_holdem::custody::Escrow;
use axiomind_holdem::deck::Seed;
use axiomind_holdem::engine::Engine;
use axiomind_holdem::game::GameId;
use axiomind_holdem::player::PlayerId;
use axiomind_holdem::randomness::{LocalRandomness, RequestToken};

pub type TestEngine = Engine<LocalRandomness, Escrow>;

pub const START: i64 = 1_000;
pub const FUNDS: u64 = 100_000;
pub const BUY_IN: u64 = 1_000;

pub fn pid(name: &str) -> PlayerId {
    PlayerId::from(name)
}

pub fn engine_with(config: TableConfig, players: &[&str]) -> (TestEngine, ManualClock) {
    let mut escrow = Escrow::new();
    for p in players {
        escrow.fund(&pid(p), FUNDS);
    }
    let clock = ManualClock::new(START);
    let engine = Engine::new(config, pid("house"), LocalRandomness::new_with_seed(7), escrow)
        .expect("valid config")
        .with_clock(Arc::new(clock.clone()));
    (engine, clock)
}

/// Creates a 1000 / 5 / 10 game, seats everyone in order and starts it.
pub fn started_game(engine: &mut TestEngine, players: &[&str]) -> (GameId, RequestToken) {
    let id = engine.create_game(BUY_IN, 5, 10).expect("create");
    for p in players {
        engine.join_game(id, &pid(p), BUY_IN).expect("join");
    }
    let token = engine.start_game(id, &pid(players[0])).expect("start");
    (id, token)
}

/// A game in PreFlop dealt from `seed`.
pub fn dealt_game(players: &[&str], seed: u64) -> (TestEngine, ManualClock, GameId) {
    let (mut engine, clock) = engine_with(TableConfig::default(), players);
    let (id, token) = started_game(&mut engine, players);
    engine
        .fulfill_randomness(token, Seed::from_u64(seed))
        .expect("fulfill");
    (engine, clock, id)
}

/// Identity of the seat whose turn it is.
pub fn actor(engine: &TestEngine, id: GameId) -> PlayerId {
    let seat = engine
        .game_info(id)
        .unwrap()
        .current_actor
        .expect("someone to act");
    engine.seat_info(id, seat).unwrap().player
}
