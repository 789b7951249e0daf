mod common;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use axiomind_holdem::config::TableConfig;
use axiomind_holdem::game::Phase;
use axiomind_holdem::player::PlayerAction as A;

use common::*;

const NAMES: [&str; 6] = ["p0", "p1", "p2", "p3", "p4", "p5"];

fn random_action(rng: &mut ChaCha8Rng) -> A {
    match rng.random_range(0..10) {
        0 => A::Fold,
        1..=3 => A::Check,
        4..=6 => A::Call,
        7 | 8 => A::Raise(10 * rng.random_range(1..=8)),
        _ => A::AllIn,
    }
}

#[test]
fn chips_pot_and_commission_balance_after_every_step() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xA11CE);
    let (mut engine, clock) = engine_with(TableConfig::default(), &NAMES);
    let mut released = 0u64;

    for round in 0..60 {
        let seats = 2 + round % 5;
        let players = &NAMES[..seats];
        let (id, _) = started_game(&mut engine, players);
        let (token, _, seed) = engine.randomness_mut().next_fulfillment().unwrap();
        engine.fulfill_randomness(token, seed).unwrap();

        let mut steps = 0;
        while engine.game_info(id).unwrap().phase != Phase::Finished {
            clock.advance(1);
            let who = actor(&engine, id);
            let before = engine.ledger();
            if engine.player_action(id, &who, random_action(&mut rng)).is_err() {
                // rejected calls leave the books untouched
                assert_eq!(engine.ledger(), before);
                let fallback = if engine.player_action(id, &who, A::Check).is_ok() {
                    Ok(())
                } else {
                    engine.player_action(id, &who, A::Call)
                };
                fallback.unwrap();
            }
            assert!(engine.ledger().is_balanced(), "round {round} step {steps}");
            assert!(engine.game(id).unwrap().is_balanced());
            steps += 1;
            assert!(steps < 500, "hand did not terminate");
        }
        released += engine
            .game(id)
            .unwrap()
            .seats()
            .iter()
            .map(|p| p.chips())
            .sum::<u64>();
    }

    let ledger = engine.ledger();
    assert!(ledger.is_balanced());
    assert_eq!(ledger.pots, 0);
    assert_eq!(ledger.commission, engine.commission_total());
    // custody holds exactly the commission once every game is cashed out
    assert_eq!(engine.custody().escrowed(), ledger.deposited - released);
    assert_eq!(engine.custody().escrowed(), engine.commission_total());
}
