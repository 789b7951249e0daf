mod common;

use axiomind_holdem::game::{Outcome, Phase};
use axiomind_holdem::hand::{evaluate, winning_seats};
use axiomind_holdem::player::PlayerAction as A;
use axiomind_holdem::pot;

use common::*;

#[test]
fn heads_up_dealer_acts_first_preflop_then_last() {
    let (mut engine, _clock, id) = dealt_game(&["alice", "bob"], 1);
    let info = engine.game_info(id).unwrap();
    assert_eq!(info.phase, Phase::PreFlop);
    assert_eq!(info.current_actor, Some(0));
    assert_eq!(info.pot, 15);
    assert_eq!(info.current_bet, 10);

    engine.player_action(id, &pid("alice"), A::Call).unwrap();
    // the big blind still has an option
    assert_eq!(engine.game_info(id).unwrap().current_actor, Some(1));
    engine.player_action(id, &pid("bob"), A::Check).unwrap();

    let info = engine.game_info(id).unwrap();
    assert_eq!(info.phase, Phase::Flop);
    assert_eq!(info.current_actor, Some(1));
    assert_eq!(info.revealed_community, 3);
    assert_eq!(engine.community_cards(id).unwrap().cards.len(), 3);
}

#[test]
fn out_of_turn_and_illegal_actions_change_nothing() {
    let (mut engine, _clock, id) = dealt_game(&["alice", "bob"], 2);
    let before = engine.game_info(id).unwrap();
    let ledger = engine.ledger();

    let err = engine.player_action(id, &pid("bob"), A::Check).unwrap_err();
    assert!(matches!(err, axiomind_holdem::errors::GameError::NotPlayersTurn { expected: 0, actual: 1 }));
    assert!(engine.player_action(id, &pid("alice"), A::Check).is_err());
    assert!(engine.player_action(id, &pid("alice"), A::Raise(3)).is_err());
    assert!(engine.player_action(id, &pid("alice"), A::Raise(5_000)).is_err());
    assert!(engine.player_action(id, &pid("mallory"), A::Fold).is_err());

    assert_eq!(engine.game_info(id).unwrap(), before);
    assert_eq!(engine.ledger(), ledger);
}

#[test]
fn raise_reopens_action_for_everyone() {
    let (mut engine, _clock, id) = dealt_game(&["a", "b", "c"], 3);
    // dealer 0, small blind 1, big blind 2, seat 0 opens
    engine.player_action(id, &pid("a"), A::Call).unwrap();
    engine.player_action(id, &pid("b"), A::Call).unwrap();
    engine.player_action(id, &pid("c"), A::Raise(40)).unwrap();

    let info = engine.game_info(id).unwrap();
    assert_eq!(info.phase, Phase::PreFlop);
    assert_eq!(info.current_bet, 50);
    assert_eq!(info.current_actor, Some(0));
    assert_eq!(engine.game(id).unwrap().last_raiser(), Some(2));

    engine.player_action(id, &pid("a"), A::Call).unwrap();
    engine.player_action(id, &pid("b"), A::Fold).unwrap();
    let info = engine.game_info(id).unwrap();
    assert_eq!(info.phase, Phase::Flop);
    assert_eq!(info.active_count, 2);
    assert_eq!(info.pot, 110);
    // first live seat left of the dealer
    assert_eq!(info.current_actor, Some(2));
}

#[test]
fn six_seats_play_to_showdown() {
    let names = ["s0", "s1", "s2", "s3", "s4", "s5"];
    let (mut engine, _clock, id) = dealt_game(&names, 4);
    assert_eq!(engine.game_info(id).unwrap().current_actor, Some(3));
    let mut steps = 0;
    while engine.game_info(id).unwrap().phase != Phase::Finished {
        let who = actor(&engine, id);
        let seat = engine.seat_of(id, &who).unwrap();
        let info = engine.seat_info(id, seat).unwrap();
        let action = if info.current_bet == engine.game_info(id).unwrap().current_bet {
            A::Check
        } else {
            A::Call
        };
        engine.player_action(id, &who, action).unwrap();
        assert!(engine.ledger().is_balanced());
        steps += 1;
        assert!(steps < 100);
    }
    // 6 preflop actions, then 6 checks on each later street
    assert_eq!(steps, 24);
    let game = engine.game(id).unwrap();
    assert_eq!(game.revealed_community(), 5);
    assert!(game.seats().iter().all(|p| p.cards_revealed()));
    assert_eq!(engine.commission_total(), 3);
}

#[test]
fn showdown_outcome_follows_the_evaluator() {
    for seed in 1..=40u64 {
        let (mut engine, _clock, id) = dealt_game(&["alice", "bob"], seed);
        engine.player_action(id, &pid("alice"), A::Call).unwrap();
        engine.player_action(id, &pid("bob"), A::Check).unwrap();
        for _ in 0..3 {
            engine.player_action(id, &pid("bob"), A::Check).unwrap();
            engine.player_action(id, &pid("alice"), A::Check).unwrap();
        }
        let game = engine.game(id).unwrap();
        assert_eq!(game.phase(), Phase::Finished, "seed {seed}");

        let board = game.board().unwrap();
        let evals: Vec<_> = (0..2)
            .map(|seat| (seat, evaluate(engine.revealed_cards(id, seat).unwrap(), &board)))
            .collect();
        let winners = winning_seats(&evals);
        let payout = pot::settle(20, 5, &winners).unwrap();
        let expected = match payout.shares.as_slice() {
            [(seat, amount)] => Outcome::Winner {
                seat: *seat,
                amount: *amount,
            },
            shares => Outcome::Split {
                shares: shares.to_vec(),
            },
        };
        assert_eq!(game.outcome(), Some(&expected), "seed {seed}");
        assert_eq!(game.commission(), 1);
    }
}

#[test]
fn all_in_and_call_runs_out_the_board() {
    let (mut engine, _clock, id) = dealt_game(&["alice", "bob", "carol"], 5);
    // seat 0 opens all in, blinds call
    engine.player_action(id, &pid("alice"), A::AllIn).unwrap();
    engine.player_action(id, &pid("bob"), A::Call).unwrap();
    engine.player_action(id, &pid("carol"), A::Call).unwrap();

    let info = engine.game_info(id).unwrap();
    assert_eq!(info.phase, Phase::Finished);
    assert_eq!(info.revealed_community, 5);
    assert_eq!(info.commission, 150);
    assert_eq!(engine.commission_total(), 150);
    assert!(engine.ledger().is_balanced());
}

#[test]
fn fold_to_one_pays_the_last_seat_and_cashes_out() {
    let (mut engine, _clock, id) = dealt_game(&["alice", "bob", "carol"], 6);
    engine.player_action(id, &pid("alice"), A::Raise(90)).unwrap();
    engine.player_action(id, &pid("bob"), A::Fold).unwrap();
    engine.player_action(id, &pid("carol"), A::Fold).unwrap();

    let info = engine.game_info(id).unwrap();
    assert_eq!(info.phase, Phase::Finished);
    // pot 100 + 5 + 10 = 115, commission 5
    assert_eq!(info.outcome, Some(Outcome::Winner { seat: 0, amount: 110 }));
    assert!(engine.community_cards(id).unwrap().cards.is_empty());

    let escrow = engine.custody();
    assert_eq!(escrow.balance_of(&pid("alice")), FUNDS + 10);
    assert_eq!(escrow.balance_of(&pid("bob")), FUNDS - 5);
    assert_eq!(escrow.balance_of(&pid("carol")), FUNDS - 10);
    assert_eq!(escrow.escrowed(), 5);

    // finished games are frozen
    assert!(engine.player_action(id, &pid("alice"), A::Check).is_err());
    assert!(engine.force_action_timeout(id).is_err());
}
