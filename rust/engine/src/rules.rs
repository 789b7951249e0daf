use crate::errors::GameError;
use crate::player::{Player, PlayerAction as A};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    Fold,
    Check,
    /// Chips to move to match the table bet.
    Call(u64),
    /// `amount` above the table bet; `total` chips moved (call + amount).
    Raise { amount: u64, total: u64 },
    /// Every remaining chip.
    AllIn(u64),
}

/// Validates a player action according to betting rules and stack size.
///
/// Converts a [`crate::player::PlayerAction`] into a [`ValidatedAction`]
/// holding the exact number of chips the action moves. A call the player
/// cannot cover degrades to an all-in for the remaining stack.
///
/// # Errors
///
/// - [`GameError::CannotCheck`] - check while facing a bet
/// - [`GameError::RaiseTooSmall`] - raise increment below the big blind
/// - [`GameError::InsufficientChips`] - raise the stack cannot cover, or an
///   all-in with nothing left
///
/// # Examples
///
/// ```
/// use axiomind_holdem::player::{Player, PlayerAction, PlayerId};
/// use axiomind_holdem::rules::{validate_action, ValidatedAction};
///
/// let player = Player::new(PlayerId::from("alice"), 1_000, 0);
/// // table bet 50, big blind 20
/// let call = validate_action(&player, 50, 20, PlayerAction::Call);
/// assert_eq!(call, Ok(ValidatedAction::Call(50)));
///
/// let raise = validate_action(&player, 50, 20, PlayerAction::Raise(100));
/// assert_eq!(raise, Ok(ValidatedAction::Raise { amount: 100, total: 150 }));
/// ```
///
/// ```
/// use axiomind_holdem::errors::GameError;
/// use axiomind_holdem::player::{Player, PlayerAction, PlayerId};
/// use axiomind_holdem::rules::validate_action;
///
/// let player = Player::new(PlayerId::from("bob"), 100, 0);
/// assert!(matches!(
///     validate_action(&player, 50, 20, PlayerAction::Check),
///     Err(GameError::CannotCheck { to_call: 50 })
/// ));
/// assert!(matches!(
///     validate_action(&player, 50, 20, PlayerAction::Raise(10)),
///     Err(GameError::RaiseTooSmall { .. })
/// ));
/// ```
pub fn validate_action(
    player: &Player,
    table_bet: u64,
    big_blind: u64,
    action: A,
) -> Result<ValidatedAction, GameError> {
    let stack = player.chips();
    let to_call = table_bet.saturating_sub(player.current_bet());
    match action {
        A::Fold => Ok(ValidatedAction::Fold),
        A::Check => {
            if to_call == 0 {
                Ok(ValidatedAction::Check)
            } else {
                Err(GameError::CannotCheck { to_call })
            }
        }
        A::Call => {
            if to_call > 0 && stack <= to_call {
                Ok(ValidatedAction::AllIn(stack))
            } else {
                Ok(ValidatedAction::Call(to_call))
            }
        }
        A::Raise(amount) => {
            if amount < big_blind {
                return Err(GameError::RaiseTooSmall {
                    amount,
                    minimum: big_blind,
                });
            }
            let total = to_call.saturating_add(amount);
            if stack < total {
                return Err(GameError::InsufficientChips {
                    needed: total,
                    available: stack,
                });
            }
            Ok(ValidatedAction::Raise { amount, total })
        }
        A::AllIn => {
            if stack == 0 {
                Err(GameError::InsufficientChips {
                    needed: 1,
                    available: 0,
                })
            } else {
                Ok(ValidatedAction::AllIn(stack))
            }
        }
    }
}

/// Round state touched by a single betting action.
#[derive(Debug)]
pub struct BettingRound<'a> {
    pub pot: &'a mut u64,
    pub table_bet: &'a mut u64,
    pub last_raiser: &'a mut Option<usize>,
    pub actions_this_round: &'a mut usize,
    pub active_count: &'a mut usize,
}

/// Applies an already validated action for `seat`. Does not count the
/// action; the state machine does that before checking round completion.
pub fn apply_action(round: BettingRound<'_>, seats: &mut [Player], seat: usize, action: &ValidatedAction) {
    let player = &mut seats[seat];
    match *action {
        ValidatedAction::Fold => {
            player.fold();
            *round.active_count = round.active_count.saturating_sub(1);
        }
        ValidatedAction::Check => {}
        ValidatedAction::Call(amount) => {
            *round.pot += player.commit(amount);
        }
        ValidatedAction::Raise { total, .. } => {
            *round.pot += player.commit(total);
            *round.table_bet = player.current_bet();
            *round.last_raiser = Some(seat);
            *round.actions_this_round = 0;
        }
        ValidatedAction::AllIn(amount) => {
            *round.pot += player.commit(amount);
            if player.current_bet() > *round.table_bet {
                *round.table_bet = player.current_bet();
                *round.last_raiser = Some(seat);
                *round.actions_this_round = 0;
            }
        }
    }
}

/// A round closes once every seat that can still bet has matched the table
/// bet and at least that many actions were taken since the last raise.
pub fn is_round_complete(seats: &[Player], table_bet: u64, actions_this_round: usize) -> bool {
    let mut eligible = 0usize;
    for p in seats.iter().filter(|p| p.can_act()) {
        if p.current_bet() != table_bet {
            return false;
        }
        eligible += 1;
    }
    actions_this_round >= eligible
}

/// Next seat clockwise from `from` that can still act, wrapping (and
/// eventually considering `from` itself).
pub fn next_eligible_seat(seats: &[Player], from: usize) -> Option<usize> {
    let n = seats.len();
    (1..=n)
        .map(|offset| (from + offset) % n)
        .find(|&seat| seats[seat].can_act())
}

pub fn eligible_count(seats: &[Player]) -> usize {
    seats.iter().filter(|p| p.can_act()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;

    fn seat(chips: u64, bet: u64) -> Player {
        let mut p = Player::new(PlayerId::from("p"), chips + bet, 0);
        p.commit(bet);
        p
    }

    #[test]
    fn heads_up_matched_bets_close_after_two_actions() {
        let seats = [seat(900, 100), seat(900, 100)];
        assert!(is_round_complete(&seats, 100, 2));
        assert!(!is_round_complete(&seats, 100, 1));
    }

    #[test]
    fn unmatched_bet_keeps_round_open() {
        let seats = [seat(900, 100), seat(900, 99)];
        assert!(!is_round_complete(&seats, 100, 2));
        assert!(!is_round_complete(&seats, 100, 50));
    }

    #[test]
    fn folded_and_all_in_seats_are_ignored() {
        let mut folded = seat(900, 0);
        folded.fold();
        let all_in = seat(0, 40);
        let seats = [seat(800, 100), folded, all_in, seat(800, 100)];
        assert!(is_round_complete(&seats, 100, 2));
        assert_eq!(eligible_count(&seats), 2);
        assert_eq!(next_eligible_seat(&seats, 0), Some(3));
        assert_eq!(next_eligible_seat(&seats, 3), Some(0));
    }

    #[test]
    fn raise_resets_counter_and_moves_table_bet() {
        let mut seats = [seat(1_000, 0), seat(1_000, 0)];
        let (mut pot, mut table_bet, mut raiser, mut acted, mut active) = (0, 0, None, 3, 2);
        let action = validate_action(&seats[1], 0, 20, A::Raise(60)).unwrap();
        apply_action(
            BettingRound {
                pot: &mut pot,
                table_bet: &mut table_bet,
                last_raiser: &mut raiser,
                actions_this_round: &mut acted,
                active_count: &mut active,
            },
            &mut seats,
            1,
            &action,
        );
        assert_eq!((pot, table_bet, raiser, acted), (60, 60, Some(1), 0));
        assert_eq!(seats[1].chips(), 940);
    }

    #[test]
    fn short_all_in_does_not_reopen_betting() {
        let mut seats = [seat(900, 100), seat(30, 20)];
        let (mut pot, mut table_bet, mut raiser, mut acted, mut active) = (120, 100, Some(0), 1, 2);
        let action = validate_action(&seats[1], 100, 20, A::Call).unwrap();
        assert_eq!(action, ValidatedAction::AllIn(30));
        apply_action(
            BettingRound {
                pot: &mut pot,
                table_bet: &mut table_bet,
                last_raiser: &mut raiser,
                actions_this_round: &mut acted,
                active_count: &mut active,
            },
            &mut seats,
            1,
            &action,
        );
        assert_eq!((pot, table_bet, raiser, acted), (150, 100, Some(0), 1));
    }

    #[test]
    fn all_in_with_empty_stack_is_rejected() {
        let broke = seat(0, 50);
        assert!(validate_action(&broke, 50, 20, A::AllIn).is_err());
    }
}
