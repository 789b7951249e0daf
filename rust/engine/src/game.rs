//! Per-table hand state and its phase transitions.
//!
//! A [`Game`] plays exactly one hand. It is created in
//! [`Phase::WaitingForPlayers`], moves strictly forward through the betting
//! streets and ends in [`Phase::Finished`], after which nothing mutates it.
//! Funds never move here; the registry turns [`Game::release_plan`] into
//! custody transfers.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::cards::Card;
use crate::clock::Timestamp;
use crate::config::{TableConfig, MAX_SEATS};
use crate::custody::Transfer;
use crate::deck::{deal_hand, Commitment, Deck, Seed};
use crate::errors::GameError;
use crate::hand::{evaluate, winning_seats};
use crate::logger::ActionRecord;
use crate::player::{Player, PlayerAction, PlayerId};
use crate::pot;
use crate::randomness::RequestToken;
use crate::rules::{self, BettingRound, ValidatedAction};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum Phase {
    WaitingForPlayers,
    RequestingVrf,
    PreFlop,
    Flop,
    Turn,
    River,
    Showdown,
    Finished,
}

impl Phase {
    /// PreFlop, Flop, Turn and River accept player actions.
    pub fn is_betting(self) -> bool {
        matches!(self, Phase::PreFlop | Phase::Flop | Phase::Turn | Phase::River)
    }
}

/// How a finished game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Winner { seat: usize, amount: u64 },
    /// `(seat, amount)` pairs, lowest seat first.
    Split { shares: Vec<(usize, u64)> },
    /// Randomness never arrived; every buy-in is returned.
    Cancelled,
}

/// Buy-in and blinds of one table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stakes {
    pub buy_in: u64,
    pub small_blind: u64,
    pub big_blind: u64,
}

impl Stakes {
    pub fn validate(&self, rules: &TableConfig) -> Result<(), GameError> {
        if self.small_blind == 0 || self.small_blind.checked_mul(2) != Some(self.big_blind) {
            return Err(GameError::InvalidBlinds {
                small_blind: self.small_blind,
                big_blind: self.big_blind,
            });
        }
        let maximum = u64::MAX / MAX_SEATS as u64;
        if self.buy_in > maximum {
            return Err(GameError::BuyInTooLarge {
                buy_in: self.buy_in,
                maximum,
            });
        }
        let minimum = self.big_blind.saturating_mul(rules.min_buy_in_big_blinds);
        if self.buy_in < minimum {
            return Err(GameError::BuyInTooSmall {
                buy_in: self.buy_in,
                minimum,
            });
        }
        Ok(())
    }
}

/// Public snapshot of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: GameId,
    pub phase: Phase,
    pub stakes: Stakes,
    pub pot: u64,
    pub current_bet: u64,
    pub dealer: usize,
    pub current_actor: Option<usize>,
    pub action_deadline: Option<Timestamp>,
    pub seat_count: usize,
    pub active_count: usize,
    pub revealed_community: usize,
    pub commission: u64,
    pub outcome: Option<Outcome>,
}

/// Public snapshot of one seat. Hole cards are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatInfo {
    pub seat: usize,
    pub player: PlayerId,
    pub chips: u64,
    pub current_bet: u64,
    pub total_bet: u64,
    pub folded: bool,
    pub cards_revealed: bool,
    pub last_action_at: Timestamp,
    pub commitment: Option<Commitment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityView {
    /// Only the revealed prefix of the board.
    pub cards: Vec<Card>,
    /// 0, 3, 4 or 5.
    pub revealed: usize,
}

fn deadline_after(at: Timestamp, secs: u64) -> Timestamp {
    at.saturating_add(Timestamp::try_from(secs).unwrap_or(Timestamp::MAX))
}

#[derive(Debug, Clone)]
pub struct Game {
    id: GameId,
    stakes: Stakes,
    rules: TableConfig,
    phase: Phase,
    seats: [Player; MAX_SEATS],
    seat_count: usize,
    active_count: usize,
    dealer: usize,
    current_actor: Option<usize>,
    pot: u64,
    current_bet: u64,
    last_raiser: Option<usize>,
    actions_this_round: usize,
    deck: Option<Deck>,
    /// Assigned in full when the deck is generated; revealed by prefix.
    community: [Option<Card>; 5],
    revealed_community: usize,
    pending_request: Option<RequestToken>,
    requested_at: Option<Timestamp>,
    seed: Option<Seed>,
    actions: Vec<ActionRecord>,
    outcome: Option<Outcome>,
    commission: u64,
    created_at: Timestamp,
}

impl Game {
    pub fn new(id: GameId, stakes: Stakes, rules: TableConfig, now: Timestamp) -> Result<Self, GameError> {
        rules.validate()?;
        stakes.validate(&rules)?;
        Ok(Self {
            id,
            stakes,
            rules,
            phase: Phase::WaitingForPlayers,
            seats: std::array::from_fn(|_| Player::default()),
            seat_count: 0,
            active_count: 0,
            dealer: 0,
            current_actor: None,
            pot: 0,
            current_bet: 0,
            last_raiser: None,
            actions_this_round: 0,
            deck: None,
            community: [None; 5],
            revealed_community: 0,
            pending_request: None,
            requested_at: None,
            seed: None,
            actions: Vec::new(),
            outcome: None,
            commission: 0,
            created_at: now,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }
    pub fn stakes(&self) -> Stakes {
        self.stakes
    }
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn pot(&self) -> u64 {
        self.pot
    }
    pub fn current_bet(&self) -> u64 {
        self.current_bet
    }
    pub fn dealer(&self) -> usize {
        self.dealer
    }
    pub fn current_actor(&self) -> Option<usize> {
        self.current_actor
    }
    pub fn last_raiser(&self) -> Option<usize> {
        self.last_raiser
    }
    pub fn actions_this_round(&self) -> usize {
        self.actions_this_round
    }
    pub fn seat_count(&self) -> usize {
        self.seat_count
    }
    pub fn active_count(&self) -> usize {
        self.active_count
    }
    /// Occupied seats only.
    pub fn seats(&self) -> &[Player] {
        &self.seats[..self.seat_count]
    }
    pub fn deck(&self) -> Option<&Deck> {
        self.deck.as_ref()
    }
    pub fn seed(&self) -> Option<Seed> {
        self.seed
    }
    pub fn pending_request(&self) -> Option<RequestToken> {
        self.pending_request
    }
    pub fn requested_at(&self) -> Option<Timestamp> {
        self.requested_at
    }
    pub fn revealed_community(&self) -> usize {
        self.revealed_community
    }
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }
    /// Commission taken when this game settled.
    pub fn commission(&self) -> u64 {
        self.commission
    }
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn seat(&self, seat: usize) -> Result<&Player, GameError> {
        self.seats().get(seat).ok_or(GameError::NoSuchSeat(seat))
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.seats().iter().position(|p| p.id() == player)
    }

    fn seat_index(&self, player: &PlayerId) -> Result<usize, GameError> {
        self.seat_of(player).ok_or_else(|| GameError::NotSeated {
            game_id: self.id,
            player: player.to_string(),
        })
    }

    fn expect_phase(&self, phase: Phase) -> Result<(), GameError> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(GameError::WrongPhase(self.phase))
        }
    }

    /// Deadline of the current actor, if any.
    pub fn action_deadline(&self) -> Option<Timestamp> {
        let seat = self.current_actor?;
        Some(deadline_after(
            self.seats[seat].last_action_at(),
            self.rules.action_timeout_secs,
        ))
    }

    pub fn randomness_deadline(&self) -> Option<Timestamp> {
        self.requested_at
            .map(|at| deadline_after(at, self.rules.randomness_timeout_secs))
    }

    /// The five board cards once the deck exists, revealed or not.
    pub fn board(&self) -> Option<[Card; 5]> {
        let cards: Vec<Card> = self.community.iter().copied().collect::<Option<_>>()?;
        cards.try_into().ok()
    }

    /// Seats a new player with a stack equal to the buy-in.
    pub fn seat_player(&mut self, player: PlayerId, now: Timestamp) -> Result<usize, GameError> {
        self.expect_phase(Phase::WaitingForPlayers)?;
        if self.seat_of(&player).is_some() {
            return Err(GameError::AlreadySeated {
                game_id: self.id,
                player: player.to_string(),
            });
        }
        if self.seat_count >= self.rules.max_players {
            return Err(GameError::GameFull(self.id));
        }
        let seat = self.seat_count;
        self.seats[seat] = Player::new(player, self.stakes.buy_in, now);
        self.seat_count += 1;
        self.active_count += 1;
        Ok(seat)
    }

    /// Checks everything `begin_randomness` checks, without side effects, so
    /// the caller can validate before asking for a randomness token.
    pub fn can_start(&self, caller: &PlayerId) -> Result<(), GameError> {
        self.expect_phase(Phase::WaitingForPlayers)?;
        self.seat_index(caller)?;
        if self.seat_count < self.rules.min_players {
            return Err(GameError::NotEnoughPlayers {
                seated: self.seat_count,
                minimum: self.rules.min_players,
            });
        }
        Ok(())
    }

    pub fn begin_randomness(
        &mut self,
        caller: &PlayerId,
        token: RequestToken,
        now: Timestamp,
    ) -> Result<(), GameError> {
        self.can_start(caller)?;
        self.pending_request = Some(token);
        self.requested_at = Some(now);
        self.enter(Phase::RequestingVrf);
        Ok(())
    }

    /// Consumes the pending request: generates the deck, deals every card of
    /// the hand up front, posts blinds and hands the turn to the first actor.
    pub fn fulfill(&mut self, token: RequestToken, seed: Seed, now: Timestamp) -> Result<(), GameError> {
        if self.phase != Phase::RequestingVrf || self.pending_request != Some(token) {
            return Err(GameError::StaleRequest {
                game_id: self.id,
                token,
            });
        }
        let mut deck = Deck::from_seed(&seed);
        let in_hand: Vec<bool> = self.seats().iter().map(|p| !p.is_folded()).collect();
        let dealt = deal_hand(&mut deck, self.dealer, &in_hand)?;

        for (seat, hole) in dealt.hole_cards.iter().enumerate() {
            let Some(hole) = *hole else { continue };
            let player = &mut self.seats[seat];
            let commitment = Commitment::compute(hole, &seed, player.id());
            player
                .give_cards(hole, commitment)
                .map_err(|_| GameError::CardsAlreadyDealt(seat))?;
        }
        self.community = dealt.community.map(Some);
        self.deck = Some(deck);
        self.seed = Some(seed);
        self.pending_request = None;
        self.enter(Phase::PreFlop);
        self.post_blinds(now)
    }

    fn post_blinds(&mut self, now: Timestamp) -> Result<(), GameError> {
        let n = self.seat_count;
        // heads-up: the dealer posts the small blind
        let sb = if n == 2 { self.dealer } else { (self.dealer + 1) % n };
        let bb = (sb + 1) % n;
        self.pot += self.seats[sb].commit(self.stakes.small_blind);
        self.pot += self.seats[bb].commit(self.stakes.big_blind);
        self.current_bet = self.seats().iter().map(Player::current_bet).max().unwrap_or(0);
        self.last_raiser = Some(bb);
        self.actions_this_round = 0;
        match rules::next_eligible_seat(self.seats(), bb) {
            Some(first) => {
                self.pass_turn(first, now);
                Ok(())
            }
            None => self.advance_street(now),
        }
    }

    fn pass_turn(&mut self, seat: usize, now: Timestamp) {
        self.current_actor = Some(seat);
        self.seats[seat].touch(now);
    }

    fn expect_actor(&self) -> Result<usize, GameError> {
        if !self.phase.is_betting() {
            return Err(GameError::WrongPhase(self.phase));
        }
        self.current_actor.ok_or(GameError::WrongPhase(self.phase))
    }

    /// Applies `action` for `caller`, who must be the current actor and still
    /// inside the action window.
    pub fn act(&mut self, caller: &PlayerId, action: PlayerAction, now: Timestamp) -> Result<(), GameError> {
        let actor = self.expect_actor()?;
        let seat = self.seat_index(caller)?;
        if seat != actor {
            return Err(GameError::NotPlayersTurn {
                expected: actor,
                actual: seat,
            });
        }
        let deadline = deadline_after(
            self.seats[actor].last_action_at(),
            self.rules.action_timeout_secs,
        );
        if now > deadline {
            return Err(GameError::ActionTimedOut { deadline });
        }
        let validated = rules::validate_action(
            &self.seats[seat],
            self.current_bet,
            self.stakes.big_blind,
            action,
        )?;
        self.apply(seat, &validated, action, false, now)
    }

    /// Folds the current actor once their window has elapsed. Returns the
    /// folded seat.
    pub fn force_timeout(&mut self, now: Timestamp) -> Result<usize, GameError> {
        let actor = self.expect_actor()?;
        let deadline = deadline_after(
            self.seats[actor].last_action_at(),
            self.rules.action_timeout_secs,
        );
        if now <= deadline {
            return Err(GameError::TimeoutNotReached { deadline, now });
        }
        self.apply(actor, &ValidatedAction::Fold, PlayerAction::Fold, true, now)?;
        Ok(actor)
    }

    fn apply(
        &mut self,
        seat: usize,
        validated: &ValidatedAction,
        action: PlayerAction,
        forced: bool,
        now: Timestamp,
    ) -> Result<(), GameError> {
        let n = self.seat_count;
        let phase = self.phase;
        rules::apply_action(
            BettingRound {
                pot: &mut self.pot,
                table_bet: &mut self.current_bet,
                last_raiser: &mut self.last_raiser,
                actions_this_round: &mut self.actions_this_round,
                active_count: &mut self.active_count,
            },
            &mut self.seats[..n],
            seat,
            validated,
        );
        self.seats[seat].touch(now);
        self.actions.push(ActionRecord {
            seat,
            phase,
            action,
            forced,
        });
        self.actions_this_round += 1;
        debug!(game_id = %self.id, seat, ?action, forced, pot = self.pot, "action applied");

        if self.active_count == 1 {
            let winner = self
                .seats()
                .iter()
                .position(|p| !p.is_folded())
                .ok_or(GameError::NotEnoughPlayers {
                    seated: n,
                    minimum: 1,
                })?;
            return self.settle(&[winner]);
        }
        if rules::is_round_complete(self.seats(), self.current_bet, self.actions_this_round) {
            return self.advance_street(now);
        }
        match rules::next_eligible_seat(self.seats(), seat) {
            Some(next) => {
                self.pass_turn(next, now);
                Ok(())
            }
            None => self.advance_street(now),
        }
    }

    /// Moves to the next street. When fewer than two seats can still bet the
    /// remaining streets are revealed without action and the hand goes to
    /// showdown.
    fn advance_street(&mut self, now: Timestamp) -> Result<(), GameError> {
        loop {
            let (next, revealed) = match self.phase {
                Phase::PreFlop => (Phase::Flop, 3),
                Phase::Flop => (Phase::Turn, 4),
                Phase::Turn => (Phase::River, 5),
                Phase::River => return self.showdown(),
                Phase::WaitingForPlayers | Phase::RequestingVrf | Phase::Showdown | Phase::Finished => {
                    return Err(GameError::WrongPhase(self.phase))
                }
            };
            self.enter(next);
            self.revealed_community = revealed;
            self.current_bet = 0;
            self.last_raiser = None;
            self.actions_this_round = 0;
            self.current_actor = None;
            let n = self.seat_count;
            for p in self.seats[..n].iter_mut() {
                p.reset_round();
            }
            if rules::eligible_count(self.seats()) >= 2 {
                if let Some(first) = rules::next_eligible_seat(self.seats(), self.dealer) {
                    self.pass_turn(first, now);
                    return Ok(());
                }
            }
        }
    }

    fn showdown(&mut self) -> Result<(), GameError> {
        self.enter(Phase::Showdown);
        self.revealed_community = 5;
        self.current_actor = None;
        let board = self.board().ok_or(GameError::DeckNotGenerated)?;
        let n = self.seat_count;
        let mut evaluations = Vec::with_capacity(n);
        for (seat, p) in self.seats[..n].iter_mut().enumerate() {
            if p.is_folded() {
                continue;
            }
            if let [Some(a), Some(b)] = p.hole_cards() {
                p.reveal();
                evaluations.push((seat, evaluate([a, b], &board)));
            }
        }
        self.settle(&winning_seats(&evaluations))
    }

    fn settle(&mut self, winners: &[usize]) -> Result<(), GameError> {
        let payout = pot::settle(self.pot, self.rules.commission_rate, winners).ok_or(
            GameError::NotEnoughPlayers {
                seated: self.seat_count,
                minimum: 1,
            },
        )?;
        for &(seat, amount) in &payout.shares {
            self.seats[seat].add_chips(amount);
        }
        self.pot = 0;
        self.commission = payout.commission;
        self.outcome = Some(match payout.shares.as_slice() {
            [(seat, amount)] => Outcome::Winner {
                seat: *seat,
                amount: *amount,
            },
            shares => Outcome::Split {
                shares: shares.to_vec(),
            },
        });
        self.current_actor = None;
        self.enter(Phase::Finished);
        Ok(())
    }

    /// Cancels a game whose randomness never arrived. Stacks are still the
    /// untouched buy-ins.
    pub fn cancel_for_randomness_timeout(&mut self, now: Timestamp) -> Result<(), GameError> {
        self.expect_phase(Phase::RequestingVrf)?;
        let deadline = self.randomness_deadline().unwrap_or(self.created_at);
        if now <= deadline {
            return Err(GameError::TimeoutNotReached { deadline, now });
        }
        self.pending_request = None;
        self.pot = 0;
        self.commission = 0;
        self.outcome = Some(Outcome::Cancelled);
        self.enter(Phase::Finished);
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        debug!(game_id = %self.id, from = ?self.phase, to = ?phase, pot = self.pot, "phase transition");
        self.phase = phase;
    }

    /// Custody releases owed once the game is finished: final stacks after a
    /// settlement, exact buy-ins after a cancellation. Empty otherwise.
    pub fn release_plan(&self) -> Vec<Transfer> {
        let amount_for = |p: &Player| match self.outcome {
            Some(Outcome::Cancelled) => self.stakes.buy_in,
            _ => p.chips(),
        };
        if !self.is_finished() {
            return Vec::new();
        }
        self.seats()
            .iter()
            .map(|p| Transfer {
                recipient: p.id().clone(),
                amount: amount_for(p),
            })
            .filter(|t| t.amount > 0)
            .collect()
    }

    /// Buy-ins taken in equal everything on the books: stacks, pot and the
    /// commission this game took.
    pub fn is_balanced(&self) -> bool {
        let on_books: u64 = self.seats().iter().map(Player::chips).sum::<u64>() + self.pot + self.commission;
        on_books == self.stakes.buy_in * self.seat_count as u64
    }

    pub fn info(&self) -> GameInfo {
        GameInfo {
            id: self.id,
            phase: self.phase,
            stakes: self.stakes,
            pot: self.pot,
            current_bet: self.current_bet,
            dealer: self.dealer,
            current_actor: self.current_actor,
            action_deadline: self.action_deadline(),
            seat_count: self.seat_count,
            active_count: self.active_count,
            revealed_community: self.revealed_community,
            commission: self.commission,
            outcome: self.outcome.clone(),
        }
    }

    pub fn seat_info(&self, seat: usize) -> Result<SeatInfo, GameError> {
        let p = self.seat(seat)?;
        Ok(SeatInfo {
            seat,
            player: p.id().clone(),
            chips: p.chips(),
            current_bet: p.current_bet(),
            total_bet: p.total_bet(),
            folded: p.is_folded(),
            cards_revealed: p.cards_revealed(),
            last_action_at: p.last_action_at(),
            commitment: p.commitment(),
        })
    }

    pub fn community_view(&self) -> CommunityView {
        let cards = self.community[..self.revealed_community]
            .iter()
            .flatten()
            .copied()
            .collect();
        CommunityView {
            cards,
            revealed: self.revealed_community,
        }
    }

    /// The caller's own hole cards.
    pub fn hole_cards_of(&self, caller: &PlayerId) -> Result<[Card; 2], GameError> {
        let seat = self.seat_index(caller)?;
        if self.deck.is_none() {
            return Err(GameError::DeckNotGenerated);
        }
        match self.seats[seat].hole_cards() {
            [Some(a), Some(b)] => Ok([a, b]),
            _ => Err(GameError::DeckNotGenerated),
        }
    }

    /// Hole cards of a seat that was revealed at showdown.
    pub fn revealed_cards(&self, seat: usize) -> Result<[Card; 2], GameError> {
        let p = self.seat(seat)?;
        match (p.cards_revealed(), p.hole_cards()) {
            (true, [Some(a), Some(b)]) => Ok([a, b]),
            _ => Err(GameError::CardsNotRevealed(seat)),
        }
    }

    pub fn verify_commitment(&self, seat: usize, hole: [Card; 2]) -> Result<bool, GameError> {
        let p = self.seat(seat)?;
        let seed = self.seed.ok_or(GameError::DeckNotGenerated)?;
        let commitment = p.commitment().ok_or(GameError::DeckNotGenerated)?;
        Ok(commitment.verify(hole, &seed, p.id()))
    }
}
