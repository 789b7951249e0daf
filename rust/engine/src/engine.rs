use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cards::Card;
use crate::clock::{Clock, SystemClock, Timestamp};
use crate::config::TableConfig;
use crate::custody::Custody;
use crate::deck::Seed;
use crate::errors::GameError;
use crate::game::{CommunityView, Game, GameId, GameInfo, SeatInfo, Stakes};
use crate::logger::HandRecord;
use crate::player::{PlayerAction, PlayerId};
use crate::randomness::{RandomnessSource, RequestToken};

/// Totals across every game the registry has created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    /// Buy-ins taken into custody.
    pub deposited: u64,
    /// Chips behind, summed over every seat of every game.
    pub stacks: u64,
    /// Chips sitting in unsettled pots.
    pub pots: u64,
    /// Lifetime accrued commission.
    pub commission: u64,
}

impl Ledger {
    pub fn is_balanced(&self) -> bool {
        self.stacks + self.pots + self.commission == self.deposited
    }
}

/// Registry and public entry point for every table.
///
/// Games live in an append-only arena; ids start at 1 and are never reused.
/// Every mutating call stages its change on a copy of the game, performs any
/// custody transfer, and only then stores the copy, so a rejected call
/// leaves no trace.
///
/// # Examples
///
/// ```
/// use axiomind_holdem::config::TableConfig;
/// use axiomind_holdem::custody::Escrow;
/// use axiomind_holdem::engine::Engine;
/// use axiomind_holdem::game::Phase;
/// use axiomind_holdem::player::{PlayerAction, PlayerId};
/// use axiomind_holdem::randomness::LocalRandomness;
///
/// let (alice, bob) = (PlayerId::from("alice"), PlayerId::from("bob"));
/// let mut escrow = Escrow::new();
/// escrow.fund(&alice, 1_000);
/// escrow.fund(&bob, 1_000);
///
/// let mut engine = Engine::new(
///     TableConfig::default(),
///     PlayerId::from("house"),
///     LocalRandomness::new_with_seed(1),
///     escrow,
/// )
/// .unwrap();
///
/// let id = engine.create_game(1_000, 5, 10).unwrap();
/// engine.join_game(id, &alice, 1_000).unwrap();
/// engine.join_game(id, &bob, 1_000).unwrap();
/// engine.start_game(id, &alice).unwrap();
///
/// let (token, _, seed) = engine.randomness_mut().next_fulfillment().unwrap();
/// engine.fulfill_randomness(token, seed).unwrap();
/// assert_eq!(engine.game_info(id).unwrap().phase, Phase::PreFlop);
///
/// // heads-up: seat 0 posts the small blind and acts first
/// engine.player_action(id, &alice, PlayerAction::Fold).unwrap();
/// assert_eq!(engine.game_info(id).unwrap().phase, Phase::Finished);
/// assert!(engine.ledger().is_balanced());
/// ```
pub struct Engine<R: RandomnessSource, C: Custody> {
    config: TableConfig,
    games: Vec<Game>,
    seats: HashMap<(GameId, PlayerId), usize>,
    games_by_player: HashMap<PlayerId, Vec<GameId>>,
    pending: HashMap<RequestToken, GameId>,
    randomness: R,
    custody: C,
    clock: Arc<dyn Clock>,
    owner: PlayerId,
    deposited: u64,
    commission_total: u64,
    commission_withdrawn: u64,
}

impl<R: RandomnessSource, C: Custody> Engine<R, C> {
    pub fn new(config: TableConfig, owner: PlayerId, randomness: R, custody: C) -> Result<Self, GameError> {
        config.validate()?;
        Ok(Self {
            config,
            games: Vec::new(),
            seats: HashMap::new(),
            games_by_player: HashMap::new(),
            pending: HashMap::new(),
            randomness,
            custody,
            clock: Arc::new(SystemClock),
            owner,
            deposited: 0,
            commission_total: 0,
            commission_withdrawn: 0,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }
    pub fn owner(&self) -> &PlayerId {
        &self.owner
    }
    pub fn randomness(&self) -> &R {
        &self.randomness
    }
    pub fn randomness_mut(&mut self) -> &mut R {
        &mut self.randomness
    }
    pub fn custody(&self) -> &C {
        &self.custody
    }
    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }
    /// Lifetime accrued commission, withdrawals included.
    pub fn commission_total(&self) -> u64 {
        self.commission_total
    }
    /// Accrued commission not yet withdrawn.
    pub fn commission_available(&self) -> u64 {
        self.commission_total - self.commission_withdrawn
    }
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    fn now(&self) -> Timestamp {
        self.clock.now()
    }

    fn slot(&self, id: GameId) -> Result<usize, GameError> {
        let idx = (id.0 as usize).checked_sub(1).ok_or(GameError::GameNotFound(id))?;
        if idx < self.games.len() {
            Ok(idx)
        } else {
            Err(GameError::GameNotFound(id))
        }
    }

    pub fn game(&self, id: GameId) -> Result<&Game, GameError> {
        let idx = self.slot(id)?;
        Ok(&self.games[idx])
    }

    pub fn games(&self) -> impl Iterator<Item = &Game> {
        self.games.iter()
    }

    /// Games the player has joined, oldest first.
    pub fn games_of(&self, player: &PlayerId) -> &[GameId] {
        self.games_by_player.get(player).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn seat_of(&self, id: GameId, player: &PlayerId) -> Option<usize> {
        self.seats.get(&(id, player.clone())).copied()
    }

    /// Stores a staged game. When the stage finishes the game, its release
    /// plan goes through custody first and a refusal discards the stage.
    fn commit(&mut self, staged: Game) -> Result<(), GameError> {
        let idx = self.slot(staged.id())?;
        if staged.is_finished() && !self.games[idx].is_finished() {
            self.custody.transfer_all(&staged.release_plan())?;
            self.commission_total += staged.commission();
            info!(
                game_id = %staged.id(),
                outcome = ?staged.outcome(),
                commission = staged.commission(),
                "game finished"
            );
        }
        self.games[idx] = staged;
        Ok(())
    }

    pub fn create_game(&mut self, buy_in: u64, small_blind: u64, big_blind: u64) -> Result<GameId, GameError> {
        let id = GameId(self.games.len() as u64 + 1);
        let stakes = Stakes {
            buy_in,
            small_blind,
            big_blind,
        };
        let game = Game::new(id, stakes, self.config.clone(), self.now())?;
        self.games.push(game);
        info!(game_id = %id, buy_in, small_blind, big_blind, "game created");
        Ok(id)
    }

    /// Takes a seat. `deposit` must equal the buy-in and is moved into
    /// custody.
    pub fn join_game(&mut self, id: GameId, player: &PlayerId, deposit: u64) -> Result<usize, GameError> {
        let mut staged = self.game(id)?.clone();
        let expected = staged.stakes().buy_in;
        if deposit != expected {
            return Err(GameError::WrongBuyIn {
                expected,
                actual: deposit,
            });
        }
        let deposited = self
            .deposited
            .checked_add(deposit)
            .ok_or(GameError::DepositOverflow {
                deposited: self.deposited,
                deposit,
            })?;
        let seat = staged.seat_player(player.clone(), self.now())?;
        self.custody.deposit(player, deposit)?;
        self.commit(staged)?;
        self.deposited = deposited;
        self.seats.insert((id, player.clone()), seat);
        self.games_by_player.entry(player.clone()).or_default().push(id);
        info!(game_id = %id, seat, player = %player, "player joined");
        Ok(seat)
    }

    /// Any seated player may start once enough seats are taken. Issues the
    /// randomness request for the hand.
    pub fn start_game(&mut self, id: GameId, caller: &PlayerId) -> Result<RequestToken, GameError> {
        let mut staged = self.game(id)?.clone();
        staged.can_start(caller)?;
        let token = self.randomness.request(id)?;
        staged.begin_randomness(caller, token, self.now())?;
        let seats = staged.seat_count();
        self.commit(staged)?;
        self.pending.insert(token, id);
        info!(game_id = %id, token = %token, seats, "game started");
        Ok(token)
    }

    /// Delivers the seed for a pending request. Unknown or stale tokens are
    /// rejected without side effects.
    pub fn fulfill_randomness(&mut self, token: RequestToken, seed: Seed) -> Result<GameId, GameError> {
        let Some(&id) = self.pending.get(&token) else {
            warn!(token = %token, "fulfillment for unknown request");
            return Err(GameError::UnknownRequest(token));
        };
        let mut staged = self.game(id)?.clone();
        if let Err(e) = staged.fulfill(token, seed, self.now()) {
            warn!(game_id = %id, token = %token, error = %e, "fulfillment rejected");
            return Err(e);
        }
        self.commit(staged)?;
        self.pending.remove(&token);
        info!(game_id = %id, token = %token, "deck generated");
        Ok(id)
    }

    pub fn player_action(&mut self, id: GameId, caller: &PlayerId, action: PlayerAction) -> Result<(), GameError> {
        let mut staged = self.game(id)?.clone();
        staged.act(caller, action, self.now())?;
        self.commit(staged)
    }

    /// Folds the current actor once their window has passed. Anyone may call
    /// it. Returns the folded seat.
    pub fn force_action_timeout(&mut self, id: GameId) -> Result<usize, GameError> {
        let mut staged = self.game(id)?.clone();
        let seat = staged.force_timeout(self.now())?;
        self.commit(staged)?;
        info!(game_id = %id, seat, "action timeout forced");
        Ok(seat)
    }

    /// Cancels a game stuck waiting for randomness and refunds every buy-in.
    pub fn randomness_timeout(&mut self, id: GameId) -> Result<(), GameError> {
        let mut staged = self.game(id)?.clone();
        let token = staged.pending_request();
        staged.cancel_for_randomness_timeout(self.now())?;
        self.commit(staged)?;
        if let Some(token) = token {
            self.pending.remove(&token);
        }
        info!(game_id = %id, "game cancelled, randomness timed out");
        Ok(())
    }

    pub fn game_info(&self, id: GameId) -> Result<GameInfo, GameError> {
        Ok(self.game(id)?.info())
    }

    pub fn seat_info(&self, id: GameId, seat: usize) -> Result<SeatInfo, GameError> {
        self.game(id)?.seat_info(seat)
    }

    pub fn community_cards(&self, id: GameId) -> Result<CommunityView, GameError> {
        Ok(self.game(id)?.community_view())
    }

    pub fn my_cards(&self, id: GameId, caller: &PlayerId) -> Result<[Card; 2], GameError> {
        self.game(id)?.hole_cards_of(caller)
    }

    pub fn revealed_cards(&self, id: GameId, seat: usize) -> Result<[Card; 2], GameError> {
        self.game(id)?.revealed_cards(seat)
    }

    pub fn verify_commitment(&self, id: GameId, seat: usize, c1: Card, c2: Card) -> Result<bool, GameError> {
        self.game(id)?.verify_commitment(seat, [c1, c2])
    }

    /// History record of a finished game.
    pub fn hand_record(&self, id: GameId) -> Result<HandRecord, GameError> {
        HandRecord::from_game(self.game(id)?)
    }

    /// Releases all unwithdrawn commission to the owner. Returns the amount.
    pub fn withdraw_commission(&mut self, caller: &PlayerId) -> Result<u64, GameError> {
        if caller != &self.owner {
            return Err(GameError::NotOwner);
        }
        let amount = self.commission_available();
        if amount > 0 {
            self.custody.transfer(&self.owner, amount)?;
            self.commission_withdrawn += amount;
        }
        info!(amount, owner = %self.owner, "commission withdrawn");
        Ok(amount)
    }

    pub fn transfer_ownership(&mut self, caller: &PlayerId, new_owner: PlayerId) -> Result<(), GameError> {
        if caller != &self.owner {
            return Err(GameError::NotOwner);
        }
        info!(from = %self.owner, to = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    pub fn ledger(&self) -> Ledger {
        let mut ledger = Ledger {
            deposited: self.deposited,
            stacks: 0,
            pots: 0,
            commission: self.commission_total,
        };
        for g in &self.games {
            ledger.stacks += g.seats().iter().map(|p| p.chips()).sum::<u64>();
            ledger.pots += g.pot();
        }
        ledger
    }
}
