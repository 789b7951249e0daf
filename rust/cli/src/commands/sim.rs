//! Simulation command: plays complete games through the engine.
//!
//! Every game goes through the public engine API: seats join with a real
//! deposit, randomness is requested and fulfilled by a seeded
//! [`LocalRandomness`], and a ChaCha-driven policy picks actions. The chip
//! ledger is checked after every step. A small share of games loses its
//! randomness or lets the actor's clock run out so the timeout paths run
//! too.
//!
//! # Examples
//!
//! ```no_run
//! use std::io;
//! let args = ["axiomind-holdem", "sim", "--games", "500", "--seats", "6", "--seed", "42", "--output", "data/sim.jsonl"];
//! let code = axiomind_holdem_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```

use crate::config::{self, Config};
use crate::error::CliError;
use crate::ui;
use axiomind_holdem::clock::ManualClock;
use axiomind_holdem::custody::Escrow;
use axiomind_holdem::deck::Seed;
use axiomind_holdem::engine::Engine;
use axiomind_holdem::game::{GameId, Outcome, Phase};
use axiomind_holdem::logger::{HandLogger, HandRecord};
use axiomind_holdem::player::{PlayerAction, PlayerId};
use axiomind_holdem::randomness::LocalRandomness;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Steps after which a game is considered stuck.
const MAX_STEPS_PER_GAME: usize = 2_000;

type SimEngine = Engine<LocalRandomness, Escrow>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimSummary {
    pub games: usize,
    pub winners: usize,
    pub splits: usize,
    pub cancelled: usize,
    pub actions: usize,
    pub forced_folds: usize,
    pub commission: u64,
}

pub fn handle_sim_command(
    games: usize,
    seats: usize,
    seed: Option<u64>,
    output: Option<String>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    if games == 0 {
        return Err(CliError::InvalidInput("games must be >= 1".to_string()));
    }
    let cfg = config::load_with_sources()
        .map_err(|e| CliError::Config(e.to_string()))?
        .config;
    let base_seed = seed
        .or_else(|| cfg.seed.as_ref().map(low_u64))
        .unwrap_or_else(rand::random);

    let mut logger = match output.as_deref() {
        Some(path) => Some(HandLogger::create(path)?),
        None => None,
    };
    let summary = run_simulation(&cfg, games, seats, base_seed, |record| match logger.as_mut() {
        Some(l) => l.write(record),
        None => Ok(()),
    })?;

    writeln!(out, "Simulated {} games ({} seats, seed {})", summary.games, seats, base_seed)?;
    writeln!(
        out,
        "Winners: {}  Splits: {}  Cancelled: {}",
        summary.winners, summary.splits, summary.cancelled
    )?;
    writeln!(out, "Actions: {}  Forced folds: {}", summary.actions, summary.forced_folds)?;
    writeln!(out, "Commission: {}", summary.commission)?;
    if let (Some(path), Some(l)) = (output, logger) {
        writeln!(out, "Hand records: {} written to {}", l.written(), path)?;
    }
    if summary.cancelled == summary.games {
        ui::display_warning(err, "every game was cancelled; no hands were played")?;
    }
    Ok(())
}

/// Low 64 bits of a configured 256-bit seed.
fn low_u64(seed: &Seed) -> u64 {
    let mut low = [0u8; 8];
    low.copy_from_slice(&seed.as_bytes()[24..]);
    u64::from_be_bytes(low)
}

fn random_action(rng: &mut ChaCha8Rng, big_blind: u64) -> PlayerAction {
    match rng.random_range(0..20) {
        0..=2 => PlayerAction::Fold,
        3..=8 => PlayerAction::Check,
        9..=15 => PlayerAction::Call,
        16..=18 => PlayerAction::Raise(big_blind * rng.random_range(1..=6)),
        _ => PlayerAction::AllIn,
    }
}

fn check_books(engine: &SimEngine, game: usize, step: usize) -> Result<(), CliError> {
    let ledger = engine.ledger();
    if !ledger.is_balanced() {
        return Err(CliError::Verification(format!(
            "chips not conserved in game {} at step {}: {:?}",
            game, step, ledger
        )));
    }
    Ok(())
}

/// Runs `games` games of `seats` seats and hands each finished record to
/// `on_finished`. Seating rotates so every player takes each position.
pub fn run_simulation<F>(
    cfg: &Config,
    games: usize,
    seats: usize,
    seed: u64,
    mut on_finished: F,
) -> Result<SimSummary, CliError>
where
    F: FnMut(&HandRecord) -> std::io::Result<()>,
{
    let stakes = cfg.stakes();
    let table = cfg.table_config();
    let owner = PlayerId::new("house");
    let players: Vec<PlayerId> = (0..seats).map(|i| PlayerId::new(format!("player{}", i))).collect();

    let mut custody = Escrow::new();
    for p in &players {
        custody.fund(p, stakes.buy_in.saturating_mul(games as u64));
    }
    let clock = Arc::new(ManualClock::new(0));
    let mut engine = Engine::new(table.clone(), owner.clone(), LocalRandomness::new_with_seed(seed), custody)?
        .with_clock(clock.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut summary = SimSummary::default();

    for game in 0..games {
        let id = engine.create_game(stakes.buy_in, stakes.small_blind, stakes.big_blind)?;
        for offset in 0..seats {
            engine.join_game(id, &players[(game + offset) % seats], stakes.buy_in)?;
        }
        engine.start_game(id, &players[game % seats])?;

        if rng.random_ratio(1, 50) {
            engine.randomness_mut().drop_next();
            clock.advance(table.randomness_timeout_secs as i64 + 1);
            engine.randomness_timeout(id)?;
        } else {
            let (token, _, value) = engine
                .randomness_mut()
                .next_fulfillment()
                .ok_or_else(|| CliError::Verification(format!("no randomness pending for {}", id)))?;
            engine.fulfill_randomness(token, value)?;
        }

        play_out(&mut engine, &clock, &mut rng, id, game, table.action_timeout_secs as i64, &mut summary)?;

        let record = engine.hand_record(id)?;
        match &record.outcome {
            Some(Outcome::Winner { .. }) => summary.winners += 1,
            Some(Outcome::Split { .. }) => summary.splits += 1,
            Some(Outcome::Cancelled) | None => summary.cancelled += 1,
        }
        on_finished(&record)?;
        summary.games += 1;
    }

    let escrowed = engine.custody().escrowed();
    if escrowed != engine.commission_total() {
        return Err(CliError::Verification(format!(
            "escrow holds {} after every game was cashed out, expected the commission {}",
            escrowed,
            engine.commission_total()
        )));
    }
    summary.commission = engine.withdraw_commission(&owner)?;
    info!(
        games = summary.games,
        actions = summary.actions,
        commission = summary.commission,
        "simulation finished"
    );
    Ok(summary)
}

fn play_out(
    engine: &mut SimEngine,
    clock: &ManualClock,
    rng: &mut ChaCha8Rng,
    id: GameId,
    game: usize,
    action_timeout: i64,
    summary: &mut SimSummary,
) -> Result<(), CliError> {
    let big_blind = engine.game(id)?.stakes().big_blind;
    let mut step = 0usize;
    while engine.game(id)?.phase() != Phase::Finished {
        check_books(engine, game, step)?;
        step += 1;
        if step > MAX_STEPS_PER_GAME {
            return Err(CliError::Verification(format!("game {} did not terminate", id)));
        }

        if rng.random_ratio(1, 40) {
            clock.advance(action_timeout + 1);
            engine.force_action_timeout(id)?;
            summary.forced_folds += 1;
            continue;
        }

        clock.advance(1);
        let seat = engine
            .game(id)?
            .current_actor()
            .ok_or_else(|| CliError::Verification(format!("game {} has no actor in a betting phase", id)))?;
        let actor = engine.game(id)?.seat(seat)?.id().clone();
        if engine.player_action(id, &actor, random_action(rng, big_blind)).is_err() {
            // a rejected action changes nothing, so the seat can still check or call
            if engine.player_action(id, &actor, PlayerAction::Check).is_err() {
                engine.player_action(id, &actor, PlayerAction::Call)?;
            }
        }
        summary.actions += 1;
    }
    check_books(engine, game, step)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::TestLogSubscriber;
    use axiomind_holdem::logger::read_records;
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    fn collect(games: usize, seats: usize, seed: u64) -> (SimSummary, Vec<HandRecord>) {
        let mut records = Vec::new();
        let summary = run_simulation(&Config::default(), games, seats, seed, |r| {
            records.push(r.clone());
            Ok(())
        })
        .unwrap();
        (summary, records)
    }

    #[test]
    fn every_game_finishes_with_a_record() {
        for seats in 2..=6 {
            let (summary, records) = collect(25, seats, 11);
            assert_eq!(summary.games, 25);
            assert_eq!(records.len(), 25);
            assert_eq!(summary.winners + summary.splits + summary.cancelled, 25);
            assert!(records.iter().all(|r| r.seats.len() == seats));
        }
    }

    #[test]
    fn same_seed_same_games() {
        let (a, ra) = collect(20, 4, 3);
        let (b, rb) = collect(20, 4, 3);
        assert_eq!(a, b);
        assert_eq!(ra, rb);
    }

    #[test]
    fn records_keep_chips_and_commission_whole() {
        let (summary, records) = collect(40, 3, 8);
        let mut commission = 0;
        for r in &records {
            let chips: u64 = r.seats.iter().map(|s| s.final_chips).sum();
            assert_eq!(chips + r.commission, r.stakes.buy_in * 3, "game {}", r.game_id);
            commission += r.commission;
        }
        assert_eq!(summary.commission, commission);
    }

    #[test]
    fn seating_rotates_between_games() {
        let (_, records) = collect(3, 3, 1);
        let first_seat: Vec<&str> = records.iter().map(|r| r.seats[0].player.as_str()).collect();
        assert_eq!(first_seat, ["player0", "player1", "player2"]);
    }

    #[test]
    fn output_file_holds_one_line_per_game() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("sim.jsonl");
        let mut out = Vec::new();
        let mut err = Vec::new();
        handle_sim_command(
            12,
            5,
            Some(77),
            Some(path.to_string_lossy().to_string()),
            &mut out,
            &mut err,
        )
        .unwrap();

        let file = std::fs::File::open(&path).unwrap();
        let records = read_records(std::io::BufReader::new(file)).unwrap();
        assert_eq!(records.len(), 12);
        assert!(records.iter().all(|r| r.ts.is_some()));
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Simulated 12 games (5 seats, seed 77)"));
        assert!(text.contains("Hand records: 12 written to"));
    }

    #[test]
    fn zero_games_is_invalid_input() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = handle_sim_command(0, 2, Some(1), None, &mut out, &mut err);
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[test]
    fn engine_events_are_traced() {
        let subscriber = TestLogSubscriber::new();
        let registry = Registry::default().with(subscriber.clone().into_layer::<Registry>());
        tracing::subscriber::with_default(registry, || {
            collect(2, 2, 5);
        });
        let messages = subscriber.messages();
        assert_eq!(messages.iter().filter(|m| *m == "game created").count(), 2);
        assert_eq!(messages.iter().filter(|m| *m == "game finished").count(), 2);
        assert_eq!(messages.last().map(String::as_str), Some("simulation finished"));
        let finished = subscriber
            .entries()
            .into_iter()
            .find(|e| e.message == "simulation finished")
            .unwrap();
        assert_eq!(finished.field("games"), Some("2"));
    }
}
