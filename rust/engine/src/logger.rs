use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use crate::cards::Card;
use crate::deck::{Commitment, Seed};
use crate::errors::GameError;
use crate::game::{Game, GameId, Outcome, Phase, Stakes};
use crate::player::{PlayerAction, PlayerId};

/// Records a single player action during a hand.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub seat: usize,
    /// The betting street when this action occurred
    pub phase: Phase,
    pub action: PlayerAction,
    /// Fold applied by a timeout rather than by the seat itself
    #[serde(default)]
    pub forced: bool,
}

/// One seat as it stood when the hand finished.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeatRecord {
    pub player: PlayerId,
    #[serde(default)]
    pub hole: Option<[Card; 2]>,
    #[serde(default)]
    pub commitment: Option<Commitment>,
    pub folded: bool,
    pub final_chips: u64,
}

/// Complete record of a finished game: seed, seats, actions, board and
/// outcome. Serialized to JSONL for hand history storage and replay.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandRecord {
    pub game_id: GameId,
    /// Seed the deck was generated from; `None` for cancelled games
    pub seed: Option<Seed>,
    pub stakes: Stakes,
    pub seats: Vec<SeatRecord>,
    /// Chronological list of all player actions
    pub actions: Vec<ActionRecord>,
    /// Community cards that were revealed
    pub board: Vec<Card>,
    pub outcome: Option<Outcome>,
    pub commission: u64,
    /// Timestamp when the hand was written (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
}

impl HandRecord {
    /// Snapshots a finished game.
    pub fn from_game(game: &Game) -> Result<Self, GameError> {
        if !game.is_finished() {
            return Err(GameError::WrongPhase(game.phase()));
        }
        let seats = game
            .seats()
            .iter()
            .map(|p| SeatRecord {
                player: p.id().clone(),
                hole: match p.hole_cards() {
                    [Some(a), Some(b)] => Some([a, b]),
                    _ => None,
                },
                commitment: p.commitment(),
                folded: p.is_folded(),
                final_chips: p.chips(),
            })
            .collect();
        Ok(Self {
            game_id: game.id(),
            seed: game.seed(),
            stakes: game.stakes(),
            seats,
            actions: game.actions().to_vec(),
            board: game.community_view().cards,
            outcome: game.outcome().cloned(),
            commission: game.commission(),
            ts: None,
        })
    }
}

/// Appends [`HandRecord`]s as JSON lines (LF only).
pub struct HandLogger<W: Write> {
    writer: W,
    written: usize,
}

impl HandLogger<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                create_dir_all(parent)?;
            }
        }
        let f = File::create(path)?;
        Ok(Self::new(BufWriter::new(f)))
    }
}

impl<W: Write> HandLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write(&mut self, record: &HandRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Parses JSONL hand history, skipping blank lines. Errors carry the
/// 1-based line number.
pub fn read_records<R: BufRead>(reader: R) -> std::io::Result<Vec<HandRecord>> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rec = serde_json::from_str(&line).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, format!("line {}: {}", i + 1, e))
        })?;
        out.push(rec);
    }
    Ok(out)
}
