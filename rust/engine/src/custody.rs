//! Value custody boundary.
//!
//! The engine never moves funds itself: buy-ins are deposited into custody
//! when a seat is taken, and final stacks (or refunds) are released from it
//! when a game finishes. [`Escrow`] is an in-memory implementation that keeps
//! per-identity wallets and a pooled escrow balance.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::player::PlayerId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient funds for {party}: {needed} needed, {available} available")]
    InsufficientFunds {
        party: String,
        needed: u64,
        available: u64,
    },
    #[error("Recipient {0} rejected the transfer")]
    Rejected(String),
}

/// One release of escrowed value to a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub recipient: PlayerId,
    pub amount: u64,
}

/// Capability to move value between participants and the table.
///
/// Each call succeeds or fails atomically; [`Custody::transfer_all`] extends
/// that to a whole batch.
pub trait Custody {
    /// Moves `amount` from `from` into escrow.
    fn deposit(&mut self, from: &PlayerId, amount: u64) -> Result<(), TransferError>;

    /// Releases `amount` from escrow to `recipient`.
    fn transfer(&mut self, recipient: &PlayerId, amount: u64) -> Result<(), TransferError>;

    /// Releases every transfer or none of them.
    fn transfer_all(&mut self, transfers: &[Transfer]) -> Result<(), TransferError>;
}

/// In-memory custody: participant wallets plus one pooled escrow.
#[derive(Debug, Clone, Default)]
pub struct Escrow {
    wallets: HashMap<PlayerId, u64>,
    escrowed: u64,
    blocked: Vec<PlayerId>,
}

impl Escrow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits a participant's wallet from outside the system.
    pub fn fund(&mut self, player: &PlayerId, amount: u64) {
        let w = self.wallets.entry(player.clone()).or_insert(0);
        *w = w.saturating_add(amount);
    }

    pub fn balance_of(&self, player: &PlayerId) -> u64 {
        self.wallets.get(player).copied().unwrap_or(0)
    }

    pub fn escrowed(&self) -> u64 {
        self.escrowed
    }

    /// Makes every future transfer to `player` fail, for exercising rollback.
    pub fn block_recipient(&mut self, player: &PlayerId) {
        self.blocked.push(player.clone());
    }

    pub fn unblock_recipient(&mut self, player: &PlayerId) {
        self.blocked.retain(|p| p != player);
    }

    fn check_recipient(&self, recipient: &PlayerId) -> Result<(), TransferError> {
        if self.blocked.contains(recipient) {
            return Err(TransferError::Rejected(recipient.to_string()));
        }
        Ok(())
    }
}

impl Custody for Escrow {
    fn deposit(&mut self, from: &PlayerId, amount: u64) -> Result<(), TransferError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                party: from.to_string(),
                needed: amount,
                available,
            });
        }
        self.wallets.insert(from.clone(), available - amount);
        self.escrowed += amount;
        Ok(())
    }

    fn transfer(&mut self, recipient: &PlayerId, amount: u64) -> Result<(), TransferError> {
        self.transfer_all(&[Transfer {
            recipient: recipient.clone(),
            amount,
        }])
    }

    fn transfer_all(&mut self, transfers: &[Transfer]) -> Result<(), TransferError> {
        let total: u64 = transfers.iter().map(|t| t.amount).sum();
        if total > self.escrowed {
            return Err(TransferError::InsufficientFunds {
                party: "escrow".to_string(),
                needed: total,
                available: self.escrowed,
            });
        }
        for t in transfers {
            self.check_recipient(&t.recipient)?;
        }
        for t in transfers {
            self.fund(&t.recipient, t.amount);
        }
        self.escrowed -= total;
        Ok(())
    }
}
