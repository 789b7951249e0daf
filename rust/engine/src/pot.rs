//! Pot settlement: commission first, then the winner share(s).

use serde::{Deserialize, Serialize};

/// How a settled pot is divided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub commission: u64,
    /// `(seat, amount)` in ascending seat order.
    pub shares: Vec<(usize, u64)>,
}

impl Payout {
    pub fn total(&self) -> u64 {
        self.commission + self.shares.iter().map(|(_, a)| a).sum::<u64>()
    }
}

/// `pot * rate / 100`, rounded down.
pub fn commission_for(pot: u64, commission_rate: u64) -> u64 {
    (pot as u128 * commission_rate as u128 / 100) as u64
}

/// Splits `pot` between `winners`.
///
/// Commission is taken once on the full pot. The rest is divided evenly and
/// the indivisible remainder goes to the lowest-indexed winner. Returns
/// `None` when there are no winners.
pub fn settle(pot: u64, commission_rate: u64, winners: &[usize]) -> Option<Payout> {
    let mut seats = winners.to_vec();
    seats.sort_unstable();
    seats.dedup();
    let n = seats.len() as u64;
    if n == 0 {
        return None;
    }

    let commission = commission_for(pot, commission_rate);
    let distributable = pot - commission;
    let share = distributable / n;
    let remainder = distributable % n;

    let shares = seats
        .iter()
        .enumerate()
        .map(|(i, &seat)| (seat, if i == 0 { share + remainder } else { share }))
        .collect();
    Some(Payout { commission, shares })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_winner_pays_commission() {
        let p = settle(1_000, 5, &[2]).unwrap();
        assert_eq!(p.commission, 50);
        assert_eq!(p.shares, vec![(2, 950)]);
        assert_eq!(p.total(), 1_000);
    }

    #[test]
    fn commission_rounds_down() {
        assert_eq!(commission_for(199, 5), 9);
        assert_eq!(commission_for(19, 5), 0);
        assert_eq!(commission_for(u64::MAX, 100), u64::MAX);
    }

    #[test]
    fn split_remainder_goes_to_lowest_seat() {
        // 103 - 5 = 98, 98 / 3 = 32 r 2
        let p = settle(103, 5, &[4, 1, 3]).unwrap();
        assert_eq!(p.commission, 5);
        assert_eq!(p.shares, vec![(1, 34), (3, 32), (4, 32)]);
        assert_eq!(p.total(), 103);
    }

    #[test]
    fn zero_rate_and_no_winners() {
        let p = settle(10, 0, &[0, 1]).unwrap();
        assert_eq!(p.shares, vec![(0, 5), (1, 5)]);
        assert!(settle(10, 5, &[]).is_none());
    }
}
