use serde::{Deserialize, Serialize};

use crate::cards::Card;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

/// Comparable strength of a best five-card hand.
///
/// The derived ordering compares `category` first and `tiebreak` second.
/// `tiebreak` packs the deciding ranks (0 = Two .. 12 = Ace) into five
/// radix-16 slots, most significant first, so plain integer comparison
/// follows kicker order. Unused trailing slots are zero.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct HandEvaluation {
    pub category: Category,
    pub tiebreak: u32,
}

const SLOTS: usize = 5;
const RADIX: u32 = 16;
const ACE: u8 = 12;

fn pack(ranks: &[u8]) -> u32 {
    let mut packed = 0u32;
    for i in 0..SLOTS {
        packed = packed * RADIX + ranks.get(i).copied().unwrap_or(0) as u32;
    }
    packed
}

/// Evaluates two hole cards together with the five community cards.
pub fn evaluate(hole: [Card; 2], community: &[Card; 5]) -> HandEvaluation {
    let mut cards = [hole[0]; 7];
    cards[1] = hole[1];
    cards[2..].copy_from_slice(community);
    evaluate_hand(&cards)
}

pub fn evaluate_hand(cards: &[Card; 7]) -> HandEvaluation {
    let mut rank_counts = [0u8; 13];
    let mut suit_counts = [0u8; 4];
    let mut suit_masks = [0u16; 4];
    let mut rank_mask = 0u16;
    for &c in cards.iter() {
        let r = c.rank().index();
        let s = c.suit().index() as usize;
        rank_counts[r as usize] += 1;
        suit_counts[s] += 1;
        suit_masks[s] |= 1 << r;
        rank_mask |= 1 << r;
    }

    // seven cards admit at most one suit with five or more
    let flush_suit = suit_counts.iter().position(|&n| n >= 5);

    if let Some(s) = flush_suit {
        if let Some(high) = straight_high(suit_masks[s]) {
            let category = if high == ACE {
                Category::RoyalFlush
            } else {
                Category::StraightFlush
            };
            return HandEvaluation {
                category,
                tiebreak: pack(&[high]),
            };
        }
    }

    let by_count = |n: u8| -> Vec<u8> {
        (0..13u8)
            .rev()
            .filter(|&r| rank_counts[r as usize] == n)
            .collect()
    };
    let quads = by_count(4);
    let trips = by_count(3);
    let pairs = by_count(2);

    if let Some(&q) = quads.first() {
        return HandEvaluation {
            category: Category::FourOfAKind,
            tiebreak: pack(&[q, kickers(rank_mask, &[q], 1)[0]]),
        };
    }

    if let Some(&t) = trips.first() {
        let pair = match (trips.get(1), pairs.first()) {
            (Some(&t2), Some(&p)) => Some(t2.max(p)),
            (Some(&t2), None) => Some(t2),
            (None, p) => p.copied(),
        };
        if let Some(p) = pair {
            return HandEvaluation {
                category: Category::FullHouse,
                tiebreak: pack(&[t, p]),
            };
        }
    }

    if let Some(s) = flush_suit {
        let top: Vec<u8> = ranks_desc(suit_masks[s]).take(SLOTS).collect();
        return HandEvaluation {
            category: Category::Flush,
            tiebreak: pack(&top),
        };
    }

    if let Some(high) = straight_high(rank_mask) {
        return HandEvaluation {
            category: Category::Straight,
            tiebreak: pack(&[high]),
        };
    }

    if let Some(&t) = trips.first() {
        let k = kickers(rank_mask, &[t], 2);
        return HandEvaluation {
            category: Category::ThreeOfAKind,
            tiebreak: pack(&[t, k[0], k[1]]),
        };
    }

    if pairs.len() >= 2 {
        let (hi, lo) = (pairs[0], pairs[1]);
        // a third pair still plays as the kicker
        let k = kickers(rank_mask, &[hi, lo], 1);
        return HandEvaluation {
            category: Category::TwoPair,
            tiebreak: pack(&[hi, lo, k[0]]),
        };
    }

    if let Some(&p) = pairs.first() {
        let k = kickers(rank_mask, &[p], 3);
        return HandEvaluation {
            category: Category::OnePair,
            tiebreak: pack(&[p, k[0], k[1], k[2]]),
        };
    }

    let top: Vec<u8> = ranks_desc(rank_mask).take(SLOTS).collect();
    HandEvaluation {
        category: Category::HighCard,
        tiebreak: pack(&top),
    }
}

/// Seats holding the strongest evaluation, in the order given.
pub fn winning_seats(evaluations: &[(usize, HandEvaluation)]) -> Vec<usize> {
    let Some(best) = evaluations.iter().map(|(_, e)| *e).max() else {
        return Vec::new();
    };
    evaluations
        .iter()
        .filter(|(_, e)| *e == best)
        .map(|(seat, _)| *seat)
        .collect()
}

fn ranks_desc(mask: u16) -> impl Iterator<Item = u8> {
    (0..13u8).rev().filter(move |&r| mask & (1u16 << r) != 0)
}

/// The `n` highest ranks present in `mask` other than `exclude`, zero-padded.
fn kickers(mask: u16, exclude: &[u8], n: usize) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (slot, r) in ranks_desc(mask)
        .filter(|r| !exclude.contains(r))
        .take(n)
        .enumerate()
    {
        out[slot] = r;
    }
    out
}

/// High rank of the best five-rank run in `mask`, with A-2-3-4-5 as the
/// lowest run (high card Five).
fn straight_high(mask: u16) -> Option<u8> {
    for high in (4..=ACE).rev() {
        let window = 0b1_1111u16 << (high - 4);
        if mask & window == window {
            return Some(high);
        }
    }
    let wheel = (1u16 << ACE) | 0b1111;
    if mask & wheel == wheel {
        return Some(3);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_high_finds_best_run_and_wheel() {
        // 5..9 plus a stray deuce
        let mask = 0b1_1111 << 3 | 1;
        assert_eq!(straight_high(mask), Some(7));
        // A2345
        let wheel = (1 << 12) | 0b1111;
        assert_eq!(straight_high(wheel), Some(3));
        // A2345 and 6 -> six high
        assert_eq!(straight_high(wheel | 1 << 4), Some(4));
        assert_eq!(straight_high(0b1_1011), None);
    }

    #[test]
    fn pack_orders_like_kickers() {
        assert!(pack(&[12, 0, 0, 0, 0]) > pack(&[11, 10, 9, 8, 6]));
        assert!(pack(&[5, 4]) > pack(&[5, 3]));
    }

    #[test]
    fn winning_seats_reports_ties() {
        let strong = HandEvaluation {
            category: Category::Flush,
            tiebreak: 1,
        };
        let weak = HandEvaluation {
            category: Category::Straight,
            tiebreak: 99,
        };
        assert_eq!(winning_seats(&[(0, weak), (2, strong), (3, strong)]), vec![2, 3]);
        assert!(winning_seats(&[]).is_empty());
    }
}
