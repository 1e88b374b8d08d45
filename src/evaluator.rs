//! Poker Squares Engine — Final-Hand Classifier
//!
//! Maps one line of the grid (five slots, some possibly empty) to the single
//! best poker category it has made so far.
//!
//! ## Algorithm
//!
//! 1. Count cards per rank and per suit
//! 2. Build a 13-bit rank mask → compare against the ten straight masks
//! 3. Flush needs all five slots filled with one suit
//! 4. Otherwise classify by the multiset of rank counts
//!
//! | Category        | Pattern                         |
//! |-----------------|---------------------------------|
//! | Royal Flush     | T-J-Q-K-A suited                |
//! | Straight Flush  | five consecutive, suited        |
//! | Four of a Kind  | rank ×4                         |
//! | Full House      | rank ×3 + rank ×2               |
//! | Flush           | five suited                     |
//! | Straight        | five consecutive (A low or high)|
//! | Three of a Kind | rank ×3                         |
//! | Two Pair        | rank ×2 twice                   |
//! | One Pair        | rank ×2                         |
//! | High Card       | anything else, incl. empty      |

use crate::card::Card;

/// Final poker categories, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandCategory {
    pub const COUNT: usize = 10;

    pub const ALL: [HandCategory; Self::COUNT] = [
        HandCategory::HighCard,
        HandCategory::OnePair,
        HandCategory::TwoPair,
        HandCategory::ThreeOfAKind,
        HandCategory::Straight,
        HandCategory::Flush,
        HandCategory::FullHouse,
        HandCategory::FourOfAKind,
        HandCategory::StraightFlush,
        HandCategory::RoyalFlush,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            HandCategory::HighCard => "high card",
            HandCategory::OnePair => "one pair",
            HandCategory::TwoPair => "two pair",
            HandCategory::ThreeOfAKind => "three of a kind",
            HandCategory::Straight => "straight",
            HandCategory::Flush => "flush",
            HandCategory::FullHouse => "full house",
            HandCategory::FourOfAKind => "four of a kind",
            HandCategory::StraightFlush => "straight flush",
            HandCategory::RoyalFlush => "royal flush",
        }
    }

    /// Flush, straight flush or royal flush.
    pub fn is_flush(self) -> bool {
        matches!(
            self,
            HandCategory::Flush | HandCategory::StraightFlush | HandCategory::RoyalFlush
        )
    }

    /// Straight, straight flush or royal flush.
    pub fn is_straight(self) -> bool {
        matches!(
            self,
            HandCategory::Straight | HandCategory::StraightFlush | HandCategory::RoyalFlush
        )
    }
}

// ── Lookup Tables ───────────────────────────────────────────────────

/// Five consecutive ranks starting at each low rank (A-2-3-4-5 .. 9-T-J-Q-K).
const fn run_mask(low: usize) -> u16 {
    0b11111 << low
}

/// T-J-Q-K-A: ranks 9..=12 plus the ace at rank 0.
const ROYAL_MASK: u16 = 0b1_1110_0000_0001;

const STRAIGHT_MASKS: [u16; 10] = [
    run_mask(0),
    run_mask(1),
    run_mask(2),
    run_mask(3),
    run_mask(4),
    run_mask(5),
    run_mask(6),
    run_mask(7),
    run_mask(8),
    ROYAL_MASK,
];

// ── Core Classifier ─────────────────────────────────────────────────

/// Classify a line. Empty slots are skipped; lines shorter or longer than
/// five slots are accepted but only five present cards can make a straight
/// or flush.
pub fn classify(line: &[Option<Card>]) -> HandCategory {
    let mut rank_counts = [0u8; Card::NUM_RANKS];
    let mut suit_counts = [0u8; Card::NUM_SUITS];
    let mut rank_bits = 0u16;
    let mut num_cards = 0usize;

    for card in line.iter().flatten() {
        rank_counts[card.rank()] += 1;
        suit_counts[card.suit()] += 1;
        rank_bits |= 1 << card.rank();
        num_cards += 1;
    }

    // Count of rank counts: how many ranks appear once, twice, ...
    let mut count_counts = [0u8; 6];
    let mut max_of_a_kind = 0u8;
    for &count in &rank_counts {
        count_counts[(count as usize).min(5)] += 1;
        max_of_a_kind = max_of_a_kind.max(count);
    }

    let is_flush = num_cards == 5 && suit_counts.iter().any(|&n| n == 5);
    let is_straight = num_cards == 5 && STRAIGHT_MASKS.contains(&rank_bits);

    if is_straight && is_flush {
        return if rank_bits == ROYAL_MASK {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
    }
    if max_of_a_kind >= 4 {
        return HandCategory::FourOfAKind;
    }
    if count_counts[3] == 1 && count_counts[2] == 1 {
        return HandCategory::FullHouse;
    }
    if is_flush {
        return HandCategory::Flush;
    }
    if is_straight {
        return HandCategory::Straight;
    }
    if max_of_a_kind == 3 {
        return HandCategory::ThreeOfAKind;
    }
    match count_counts[2] {
        2 => HandCategory::TwoPair,
        1 => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
