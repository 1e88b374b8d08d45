//! Poker Squares Engine — Reachable-Hand Classifier
//!
//! Given the cards already placed in a line, report which final categories
//! the line can still finish as. Only the cards present matter; their
//! position inside the line does not.
//!
//! | Category        | Still reachable when                                      |
//! |-----------------|-----------------------------------------------------------|
//! | Flush           | ≤1 card, or every card shares one suit                    |
//! | Straight        | ≥2 distinct ranks, no duplicate, span < line length or ace-high |
//! | Four of a Kind  | cards − max rank count ≤ 1                                |
//! | Full House      | depends on how many cards are present                     |
//! | Three of a Kind | cards − max rank count ≤ 2                                |

use bitflags::bitflags;

use crate::card::Card;

bitflags! {
    /// Final categories a partial line can still reach.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Reachable: u8 {
        const FLUSH           = 1 << 0;
        const STRAIGHT        = 1 << 1;
        const FOUR_OF_A_KIND  = 1 << 2;
        const FULL_HOUSE      = 1 << 3;
        const THREE_OF_A_KIND = 1 << 4;
    }
}

impl Reachable {
    /// Straight and flush both open means a straight flush is too.
    pub fn straight_flush(self) -> bool {
        self.contains(Reachable::FLUSH | Reachable::STRAIGHT)
    }
}

/// Shape constants the rules depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRules {
    /// Cards in a complete line.
    pub line_len: usize,
    /// Ranks in the deck, ace at index 0.
    pub num_ranks: usize,
}

impl LineRules {
    pub const STANDARD: LineRules = LineRules {
        line_len: 5,
        num_ranks: Card::NUM_RANKS,
    };
}

impl Default for LineRules {
    fn default() -> Self {
        LineRules::STANDARD
    }
}

/// Classifier output for one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Outlook {
    pub reachable: Reachable,
    /// Ranks present exactly once, 0..=5.
    pub singletons: u8,
}

/// Per-line counts shared by every rule.
struct Counts {
    cards: usize,
    rank_counts: [u8; Card::NUM_RANKS],
    /// `count_counts[k]` = number of ranks with exactly k cards.
    count_counts: [u8; 6],
    max_of_a_kind: usize,
    single_suit: bool,
}

impl Counts {
    fn of(line: &[Option<Card>]) -> Counts {
        let mut rank_counts = [0u8; Card::NUM_RANKS];
        let mut cards = 0usize;
        let mut first_suit = None;
        let mut single_suit = true;
        for card in line.iter().flatten() {
            cards += 1;
            rank_counts[card.rank()] += 1;
            match first_suit {
                None => first_suit = Some(card.suit()),
                Some(s) if s != card.suit() => single_suit = false,
                Some(_) => {}
            }
        }

        let mut count_counts = [0u8; 6];
        let mut max_of_a_kind = 0usize;
        for &count in &rank_counts {
            count_counts[(count as usize).min(5)] += 1;
            max_of_a_kind = max_of_a_kind.max(count as usize);
        }

        Counts {
            cards,
            rank_counts,
            count_counts,
            max_of_a_kind,
            single_suit,
        }
    }
}

// ── Core Classifier ─────────────────────────────────────────────────

/// Classify with the standard 5-card, 13-rank rules.
pub fn outlook(line: &[Option<Card>]) -> Outlook {
    LineRules::STANDARD.outlook(line)
}

impl LineRules {
    pub fn outlook(&self, line: &[Option<Card>]) -> Outlook {
        let counts = Counts::of(line);
        let mut reachable = Reachable::empty();

        if counts.cards <= 1 || counts.single_suit {
            reachable |= Reachable::FLUSH;
        }
        if self.straight_reachable(&counts) {
            reachable |= Reachable::STRAIGHT;
        }
        if counts.cards - counts.max_of_a_kind <= 1 {
            reachable |= Reachable::FOUR_OF_A_KIND;
        }
        if full_house_reachable(&counts) {
            reachable |= Reachable::FULL_HOUSE;
        }
        if counts.cards - counts.max_of_a_kind <= 2 {
            reachable |= Reachable::THREE_OF_A_KIND;
        }

        Outlook {
            reachable,
            singletons: counts.count_counts[1],
        }
    }

    fn straight_reachable(&self, counts: &Counts) -> bool {
        if counts.max_of_a_kind > 1 {
            return false;
        }
        let ranks = &counts.rank_counts[..self.num_ranks.min(Card::NUM_RANKS)];
        // No span to measure with fewer than two cards; only the ace-high
        // window below can open the line.
        let Some(low) = ranks.iter().position(|&n| n > 0) else {
            return false;
        };
        let high = ranks.iter().rposition(|&n| n > 0).unwrap_or(low);
        if high > low && high - low < self.line_len {
            return true;
        }

        // Ace-high window: ace plus broadway ranks, nothing from 2 up to the window.
        let window_start = ranks.len().saturating_sub(self.line_len.saturating_sub(1));
        let ace = ranks[0] == 1;
        let broadway = ranks[window_start..].iter().any(|&n| n == 1);
        let gap_clear = ranks
            .get(1..window_start)
            .map_or(true, |gap| gap.iter().all(|&n| n == 0));
        ace && broadway && gap_clear
    }
}

/// Full house by number of cards present:
/// - 5: trips and a pair
/// - 4: trips plus a singleton, or two pairs
/// - 3: trips, or a pair
/// - 0..=2: always
fn full_house_reachable(counts: &Counts) -> bool {
    let cc = &counts.count_counts;
    match counts.cards {
        5 => cc[3] == 1 && cc[2] == 1,
        4 => (cc[3] == 1 && cc[1] == 1) || cc[2] == 2,
        3 => cc[3] == 1 || cc[2] == 1,
        0..=2 => true,
        _ => false,
    }
}

// ── Tests ───────────────────────────────────────────────────────────
