//! Poker Squares Engine — Cards
//!
//! ## Card Encoding
//!
//! Each card is an ID 0-51:
//!   - `rank = id >> 2`  (0=A, 1=2, ..., 9=T, 10=J, 11=Q, 12=K)
//!   - `suit = id & 3`   (0=♣, 1=♦, 2=♥, 3=♠)
//!
//! Aces sit at rank 0 so that the ace-high straight window (T-J-Q-K plus A)
//! is the only wrap-around the line rules have to special-case.

use std::fmt;
use std::str::FromStr;

const RANK_CHARS: [char; 13] = ['A', '2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K'];
const SUIT_CHARS: [char; 4] = ['C', 'D', 'H', 'S'];

/// A single playing card, packed into one byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    pub const NUM_RANKS: usize = 13;
    pub const NUM_SUITS: usize = 4;
    pub const NUM_CARDS: usize = Self::NUM_RANKS * Self::NUM_SUITS;

    /// Build a card from rank (0=A .. 12=K) and suit (0..4).
    ///
    /// Returns `None` when either index is out of range.
    pub fn new(rank: usize, suit: usize) -> Option<Card> {
        if rank < Self::NUM_RANKS && suit < Self::NUM_SUITS {
            Some(Card(((rank << 2) | suit) as u8))
        } else {
            None
        }
    }

    pub fn from_id(id: usize) -> Option<Card> {
        (id < Self::NUM_CARDS).then_some(Card(id as u8))
    }

    #[inline]
    pub fn id(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn rank(self) -> usize {
        (self.0 >> 2) as usize
    }

    #[inline]
    pub fn suit(self) -> usize {
        (self.0 & 3) as usize
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", RANK_CHARS[self.rank()], SUIT_CHARS[self.suit()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseCardError {
    #[error("card text must be two characters, got {0:?}")]
    Length(String),
    #[error("unknown rank character {0:?}")]
    Rank(char),
    #[error("unknown suit character {0:?}")]
    Suit(char),
}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ParseCardError::Length(s.to_string()));
        };
        let r = r.to_ascii_uppercase();
        let su = su.to_ascii_uppercase();
        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == r)
            .ok_or(ParseCardError::Rank(r))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == su)
            .ok_or(ParseCardError::Suit(su))?;
        Ok(Card(((rank << 2) | suit) as u8))
    }
}

// ── Deck ────────────────────────────────────────────────────────────

/// The full 52-card deck in id order.
pub fn full_deck() -> Vec<Card> {
    (0..Card::NUM_CARDS as u8).map(Card).collect()
}

/// Parse a whitespace-separated list of cards, `_` marking an empty slot.
///
/// Handy for fixtures: `parse_line("2C 2D _ _ _")`.
pub fn parse_line(text: &str) -> Result<Vec<Option<Card>>, ParseCardError> {
    text.split_whitespace()
        .map(|tok| if tok == "_" { Ok(None) } else { tok.parse().map(Some) })
        .collect()
}
