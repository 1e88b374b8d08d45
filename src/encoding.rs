//! Poker Squares Engine — Line Encoding
//!
//! Compresses a line into the key the heuristic table is indexed by. The key
//! only depends on the multiset of cards in the line and the game-wide play
//! count, so identical situations from unrelated games share a table entry.
//!
//! ## Packed Layout (u32)
//!
//! | Bits  | Field                                        |
//! |-------|----------------------------------------------|
//! | 0-4   | cards placed so far in the game (0..=25)     |
//! | 5-6   | made pairs: 0 none, 1 one pair, 2 two pair   |
//! | 7-8   | flush:          0 absent, 1 open, 2 made     |
//! | 9-10  | straight        ″                            |
//! | 11-12 | four of a kind  ″                            |
//! | 13-14 | full house      ″                            |
//! | 15-17 | singleton ranks (0..=5)                      |
//!
//! ## Text Form
//!
//! `<plays>:[p|P][f|F][s|S][o|O][h|H][(n)]`, lower case for open, upper case
//! for made, e.g. `7:pfoh(2)`. This is the key written to disk.

use std::fmt;
use std::str::FromStr;

use crate::card::Card;
use crate::evaluator::{classify, HandCategory};
use crate::grid::NUM_CELLS;
use crate::reachable::{outlook, Reachable};

/// Status of one trackable category in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prospect {
    Absent = 0,
    Open = 1,
    Made = 2,
}

/// Pair status already achieved by a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pairs {
    None = 0,
    One = 1,
    Two = 2,
}

/// The four categories carried in the key, in text order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tracked {
    Flush,
    Straight,
    FourOfAKind,
    FullHouse,
}

impl Tracked {
    pub const ALL: [Tracked; 4] = [
        Tracked::Flush,
        Tracked::Straight,
        Tracked::FourOfAKind,
        Tracked::FullHouse,
    ];

    fn shift(self) -> u32 {
        match self {
            Tracked::Flush => 7,
            Tracked::Straight => 9,
            Tracked::FourOfAKind => 11,
            Tracked::FullHouse => 13,
        }
    }

    fn letter(self) -> char {
        match self {
            Tracked::Flush => 'f',
            Tracked::Straight => 's',
            Tracked::FourOfAKind => 'o',
            Tracked::FullHouse => 'h',
        }
    }

    fn flag(self) -> Reachable {
        match self {
            Tracked::Flush => Reachable::FLUSH,
            Tracked::Straight => Reachable::STRAIGHT,
            Tracked::FourOfAKind => Reachable::FOUR_OF_A_KIND,
            Tracked::FullHouse => Reachable::FULL_HOUSE,
        }
    }

    fn made_by(self, category: HandCategory) -> bool {
        match self {
            Tracked::Flush => category.is_flush(),
            Tracked::Straight => category.is_straight(),
            Tracked::FourOfAKind => category == HandCategory::FourOfAKind,
            Tracked::FullHouse => category == HandCategory::FullHouse,
        }
    }
}

const PLAYS_MASK: u32 = 0b1_1111;
const PAIRS_SHIFT: u32 = 5;
const SINGLETONS_SHIFT: u32 = 15;
const MAX_PLAYS: u32 = PLAYS_MASK;

/// Compact heuristic-table key for one line at one point in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineEncoding(u32);

impl LineEncoding {
    pub fn new(plays: usize, pairs: Pairs, prospects: [Prospect; 4], singletons: u8) -> Self {
        let mut bits = (plays as u32).min(MAX_PLAYS);
        bits |= (pairs as u32) << PAIRS_SHIFT;
        for (tracked, prospect) in Tracked::ALL.iter().zip(prospects) {
            bits |= (prospect as u32) << tracked.shift();
        }
        bits |= (singletons.min(5) as u32) << SINGLETONS_SHIFT;
        LineEncoding(bits)
    }

    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn plays(self) -> usize {
        (self.0 & PLAYS_MASK) as usize
    }

    pub fn pairs(self) -> Pairs {
        match (self.0 >> PAIRS_SHIFT) & 0b11 {
            1 => Pairs::One,
            2 => Pairs::Two,
            _ => Pairs::None,
        }
    }

    pub fn prospect(self, tracked: Tracked) -> Prospect {
        match (self.0 >> tracked.shift()) & 0b11 {
            1 => Prospect::Open,
            2 => Prospect::Made,
            _ => Prospect::Absent,
        }
    }

    pub fn singletons(self) -> u8 {
        ((self.0 >> SINGLETONS_SHIFT) & 0b111) as u8
    }
}

// ── Encoder ─────────────────────────────────────────────────────────

/// Encode a line given the number of cards placed so far in the game.
///
/// Total over every well-formed line, including all-empty ones.
#[inline]
pub fn encode(line: &[Option<Card>], plays: usize) -> LineEncoding {
    let outlook = outlook(line);
    let category = classify(line);

    let pairs = match category {
        HandCategory::OnePair => Pairs::One,
        HandCategory::TwoPair => Pairs::Two,
        _ => Pairs::None,
    };

    let prospects = Tracked::ALL.map(|tracked| {
        if !outlook.reachable.contains(tracked.flag()) {
            Prospect::Absent
        } else if tracked.made_by(category) {
            Prospect::Made
        } else {
            Prospect::Open
        }
    });

    LineEncoding::new(plays, pairs, prospects, outlook.singletons)
}

// ── Text Form ───────────────────────────────────────────────────────

impl fmt::Display for LineEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.plays())?;
        match self.pairs() {
            Pairs::One => f.write_str("p")?,
            Pairs::Two => f.write_str("P")?,
            Pairs::None => {}
        }
        for tracked in Tracked::ALL {
            match self.prospect(tracked) {
                Prospect::Open => write!(f, "{}", tracked.letter())?,
                Prospect::Made => write!(f, "{}", tracked.letter().to_ascii_uppercase())?,
                Prospect::Absent => {}
            }
        }
        match self.singletons() {
            0 => Ok(()),
            n => write!(f, "({n})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed line encoding {0:?}")]
pub struct ParseEncodingError(pub String);

impl FromStr for LineEncoding {
    type Err = ParseEncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ParseEncodingError(s.to_string());

        let (plays, rest) = s.split_once(':').ok_or_else(bad)?;
        if plays.is_empty() || !plays.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad());
        }
        // One spelling per key: "07:f" would alias "7:f" on load.
        if plays.len() > 1 && plays.starts_with('0') {
            return Err(bad());
        }
        let plays: usize = plays.parse().map_err(|_| bad())?;
        if plays > NUM_CELLS {
            return Err(bad());
        }

        let mut rest = rest;
        let pairs = if let Some(r) = rest.strip_prefix('p') {
            rest = r;
            Pairs::One
        } else if let Some(r) = rest.strip_prefix('P') {
            rest = r;
            Pairs::Two
        } else {
            Pairs::None
        };

        let mut prospects = [Prospect::Absent; 4];
        for (slot, tracked) in prospects.iter_mut().zip(Tracked::ALL) {
            let open = tracked.letter();
            let made = open.to_ascii_uppercase();
            if let Some(r) = rest.strip_prefix(open) {
                rest = r;
                *slot = Prospect::Open;
            } else if let Some(r) = rest.strip_prefix(made) {
                rest = r;
                *slot = Prospect::Made;
            }
        }

        let singletons = match rest {
            "" => 0,
            "(1)" => 1,
            "(2)" => 2,
            "(3)" => 3,
            "(4)" => 4,
            "(5)" => 5,
            _ => return Err(bad()),
        };

        Ok(LineEncoding::new(plays, pairs, prospects, singletons))
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::parse_line;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn enc(text: &str, plays: usize) -> LineEncoding {
        encode(&parse_line(text).unwrap(), plays)
    }

    #[test]
    fn test_pair_fixture() {
        let e = enc("2C 2D _ _ _", 2);
        assert_eq!(e.pairs(), Pairs::One);
        assert_eq!(e.prospect(Tracked::Flush), Prospect::Absent);
        assert_eq!(e.prospect(Tracked::Straight), Prospect::Absent);
        assert_eq!(e.prospect(Tracked::FourOfAKind), Prospect::Open);
        assert_eq!(e.prospect(Tracked::FullHouse), Prospect::Open);
        assert_eq!(e.to_string(), "2:poh");
    }

    #[test]
    fn test_broadway_draw() {
        let e = enc("AS KS QS JS _", 9);
        assert_eq!(e.to_string(), "9:fs(4)");
    }

    #[test]
    fn test_quads_made() {
        let e = enc("5C 5D 5H 5S _", 20);
        assert_eq!(e.prospect(Tracked::FourOfAKind), Prospect::Made);
        assert_eq!(e.to_string(), "20:O");
    }

    #[test]
    fn test_made_full_house_hides_pair() {
        let e = enc("3H 3S 3D 9C 9D", 25);
        assert_eq!(e.pairs(), Pairs::None, "full house classification wins over the pair");
        assert_eq!(e.to_string(), "25:H");
    }

    #[test]
    fn test_royal_is_straight_and_flush() {
        assert_eq!(enc("TH JH QH KH AH", 25).to_string(), "25:FS(5)");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(enc("_ _ _ _ _", 0).to_string(), "0:foh");
    }

    #[test]
    fn test_permutation_invariance() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        for text in ["2C 2D _ _ _", "AS KS QS JS _", "9C 9D 9H 4S 4C", "3H _ 8C _ JD"] {
            let mut line = parse_line(text).unwrap();
            let expected = encode(&line, 11);
            for _ in 0..20 {
                line.shuffle(&mut rng);
                assert_eq!(encode(&line, 11), expected, "order changed encoding of {text}");
            }
        }
    }

    #[test]
    fn test_play_count_distinguishes() {
        assert_ne!(enc("2C _ _ _ _", 3), enc("2C _ _ _ _", 4));
    }

    #[test]
    fn test_text_round_trip() {
        for text in ["2C 2D _ _ _", "AS KS QS JS _", "5C 5D 5H 5S _", "9C 9D 4H 4S KC", "_ _ _ _ _"] {
            let e = enc(text, 14);
            let parsed: LineEncoding = e.to_string().parse().unwrap();
            assert_eq!(parsed, e, "round trip of {e}");
        }
    }

    #[test]
    fn test_rejects_malformed_text() {
        for bad in ["", "x:f", "7", "7:fz", "7:(6)", "7:sf", "99:f", "7:f(2)x"] {
            assert!(bad.parse::<LineEncoding>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_one_spelling_per_key() {
        assert!("07:f".parse::<LineEncoding>().is_err(), "leading zero aliases 7:f");
        assert!("00:f".parse::<LineEncoding>().is_err());
        assert!("26:f".parse::<LineEncoding>().is_err(), "more plays than cells");
        assert!("31:f".parse::<LineEncoding>().is_err());
        assert_eq!("25:f".parse::<LineEncoding>().unwrap().plays(), 25);
        assert_eq!("0:foh".parse::<LineEncoding>().unwrap().plays(), 0);
    }
}
