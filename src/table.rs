//! Poker Squares Engine — Heuristic Tables
//!
//! Two shapes sharing only the key:
//!
//! - [`HeuristicTable`]: read-only `LineEncoding → expected final score`,
//!   loaded once and consulted by every rollout.
//! - [`TrainingTable`]: `LineEncoding → (count, running mean)`, grown by the
//!   trainer and flattened into a `HeuristicTable` to save.
//!
//! ## File Format
//!
//! A flat JSON object from the encoding's text form to its score, keys
//! sorted: `{"0:foh": 61.2, "1:foh(1)": 60.9, ...}`. Saves go through a
//! `.tmp` sibling and a rename so readers never see a half-written table.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::card::Card;
use crate::encoding::{encode, LineEncoding};
use crate::grid::Grid;

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("heuristic table I/O at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("heuristic table {path} is not a valid JSON map: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("heuristic table {path} has a bad key: {key:?}")]
    InvalidKey { path: PathBuf, key: String },
}

// ── Play-time Table ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeuristicTable {
    scores: FxHashMap<LineEncoding, f64>,
}

impl HeuristicTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Score for `key`; unknown keys are neutral (0.0).
    #[inline]
    pub fn lookup(&self, key: LineEncoding) -> f64 {
        self.scores.get(&key).copied().unwrap_or(0.0)
    }

    pub fn get(&self, key: LineEncoding) -> Option<f64> {
        self.scores.get(&key).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (LineEncoding, f64)> + '_ {
        self.scores.iter().map(|(&k, &v)| (k, v))
    }

    /// Sum of line scores over the ten lines of `grid`, keyed at `plays`.
    #[inline]
    pub fn evaluate(&self, grid: &Grid, plays: usize) -> f64 {
        grid.lines().map(|line| self.lookup_line(&line, plays)).sum()
    }

    #[inline]
    pub fn lookup_line(&self, line: &[Option<Card>], plays: usize) -> f64 {
        self.lookup(encode(line, plays))
    }

    /// Entries sorted by the key's text form.
    pub fn to_sorted(&self) -> BTreeMap<String, f64> {
        self.scores.iter().map(|(k, &v)| (k.to_string(), v)).collect()
    }

    /// Load a table. Missing, truncated or malformed files are errors; play
    /// never falls back to an empty table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| TableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw: BTreeMap<String, f64> =
            serde_json::from_slice(&bytes).map_err(|source| TableError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut scores = FxHashMap::default();
        scores.reserve(raw.len());
        // serde_json already refuses NaN, infinities and out-of-range numbers.
        for (key, score) in raw {
            let encoding = match key.parse::<LineEncoding>() {
                Ok(e) => e,
                Err(_) => {
                    return Err(TableError::InvalidKey {
                        path: path.to_path_buf(),
                        key,
                    })
                }
            };
            scores.insert(encoding, score);
        }

        log::info!("Loaded heuristic table {} ({} encodings)", path.display(), scores.len());
        Ok(HeuristicTable { scores })
    }

    /// Write the table, atomically replacing any previous file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        let io_err = |source| TableError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let bytes = serde_json::to_vec(&self.to_sorted()).map_err(|source| TableError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = PathBuf::from(tmp_name);
        {
            let mut f = fs::File::create(&tmp).map_err(io_err)?;
            f.write_all(&bytes).map_err(io_err)?;
            f.sync_all().map_err(io_err)?;
        }
        fs::rename(&tmp, path).map_err(io_err)?;

        log::info!("Saved heuristic table {} ({} encodings)", path.display(), self.len());
        Ok(())
    }
}

impl FromIterator<(LineEncoding, f64)> for HeuristicTable {
    fn from_iter<I: IntoIterator<Item = (LineEncoding, f64)>>(iter: I) -> Self {
        HeuristicTable {
            scores: iter.into_iter().collect(),
        }
    }
}

// ── Training-time Table ─────────────────────────────────────────────

/// Running statistics for one encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stat {
    pub count: u64,
    pub mean: f64,
}

impl Stat {
    /// `mean' = mean + (score - mean) / (count + 1)`.
    #[inline]
    pub fn observe(&mut self, score: f64) {
        self.count += 1;
        self.mean += (score - self.mean) / self.count as f64;
    }
}

#[derive(Debug, Clone, Default)]
pub struct TrainingTable {
    stats: FxHashMap<LineEncoding, Stat>,
}

impl TrainingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    pub fn get(&self, key: LineEncoding) -> Option<Stat> {
        self.stats.get(&key).copied()
    }

    /// Fold one final-game score into `key`'s mean. A new key starts at
    /// `count = 0, mean = score`, so its first observation is the mean.
    pub fn observe(&mut self, key: LineEncoding, score: f64) {
        self.stats
            .entry(key)
            .or_insert(Stat {
                count: 0,
                mean: score,
            })
            .observe(score);
    }

    /// Drop the counts, keep the means.
    pub fn flatten(&self) -> HeuristicTable {
        self.stats.iter().map(|(&k, s)| (k, s.mean)).collect()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
