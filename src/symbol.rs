//! Symbol extraction: overlapping chunk windows and alphabet folding.
//!
//! The first codec stage slides a fixed-width window over the input one
//! Unicode scalar at a time, so adjacent chunks overlap in all but one
//! scalar. Each chunk folds onto a bounded symbol alphabet by hashing its
//! UTF-8 bytes and reducing modulo the alphabet size. Distinct chunks may
//! share a symbol; reconstruction never relies on symbol uniqueness, only
//! on the literal chunk ledger kept by the codex.

use rustc_hash::FxHasher;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::Hasher;
use std::str::FromStr;

/// Prefix of the canonical symbol rendering.
pub const SYMBOL_PREFIX: &str = "S_";

// ----------------------------------------------------------------------------
// Symbol identifiers
// ----------------------------------------------------------------------------

/// Identifier of a slot in the bounded symbol alphabet.
///
/// The canonical rendering is `S_` followed by the decimal slot, zero-padded
/// to at least four digits (`S_0042`). That string is the serde form and the
/// text the fractal fold consumes, so it must stay stable across versions.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Creates a symbol id from its raw alphabet slot.
    #[inline]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Returns the raw alphabet slot.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", SYMBOL_PREFIX, self.0)
    }
}

impl FromStr for SymbolId {
    type Err = ParseSymbolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(SYMBOL_PREFIX)
            .ok_or(ParseSymbolError::MissingPrefix)?;
        // Strict decimal: u32::from_str alone would admit a leading '+'.
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseSymbolError::InvalidNumber);
        }
        digits
            .parse::<u32>()
            .map(SymbolId)
            .map_err(|_| ParseSymbolError::InvalidNumber)
    }
}

impl Serialize for SymbolId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for SymbolId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Error parsing a symbol id from its canonical rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSymbolError {
    /// Text does not start with the symbol prefix.
    MissingPrefix,
    /// The part after the prefix is not a plain decimal `u32`.
    InvalidNumber,
}

impl fmt::Display for ParseSymbolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseSymbolError::MissingPrefix => {
                write!(f, "symbol id must start with {:?}", SYMBOL_PREFIX)
            }
            ParseSymbolError::InvalidNumber => {
                write!(f, "symbol id digits must be a plain decimal u32")
            }
        }
    }
}

impl std::error::Error for ParseSymbolError {}

// ----------------------------------------------------------------------------
// Chunk extraction
// ----------------------------------------------------------------------------

/// Splits text into overlapping chunks of `window_width` Unicode scalars.
///
/// The window advances one scalar per chunk, so a text of `n` scalars yields
/// `n - window_width + 1` chunks. Inputs shorter than the window, and a zero
/// width, yield no chunks at all.
pub fn chunk_text(text: &str, window_width: usize) -> Vec<String> {
    let scalars: Vec<char> = text.chars().collect();
    if window_width == 0 || scalars.len() < window_width {
        return Vec::new();
    }
    scalars
        .windows(window_width)
        .map(|window| window.iter().collect())
        .collect()
}

/// Folds one chunk onto the symbol alphabet.
///
/// Hashes the chunk's UTF-8 bytes and reduces modulo `symbol_range`. Equal
/// chunks always land on the same slot; distinct chunks may collide, which
/// widens a symbol's chunk set but never corrupts reconstruction. A zero
/// range is treated as one.
///
/// # Determinism
/// `FxHasher` carries no per-process seed, so the chunk-to-symbol map is
/// identical across runs, processes, and platforms for a fixed range.
pub fn derive_symbol(chunk: &str, symbol_range: u32) -> SymbolId {
    let mut hasher = FxHasher::default();
    hasher.write(chunk.as_bytes());
    let slot = hasher.finish() % u64::from(symbol_range.max(1));
    SymbolId::new(slot as u32)
}

/// Extracts the chunk ledger and symbol sequence for one input.
///
/// The vectors are parallel: `chunks[i]` folded onto `symbols[i]`. Both are
/// empty when the input is shorter than the window.
pub fn extract(text: &str, window_width: usize, symbol_range: u32) -> (Vec<String>, Vec<SymbolId>) {
    let chunks = chunk_text(text, window_width);
    let symbols = chunks
        .iter()
        .map(|chunk| derive_symbol(chunk, symbol_range))
        .collect();
    (chunks, symbols)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
