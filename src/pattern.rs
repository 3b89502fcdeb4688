//! Pattern dictionary: discovery, substitution, expansion, and accounting.
//!
//! The second codec layer rewrites a symbol sequence against a small
//! dictionary of repeating subsequences. Discovery estimates worth from
//! sliding-window counts, which admit overlapping repeats; substitution is
//! the ground truth. Each pattern gets one left-to-right pass over the
//! token stream, and a pass that fails to pay for the pattern's dictionary
//! slot is discarded along with the pattern itself. The layer therefore
//! never emits output larger than its input.
//!
//! # Citations
//! - Dictionary methods: Ziv & Lempel, "A universal algorithm for sequential data compression" (1977)
//! - Offline dictionary construction: Larsson & Moffat, "Off-line dictionary-based compression" (2000)

use crate::symbol::{SymbolId, SYMBOL_PREFIX};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::hash_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ----------------------------------------------------------------------------
// Limits
// ----------------------------------------------------------------------------

/// Prefix of the canonical pattern rendering.
pub const PATTERN_PREFIX: &str = "P_";

/// Most patterns one discovery run will accept.
pub const MAX_PATTERNS: usize = 10;

/// Longest subsequence discovery will consider.
pub const MAX_PATTERN_LENGTH: usize = 20;

// ----------------------------------------------------------------------------
// Pattern identifiers
// ----------------------------------------------------------------------------

/// Identifier of a dictionary pattern.
///
/// Renders as `P_` plus the counter value, zero-padded to at least three
/// digits (`P_007`). Ids are allocated per compressor instance, so ids
/// from different artifacts never share meaning.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatternId(u32);

impl PatternId {
    /// Creates a pattern id from its raw counter value.
    #[inline]
    pub const fn new(counter: u32) -> Self {
        Self(counter)
    }

    /// Returns the raw counter value.
    #[inline]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PatternId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", PATTERN_PREFIX, self.0)
    }
}

impl FromStr for PatternId {
    type Err = ParsePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(PATTERN_PREFIX)
            .ok_or(ParsePatternError::MissingPrefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParsePatternError::InvalidNumber);
        }
        digits
            .parse::<u32>()
            .map(PatternId)
            .map_err(|_| ParsePatternError::InvalidNumber)
    }
}

impl Serialize for PatternId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PatternId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Error parsing a pattern id from its canonical rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePatternError {
    /// Text does not start with the pattern prefix.
    MissingPrefix,
    /// The part after the prefix is not a plain decimal `u32`.
    InvalidNumber,
}

impl fmt::Display for ParsePatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsePatternError::MissingPrefix => {
                write!(f, "pattern id must start with {:?}", PATTERN_PREFIX)
            }
            ParsePatternError::InvalidNumber => {
                write!(f, "pattern id digits must be a plain decimal u32")
            }
        }
    }
}

impl std::error::Error for ParsePatternError {}

// ----------------------------------------------------------------------------
// Tokens
// ----------------------------------------------------------------------------

/// One element of a compressed sequence: a base symbol or a pattern
/// reference.
///
/// Tokens render and serialize as their canonical string (`S_0042` or
/// `P_003`), so compressed sequences stay homogeneous in artifacts and
/// the two namespaces can never be confused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Token {
    /// A base symbol carried through unchanged.
    Symbol(SymbolId),
    /// A reference into the pattern dictionary.
    Pattern(PatternId),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Symbol(symbol) => write!(f, "{}", symbol),
            Token::Pattern(id) => write!(f, "{}", id),
        }
    }
}

impl FromStr for Token {
    type Err = ParseTokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with(PATTERN_PREFIX) {
            s.parse::<PatternId>()
                .map(Token::Pattern)
                .map_err(|_| ParseTokenError::InvalidNumber)
        } else if s.starts_with(SYMBOL_PREFIX) {
            s.parse::<SymbolId>()
                .map(Token::Symbol)
                .map_err(|_| ParseTokenError::InvalidNumber)
        } else {
            Err(ParseTokenError::UnknownPrefix)
        }
    }
}

impl Serialize for Token {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Token {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Error parsing a token from its canonical rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseTokenError {
    /// Text carries neither the symbol nor the pattern prefix.
    UnknownPrefix,
    /// Prefixed digits failed to parse.
    InvalidNumber,
}

impl fmt::Display for ParseTokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseTokenError::UnknownPrefix => write!(
                f,
                "token must start with {:?} or {:?}",
                SYMBOL_PREFIX, PATTERN_PREFIX
            ),
            ParseTokenError::InvalidNumber => {
                write!(f, "token digits must be a plain decimal u32")
            }
        }
    }
}

impl std::error::Error for ParseTokenError {}

// ----------------------------------------------------------------------------
// Dictionary
// ----------------------------------------------------------------------------

/// Dictionary of discovered patterns, keyed by pattern id.
///
/// Iteration runs in ascending id order, which equals discovery order
/// because ids come from an incrementing counter. Pattern bodies hold
/// only base symbols, never other pattern ids, so expansion is
/// single-level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternDictionary {
    patterns: BTreeMap<PatternId, Vec<SymbolId>>,
}

impl PatternDictionary {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when no pattern was kept.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when the id has an entry.
    pub fn contains(&self, id: PatternId) -> bool {
        self.patterns.contains_key(&id)
    }

    /// The body of a pattern, if present.
    pub fn get(&self, id: PatternId) -> Option<&[SymbolId]> {
        self.patterns.get(&id).map(Vec::as_slice)
    }

    /// Adds or replaces a pattern body.
    pub fn insert(&mut self, id: PatternId, sequence: Vec<SymbolId>) {
        self.patterns.insert(id, sequence);
    }

    /// Drops a pattern, returning its body when it existed.
    pub fn remove(&mut self, id: PatternId) -> Option<Vec<SymbolId>> {
        self.patterns.remove(&id)
    }

    /// Iterates patterns in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (PatternId, &[SymbolId])> {
        self.patterns.iter().map(|(&id, seq)| (id, seq.as_slice()))
    }

    /// Pattern ids in ascending order.
    pub fn ids(&self) -> Vec<PatternId> {
        self.patterns.keys().copied().collect()
    }

    /// Total symbol slots across all pattern bodies.
    ///
    /// This is the dictionary's share of the compressed size.
    pub fn total_slots(&self) -> usize {
        self.patterns.values().map(Vec::len).sum()
    }

    /// Expands a token stream back to the flat symbol sequence.
    ///
    /// Single level: bodies contain only base symbols, so one pass is
    /// complete. Fails on the first pattern token without an entry.
    pub fn expand(&self, tokens: &[Token]) -> Result<Vec<SymbolId>, ExpandError> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                Token::Symbol(symbol) => out.push(*symbol),
                Token::Pattern(id) => match self.patterns.get(id) {
                    Some(sequence) => out.extend_from_slice(sequence),
                    None => return Err(ExpandError::UnknownPattern(*id)),
                },
            }
        }
        Ok(out)
    }

    /// Measures every pattern against a symbol sequence, in id order.
    ///
    /// Occurrences count sliding windows, matching discovery's estimate
    /// rather than substitution's realized hits, so savings can read
    /// higher than what substitution achieved. Efficiency is the saved
    /// fraction of the span the pattern covers, zero when it never
    /// occurs.
    pub fn analyze(&self, symbols: &[SymbolId]) -> Vec<PatternAnalysis> {
        self.patterns
            .iter()
            .map(|(&id, sequence)| {
                let length = sequence.len();
                let occurrences = count_occurrences(symbols, sequence);
                let covered = (length * occurrences) as i64;
                let space_saved = covered - (length + occurrences) as i64;
                let space_efficiency = if covered == 0 {
                    0.0
                } else {
                    space_saved as f64 / covered as f64
                };
                PatternAnalysis {
                    id,
                    sequence: sequence.clone(),
                    length,
                    occurrences,
                    space_saved,
                    space_efficiency,
                }
            })
            .collect()
    }

    /// Patterns sorted longest body first; equal lengths keep id order.
    fn by_descending_length(&self) -> Vec<(PatternId, Vec<SymbolId>)> {
        let mut items: Vec<(PatternId, Vec<SymbolId>)> = self
            .patterns
            .iter()
            .map(|(&id, seq)| (id, seq.clone()))
            .collect();
        items.sort_by(|a, b| b.1.len().cmp(&a.1.len()));
        items
    }
}

/// Error expanding a token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandError {
    /// A pattern token has no dictionary entry.
    UnknownPattern(PatternId),
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::UnknownPattern(id) => {
                write!(f, "compressed sequence references unknown pattern {}", id)
            }
        }
    }
}

impl std::error::Error for ExpandError {}

/// Counts sliding-window occurrences of `sequence` in `symbols`.
///
/// Overlapping occurrences all count, so for periodic input this exceeds
/// the number of non-overlapping replacement slots.
pub fn count_occurrences(symbols: &[SymbolId], sequence: &[SymbolId]) -> usize {
    if sequence.is_empty() || symbols.len() < sequence.len() {
        return 0;
    }
    symbols
        .windows(sequence.len())
        .filter(|window| *window == sequence)
        .count()
}

// ----------------------------------------------------------------------------
// Compressor
// ----------------------------------------------------------------------------

/// Offline pattern compressor over symbol sequences.
///
/// Holds the acceptance thresholds and the id counter. The counter is
/// instance-scoped: ids within one instance never repeat, and a fresh
/// instance starts over at `P_000`.
#[derive(Debug, Clone)]
pub struct PatternCompressor {
    min_pattern_length: usize,
    min_occurrences: usize,
    min_space_saved: usize,
    next_id: u32,
}

impl PatternCompressor {
    /// Creates a compressor with the given acceptance thresholds.
    pub fn new(min_pattern_length: usize, min_occurrences: usize, min_space_saved: usize) -> Self {
        Self {
            min_pattern_length,
            min_occurrences,
            min_space_saved,
            next_id: 0,
        }
    }

    /// Runs discovery and substitution over one symbol sequence.
    pub fn compress(&mut self, symbols: &[SymbolId]) -> PatternCompression {
        let mut dictionary = self.discover(symbols);
        let compressed = substitute(symbols, &mut dictionary);
        let stats = PatternStats::measure(symbols.len(), &compressed, &dictionary);
        PatternCompression {
            dictionary,
            compressed,
            stats,
        }
    }

    /// Scans for repeating subsequences worth a dictionary slot.
    ///
    /// Inputs shorter than twice the minimum pattern length are left
    /// alone. Candidate lengths run from the minimum up to a third of
    /// the input, clamped to [`MAX_PATTERN_LENGTH`] and never below the
    /// minimum itself. Within one length, candidates are judged in order
    /// of first sighting; a candidate needs both enough sliding
    /// occurrences and enough estimated saving. Acceptance stops at
    /// [`MAX_PATTERNS`] patterns.
    pub fn discover(&mut self, symbols: &[SymbolId]) -> PatternDictionary {
        let mut dictionary = PatternDictionary::new();
        if self.min_pattern_length == 0 || symbols.len() < 2 * self.min_pattern_length {
            return dictionary;
        }
        let max_length = (symbols.len() / 3)
            .min(MAX_PATTERN_LENGTH)
            .max(self.min_pattern_length);
        'lengths: for length in self.min_pattern_length..=max_length {
            let mut counts: FxHashMap<&[SymbolId], usize> = FxHashMap::default();
            let mut first_seen: Vec<&[SymbolId]> = Vec::new();
            for window in symbols.windows(length) {
                match counts.entry(window) {
                    Entry::Occupied(mut slot) => *slot.get_mut() += 1,
                    Entry::Vacant(slot) => {
                        slot.insert(1);
                        first_seen.push(window);
                    }
                }
            }
            for window in first_seen {
                let count = counts[window];
                if count < self.min_occurrences {
                    continue;
                }
                let saved = (length * count) as i64 - (length + count) as i64;
                if saved < self.min_space_saved as i64 {
                    continue;
                }
                dictionary.insert(self.allocate_id(), window.to_vec());
                if dictionary.len() >= MAX_PATTERNS {
                    break 'lengths;
                }
            }
        }
        dictionary
    }

    fn allocate_id(&mut self) -> PatternId {
        let id = PatternId::new(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Rewrites the sequence with pattern tokens, longest pattern first.
///
/// Each pattern gets one left-to-right pass over the current token stream;
/// a match consumes its whole span, so replacements never overlap. After
/// the pass the realized saving is re-checked against the pattern's slot
/// cost: a pass saving less than one slot is discarded and its pattern
/// dropped from the dictionary. Sliding-window estimates over-count
/// overlapping repeats, and this is where the over-count gets corrected.
fn substitute(symbols: &[SymbolId], dictionary: &mut PatternDictionary) -> Vec<Token> {
    let mut tokens: Vec<Token> = symbols.iter().copied().map(Token::Symbol).collect();
    for (id, sequence) in dictionary.by_descending_length() {
        let mut replaced = Vec::with_capacity(tokens.len());
        let mut hits = 0usize;
        let mut i = 0;
        while i < tokens.len() {
            if matches_at(&tokens, i, &sequence) {
                replaced.push(Token::Pattern(id));
                i += sequence.len();
                hits += 1;
            } else {
                replaced.push(tokens[i]);
                i += 1;
            }
        }
        let saved = (hits * sequence.len()) as i64 - (hits + sequence.len()) as i64;
        if saved >= 1 {
            tokens = replaced;
        } else {
            dictionary.remove(id);
        }
    }
    tokens
}

/// True when `sequence` matches a run of plain symbol tokens at `start`.
fn matches_at(tokens: &[Token], start: usize, sequence: &[SymbolId]) -> bool {
    if sequence.is_empty() || start + sequence.len() > tokens.len() {
        return false;
    }
    tokens[start..start + sequence.len()]
        .iter()
        .zip(sequence)
        .all(|(token, &symbol)| matches!(token, Token::Symbol(s) if *s == symbol))
}

// ----------------------------------------------------------------------------
// Accounting
// ----------------------------------------------------------------------------

/// Output of one compressor run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternCompression {
    /// Patterns that survived the realized-saving check.
    pub dictionary: PatternDictionary,
    /// The rewritten token stream.
    pub compressed: Vec<Token>,
    /// Size accounting for the run.
    pub stats: PatternStats,
}

/// Size accounting for one pattern-layer run.
///
/// `compressed_size` counts the token stream plus every dictionary slot,
/// so the ratio prices in the cost of carrying the dictionary. The
/// realized-saving check in substitution keeps the ratio at or above one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternStats {
    /// Input length in symbols.
    pub original_size: usize,
    /// Token stream length plus dictionary slots.
    pub compressed_size: usize,
    /// Original over compressed; one for empty input.
    pub compression_ratio: f64,
    /// Slots saved against the input.
    pub space_saved: usize,
    /// Saved fraction of the input as a percentage; zero for empty input.
    pub compression_percentage: f64,
    /// Patterns kept in the dictionary.
    pub pattern_count: usize,
}

impl PatternStats {
    fn measure(original_size: usize, compressed: &[Token], dictionary: &PatternDictionary) -> Self {
        let compressed_size = compressed.len() + dictionary.total_slots();
        let space_saved = original_size.saturating_sub(compressed_size);
        let (compression_ratio, compression_percentage) = if original_size == 0 {
            (1.0, 0.0)
        } else {
            (
                original_size as f64 / compressed_size as f64,
                space_saved as f64 / original_size as f64 * 100.0,
            )
        };
        Self {
            original_size,
            compressed_size,
            compression_ratio,
            space_saved,
            compression_percentage,
            pattern_count: dictionary.len(),
        }
    }
}

/// Realized shape of one dictionary pattern against a sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    /// The pattern's id.
    pub id: PatternId,
    /// The pattern body.
    pub sequence: Vec<SymbolId>,
    /// Body length in symbols.
    pub length: usize,
    /// Sliding-window occurrence count in the analyzed sequence.
    pub occurrences: usize,
    /// Estimated slots saved; negative when the pattern never pays off.
    pub space_saved: i64,
    /// Saved fraction of the covered span, zero when never occurring.
    pub space_efficiency: f64,
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
