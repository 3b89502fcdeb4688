//! Codex ledger: per-chunk rows, frequencies, and overlap reconstruction.
//!
//! The codex is the literal record of one compression run: one row per
//! chunk holding the chunk text, its symbol, its fractal digest, and the
//! symbol's ontology depth, plus the tree, the content fingerprint, and
//! the symbol-layer ratio. Reconstruction reads only the chunk column:
//! the first chunk verbatim, then the final scalar of every later chunk.
//! Adjacent windows overlap in all but one scalar, so this is exact.
//! Symbols and digests never participate in reconstruction.

use crate::fractal::FractalHash;
use crate::ontology::OntologyTree;
use crate::symbol::SymbolId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ----------------------------------------------------------------------------
// Rows
// ----------------------------------------------------------------------------

/// One row of the codex, describing a single chunk occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodexEntry {
    /// Position of the chunk in the ledger.
    pub index: usize,
    /// Literal chunk text.
    pub chunk: String,
    /// Symbol the chunk folded onto.
    pub symbol: SymbolId,
    /// Fractal digest of the symbol at the configured depth.
    pub fractal_hash: FractalHash,
    /// Ontology depth of the symbol's node.
    pub tree_depth: usize,
}

// ----------------------------------------------------------------------------
// Ledger
// ----------------------------------------------------------------------------

/// Complete codex for one input.
///
/// # Invariants
/// Rows are in chunk order and `entries[i].index == i`. Every symbol in a
/// row has a node in the tree, and the fingerprint covers exactly the
/// symbol and digest columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Codex {
    entries: Vec<CodexEntry>,
    tree: OntologyTree,
    fingerprint: FractalHash,
    compression_ratio: f64,
}

impl Codex {
    /// Assembles a codex from its parts.
    pub fn new(
        entries: Vec<CodexEntry>,
        tree: OntologyTree,
        fingerprint: FractalHash,
        compression_ratio: f64,
    ) -> Self {
        Self {
            entries,
            tree,
            fingerprint,
            compression_ratio,
        }
    }

    /// Rows in chunk order.
    pub fn entries(&self) -> &[CodexEntry] {
        &self.entries
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the input was shorter than the chunk window.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The ontology tree built over the symbol sequence.
    pub fn tree(&self) -> &OntologyTree {
        &self.tree
    }

    /// Content fingerprint over the symbol and digest columns.
    pub fn fingerprint(&self) -> FractalHash {
        self.fingerprint
    }

    /// Symbol-layer ratio: input scalars over rows, one when empty.
    pub fn compression_ratio(&self) -> f64 {
        self.compression_ratio
    }

    /// The symbol column, in chunk order.
    pub fn symbol_sequence(&self) -> Vec<SymbolId> {
        self.entries.iter().map(|entry| entry.symbol).collect()
    }

    /// The digest column, in chunk order.
    pub fn hash_sequence(&self) -> Vec<FractalHash> {
        self.entries.iter().map(|entry| entry.fractal_hash).collect()
    }

    /// The chunk column, in chunk order.
    pub fn chunk_sequence(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.chunk.as_str()).collect()
    }

    /// Chunk text at a ledger position.
    pub fn chunk_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.chunk.as_str())
    }

    /// Symbol at a ledger position.
    pub fn symbol_at(&self, index: usize) -> Option<SymbolId> {
        self.entries.get(index).map(|entry| entry.symbol)
    }

    /// Digest at a ledger position.
    pub fn hash_at(&self, index: usize) -> Option<FractalHash> {
        self.entries.get(index).map(|entry| entry.fractal_hash)
    }

    /// Number of distinct symbol values in the ledger.
    pub fn unique_symbols(&self) -> usize {
        let distinct: FxHashSet<SymbolId> =
            self.entries.iter().map(|entry| entry.symbol).collect();
        distinct.len()
    }

    /// Occurrence count per symbol value, keyed in ascending id order.
    pub fn symbol_frequency(&self) -> BTreeMap<SymbolId, usize> {
        let mut frequency = BTreeMap::new();
        for entry in &self.entries {
            *frequency.entry(entry.symbol).or_insert(0) += 1;
        }
        frequency
    }

    /// Occurrence count per digest, keyed in ascending digest order.
    pub fn hash_frequency(&self) -> BTreeMap<FractalHash, usize> {
        let mut frequency = BTreeMap::new();
        for entry in &self.entries {
            *frequency.entry(entry.fractal_hash).or_insert(0) += 1;
        }
        frequency
    }

    /// Rebuilds the original text from the chunk column.
    ///
    /// Takes the first chunk verbatim, then appends the final scalar of
    /// every later chunk. Exact for any ledger produced by overlapping
    /// windows; an empty codex reconstructs the empty string.
    pub fn reconstruct(&self) -> String {
        let mut out = String::new();
        let mut rows = self.entries.iter();
        if let Some(first) = rows.next() {
            out.push_str(&first.chunk);
        }
        for entry in rows {
            if let Some(last) = entry.chunk.chars().last() {
                out.push(last);
            }
        }
        out
    }

    /// Builds the compact summary used for reporting.
    ///
    /// All counts come from the ledger itself, so an empty codex reports a
    /// zero original length even when the surrounding artifact stores a
    /// sub-window original text. The artifact's stats carry the true input
    /// size.
    pub fn summary(&self) -> CodexSummary {
        CodexSummary {
            original_length: self.reconstruct().chars().count(),
            symbol_count: self.entries.len(),
            unique_symbols: self.unique_symbols(),
            tree_depth: self.tree.max_depth(),
            compression_ratio: self.compression_ratio,
            fingerprint: abbreviate(&self.fingerprint),
            most_common_symbol: most_common(&self.symbol_frequency()),
            most_common_hash: most_common(&self.hash_frequency())
                .map(|hash| abbreviate(&hash)),
        }
    }
}

// ----------------------------------------------------------------------------
// Summary
// ----------------------------------------------------------------------------

/// Compact report over one codex.
///
/// Digests appear abbreviated to their first sixteen hex characters; the
/// most-common fields break count ties toward the smallest key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodexSummary {
    pub original_length: usize,
    pub symbol_count: usize,
    pub unique_symbols: usize,
    pub tree_depth: usize,
    pub compression_ratio: f64,
    pub fingerprint: String,
    pub most_common_symbol: Option<SymbolId>,
    pub most_common_hash: Option<String>,
}

fn abbreviate(hash: &FractalHash) -> String {
    let hex = hash.to_hex();
    format!("{}…", &hex[..16])
}

fn most_common<K: Copy + Ord>(frequency: &BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (&key, &count) in frequency {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
