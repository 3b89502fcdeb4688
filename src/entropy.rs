//! Shannon entropy across the codec's representation layers.
//!
//! Entropy is measured over Unicode scalar values, base two, for three
//! renderings of one input: the raw text, the joined symbol-id string,
//! and the joined fractal-digest string. The digest rendering draws from
//! the sixteen-character hex alphabet, so its entropy tops out at four
//! bits per scalar regardless of depth. The depth sweep re-derives the
//! digest layer across a depth range to expose how quickly the fold
//! saturates that bound.
//!
//! # Citations
//! - Shannon, "A Mathematical Theory of Communication" (1948)
//! - Cover & Thomas, "Elements of Information Theory" (2006)

use crate::codex::Codex;
use crate::fractal::{fractal_hash_sequence, DigestError, FractalHash, DIGEST_HEX_LEN};
use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Depth range the orchestrator sweeps when none is given.
pub const DEFAULT_SWEEP_DEPTHS: RangeInclusive<u32> = 1..=10;

// ----------------------------------------------------------------------------
// Entropy
// ----------------------------------------------------------------------------

/// Shannon entropy of a string in bits per Unicode scalar.
///
/// Empty input measures zero.
pub fn shannon_entropy(text: &str) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let mut counts: FxHashMap<char, usize> = FxHashMap::default();
    let mut total = 0usize;
    for scalar in text.chars() {
        *counts.entry(scalar).or_insert(0) += 1;
        total += 1;
    }
    let total = total as f64;
    counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            -p * p.log2()
        })
        .sum()
}

/// Ratio of a layer's entropy to the original's, unit on a zero original.
fn preservation(layer: f64, original: f64) -> f64 {
    if original == 0.0 {
        1.0
    } else {
        layer / original
    }
}

fn joined_symbol_text(symbols: &[SymbolId]) -> String {
    use std::fmt::Write as _;
    let mut text = String::with_capacity(symbols.len() * 6);
    for symbol in symbols {
        let _ = write!(text, "{}", symbol);
    }
    text
}

fn joined_hash_text(hashes: &[FractalHash]) -> String {
    let mut text = String::with_capacity(hashes.len() * DIGEST_HEX_LEN);
    for hash in hashes {
        text.push_str(&hash.to_hex());
    }
    text
}

// ----------------------------------------------------------------------------
// Reports
// ----------------------------------------------------------------------------

/// Entropy of one input across all three codec layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyReport {
    /// Entropy of the raw input text.
    pub original_entropy: f64,
    /// Entropy of the concatenated symbol-id renderings.
    pub symbolic_entropy: f64,
    /// Entropy of the concatenated digest hex strings.
    pub fractal_entropy: f64,
    /// Symbolic over original entropy.
    pub entropy_preservation: f64,
}

impl EntropyReport {
    /// Measures the input text against its codex.
    pub fn measure(original: &str, codex: &Codex) -> Self {
        let original_entropy = shannon_entropy(original);
        let symbolic_entropy = shannon_entropy(&joined_symbol_text(&codex.symbol_sequence()));
        let fractal_entropy = shannon_entropy(&joined_hash_text(&codex.hash_sequence()));
        Self {
            original_entropy,
            symbolic_entropy,
            fractal_entropy,
            entropy_preservation: preservation(symbolic_entropy, original_entropy),
        }
    }
}

/// Digest-layer entropy at one fold depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSweepPoint {
    /// The fold depth measured.
    pub depth: u32,
    /// Entropy of the digest rendering at this depth.
    pub fractal_entropy: f64,
    /// Digest entropy over the original text's entropy.
    pub entropy_preservation: f64,
}

/// Digest-layer entropy across a depth range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSweep {
    /// Entropy of the raw input text.
    pub original_entropy: f64,
    /// Entropy of the concatenated symbol-id renderings.
    pub symbolic_entropy: f64,
    /// One measurement per swept depth, in ascending depth order.
    pub points: Vec<DepthSweepPoint>,
}

/// Re-derives the digest layer at every depth in `depths`.
///
/// Depth zero is not a valid fold and fails the sweep, so callers passing
/// a custom range start it at one.
pub fn depth_sweep(
    original: &str,
    symbols: &[SymbolId],
    depths: RangeInclusive<u32>,
) -> Result<DepthSweep, DigestError> {
    let original_entropy = shannon_entropy(original);
    let symbolic_entropy = shannon_entropy(&joined_symbol_text(symbols));
    let mut points = Vec::new();
    for depth in depths {
        let hashes = fractal_hash_sequence(symbols, depth)?;
        let fractal_entropy = shannon_entropy(&joined_hash_text(&hashes));
        points.push(DepthSweepPoint {
            depth,
            fractal_entropy,
            entropy_preservation: preservation(fractal_entropy, original_entropy),
        });
    }
    Ok(DepthSweep {
        original_entropy,
        symbolic_entropy,
        points,
    })
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
