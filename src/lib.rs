//! Tachygraph: a reversible semantic-compression codec over symbol streams.
//!
//! This crate implements the tachygraph codec, providing:
//! - Overlapping-window chunking that folds text onto a bounded symbol alphabet.
//! - A value-keyed ontology tree linking each symbol to its final predecessor.
//! - Iterated SHA-256 "fractal" digests and a per-codex content fingerprint.
//! - A reversible pattern dictionary over symbol sequences whose accounting
//!   never reports a ratio below one.
//! - JSON artifact persistence with structural validation on every load.
//!
//! # Name Origin: "Tachygraph"
//!
//! Tachygraphy is the classical art of swift writing: the shorthand systems
//! Greek and Roman scribes used to keep pace with speech by substituting
//! compact strokes for recurring words. This codec works the same trade.
//! Recurring chunks collapse onto short symbols, and recurring symbol runs
//! collapse onto dictionary patterns, while the literal chunk ledger keeps
//! every stroke of the original recoverable.
//!
//! # References
//!
//! - Shannon, C. "A Mathematical Theory of Communication" (1948) – entropy measures
//! - Ziv, J., Lempel, A. "A universal algorithm for sequential data compression" (1977) – dictionary coding
//! - NIST FIPS 180-4, "Secure Hash Standard" (2015) – SHA-256
//!
//! # Example
//!
//! ```
//! use tachygraph::prelude::*;
//!
//! let codec = Tachygraph::new();
//! let artifact = codec.compress("the rain in spain stays mainly in the plain")?;
//! assert!(codec.verify(&artifact));
//! assert!(codec.stats(&artifact).compression_ratio >= 1.0);
//! assert_eq!(
//!     codec.reconstruct(&artifact),
//!     "the rain in spain stays mainly in the plain",
//! );
//! # Ok::<(), DigestError>(())
//! ```

pub mod artifact;
pub mod codex;
pub mod engine;
pub mod entropy;
pub mod fractal;
pub mod ontology;
pub mod pattern;
pub mod symbol;

pub use artifact::{ArtifactError, CompressedArtifact};
pub use codex::{Codex, CodexEntry, CodexSummary};
pub use engine::{
    ArtifactStats, CodecConfig, CodexStats, CombinedStats, DetailedAnalysis, Tachygraph,
};
pub use fractal::{DigestError, FractalHash};
pub use ontology::{OntologyNode, OntologyTree};
pub use pattern::{PatternDictionary, PatternId, Token};
pub use symbol::SymbolId;

/// Prelude for convenient usage.
pub mod prelude {
    pub use crate::artifact::{ArtifactError, CompressedArtifact};
    pub use crate::codex::{Codex, CodexEntry, CodexSummary};
    pub use crate::engine::{
        ArtifactStats, CodecConfig, CodexStats, CombinedStats, DetailedAnalysis, Tachygraph,
    };
    pub use crate::entropy::{
        depth_sweep, shannon_entropy, DepthSweep, DepthSweepPoint, EntropyReport,
        DEFAULT_SWEEP_DEPTHS,
    };
    pub use crate::fractal::{
        codex_fingerprint, fractal_hash, fractal_hash_sequence, DigestError, FractalHash,
    };
    pub use crate::ontology::{OntologyNode, OntologyTree};
    pub use crate::pattern::{
        count_occurrences, ExpandError, PatternAnalysis, PatternCompression, PatternCompressor,
        PatternDictionary, PatternId, PatternStats, Token,
    };
    pub use crate::symbol::{chunk_text, derive_symbol, extract, SymbolId};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    /// Round trip holds across representative inputs, degenerate ones included.
    #[test]
    fn round_trip_across_inputs() {
        let codec = Tachygraph::new();
        let repetitive = "the quick brown fox ".repeat(10);
        let texts = [
            "",
            "A",
            "AB",
            "Hello, World!",
            "こんにちは、世界。",
            repetitive.as_str(),
        ];
        for text in texts {
            let artifact = codec.compress(text).unwrap();
            assert!(codec.verify(&artifact), "verify failed for {:?}", text);
            assert_eq!(codec.reconstruct(&artifact), text);
            assert!(codec.stats(&artifact).compression_ratio >= 1.0);
        }
    }

    /// The pattern layer always expands back to the codex's symbol sequence.
    #[test]
    fn pattern_layer_is_reversible() {
        let codec = Tachygraph::new();
        let repetitive = "abcabcabc".repeat(8);
        for text in ["", "AB", "no repeats here!", repetitive.as_str()] {
            let artifact = codec.compress(text).unwrap();
            let expanded = artifact
                .pattern_dictionary
                .expand(&artifact.compressed_sequence)
                .unwrap();
            assert_eq!(expanded, artifact.codex.symbol_sequence());
        }
    }

    /// Same text, same config: identical artifacts. Different text: different
    /// fingerprints.
    #[test]
    fn fingerprints_are_deterministic() {
        let codec = Tachygraph::new();
        let first = codec.compress("tachygraphy is swift writing").unwrap();
        let second = codec.compress("tachygraphy is swift writing").unwrap();
        assert_eq!(first.codex.fingerprint(), second.codex.fingerprint());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        let other = codec.compress("stenography is narrow writing").unwrap();
        assert_ne!(first.codex.fingerprint(), other.codex.fingerprint());
    }

    /// Discovery never keeps more than the dictionary cap.
    #[test]
    fn dictionary_respects_the_cap() {
        let codec = Tachygraph::new();
        let text = "ab".repeat(200);
        let artifact = codec.compress(&text).unwrap();
        assert!(artifact.pattern_dictionary.len() <= crate::pattern::MAX_PATTERNS);
        assert!(codec.verify(&artifact));

        let (_, symbols) = extract(&text, 2, 10_000);
        let mut compressor = PatternCompressor::new(4, 3, 5);
        let discovered = compressor.discover(&symbols);
        assert_eq!(discovered.len(), crate::pattern::MAX_PATTERNS);
    }

    /// A two-scalar input yields exactly one chunk and reconstructs itself.
    #[test]
    fn minimal_window_input() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("AB").unwrap();
        assert_eq!(artifact.codex.len(), 1);
        assert_eq!(artifact.codex.chunk_at(0), Some("AB"));
        assert_eq!(
            artifact.codex.symbol_at(0),
            Some(derive_symbol("AB", 10_000))
        );
        assert_eq!(codec.reconstruct(&artifact), "AB");
    }

    /// Five repeats of a two-scalar phrase earn exactly one pattern under
    /// loosened thresholds. A length-three pattern cannot tile the
    /// period-two run, so single symbols separate its substitutions.
    #[test]
    fn repeated_alternation_earns_a_pattern() {
        let config = CodecConfig {
            min_pattern_length: 3,
            min_occurrences: 2,
            ..CodecConfig::default()
        };
        let codec = Tachygraph::with_config(config);
        let text = "AB".repeat(5);
        let artifact = codec.compress(&text).unwrap();
        assert_eq!(codec.stats(&artifact).pattern_count, 1);

        let symbols = artifact.codex.symbol_sequence();
        let id = PatternId::new(0);
        assert_eq!(artifact.pattern_dictionary.get(id), Some(&symbols[0..3]));
        assert_eq!(
            artifact.compressed_sequence,
            vec![
                Token::Pattern(id),
                Token::Symbol(symbols[3]),
                Token::Pattern(id),
                Token::Symbol(symbols[7]),
                Token::Symbol(symbols[8]),
            ]
        );
        assert!(codec.verify(&artifact));
        assert_eq!(codec.reconstruct(&artifact), text);
    }

    /// Artifacts survive the full save, load, verify, analyze cycle.
    #[test]
    fn persisted_artifact_lifecycle() {
        let codec = Tachygraph::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lifecycle.json");
        let text = "swift writing, swift reading, swift writing again";
        let artifact = codec.compress(text).unwrap();
        artifact.save_to_file(&path).unwrap();

        let loaded = CompressedArtifact::load_from_file(&path).unwrap();
        assert_eq!(loaded, artifact);
        assert!(codec.verify(&loaded));
        let analysis = codec.detailed_analysis(&loaded).unwrap();
        assert_eq!(analysis.depth_sweep.points.len(), 10);
        assert_eq!(analysis.stats, loaded.combined_stats);
    }

    /// The codex summary agrees with the statistics view.
    #[test]
    fn summary_agrees_with_stats() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("summary and stats must agree").unwrap();
        let summary = artifact.codex.summary();
        let stats = codec.stats(&artifact);
        assert_eq!(summary.symbol_count, stats.symbol_count);
        assert_eq!(summary.unique_symbols, stats.unique_symbols);
        assert_eq!(summary.tree_depth, stats.tree_depth);
        assert_eq!(summary.original_length, stats.original_size);
        assert!(summary
            .fingerprint
            .starts_with(&stats.fingerprint.to_hex()[..16]));
    }

    /// Every codex symbol has a node in the ontology tree.
    #[test]
    fn ontology_covers_the_symbol_sequence() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("every symbol gets a node").unwrap();
        let tree = artifact.codex.tree();
        for symbol in artifact.codex.symbol_sequence() {
            assert!(tree.contains(symbol));
        }
        assert_eq!(tree.node_count(), artifact.codex.unique_symbols());
    }
}
