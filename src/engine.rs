//! Codec orchestration: configuration, compression, and statistics.
//!
//! [`Tachygraph`] wires the layers together. One `compress` call chunks
//! the input, links the ontology, derives digests and the content
//! fingerprint, and runs pattern compression over the same symbol
//! sequence, bundling everything into a self-contained
//! [`CompressedArtifact`]. The orchestrator holds configuration only;
//! each call builds its own pattern compressor, so calls never share
//! mutable state and a single instance can serve parallel callers.

use crate::artifact::CompressedArtifact;
use crate::codex::{Codex, CodexEntry};
use crate::entropy::{depth_sweep, DepthSweep, EntropyReport, DEFAULT_SWEEP_DEPTHS};
use crate::fractal::{codex_fingerprint, fractal_hash_sequence, DigestError, FractalHash};
use crate::ontology::OntologyTree;
use crate::pattern::{PatternAnalysis, PatternCompressor, PatternStats};
use crate::symbol::extract;
use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Knobs for one compression run.
///
/// The defaults suit prose-length inputs; short or highly repetitive
/// inputs usually want a lower `min_space_saved`. The discovery-wide
/// caps (pattern count, candidate length) are constants of the pattern
/// layer, not knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Width of the overlapping chunk window, in Unicode scalars.
    pub window_width: usize,
    /// Symbol alphabet size; derived symbols fall in `0..symbol_range`.
    pub symbol_range: u32,
    /// Fold depth for fractal digests. Zero fails at compress time.
    pub hash_depth: u32,
    /// Shortest subsequence pattern discovery will consider.
    pub min_pattern_length: usize,
    /// Fewest sliding-window occurrences a candidate needs.
    pub min_occurrences: usize,
    /// Smallest estimated slot saving a candidate needs.
    pub min_space_saved: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            window_width: 2,
            symbol_range: 10_000,
            hash_depth: 4,
            min_pattern_length: 4,
            min_occurrences: 3,
            min_space_saved: 5,
        }
    }
}

// ----------------------------------------------------------------------------
// Statistics
// ----------------------------------------------------------------------------

/// Size accounting for the codex layer of one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodexStats {
    /// Input length in Unicode scalars.
    pub original_size: usize,
    /// Number of codex rows.
    pub codex_size: usize,
    /// Scalars per row; one for an empty codex.
    pub compression_ratio: f64,
    /// Scalars saved against the row count.
    pub space_saved: usize,
    /// Saved fraction of the input as a percentage.
    pub compression_percentage: f64,
    /// Total symbol occurrences, equal to the row count.
    pub symbol_count: usize,
    /// Distinct symbol values.
    pub unique_symbols: usize,
    /// Deepest ontology node.
    pub tree_depth: usize,
    /// Content fingerprint of the codex.
    pub fingerprint: FractalHash,
}

/// Accounting across both codec layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedStats {
    /// Codex-layer accounting.
    pub codex: CodexStats,
    /// Pattern-layer accounting.
    pub patterns: PatternStats,
    /// Input scalars over final compressed slots; one on empty output.
    pub overall_compression_ratio: f64,
    /// Input scalars saved against the final compressed slots.
    pub total_space_saved: usize,
    /// Patterns kept in the dictionary.
    pub pattern_count: usize,
}

/// The flat per-artifact statistics view handed to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactStats {
    pub original_size: usize,
    pub symbol_count: usize,
    pub unique_symbols: usize,
    pub compression_ratio: f64,
    pub space_saved: usize,
    pub pattern_count: usize,
    pub tree_depth: usize,
    pub fingerprint: FractalHash,
}

/// Deep-dive view of one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    /// Realized shape of every kept pattern.
    pub patterns: Vec<PatternAnalysis>,
    /// Entropy of the three codec layers.
    pub entropy: EntropyReport,
    /// Digest entropy across the default depth range.
    pub depth_sweep: DepthSweep,
    /// The artifact's combined accounting.
    pub stats: CombinedStats,
}

fn combine_stats(original_size: usize, codex: &Codex, patterns: &PatternStats) -> CombinedStats {
    let codex_size = codex.len();
    let space_saved = original_size.saturating_sub(codex_size);
    let compression_percentage = if original_size == 0 {
        0.0
    } else {
        space_saved as f64 / original_size as f64 * 100.0
    };
    let codex_stats = CodexStats {
        original_size,
        codex_size,
        compression_ratio: codex.compression_ratio(),
        space_saved,
        compression_percentage,
        symbol_count: codex.len(),
        unique_symbols: codex.unique_symbols(),
        tree_depth: codex.tree().max_depth(),
        fingerprint: codex.fingerprint(),
    };
    let overall_compression_ratio = if patterns.compressed_size == 0 {
        1.0
    } else {
        original_size as f64 / patterns.compressed_size as f64
    };
    CombinedStats {
        codex: codex_stats,
        overall_compression_ratio,
        total_space_saved: original_size.saturating_sub(patterns.compressed_size),
        pattern_count: patterns.pattern_count,
        patterns: patterns.clone(),
    }
}

// ----------------------------------------------------------------------------
// Orchestrator
// ----------------------------------------------------------------------------

/// The codec orchestrator.
#[derive(Debug, Clone, Default)]
pub struct Tachygraph {
    config: CodecConfig,
}

impl Tachygraph {
    /// Creates an orchestrator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an orchestrator with the given configuration.
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Compresses one input into a self-contained artifact.
    ///
    /// Builds the codex (chunks, ontology, digests, fingerprint) and,
    /// independently, the pattern layer over the same symbol sequence.
    /// Inputs shorter than the window yield an empty codex; the artifact
    /// still round-trips because it carries the original text.
    pub fn compress(&self, text: &str) -> Result<CompressedArtifact, DigestError> {
        let original_size = text.chars().count();
        let (chunks, symbols) = extract(text, self.config.window_width, self.config.symbol_range);
        let tree = OntologyTree::link(&symbols);
        let hashes = fractal_hash_sequence(&symbols, self.config.hash_depth)?;
        let fingerprint = codex_fingerprint(&symbols, &hashes);

        let entries: Vec<CodexEntry> = chunks
            .into_iter()
            .zip(symbols.iter().zip(&hashes))
            .enumerate()
            .map(|(index, (chunk, (&symbol, &fractal_hash)))| CodexEntry {
                index,
                chunk,
                symbol,
                fractal_hash,
                tree_depth: tree.depth(symbol),
            })
            .collect();
        let codex_ratio = if entries.is_empty() {
            1.0
        } else {
            original_size as f64 / entries.len() as f64
        };
        let codex = Codex::new(entries, tree, fingerprint, codex_ratio);

        let mut compressor = PatternCompressor::new(
            self.config.min_pattern_length,
            self.config.min_occurrences,
            self.config.min_space_saved,
        );
        let run = compressor.compress(&symbols);

        let combined_stats = combine_stats(original_size, &codex, &run.stats);
        Ok(CompressedArtifact {
            original_data: text.to_string(),
            codex,
            pattern_dictionary: run.dictionary,
            compressed_sequence: run.compressed,
            combined_stats,
        })
    }

    /// Rebuilds the original text from an artifact's chunk ledger.
    pub fn reconstruct(&self, artifact: &CompressedArtifact) -> String {
        artifact.reconstruct_text()
    }

    /// Checks an artifact end to end.
    ///
    /// The pattern layer must expand back to the codex's symbol sequence
    /// and the chunk ledger must rebuild the stored original text. A
    /// failure here is a codec defect, not a recoverable condition.
    pub fn verify(&self, artifact: &CompressedArtifact) -> bool {
        let expanded = match artifact
            .pattern_dictionary
            .expand(&artifact.compressed_sequence)
        {
            Ok(expanded) => expanded,
            Err(_) => return false,
        };
        expanded == artifact.codex.symbol_sequence()
            && artifact.reconstruct_text() == artifact.original_data
    }

    /// The flat statistics view of an artifact.
    pub fn stats(&self, artifact: &CompressedArtifact) -> ArtifactStats {
        let combined = &artifact.combined_stats;
        ArtifactStats {
            original_size: combined.codex.original_size,
            symbol_count: combined.codex.symbol_count,
            unique_symbols: combined.codex.unique_symbols,
            compression_ratio: combined.overall_compression_ratio,
            space_saved: combined.total_space_saved,
            pattern_count: combined.pattern_count,
            tree_depth: combined.codex.tree_depth,
            fingerprint: combined.codex.fingerprint,
        }
    }

    /// Compresses many inputs independently; the first failure aborts.
    pub fn batch_compress<I, S>(&self, texts: I) -> Result<Vec<CompressedArtifact>, DigestError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        texts
            .into_iter()
            .map(|text| self.compress(text.as_ref()))
            .collect()
    }

    /// Builds the deep-dive view of an artifact.
    ///
    /// Pattern shapes and entropy are re-derived from the artifact's own
    /// sequences; the digest layer is swept across the default depth
    /// range.
    pub fn detailed_analysis(
        &self,
        artifact: &CompressedArtifact,
    ) -> Result<DetailedAnalysis, DigestError> {
        let symbols = artifact.codex.symbol_sequence();
        let patterns = artifact.pattern_dictionary.analyze(&symbols);
        let report = EntropyReport::measure(&artifact.original_data, &artifact.codex);
        let sweep = depth_sweep(&artifact.original_data, &symbols, DEFAULT_SWEEP_DEPTHS)?;
        Ok(DetailedAnalysis {
            patterns,
            entropy: report,
            depth_sweep: sweep,
            stats: artifact.combined_stats.clone(),
        })
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{PatternId, Token};

    #[test]
    fn round_trip_plain_text() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("Hello, World!").unwrap();
        assert_eq!(codec.reconstruct(&artifact), "Hello, World!");
        assert!(codec.verify(&artifact));
    }

    #[test]
    fn repetitive_text_earns_patterns() {
        let codec = Tachygraph::new();
        let text = "the quick brown fox ".repeat(10);
        let artifact = codec.compress(&text).unwrap();
        assert!(codec.verify(&artifact));
        let stats = codec.stats(&artifact);
        assert_eq!(stats.original_size, 200);
        assert!(stats.pattern_count >= 1);
        assert!(stats.compression_ratio > 1.0);
        assert!(stats.space_saved > 0);
    }

    #[test]
    fn empty_input_round_trips() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("").unwrap();
        assert!(artifact.codex.is_empty());
        assert_eq!(codec.reconstruct(&artifact), "");
        assert!(codec.verify(&artifact));
        let stats = codec.stats(&artifact);
        assert_eq!(stats.compression_ratio, 1.0);
        assert_eq!(stats.pattern_count, 0);
    }

    #[test]
    fn sub_window_input_round_trips() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("A").unwrap();
        assert!(artifact.codex.is_empty());
        assert_eq!(codec.reconstruct(&artifact), "A");
        assert!(codec.verify(&artifact));
        assert_eq!(codec.stats(&artifact).compression_ratio, 1.0);
    }

    #[test]
    fn two_scalar_input_yields_one_row() {
        let codec = Tachygraph::new();
        let artifact = codec.compress("AB").unwrap();
        assert_eq!(artifact.codex.len(), 1);
        assert_eq!(artifact.codex.chunk_at(0), Some("AB"));
        assert_eq!(codec.reconstruct(&artifact), "AB");
        assert!(codec.verify(&artifact));
    }

    #[test]
    fn unicode_round_trips() {
        let codec = Tachygraph::new();
        let text = "こんにちは、世界。ここはこんにちは。";
        let artifact = codec.compress(text).unwrap();
        assert_eq!(codec.reconstruct(&artifact), text);
        assert!(codec.verify(&artifact));
    }

    #[test]
    fn wider_window_round_trips() {
        let config = CodecConfig {
            window_width: 3,
            ..CodecConfig::default()
        };
        let codec = Tachygraph::with_config(config);
        let artifact = codec.compress("abcdefghij").unwrap();
        assert_eq!(artifact.codex.len(), 8);
        assert!(codec.verify(&artifact));
    }

    #[test]
    fn ratio_never_falls_below_unit() {
        let codec = Tachygraph::new();
        let long = "xy".repeat(40);
        for text in ["", "A", "AB", "ABAB", "mixed content 123", long.as_str()] {
            let artifact = codec.compress(text).unwrap();
            let stats = codec.stats(&artifact);
            assert!(stats.compression_ratio >= 1.0, "text {:?}", text);
        }
    }

    #[test]
    fn artifacts_are_deterministic() {
        let codec = Tachygraph::new();
        let text = "deterministic input, deterministic output";
        let first = codec.compress(text).unwrap();
        let second = codec.compress(text).unwrap();
        assert_eq!(first.codex.fingerprint(), second.codex.fingerprint());
        assert_eq!(first, second);
        let first_json = serde_json::to_string(&first).unwrap();
        let second_json = serde_json::to_string(&second).unwrap();
        assert_eq!(first_json, second_json);
    }

    #[test]
    fn distinct_inputs_get_distinct_fingerprints() {
        let codec = Tachygraph::new();
        let first = codec.compress("first input text").unwrap();
        let second = codec.compress("a rather longer second input text").unwrap();
        assert_ne!(first.codex.fingerprint(), second.codex.fingerprint());
    }

    #[test]
    fn zero_depth_config_fails() {
        let config = CodecConfig {
            hash_depth: 0,
            ..CodecConfig::default()
        };
        let codec = Tachygraph::with_config(config);
        assert!(codec.compress("AB").is_err());
    }

    #[test]
    fn batch_compresses_each_input() {
        let codec = Tachygraph::new();
        let artifacts = codec.batch_compress(["one", "two two two", ""]).unwrap();
        assert_eq!(artifacts.len(), 3);
        for artifact in &artifacts {
            assert!(codec.verify(artifact));
        }
    }

    #[test]
    fn batch_aborts_on_first_failure() {
        let config = CodecConfig {
            hash_depth: 0,
            ..CodecConfig::default()
        };
        let codec = Tachygraph::with_config(config);
        // The empty input hashes nothing and would succeed alone.
        assert!(codec.batch_compress(["", "AB"]).is_err());
    }

    #[test]
    fn repeated_three_symbol_block_substitutes_both_runs() {
        let config = CodecConfig {
            min_pattern_length: 3,
            min_occurrences: 2,
            min_space_saved: 1,
            ..CodecConfig::default()
        };
        let codec = Tachygraph::with_config(config);
        // Chunks repeat as [a,b,c,a,b,c,d,e] over the symbol alphabet.
        let artifact = codec.compress("ABCABCADE").unwrap();

        let symbols = artifact.codex.symbol_sequence();
        assert_eq!(symbols.len(), 8);
        assert_eq!(artifact.pattern_dictionary.len(), 1);
        let id = PatternId::new(0);
        assert_eq!(artifact.pattern_dictionary.get(id), Some(&symbols[0..3]));
        assert_eq!(
            artifact.compressed_sequence,
            vec![
                Token::Pattern(id),
                Token::Pattern(id),
                Token::Symbol(symbols[6]),
                Token::Symbol(symbols[7]),
            ]
        );
        let expanded = artifact
            .pattern_dictionary
            .expand(&artifact.compressed_sequence)
            .unwrap();
        assert_eq!(expanded, symbols);
        assert!(codec.verify(&artifact));
    }

    #[test]
    fn pattern_ids_start_fresh_per_call() {
        let codec = Tachygraph::new();
        let text = "the quick brown fox ".repeat(10);
        let first = codec.compress(&text).unwrap();
        let second = codec.compress(&text).unwrap();
        assert!(first.pattern_dictionary.contains(PatternId::new(0)));
        assert!(second.pattern_dictionary.contains(PatternId::new(0)));
    }

    #[test]
    fn detailed_analysis_bundles_all_views() {
        let codec = Tachygraph::new();
        let text = "analysis target text, analysis target text, analysis target";
        let artifact = codec.compress(text).unwrap();
        let analysis = codec.detailed_analysis(&artifact).unwrap();
        assert_eq!(analysis.depth_sweep.points.len(), 10);
        assert_eq!(analysis.patterns.len(), artifact.pattern_dictionary.len());
        assert_eq!(analysis.stats, artifact.combined_stats);
        assert!(analysis.entropy.original_entropy > 0.0);
    }
}
