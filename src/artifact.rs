//! The persisted artifact: JSON interchange record and loader checks.
//!
//! One artifact is the complete, self-contained output of a compression
//! run. Every decode path (string or file) runs the same structural
//! validation: each compressed token must be a symbol the codex saw or a
//! key of the pattern dictionary, the stored fingerprint must match one
//! recomputed from the codex columns, and the chunk ledger must rebuild
//! the stored original text. Digest length is enforced earlier, by the
//! digest type's own string decoding.

use crate::codex::Codex;
use crate::engine::CombinedStats;
use crate::fractal::{codex_fingerprint, FractalHash};
use crate::pattern::{PatternDictionary, PatternId, Token};
use crate::symbol::SymbolId;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

// ----------------------------------------------------------------------------
// Artifact
// ----------------------------------------------------------------------------

/// The full persisted unit of one compression run.
///
/// Everything needed to reconstruct, verify, and analyze the input
/// travels together: the original text, the codex ledger, the pattern
/// dictionary with its substituted sequence, and the combined
/// accounting. The JSON form keeps identifier newtypes in their
/// canonical string renderings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedArtifact {
    /// The input text, verbatim.
    pub original_data: String,
    /// The per-chunk ledger.
    pub codex: Codex,
    /// Patterns kept by the compression run.
    pub pattern_dictionary: PatternDictionary,
    /// The symbol sequence with pattern substitutions applied.
    pub compressed_sequence: Vec<Token>,
    /// Accounting across both layers.
    pub combined_stats: CombinedStats,
}

impl CompressedArtifact {
    /// Rebuilds the original text from the chunk ledger.
    ///
    /// Sub-window inputs leave the codex empty; those fall back to the
    /// stored original so every artifact round-trips.
    pub fn reconstruct_text(&self) -> String {
        if self.codex.is_empty() {
            self.original_data.clone()
        } else {
            self.codex.reconstruct()
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ArtifactError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decodes from JSON and validates the result.
    pub fn from_json(text: &str) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_str(text)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Writes the JSON form to a file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ArtifactError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Reads and validates an artifact from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ArtifactError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Structural checks applied on every decode path.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let symbols = self.codex.symbol_sequence();
        let known: FxHashSet<SymbolId> = symbols.iter().copied().collect();
        for token in &self.compressed_sequence {
            match token {
                Token::Symbol(symbol) => {
                    if !known.contains(symbol) {
                        return Err(ArtifactError::UnknownSymbol(*symbol));
                    }
                }
                Token::Pattern(id) => {
                    if !self.pattern_dictionary.contains(*id) {
                        return Err(ArtifactError::UnknownPattern(*id));
                    }
                }
            }
        }
        let computed = codex_fingerprint(&symbols, &self.codex.hash_sequence());
        if computed != self.codex.fingerprint() {
            return Err(ArtifactError::FingerprintMismatch {
                stored: self.codex.fingerprint(),
                computed,
            });
        }
        if self.reconstruct_text() != self.original_data {
            return Err(ArtifactError::ReconstructionMismatch);
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Errors
// ----------------------------------------------------------------------------

/// Error loading, saving, or validating an artifact.
#[derive(Debug)]
pub enum ArtifactError {
    /// File read or write failed.
    Io(io::Error),
    /// JSON encode or decode failed.
    Decode(serde_json::Error),
    /// The compressed sequence references a pattern with no entry.
    UnknownPattern(PatternId),
    /// The compressed sequence carries a symbol the codex never saw.
    UnknownSymbol(SymbolId),
    /// The stored fingerprint does not match the codex content.
    FingerprintMismatch {
        stored: FractalHash,
        computed: FractalHash,
    },
    /// The chunk ledger does not rebuild the stored original text.
    ReconstructionMismatch,
}

impl fmt::Display for ArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactError::Io(err) => write!(f, "artifact io failure: {}", err),
            ArtifactError::Decode(err) => write!(f, "artifact decode failure: {}", err),
            ArtifactError::UnknownPattern(id) => {
                write!(f, "compressed sequence references unknown pattern {}", id)
            }
            ArtifactError::UnknownSymbol(symbol) => {
                write!(f, "compressed sequence references unknown symbol {}", symbol)
            }
            ArtifactError::FingerprintMismatch { stored, computed } => write!(
                f,
                "stored fingerprint {} does not match recomputed {}",
                stored, computed
            ),
            ArtifactError::ReconstructionMismatch => {
                write!(f, "chunk ledger does not rebuild the stored original text")
            }
        }
    }
}

impl std::error::Error for ArtifactError {}

impl From<io::Error> for ArtifactError {
    fn from(err: io::Error) -> Self {
        ArtifactError::Io(err)
    }
}

impl From<serde_json::Error> for ArtifactError {
    fn from(err: serde_json::Error) -> Self {
        ArtifactError::Decode(err)
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
