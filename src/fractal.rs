//! Fractal hashing and codex fingerprinting.
//!
//! A fractal hash collapses a symbol string into attractor space by applying
//! SHA-256 repeatedly: round one hashes the symbol text, and every further
//! round hashes the lowercase-hex rendering of the previous digest. The fold
//! depth is a compression-time constant, so digests taken at different depths
//! are unrelated. The codex fingerprint hashes the joined symbol
//! and digest sequences once, under domain separation, to tag codex content.
//!
//! # Citations
//! - SHA-256: NIST FIPS 180-4 (2015)
//! - Iterated hash chains: Lamport, "Password authentication with insecure communication" (1981)
//! - Domain separation & length prefixing: Bernstein et al., "How to hash into elliptic curves" (2009)

use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

// ----------------------------------------------------------------------------
// Domain separation constants
// ----------------------------------------------------------------------------

/// Domain for the whole-codex content fingerprint (v0).
pub const DOMAIN_CODEX_FINGERPRINT_V0: &[u8] = b"CODEX_FINGERPRINT_V0";

/// Length of a digest rendered as lowercase hex.
pub const DIGEST_HEX_LEN: usize = 64;

// ----------------------------------------------------------------------------
// Digest type
// ----------------------------------------------------------------------------

/// A 256-bit fractal digest.
///
/// Wraps the raw bytes; the canonical external form is the 64-character
/// lowercase-hex string (`to_hex`), which is also the serde representation.
/// Constructing one from text with any other length fails with
/// [`DigestError`]; digests are never truncated or padded.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FractalHash([u8; 32]);

impl FractalHash {
    /// Creates a digest from a raw byte array.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw byte array.
    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Renders the canonical 64-character lowercase-hex form.
    pub fn to_hex(&self) -> String {
        use std::fmt::Write as _;
        let mut out = String::with_capacity(DIGEST_HEX_LEN);
        for byte in self.0 {
            let _ = write!(out, "{:02x}", byte);
        }
        out
    }

    /// Parses the canonical hex form, validating length and alphabet.
    pub fn parse(text: &str) -> Result<Self, DigestError> {
        if text.len() != DIGEST_HEX_LEN {
            return Err(DigestError::InvalidLength { got: text.len() });
        }
        let raw = text.as_bytes();
        let mut bytes = [0u8; 32];
        for (i, slot) in bytes.iter_mut().enumerate() {
            let hi = hex_value(raw[2 * i]).ok_or(DigestError::InvalidHex { offset: 2 * i })?;
            let lo =
                hex_value(raw[2 * i + 1]).ok_or(DigestError::InvalidHex { offset: 2 * i + 1 })?;
            *slot = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }

    /// Computes SHA-256 of the given data with domain separation.
    ///
    /// Input framing is `b"TG:" || domain || b":v0" || len(data) as u64 LE || data`,
    /// so digests taken under different domains never collide on equal payloads.
    pub fn hash_with_domain(domain: &[u8], data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        // Domain tag
        hasher.update(b"TG:");
        hasher.update(domain);
        hasher.update(b":v0");
        // Length prefix (64-bit little-endian)
        hasher.update((data.len() as u64).to_le_bytes());
        hasher.update(data);
        Self(hasher.finalize().into())
    }
}

impl fmt::Display for FractalHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Show first 4 bytes in hex for readability
        write!(
            f,
            "FractalHash({:02x}{:02x}{:02x}{:02x}…)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}

impl FromStr for FractalHash {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FractalHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for FractalHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

/// Error constructing a digest from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestError {
    /// Text is not exactly [`DIGEST_HEX_LEN`] characters long.
    InvalidLength { got: usize },
    /// Text contains a character outside lowercase hex.
    InvalidHex { offset: usize },
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DigestError::InvalidLength { got } => {
                write!(f, "digest must be {} hex characters, got {}", DIGEST_HEX_LEN, got)
            }
            DigestError::InvalidHex { offset } => {
                write!(f, "non-hex character at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for DigestError {}

// ----------------------------------------------------------------------------
// Fractal fold
// ----------------------------------------------------------------------------

/// Collapses a symbol string into fractal attractor space.
///
/// Applies the plain (untagged) SHA-256 fold `depth` times over hex strings.
/// A `depth` of zero leaves the input unhashed and therefore fails digest
/// construction with [`DigestError::InvalidLength`].
pub fn fractal_hash(symbol: &str, depth: u32) -> Result<FractalHash, DigestError> {
    let mut current = symbol.to_string();
    for _ in 0..depth {
        let digest: [u8; 32] = Sha256::digest(current.as_bytes()).into();
        current = FractalHash::from_bytes(digest).to_hex();
    }
    FractalHash::parse(&current)
}

/// Hashes every symbol occurrence of a sequence at the given depth.
///
/// Occurrences of one symbol value always share a digest, so the fold runs
/// once per unique symbol.
pub fn fractal_hash_sequence(
    symbols: &[SymbolId],
    depth: u32,
) -> Result<Vec<FractalHash>, DigestError> {
    let mut memo: FxHashMap<SymbolId, FractalHash> = FxHashMap::default();
    let mut out = Vec::with_capacity(symbols.len());
    for &symbol in symbols {
        let hash = match memo.get(&symbol) {
            Some(&hash) => hash,
            None => {
                let hash = fractal_hash(&symbol.to_string(), depth)?;
                memo.insert(symbol, hash);
                hash
            }
        };
        out.push(hash);
    }
    Ok(out)
}

// ----------------------------------------------------------------------------
// Codex fingerprint
// ----------------------------------------------------------------------------

/// Content fingerprint over a codex: all symbol ids concatenated, then all
/// fractal digests (hex form), hashed once under the codex domain.
///
/// Pure function of the two sequences: the same codex content yields the
/// same fingerprint regardless of when or where it was built. Never used for
/// reconstruction.
pub fn codex_fingerprint(symbols: &[SymbolId], hashes: &[FractalHash]) -> FractalHash {
    use std::fmt::Write as _;
    let mut payload = String::with_capacity(symbols.len() * 6 + hashes.len() * DIGEST_HEX_LEN);
    for symbol in symbols {
        let _ = write!(payload, "{}", symbol);
    }
    for hash in hashes {
        payload.push_str(&hash.to_hex());
    }
    FractalHash::hash_with_domain(DOMAIN_CODEX_FINGERPRINT_V0, payload.as_bytes())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolId;

    #[test]
    fn single_fold_matches_sha256() {
        let direct: [u8; 32] = Sha256::digest(b"S_0001").into();
        assert_eq!(fractal_hash("S_0001", 1).unwrap(), FractalHash::from_bytes(direct));
    }

    #[test]
    fn depth_changes_digest() {
        let d1 = fractal_hash("S_0042", 1).unwrap();
        let d4 = fractal_hash("S_0042", 4).unwrap();
        assert_ne!(d1, d4);
    }

    #[test]
    fn fold_is_deterministic() {
        assert_eq!(fractal_hash("S_0042", 4).unwrap(), fractal_hash("S_0042", 4).unwrap());
    }

    #[test]
    fn hex_round_trip() {
        let digest = fractal_hash("S_0007", 2).unwrap();
        let hex = digest.to_hex();
        assert_eq!(hex.len(), DIGEST_HEX_LEN);
        assert!(hex.bytes().all(|b| b.is_ascii_hexdigit()));
        assert_eq!(FractalHash::parse(&hex).unwrap(), digest);
    }

    #[test]
    fn zero_depth_is_rejected() {
        assert_eq!(fractal_hash("S_0001", 0), Err(DigestError::InvalidLength { got: 6 }));
    }

    #[test]
    fn parse_rejects_bad_text() {
        assert!(matches!(
            FractalHash::parse("abc"),
            Err(DigestError::InvalidLength { got: 3 })
        ));
        let not_hex = "g".repeat(DIGEST_HEX_LEN);
        assert!(matches!(
            FractalHash::parse(&not_hex),
            Err(DigestError::InvalidHex { offset: 0 })
        ));
    }

    #[test]
    fn sequence_memoizes_per_symbol() {
        let symbols = vec![SymbolId::new(3), SymbolId::new(9), SymbolId::new(3)];
        let hashes = fractal_hash_sequence(&symbols, 4).unwrap();
        assert_eq!(hashes.len(), 3);
        assert_eq!(hashes[0], hashes[2]);
        assert_ne!(hashes[0], hashes[1]);
    }

    #[test]
    fn fingerprint_depends_on_sequence_order() {
        let symbols = vec![SymbolId::new(1), SymbolId::new(2)];
        let swapped = vec![SymbolId::new(2), SymbolId::new(1)];
        let hashes = fractal_hash_sequence(&symbols, 2).unwrap();
        let swapped_hashes = fractal_hash_sequence(&swapped, 2).unwrap();
        assert_ne!(
            codex_fingerprint(&symbols, &hashes),
            codex_fingerprint(&swapped, &swapped_hashes)
        );
    }

    #[test]
    fn domains_do_not_collide() {
        let a = FractalHash::hash_with_domain(b"A", b"payload");
        let b = FractalHash::hash_with_domain(b"B", b"payload");
        assert_ne!(a, b);
    }

    #[test]
    fn serde_uses_hex_form() {
        let digest = fractal_hash("S_0001", 3).unwrap();
        let json = serde_json::to_string(&digest).unwrap();
        assert_eq!(json, format!("\"{}\"", digest.to_hex()));
        let back: FractalHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, digest);
    }
}
