//! Core types for QCGen
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Index aliases and the small validated wrappers shared by the
//! normalizer, the dispatch table, and the assembler.

use crate::error::{QcgenError, QcgenResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Index into register `q`
/// Gantree: QubitId // 큐비트 인덱스
pub type QubitId = usize;

/// Classical bit identifier (0-indexed, register `c`)
pub type ClbitId = usize;

/// Evaluated rotation angle, radians
/// Gantree: Angle // 회전 각도
pub type Angle = f64;

// ============================================================================
// Bitstring
// ============================================================================

/// Classical secret or message for oracle families, leftmost bit first
/// Gantree: Bitstring // 비트열 타입
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bitstring {
    bits: Vec<bool>,
}

impl Bitstring {
    /// Wrap bits as given
    pub fn new(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// Read a `0`/`1` string such as `"0110"`; surrounding whitespace is ignored
    pub fn parse(s: &str) -> QcgenResult<Self> {
        s.trim()
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(QcgenError::InvalidBitstring(s.to_string())),
            })
            .collect::<QcgenResult<Vec<bool>>>()
            .map(Self::new)
    }

    /// `1010...` of length `n`
    pub fn alternating(n: usize) -> Self {
        Self::new((0..n).map(|i| i % 2 == 0).collect())
    }

    /// Resize to `n`: zeros are prepended, or the leading bits dropped
    pub fn fit(&self, n: usize) -> Self {
        let len = self.bits.len();
        if len >= n {
            return Self::new(self.bits[len - n..].to_vec());
        }
        let mut bits = vec![false; n - len];
        bits.extend_from_slice(&self.bits);
        Self::new(bits)
    }

    /// Every bit flipped
    pub fn complement(&self) -> Self {
        Self::new(self.iter().map(|b| !b).collect())
    }

    /// Bit count
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// No bits
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Bit at `index`, counted from the left
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).copied()
    }

    /// Bits from the left
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: String = self.iter().map(|b| if b { '1' } else { '0' }).collect();
        f.write_str(&text)
    }
}

// ============================================================================
// Condition
// ============================================================================

/// Classical condition attached to a gate: `if(c[index]==value)`
///
/// Only the single classical register `c` exists; the comparison is made
/// against the whole register value. `index` records the bit the source
/// instruction named and must be in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// Classical bit named by the instruction
    pub index: ClbitId,
    /// Comparison value
    pub value: u64,
}

impl Condition {
    /// Create a new condition
    pub fn new(index: ClbitId, value: u64) -> Self {
        Self { index, value }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c[{}]=={}", self.index, self.value)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_read_leftmost_first() {
        let secret = Bitstring::parse(" 0110 ").unwrap();
        assert_eq!(secret.len(), 4);
        assert_eq!(secret.get(1), Some(true));
        assert_eq!(secret.get(3), Some(false));
        assert_eq!(secret.to_string(), "0110");
    }

    #[test]
    fn test_bitstring_invalid() {
        assert!(Bitstring::parse("01a1").is_err());
    }

    #[test]
    fn test_bitstring_fit() {
        let bs = Bitstring::parse("101").unwrap();
        assert_eq!(bs.fit(5).to_string(), "00101");
        assert_eq!(bs.fit(2).to_string(), "01");
        assert_eq!(bs.fit(3), bs);
    }

    #[test]
    fn test_bitstring_alternating() {
        assert_eq!(Bitstring::alternating(4).to_string(), "1010");
        assert_eq!(Bitstring::alternating(4).complement().to_string(), "0101");
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(Condition::new(2, 1).to_string(), "c[2]==1");
    }
}
