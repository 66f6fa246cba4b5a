//! Dice types and the five-bucket dice array.
//!
//! Ironclaw pools only ever use five die sizes, so a pool is modelled as a
//! fixed vector of counts rather than a list of individual dice.

pub mod array;

pub use array::DiceArray;

use serde::{Deserialize, Serialize};

/// Number of die sizes a [`DiceArray`] tracks.
pub const BUCKETS: usize = 5;

/// One of the five die sizes, ordered from the largest bucket down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Die {
    /// Twelve-sided die, bucket 0.
    D12,
    /// Ten-sided die, bucket 1.
    D10,
    /// Eight-sided die, bucket 2.
    D8,
    /// Six-sided die, bucket 3.
    D6,
    /// Four-sided die, bucket 4.
    D4,
}

impl Die {
    /// All dice in bucket order.
    pub const ALL: [Die; BUCKETS] = [Die::D12, Die::D10, Die::D8, Die::D6, Die::D4];

    /// Returns the number of sides on this die.
    pub fn sides(self) -> u32 {
        match self {
            Self::D12 => 12,
            Self::D10 => 10,
            Self::D8 => 8,
            Self::D6 => 6,
            Self::D4 => 4,
        }
    }

    /// Bucket index of this die inside a [`DiceArray`].
    pub fn index(self) -> usize {
        match self {
            Self::D12 => 0,
            Self::D10 => 1,
            Self::D8 => 2,
            Self::D6 => 3,
            Self::D4 => 4,
        }
    }

    /// The die stored at the given bucket index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The die with exactly this many sides.
    pub fn from_sides(sides: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.sides() == sides)
    }

    /// The largest die whose face does not exceed `face`, bottoming out at d4.
    pub fn at_most(face: u32) -> Self {
        Self::ALL
            .into_iter()
            .find(|d| d.sides() <= face)
            .unwrap_or(Self::D4)
    }

    /// Parse a die from a string like "d8" or "D12".
    pub fn from_str_tag(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let sides = s.strip_prefix('d')?.parse::<u32>().ok()?;
        Self::from_sides(sides)
    }
}

impl std::fmt::Display for Die {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn die_sides_and_index() {
        assert_eq!(Die::D12.sides(), 12);
        assert_eq!(Die::D4.sides(), 4);
        assert_eq!(Die::D12.index(), 0);
        assert_eq!(Die::D8.index(), 2);
        assert_eq!(Die::D4.index(), 4);
    }

    #[test]
    fn die_lookup() {
        assert_eq!(Die::from_index(3), Some(Die::D6));
        assert_eq!(Die::from_index(5), None);
        assert_eq!(Die::from_sides(10), Some(Die::D10));
        assert_eq!(Die::from_sides(20), None);
    }

    #[test]
    fn die_at_most() {
        assert_eq!(Die::at_most(12), Die::D12);
        assert_eq!(Die::at_most(9), Die::D8);
        assert_eq!(Die::at_most(100), Die::D12);
        assert_eq!(Die::at_most(2), Die::D4);
    }

    #[test]
    fn die_from_str() {
        assert_eq!(Die::from_str_tag("d8"), Some(Die::D8));
        assert_eq!(Die::from_str_tag(" D12 "), Some(Die::D12));
        assert_eq!(Die::from_str_tag("d20"), None);
        assert_eq!(Die::from_str_tag("eight"), None);
    }

    #[test]
    fn die_display() {
        assert_eq!(Die::D10.to_string(), "d10");
    }
}
