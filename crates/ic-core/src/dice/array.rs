//! The five-bucket dice array and its arithmetic.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::{BUCKETS, Die};

/// Counts of d12, d10, d8, d6 and d4, in that order.
///
/// Ordering is lexicographic from the d12 bucket down, so the array whose
/// largest occupied bucket is bigger always compares greater, with ties broken
/// by the count in that bucket and then by the next bucket down.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct DiceArray([u32; BUCKETS]);

impl DiceArray {
    /// The empty array.
    pub const EMPTY: DiceArray = DiceArray([0; BUCKETS]);

    /// Build an array from raw bucket counts.
    pub fn new(counts: [u32; BUCKETS]) -> Self {
        Self(counts)
    }

    /// An array holding `count` dice of a single size.
    pub fn of(count: u32, die: Die) -> Self {
        let mut counts = [0; BUCKETS];
        counts[die.index()] = count;
        Self(counts)
    }

    /// Raw bucket counts.
    pub fn counts(&self) -> [u32; BUCKETS] {
        self.0
    }

    /// Count of dice of the given size.
    pub fn count(&self, die: Die) -> u32 {
        self.0[die.index()]
    }

    /// Total number of dice across all buckets.
    pub fn total_dice(&self) -> u32 {
        self.0.iter().fold(0, |acc, &c| acc.saturating_add(c))
    }

    /// Returns true if no bucket holds any dice.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Parse a comma separated dice string such as `"2d8, d6"`.
    ///
    /// Terms that cannot be read are skipped with a warning, so the result is
    /// always a valid (possibly empty) array.
    pub fn parse(text: &str) -> Self {
        let mut result = Self::EMPTY;
        for term in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match Self::parse_single(term) {
                Some((count, die)) => result += Self::of(count, die),
                None => tracing::warn!(term, input = text, "skipping unreadable dice term"),
            }
        }
        result
    }

    /// Parse one dice term (`"3d6"`, `"d12"`) into its count and die.
    pub fn parse_single(term: &str) -> Option<(u32, Die)> {
        let term = term.trim().to_lowercase();
        let (count, sides) = term.split_once('d')?;
        let count = match count.trim() {
            "" => 1,
            n => n.parse().ok()?,
        };
        let die = Die::from_sides(sides.trim().parse().ok()?)?;
        Some((count, die))
    }

    /// Format the array as a dice string.
    ///
    /// The short form drops a count of one (`"2d8, d6"`), the long form keeps
    /// it (`"2d8, 1d6"`). An empty array formats as an empty string.
    pub fn format(&self, short: bool) -> String {
        Die::ALL
            .into_iter()
            .filter_map(|die| match self.count(die) {
                0 => None,
                1 if short => Some(die.to_string()),
                n => Some(format!("{n}{die}")),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Compare two arrays by strength. `Less` means `self` is the weaker pool.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }

    /// The largest die present, if any.
    pub fn max_die(&self) -> Option<Die> {
        self.leading().map(|(_, die)| die)
    }

    /// Face size of the largest die present, or -1 when empty.
    pub fn max_value(&self) -> i32 {
        self.max_die().map_or(-1, |d| d.sides() as i32)
    }

    /// Count and size of the largest occupied bucket.
    pub fn leading(&self) -> Option<(u32, Die)> {
        Die::ALL
            .into_iter()
            .find(|&d| self.count(d) > 0)
            .map(|d| (self.count(d), d))
    }

    /// Count and size when exactly one bucket is occupied.
    pub fn single(&self) -> Option<(u32, Die)> {
        let mut occupied = Die::ALL.into_iter().filter(|&d| self.count(d) > 0);
        let die = occupied.next()?;
        match occupied.next() {
            Some(_) => None,
            None => Some((self.count(die), die)),
        }
    }

    /// Collapse every die larger than `limit` into the `limit` bucket.
    pub fn enforce_limit(&self, limit: Die) -> Self {
        let cut = limit.index();
        let mut counts = self.0;
        let moved = counts[..cut]
            .iter()
            .fold(0u32, |acc, &c| acc.saturating_add(c));
        counts[..cut].iter_mut().for_each(|c| *c = 0);
        counts[cut] = counts[cut].saturating_add(moved);
        Self(counts)
    }

    /// Promote every die `steps` sizes up, saturating at d12.
    pub fn upgrade(&self, steps: u32) -> Self {
        let mut counts = [0u32; BUCKETS];
        for (index, &count) in self.0.iter().enumerate() {
            let target = index.saturating_sub(steps as usize);
            counts[target] = counts[target].saturating_add(count);
        }
        Self(counts)
    }

    /// Convert skill marks into dice.
    ///
    /// Every five marks is a d12; a non-zero remainder `r` adds one die at
    /// bucket `5 - r` (one mark is a d4, four marks a d10).
    pub fn from_marks(marks: u32) -> Self {
        let mut counts = [0; BUCKETS];
        counts[0] = marks / 5;
        let remainder = (marks % 5) as usize;
        if remainder > 0 {
            counts[BUCKETS - remainder] += 1;
        }
        Self(counts)
    }
}

impl Add for DiceArray {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        let mut counts = self.0;
        for (c, r) in counts.iter_mut().zip(rhs.0) {
            *c = c.saturating_add(r);
        }
        Self(counts)
    }
}

impl AddAssign for DiceArray {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for DiceArray {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::EMPTY, Add::add)
    }
}

impl<'a> std::iter::Sum<&'a DiceArray> for DiceArray {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl From<String> for DiceArray {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<DiceArray> for String {
    fn from(dice: DiceArray) -> Self {
        dice.format(true)
    }
}

impl std::fmt::Display for DiceArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format(true))
    }
}
