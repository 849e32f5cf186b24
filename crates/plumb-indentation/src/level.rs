//! Acceptable indentation columns.

use std::collections::BTreeSet;
use std::fmt;

/// Set of columns a token may start at.
///
/// Strict levels accept exactly their members. Lenient levels also accept any
/// column at or right of the smallest member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndentLevel {
    levels: BTreeSet<usize>,
    strict: bool,
}

impl IndentLevel {
    #[must_use]
    pub fn new(column: usize) -> Self {
        Self {
            levels: BTreeSet::from([column]),
            strict: true,
        }
    }

    /// Every member of `base` shifted by every offset. Results left of column 0 are dropped.
    #[must_use]
    pub fn with_offsets(base: &Self, offsets: &[isize]) -> Self {
        let levels = base
            .levels
            .iter()
            .flat_map(|&level| {
                offsets
                    .iter()
                    .filter_map(move |&offset| level.checked_add_signed(offset))
            })
            .collect();
        Self {
            levels,
            strict: base.strict,
        }
    }

    /// Every member shifted right by `offset`.
    #[must_use]
    pub fn shifted(&self, offset: usize) -> Self {
        Self {
            levels: self.levels.iter().map(|level| level + offset).collect(),
            strict: self.strict,
        }
    }

    #[must_use]
    pub fn add_acceptable(&self, values: impl IntoIterator<Item = usize>) -> Self {
        let mut levels = self.levels.clone();
        levels.extend(values);
        Self {
            levels,
            strict: self.strict,
        }
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            levels: self.levels.union(&other.levels).copied().collect(),
            strict: self.strict && other.strict,
        }
    }

    /// Same members, accepting anything at or right of the first one.
    #[must_use]
    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }

    #[must_use]
    pub fn is_multi_level(&self) -> bool {
        self.levels.len() > 1
    }

    #[must_use]
    pub fn is_acceptable(&self, column: usize) -> bool {
        self.levels.contains(&column) || (!self.strict && column >= self.first())
    }

    /// `true` when the smallest member is right of `column`.
    #[must_use]
    pub fn is_greater_than(&self, column: usize) -> bool {
        self.first() > column
    }

    #[must_use]
    pub fn first(&self) -> usize {
        self.levels.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn last(&self) -> usize {
        self.levels.last().copied().unwrap_or_default()
    }

    /// Members in ascending order.
    pub fn values(&self) -> impl Iterator<Item = usize> + '_ {
        self.levels.iter().copied()
    }
}

impl fmt::Display for IndentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, level) in self.levels.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{level}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_offsets_drop_negative_columns() {
        let base = IndentLevel::new(2).add_acceptable([8]);
        let level = IndentLevel::with_offsets(&base, &[-4, 0, 4]);
        assert_eq!(level.values().collect::<Vec<_>>(), vec![2, 4, 6, 8, 12]);
    }

    #[test]
    fn strict_accepts_members_only() {
        let level = IndentLevel::new(8).add_acceptable([12]);
        assert!(level.is_acceptable(8));
        assert!(level.is_acceptable(12));
        assert!(!level.is_acceptable(10));
        assert!(!level.is_acceptable(16));
    }

    #[test]
    fn lenient_accepts_anything_past_first() {
        let level = IndentLevel::new(8).lenient();
        assert!(level.is_acceptable(8));
        assert!(level.is_acceptable(13));
        assert!(!level.is_acceptable(7));
    }

    #[test]
    fn greater_than_compares_smallest_member() {
        let level = IndentLevel::new(4).add_acceptable([12]);
        assert!(level.is_greater_than(3));
        assert!(!level.is_greater_than(4));
        assert_eq!(level.last(), 12);
    }

    #[test]
    fn displays_ascending() {
        let level = IndentLevel::new(24).add_acceptable([16, 20, 16]);
        assert!(level.is_multi_level());
        assert_eq!(level.to_string(), "16, 20, 24");
    }

    #[test]
    fn union_is_strict_only_when_both_are() {
        let strict = IndentLevel::new(4);
        let lenient = IndentLevel::new(8).lenient();
        assert!(!strict.union(&lenient).is_strict());
        assert!(strict.union(&strict.shifted(4)).is_strict());
    }
}
