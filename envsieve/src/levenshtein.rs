//! Bounded Levenshtein distance used for typo suggestions.
//!
//! The distance is computed with a banded two-row dynamic program so that
//! time and space scale with `min(|a|, |b|) * cutoff` instead of `|a| * |b|`.
//! Distances are capped at the cutoff: the functions never report a value
//! larger than the cutoff, which is all the suggestion logic needs.

/// Sentinel for cells outside the computed band.
const INF: usize = usize::MAX;

/// Computes the Levenshtein distance between `lhs` and `rhs`, capped at
/// `cutoff`.
///
/// Returns `min(d, cutoff)` where `d` is the true edit distance. The band
/// around the diagonal is abandoned early when the strings cannot be within
/// the cutoff of each other. Operates on `char`s, so multibyte input is
/// handled per character rather than per byte.
///
/// # Examples
///
/// ```
/// use envsieve::levenshtein::distance;
///
/// assert_eq!(distance("kitten", "sitting", 10), 3);
/// assert_eq!(distance("Hello World", "HelloWorld", 1), 1);
/// assert_eq!(distance("completely", "different", 3), 3);
/// ```
#[must_use]
pub fn distance(lhs: &str, rhs: &str, cutoff: usize) -> usize {
    let mut lhs: Vec<char> = lhs.chars().collect();
    let mut rhs: Vec<char> = rhs.chars().collect();

    if lhs.is_empty() {
        return rhs.len().min(cutoff);
    }
    if rhs.is_empty() {
        return lhs.len().min(cutoff);
    }

    // The shorter string is the row dimension.
    if lhs.len() > rhs.len() {
        std::mem::swap(&mut lhs, &mut rhs);
    }
    let short_len = lhs.len();

    let mut prev = vec![INF; short_len + 1]; // Previous row of costs.
    let mut curr = vec![INF; short_len + 1]; // Current row of costs.

    // Seed the previous row; cells past the band boundary stay at INF so
    // they are ignored by the recurrence below.
    let boundary = short_len.min(cutoff) + 1;
    for (i, cell) in prev.iter_mut().enumerate().take(boundary) {
        *cell = i;
    }

    for (j, &long_ch) in rhs.iter().enumerate() {
        let j = j + 1;
        curr[0] = j;

        // Band of columns to compute for this row.
        let min = j.saturating_sub(cutoff).max(1);
        let max = short_len.min(j.saturating_add(cutoff));

        // The band slid off the table: the strings differ in length by more
        // than the cutoff.
        if min > max {
            return cutoff;
        }

        // Invalidate the cell left of the band's leftmost entry.
        if min > 1 {
            curr[min - 1] = INF;
        }

        for i in min..=max {
            curr[i] = if lhs[i - 1] == long_ch {
                prev[i - 1]
            } else {
                curr[i - 1].min(prev[i]).min(prev[i - 1]).saturating_add(1)
            };
        }

        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short_len].min(cutoff)
}

/// Returns `true` if the distance between `lhs` and `rhs` is strictly less
/// than `cutoff`.
///
/// # Examples
///
/// ```
/// use envsieve::levenshtein::is_distance_less_than;
///
/// assert!(is_distance_less_than("PATH", "PATHS", 2));
/// assert!(!is_distance_less_than("PATH", "HOME", 2));
/// ```
#[must_use]
pub fn is_distance_less_than(lhs: &str, rhs: &str, cutoff: usize) -> bool {
    distance(lhs, rhs, cutoff) < cutoff
}

/// Edit-distance cutoff used when searching for likely typos.
///
/// The default derives the cutoff from the length of the variable name being
/// searched for, keeping false-positive suggestions rare for short names.
///
/// # Examples
///
/// ```
/// use envsieve::Cutoff;
///
/// assert_eq!(Cutoff::Adaptive.for_name_len(3), 0);
/// assert_eq!(Cutoff::Adaptive.for_name_len(12), 3);
/// assert_eq!(Cutoff::Exact(5).for_name_len(12), 5);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cutoff {
    /// Derive the cutoff from the prefixed variable name's length:
    /// 0 for names up to 3 characters, 1 up to 6, 2 up to 9, 3 beyond.
    #[default]
    Adaptive,
    /// Use exactly this cutoff for every variable.
    Exact(usize),
}

impl Cutoff {
    /// Resolves the cutoff for a variable name of `len` characters.
    #[must_use]
    pub fn for_name_len(self, len: usize) -> usize {
        match self {
            Self::Exact(value) => value,
            Self::Adaptive => match len {
                0..=3 => 0,
                4..=6 => 1,
                7..=9 => 2,
                _ => 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_strings() {
        assert_eq!(distance("PREFIX_INT", "PREFIX_INT", 3), 0);
        assert_eq!(distance("", "", 5), 0);
    }

    #[test]
    fn test_known_distances() {
        assert_eq!(distance("kitten", "sitting", 10), 3);
        assert_eq!(distance("flaw", "lawn", 10), 2);
        assert_eq!(distance("abc", "abd", 10), 1);
    }

    #[test]
    fn test_cap_at_cutoff() {
        assert_eq!(distance("Hello World", "HelloWorld", 1), 1);
        assert_eq!(distance("Hello World", "HelloWorld", 2), 1);
        assert_eq!(distance("abcdefgh", "zyxwvuts", 3), 3);
    }

    #[test]
    fn test_empty_string_capped() {
        assert_eq!(distance("", "abcdef", 3), 3);
        assert_eq!(distance("abcdef", "", 10), 6);
    }

    #[test]
    fn test_length_difference_exceeds_cutoff() {
        // Band slides off the table immediately.
        assert_eq!(distance("ab", "abcdefghij", 2), 2);
    }

    #[test]
    fn test_cutoff_zero() {
        assert_eq!(distance("same", "same", 0), 0);
        assert_eq!(distance("same", "sane", 0), 0);
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(distance("grüße", "grüsse", 5), 2);
        assert_eq!(distance("日本語", "日本語", 2), 0);
        assert_eq!(distance("日本語", "日本誤", 2), 1);
    }

    #[test]
    fn test_is_distance_less_than() {
        assert!(is_distance_less_than("PATH", "PATHS", 2));
        assert!(!is_distance_less_than("PATH", "PATHS", 1));
        assert!(!is_distance_less_than("a", "a", 0));
    }

    #[test]
    fn test_adaptive_cutoff_tiers() {
        assert_eq!(Cutoff::Adaptive.for_name_len(0), 0);
        assert_eq!(Cutoff::Adaptive.for_name_len(3), 0);
        assert_eq!(Cutoff::Adaptive.for_name_len(4), 1);
        assert_eq!(Cutoff::Adaptive.for_name_len(6), 1);
        assert_eq!(Cutoff::Adaptive.for_name_len(7), 2);
        assert_eq!(Cutoff::Adaptive.for_name_len(9), 2);
        assert_eq!(Cutoff::Adaptive.for_name_len(10), 3);
        assert_eq!(Cutoff::Adaptive.for_name_len(100), 3);
    }

    #[test]
    fn test_exact_cutoff_ignores_length() {
        assert_eq!(Cutoff::Exact(7).for_name_len(2), 7);
        assert_eq!(Cutoff::Exact(0).for_name_len(50), 0);
    }
}
