//! # Query Distance
//!
//! Classic Levenshtein distance over Unicode scalar values: unit-cost
//! insertions, deletions and substitutions, case-sensitive.

/// Minimum number of single-character edits turning `a` into `b`.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // Keep the shorter string on the row axis.
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return long.len();
    }

    // Single-row DP: O(min(m, n)) memory.
    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr = vec![0; short.len() + 1];

    for (i, lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (prev[j + 1] + 1) // deletion
                .min(curr[j] + 1) // insertion
                .min(prev[j] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Returns `true` when `levenshtein(a, b) > threshold`.
///
/// The length difference is a lower bound on the distance, so queries of
/// very different lengths are rejected without running the DP.
#[inline]
pub fn exceeds(a: &str, b: &str, threshold: usize) -> bool {
    let (la, lb) = (a.chars().count(), b.chars().count());
    if la.abs_diff(lb) > threshold {
        return true;
    }
    levenshtein(a, b) > threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_strings() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_identical() {
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn test_kitten_sitting() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("sitting", "kitten"), 3);
    }

    #[test]
    fn test_single_edits() {
        assert_eq!(levenshtein("cat", "cats"), 1);
        assert_eq!(levenshtein("cat", "bat"), 1);
        assert_eq!(levenshtein("cart", "cat"), 1);
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(levenshtein("Shoes", "shoes"), 1);
    }

    #[test]
    fn test_counts_code_points_not_bytes() {
        // 'é' is two bytes in UTF-8 but one edit.
        assert_eq!(levenshtein("cafe", "café"), 1);
        assert_eq!(levenshtein("", "日本語"), 3);
        assert_eq!(levenshtein("日本語", "日本"), 1);
    }

    #[test]
    fn test_exceeds_matches_full_distance() {
        let pairs = [
            ("", "abc"),
            ("cat", "cats"),
            ("kitten", "sitting"),
            ("iphone", "iphone case"),
            ("tv", "television"),
        ];
        for (a, b) in pairs {
            for threshold in 0..5 {
                assert_eq!(
                    exceeds(a, b, threshold),
                    levenshtein(a, b) > threshold,
                    "{a:?} vs {b:?} at {threshold}"
                );
            }
        }
    }
}
