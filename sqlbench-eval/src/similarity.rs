//! Ratcliff/Obershelp sequence similarity.
//!
//! Finds the longest common substring, then recurses on the unmatched
//! pieces to its left and right. The similarity ratio is `2*M / T`, with `M`
//! the total length of all matched blocks and `T` the combined length of
//! both inputs.
//!
//! Comparison is over Unicode scalar values, not bytes.

use std::collections::HashMap;

/// Minimum length of the second sequence before popular elements are
/// excluded from seeding matches.
const POPULAR_MIN_LEN: usize = 200;

/// A matched block: `a[a_start..a_start + len] == b[b_start..b_start + len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub a_start: usize,
    pub b_start: usize,
    pub len: usize,
}

/// Similarity ratio of two strings in `[0, 1]`.
///
/// Two empty strings are identical and score `1.0`.
///
/// # Example
///
/// ```
/// use sqlbench_eval::similarity::ratio;
///
/// assert_eq!(ratio("sales", "sales"), 1.0);
/// assert_eq!(ratio("abcd", "bcde"), 0.75);
/// assert_eq!(ratio("abc", "xyz"), 0.0);
/// ```
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched: usize = Matcher::new(&a, &b).blocks().iter().map(|m| m.len).sum();
    2.0 * matched as f64 / total as f64
}

/// Matching blocks of two strings, in ascending order, with adjacent
/// blocks merged.
pub fn matching_blocks(a: &str, b: &str) -> Vec<Match> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    Matcher::new(&a, &b).blocks()
}

struct Matcher<'a> {
    a: &'a [char],
    b: &'a [char],
    /// Positions of each element in `b`, ascending; popular elements omitted
    b2j: HashMap<char, Vec<usize>>,
}

impl<'a> Matcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b2j.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b2j }
    }

    /// Longest matching block within `a[alo..ahi]` and `b[blo..bhi]`.
    ///
    /// Ties go to the block starting earliest in `a`, then earliest in `b`.
    fn longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> Match {
        let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);

        // j2len[j] = length of the match ending at a[i - 1] and b[j]
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut next: HashMap<usize, usize> = HashMap::new();
            if let Some(positions) = self.b2j.get(&self.a[i]) {
                for &j in positions {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let prev = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied();
                    let k = prev.unwrap_or(0) + 1;
                    next.insert(j, k);
                    if k > best_len {
                        best_i = i + 1 - k;
                        best_j = j + 1 - k;
                        best_len = k;
                    }
                }
            }
            j2len = next;
        }

        // Popular elements never seed a match but may extend one
        while best_i > alo && best_j > blo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_len += 1;
        }
        while best_i + best_len < ahi
            && best_j + best_len < bhi
            && self.a[best_i + best_len] == self.b[best_j + best_len]
        {
            best_len += 1;
        }

        Match {
            a_start: best_i,
            b_start: best_j,
            len: best_len,
        }
    }

    fn blocks(&self) -> Vec<Match> {
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];
        let mut found = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = pending.pop() {
            let m = self.longest_match(alo, ahi, blo, bhi);
            if m.len == 0 {
                continue;
            }
            if alo < m.a_start && blo < m.b_start {
                pending.push((alo, m.a_start, blo, m.b_start));
            }
            if m.a_start + m.len < ahi && m.b_start + m.len < bhi {
                pending.push((m.a_start + m.len, ahi, m.b_start + m.len, bhi));
            }
            found.push(m);
        }

        found.sort_by_key(|m| (m.a_start, m.b_start));

        let mut merged: Vec<Match> = Vec::with_capacity(found.len());
        for m in found {
            match merged.last_mut() {
                Some(last)
                    if last.a_start + last.len == m.a_start
                        && last.b_start + last.len == m.b_start =>
                {
                    last.len += m.len;
                }
                _ => merged.push(m),
            }
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[rstest]
    #[case::identical("arno kumaresan", "arno kumaresan", 1.0)]
    #[case::both_empty("", "", 1.0)]
    #[case::one_empty("", "sales", 0.0)]
    #[case::disjoint("wrong", "manton leuchs", 2.0 * 2.0 / 18.0)]
    #[case::shifted("abcd", "bcde", 0.75)]
    #[case::digits("401", "410", 2.0 * 2.0 / 6.0)]
    #[case::prefix("sales", "sales dept", 2.0 * 5.0 / 15.0)]
    #[case::unicode("café", "cafe", 0.75)]
    fn test_ratio(#[case] a: &str, #[case] b: &str, #[case] expected: f64) {
        let got = ratio(a, b);
        assert!(approx(got, expected), "ratio({a:?}, {b:?}) = {got}, expected {expected}");
    }

    #[test]
    fn test_ratio_is_bounded() {
        let pairs = [
            ("development", "developer"),
            ("39265", "39,265"),
            ("dietrich journel", "journel, dietrich"),
            ("x", "xxxxxxxxxxxxxxxx"),
        ];
        for (a, b) in pairs {
            let r = ratio(a, b);
            assert!((0.0..=1.0).contains(&r), "{a:?} vs {b:?}: {r}");
        }
    }

    #[test]
    fn test_matching_blocks_recurses_both_sides() {
        // "abxcd" vs "abcd": longest is "ab", then "cd" on the right
        let blocks = matching_blocks("abxcd", "abcd");
        assert_eq!(
            blocks,
            vec![
                Match { a_start: 0, b_start: 0, len: 2 },
                Match { a_start: 3, b_start: 2, len: 2 },
            ]
        );
    }

    #[test]
    fn test_matching_blocks_prefers_earliest_longest() {
        // "ab" occurs twice in b; the first occurrence wins
        let blocks = matching_blocks("ab", "abab");
        assert_eq!(blocks, vec![Match { a_start: 0, b_start: 0, len: 2 }]);
    }

    #[test]
    fn test_matching_blocks_does_not_cross() {
        // Once "bc" is matched, "a" (after it in b) cannot pair with "a" before it in a
        let blocks = matching_blocks("abc", "bca");
        let total: usize = blocks.iter().map(|m| m.len).sum();
        assert_eq!(total, 2);
    }

    #[test]
    fn test_popular_elements_do_not_seed_matches() {
        // 'a' makes up all of b, so it is popular and cannot start a match
        let b = "a".repeat(200);
        assert_eq!(ratio("xa", &b), 0.0);

        // Below the length cutoff every element counts
        let b = "a".repeat(199);
        assert!(ratio("xa", &b) > 0.0);
    }

    #[test]
    fn test_popular_elements_extend_matches() {
        // 'x' seeds the match and the popular 'a's on either side extend it
        let b = format!("{}axa{}", "a".repeat(150), "b".repeat(100));
        let blocks = matching_blocks("axa", &b);
        assert_eq!(blocks, vec![Match { a_start: 0, b_start: 150, len: 3 }]);
    }
}
