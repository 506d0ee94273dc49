//! Damerau–Levenshtein edit distance (optimal string alignment variant).
//!
//! Counts single-character insertions, deletions, substitutions and swaps of
//! two adjacent characters. Characters are compared as raw `char` values with
//! no Unicode normalization.
//!
//! The full `(len(a) + 1) × (len(b) + 1)` table is kept in memory, so time and
//! space are both `O(len(a) · len(b))`. That is fine for short text fields but
//! long documents need a banded or linear-space variant.

/// Compute the edit distance between `a` and `b`.
///
/// ```
/// use pair_record::distance::damerau_levenshtein;
///
/// assert_eq!(damerau_levenshtein("ab", "ba"), 1);
/// assert_eq!(damerau_levenshtein("", "abc"), 3);
/// ```
pub fn damerau_levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let rows = a.len() + 1;
    let cols = b.len() + 1;
    if a.is_empty() || b.is_empty() {
        return a.len().max(b.len());
    }

    let mut table = vec![0usize; rows * cols];
    let at = |i: usize, j: usize| i * cols + j;
    for i in 0..rows {
        table[at(i, 0)] = i;
    }
    for j in 0..cols {
        table[at(0, j)] = j;
    }

    for i in 1..rows {
        for j in 1..cols {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (table[at(i - 1, j)] + 1) // delete
                .min(table[at(i, j - 1)] + 1) // insert
                .min(table[at(i - 1, j - 1)] + cost); // substitute
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(table[at(i - 2, j - 2)] + cost); // transpose
            }
            table[at(i, j)] = best;
        }
    }

    table[at(rows - 1, cols - 1)]
}
