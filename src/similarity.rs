//! Fast string similarity calculation
//!
//! Edit-distance ratios used by the matching pipeline. Both functions return
//! a score in 0.0-1.0 and operate on chars, not bytes, so non-Latin language
//! packs score the same way English does.

/// Normalized similarity of two strings (similar to difflib.SequenceMatcher.ratio)
///
/// `2 * LCS / (len(a) + len(b))`, i.e. one minus the normalized insert/delete
/// distance.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    char_ratio(&a_chars, &b_chars)
}

/// Best `ratio` of the shorter string against any same-length window of the
/// longer one.
///
/// Windows hanging off either end of the longer string (shorter prefixes and
/// suffixes) are scored as well, so a phrase cut off at the start or end of
/// the text still scores.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return if long.is_empty() { 1.0 } else { 0.0 };
    }

    let n = short.len();
    let m = long.len();
    let mut best = 0.0_f64;

    // Full windows
    for start in 0..=(m - n) {
        let score = char_ratio(&short, &long[start..start + n]);
        if score > best {
            best = score;
            if best >= 1.0 {
                return 1.0;
            }
        }
    }

    // Partial windows at both ends
    for len in 1..n.min(m + 1) {
        let prefix = char_ratio(&short, &long[..len]);
        let suffix = char_ratio(&short, &long[m - len..]);
        best = best.max(prefix).max(suffix);
    }

    best
}

fn char_ratio(a: &[char], b: &[char]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let lcs_len = longest_common_subsequence(a, b);
    (2.0 * lcs_len as f64) / (a.len() + b.len()) as f64
}

/// Calculate length of longest common subsequence (LCS)
fn longest_common_subsequence(s1: &[char], s2: &[char]) -> usize {
    let m = s1.len();
    let n = s2.len();

    // Use dynamic programming with space optimization
    let mut prev = vec![0; n + 1];
    let mut curr = vec![0; n + 1];

    for i in 1..=m {
        for j in 1..=n {
            if s1[i - 1] == s2[j - 1] {
                curr[j] = prev[j - 1] + 1;
            } else {
                curr[j] = prev[j].max(curr[j - 1]);
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
