// Ratcliff/Obershelp gestalt similarity, without difflib's junk heuristics

/// Similarity ratio in `[0, 1]`: `2 * M / (len(a) + len(b))`, where `M` is the
/// number of characters in the matching blocks. Two empty strings give 1.0.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    let matched = matched_chars(&a, &b);
    2.0 * matched as f64 / total as f64
}

/// Total length of all matching blocks between `a` and `b`.
pub fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, size) = longest_match(a, b, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            queue.push((i + size, ahi, j + size, bhi));
        }
    }

    matched
}

/// Longest common block in `a[alo..ahi]` x `b[blo..bhi]`. Ties resolve to the
/// earliest start in `a`, then the earliest start in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run[j] = length of the common block ending at a[i-1], b[j-1]
    let mut prev = vec![0usize; bhi - blo + 1];
    let mut curr = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let k = j - blo + 1;
            if a[i] == b[j] {
                curr[k] = prev[k - 1] + 1;
                if curr[k] > best_size {
                    best_i = i + 1 - curr[k];
                    best_j = j + 1 - curr[k];
                    best_size = curr[k];
                }
            } else {
                curr[k] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_identical_and_empty() {
        assert!(close(similarity_ratio("milk", "milk"), 1.0));
        assert!(close(similarity_ratio("", ""), 1.0));
        assert!(close(similarity_ratio("milk", ""), 0.0));
        assert!(close(similarity_ratio("abc", "xyz"), 0.0));
    }

    #[test]
    fn test_known_difflib_ratios() {
        // SequenceMatcher(None, "abcd", "bcde").ratio() == 0.75
        assert!(close(similarity_ratio("abcd", "bcde"), 0.75));
        // SequenceMatcher(None, "daawat", "dawaat").ratio() == 0.8333...
        assert!(close(similarity_ratio("daawat", "dawaat"), 10.0 / 12.0));
        // SequenceMatcher(None, "fresh milk", "fresh milk 500ml").ratio()
        assert!(close(similarity_ratio("fresh milk", "fresh milk 500ml"), 20.0 / 26.0));
    }

    #[test]
    fn test_recurses_on_both_sides() {
        // blocks "a", "bc" around the mismatch -> 3 matched chars
        let a: Vec<char> = "axbc".chars().collect();
        let b: Vec<char> = "aybc".chars().collect();
        assert_eq!(matched_chars(&a, &b), 3);
    }

    #[test]
    fn test_ratio_is_symmetric_on_simple_input() {
        let x = similarity_ratio("brookside milk", "milk brookside");
        let y = similarity_ratio("milk brookside", "brookside milk");
        assert!(close(x, y));
    }
}
