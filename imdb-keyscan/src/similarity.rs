use crate::record::MAX_RECORD_LEN;

/// The default length disparity threshold.
///
/// Two strings whose length ratio (shorter over longer) falls below this
/// value are never compared and have a similarity of `0`.
pub const DEFAULT_LENGTH_THRESHOLD: f64 = 0.7;

/// The Ratcliff-Obershelp similarity metric, combined with a cheap
/// preliminary filter.
///
/// The metric finds the longest common substring of two strings, then
/// recursively does the same on the unmatched pieces to its left and to its
/// right. The similarity is twice the total number of matched bytes divided
/// by the combined length of both strings.
///
/// Before running the metric, empty strings score `0`, identical strings
/// score `1` and strings of very different lengths score `0`. The last rule
/// bounds the cost of scanning large key files, at the expense of missing
/// some genuinely similar strings.
///
/// Comparisons are byte oriented and case sensitive. Callers are expected to
/// normalize both sides first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Similarity {
    length_threshold: f64,
}

impl Default for Similarity {
    fn default() -> Similarity {
        Similarity::new(DEFAULT_LENGTH_THRESHOLD)
    }
}

impl Similarity {
    /// Create a metric that refuses to compare strings whose length ratio is
    /// below `length_threshold`.
    pub fn new(length_threshold: f64) -> Similarity {
        Similarity { length_threshold }
    }

    /// Return the length disparity threshold of this metric.
    pub fn length_threshold(&self) -> f64 {
        self.length_threshold
    }

    /// Compute the similarity of `a` and `b`, in the range `[0, 1]`.
    pub fn ratio(&self, a: &[u8], b: &[u8]) -> f64 {
        if let Some(score) = self.precheck(a, b) {
            return score;
        }
        let matched = common(a, 0, a.len(), b, 0, b.len());
        2.0 * matched as f64 / (a.len() + b.len()) as f64
    }

    /// Returns a score without running the metric when the preliminary
    /// filter can decide one.
    fn precheck(&self, a: &[u8], b: &[u8]) -> Option<f64> {
        if a.is_empty() || b.is_empty() {
            return Some(0.0);
        }
        if a == b {
            return Some(1.0);
        }
        let (la, lb) = (a.len() as f64, b.len() as f64);
        if la.min(lb) / la.max(lb) < self.length_threshold {
            return Some(0.0);
        }
        None
    }
}

/// Return the number of bytes matched between `a[st1..end1]` and
/// `b[st2..end2]`.
///
/// The longest match found first wins, scanning `a` in the outer loop and `b`
/// in the inner loop. A match may extend past the end of either range, up to
/// the end of the whole string. A pair of single byte ranges always matches
/// nothing.
fn common(
    a: &[u8],
    st1: usize,
    end1: usize,
    b: &[u8],
    st2: usize,
    end2: usize,
) -> usize {
    if end1 <= st1 || end2 <= st2 {
        return 0;
    }
    if end1 == st1 + 1 && end2 == st2 + 1 {
        return 0;
    }

    let (mut max, mut s1, mut s2) = (0, st1, st2);
    let (mut b1, mut b2) = (end1, end2);
    let mut a1 = st1;
    while a1 < b1 {
        let mut a2 = st2;
        while a2 < b2 {
            if a[a1] == b[a2] {
                let mut i = 1;
                while a1 + i < a.len()
                    && a2 + i < b.len()
                    && a[a1 + i] == b[a2 + i]
                {
                    i += 1;
                }
                if i > max {
                    max = i;
                    s1 = a1;
                    s2 = a2;
                    b1 = end1.saturating_sub(max);
                    b2 = end2.saturating_sub(max);
                }
            }
            a2 += 1;
        }
        a1 += 1;
    }
    if max == 0 {
        return 0;
    }
    max + common(a, s1 + max, end1, b, s2 + max, end2)
        + common(a, st1, s1, b, st2, s2)
}

/// Compute the similarity of two strings with the default metric.
///
/// Both strings are lowercased (ASCII only) and truncated to the maximum
/// record length before comparison, so this gives the same score a key file
/// scan gives to an equivalent pair of normalized strings.
pub fn similarity(a: &str, b: &str) -> f64 {
    Similarity::default().ratio(&fold(a.as_bytes()), &fold(b.as_bytes()))
}

fn fold(s: &[u8]) -> Vec<u8> {
    let len = s.len().min(MAX_RECORD_LEN);
    s[..len].to_ascii_lowercase()
}
