//! Natural ("human") ordering of identifiers.
//!
//! Register names and block addresses are compared by splitting them into alternating runs
//! of non-digit and digit characters. Non-digit runs compare as text, digit runs compare
//! by their numeric value. This makes `r2` sort before `r10` and `block2` before `block10`,
//! which keeps operand lists and CFG dumps stable and readable.
//!
//! Digit runs are compared without converting them into integers, so arbitrarily long runs
//! never overflow.

use std::cmp::Ordering;

/// One run of a split identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Digits(&'a str),
}

/// Splits `s` into alternating text/digit runs.
///
/// The sequence always starts with a text run (possibly empty) so that runs at the same
/// position in two sequences are always of the same kind.
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let bytes = s.as_bytes();
    let mut result = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (i, b) in bytes.iter().enumerate() {
        if b.is_ascii_digit() != in_digits {
            let run = &s[start..i];
            result.push(if in_digits {
                Chunk::Digits(run)
            } else {
                Chunk::Text(run)
            });
            start = i;
            in_digits = !in_digits;
        }
    }

    let run = &s[start..];
    result.push(if in_digits {
        Chunk::Digits(run)
    } else {
        Chunk::Text(run)
    });
    if in_digits {
        result.push(Chunk::Text(""));
    }
    result
}

/// Compares two runs of ASCII digits by numeric value.
fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Compares two strings using natural order.
///
/// Strings whose runs are numerically identical but textually different (`r07` and `r7`)
/// are ordered by plain string comparison, so the result is `Equal` only for identical
/// strings. This keeps the order consistent with string equality.
///
/// # Examples
///
/// ```rust
/// use std::cmp::Ordering;
/// use blockscope::utils::natural_cmp;
///
/// assert_eq!(natural_cmp("r2", "r10"), Ordering::Less);
/// assert_eq!(natural_cmp("blk10", "blk2"), Ordering::Greater);
/// assert_eq!(natural_cmp("a", "a"), Ordering::Equal);
/// ```
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            // Runs alternate from the same starting kind, so kinds always line up
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

/// Sorts a slice of string-like items in natural order.
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs() {
        assert_eq!(natural_cmp("r2", "r10"), Ordering::Less);
        assert_eq!(natural_cmp("r10", "r2"), Ordering::Greater);
        assert_eq!(natural_cmp("r10", "r10"), Ordering::Equal);
    }

    #[test]
    fn test_text_runs() {
        assert_eq!(natural_cmp("eax", "ebx"), Ordering::Less);
        assert_eq!(natural_cmp("r", "r1"), Ordering::Less);
        assert_eq!(natural_cmp("", "a"), Ordering::Less);
    }

    #[test]
    fn test_leading_digits() {
        assert_eq!(natural_cmp("2abc", "10abc"), Ordering::Less);
        assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zeros_tie_break() {
        assert_ne!(natural_cmp("r07", "r7"), Ordering::Equal);
        assert_eq!(natural_cmp("r07", "r8"), Ordering::Less);
    }

    #[test]
    fn test_huge_digit_runs() {
        let a = "blk99999999999999999999999999999998";
        let b = "blk99999999999999999999999999999999";
        assert_eq!(natural_cmp(a, b), Ordering::Less);
        assert_eq!(natural_cmp("blk9", b), Ordering::Less);
    }

    #[test]
    fn test_multiple_runs() {
        let mut names = vec!["bb1_10", "bb1_2", "bb10_1", "bb2_1"];
        natural_sort(&mut names);
        assert_eq!(names, vec!["bb1_2", "bb1_10", "bb2_1", "bb10_1"]);
    }

    #[test]
    fn test_mixed_kinds_at_same_position() {
        // "_" and "1" land in different run kinds only after the shared prefix
        assert_eq!(natural_cmp("a1", "a_"), Ordering::Less);
        assert_eq!(natural_cmp("a_", "a1"), Ordering::Greater);
    }
}
