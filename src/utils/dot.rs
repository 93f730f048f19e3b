//! DOT format utilities for graph visualization.
//!
//! Used by [`crate::cfg::to_dot`] to embed rendered instructions and branch conditions
//! into Graphviz labels.

/// Escapes a string for safe use in DOT format labels and identifiers.
///
/// Quotes, backslashes, angle brackets and line breaks all carry meaning in DOT. Line
/// breaks become the `\l` left-justify escape so multi-line block listings stay aligned.
///
/// # Examples
///
/// ```rust
/// use blockscope::utils::escape_dot;
///
/// assert_eq!(escape_dot("$r1 = *(u32*)$sp"), "$r1 = *(u32*)$sp");
/// assert_eq!(escape_dot("(a < b)"), "(a \\< b)");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\r', "")
        .replace('\n', "\\l")
        .replace('<', "\\<")
        .replace('>', "\\>")
        .replace('{', "\\{")
        .replace('}', "\\}")
}
