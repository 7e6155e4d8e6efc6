//! Inline-citation stripping.
//!
//! Citation-adjacent mentions are a major source of false positives: an
//! entity cited from another paper is not used by this one. The patterns
//! here remove citation markers while leaving scientific notation that
//! happens to look similar ("488 nm", "[Ca2+]", "[3H]") untouched.

use std::sync::LazyLock;

use regex::Regex;

/// Numeric bracket citations: [12], [3,4], [5-7], [5–7]. Digits, commas and
/// dashes only, so ion and isotope notation never matches.
static NUMERIC_BRACKETS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\d+(?:\s*[,\u{2013}-]\s*\d+)*\]").expect("numeric bracket pattern")
});

/// Parenthetical author-year citations: (Smith et al., 2020),
/// (Smith and Jones, 2019; Lee, 2021), (Smith & Jones 2018).
static AUTHOR_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\(\s*[A-Z][A-Za-z'\u{2019}-]+(?:\s+(?:et al\.?|and\s+[A-Z][A-Za-z'\u{2019}-]+|&\s*[A-Z][A-Za-z'\u{2019}-]+))?\s*,?\s+(?:19|20)\d{2}[a-z]?(?:\s*;[^()]*)?\)",
    )
    .expect("author-year pattern")
});

/// Runs of superscript digit glyphs, captured with the token they follow so
/// citation markers can be told apart from unit exponents ("cm²", "s⁻¹").
static SUPERSCRIPT_DIGITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"((?:\d+|[A-Za-z\u{00B5}\u{03BC}]+)?)(\u{207B}?[\u{00B9}\u{00B2}\u{00B3}\u{2070}\u{2074}-\u{2079}](?:[,\u{207B}]?[\u{00B9}\u{00B2}\u{00B3}\u{2070}\u{2074}-\u{2079}])*)",
    )
    .expect("superscript pattern")
});

/// Unit abbreviations whose superscripts are exponents, not citations.
const UNIT_TOKENS: &[&str] = &[
    "m", "cm", "mm", "nm", "km", "s", "ms", "min", "h", "g", "kg", "mg", "l", "L", "ml", "mL",
    "mol", "M", "px", "pixel", "pixels", "voxel", "voxels", "\u{00B5}m", "\u{03BC}m",
    "\u{00B5}l", "\u{00B5}g",
];

/// A superscript run reads as an exponent when it follows a number or a unit
/// token, or carries a superscript minus. Comma-separated runs are always
/// citation lists.
fn exponent_like(pre: &str, run: &str) -> bool {
    if run.contains(',') {
        return false;
    }
    if run.contains('\u{207B}') {
        return true;
    }
    !pre.is_empty() && (pre.bytes().all(|b| b.is_ascii_digit()) || UNIT_TOKENS.contains(&pre))
}

static MULTI_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("multi-space pattern"));

static SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,;:)])").expect("space-punct pattern"));

/// Remove inline citation markers from `text`, preserving surrounding prose
/// verbatim apart from whitespace cleanup around the removed spans.
pub fn strip_inline_citations(text: &str) -> String {
    let stripped = NUMERIC_BRACKETS.replace_all(text, "");
    let stripped = AUTHOR_YEAR.replace_all(&stripped, "");
    let stripped = SUPERSCRIPT_DIGITS.replace_all(&stripped, |caps: &regex::Captures| {
        if exponent_like(&caps[1], &caps[2]) {
            caps[0].to_string()
        } else {
            caps[1].to_string()
        }
    });
    let stripped = SPACE_BEFORE_PUNCT.replace_all(&stripped, "$1");
    MULTI_SPACE.replace_all(&stripped, " ").into_owned()
}
