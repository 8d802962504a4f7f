//! Post-processing: cosmetic cleanup of generated answers.
//!
//! Some models emit run-together words ("growthIn Q2", "sales.Q2") when they
//! paraphrase OCR text that itself lost its spacing. These rules restore
//! word boundaries without touching content. They are purely textual and make
//! no claim about semantic correctness.
//!
//! ## Rule Order
//!
//! Spacing is inserted first and collapsed last, so a rule that adds a space
//! next to an existing one never leaves a double space behind.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to a model answer.
///
/// Rules (applied in order):
/// 1. Insert a space after a period directly followed by a letter
/// 2. Insert a space at each lowercase→uppercase boundary
/// 3. Collapse whitespace runs to a single space
/// 4. Trim both ends
pub fn clean_answer(input: &str) -> String {
    let s = space_after_period(input);
    let s = split_case_boundaries(&s);
    let s = collapse_whitespace(&s);
    s.trim().to_string()
}

// ── Rule 1: Space after period ───────────────────────────────────────────────

// Letters only: "1.5" and "v2.0" keep their decimal points.
static RE_PERIOD_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.(\p{L})").unwrap());

fn space_after_period(input: &str) -> String {
    RE_PERIOD_LETTER.replace_all(input, ". $1").to_string()
}

// ── Rule 2: Split lowercase→uppercase boundaries ─────────────────────────────
//
// A character cannot be both the uppercase side of one boundary and the
// lowercase side of the next, so matches never overlap and one pass splits
// every boundary ("aBcD" → "a Bc D").

static RE_CASE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());

fn split_case_boundaries(input: &str) -> String {
    RE_CASE_BOUNDARY.replace_all(input, "$1 $2").to_string()
}

// ── Rule 3: Collapse whitespace ──────────────────────────────────────────────

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

fn collapse_whitespace(input: &str) -> String {
    RE_WHITESPACE.replace_all(input, " ").to_string()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_after_period() {
        assert_eq!(space_after_period("Q2 won.It grew"), "Q2 won. It grew");
    }

    #[test]
    fn test_decimal_untouched() {
        assert_eq!(space_after_period("grew 1.5 times"), "grew 1.5 times");
    }

    #[test]
    fn test_case_boundary() {
        assert_eq!(split_case_boundaries("salesIn Q2"), "sales In Q2");
    }

    #[test]
    fn test_consecutive_case_boundaries() {
        assert_eq!(split_case_boundaries("aBcDeF"), "a Bc De F");
    }

    #[test]
    fn test_acronyms_untouched() {
        assert_eq!(split_case_boundaries("USA GDP"), "USA GDP");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \n\t  b"), "a b");
    }

    #[test]
    fn test_clean_answer_full() {
        assert_eq!(
            clean_answer("  Q2 had higher sales.The increaseWas 50 units.\n"),
            "Q2 had higher sales. The increase Was 50 units."
        );
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let inputs = [
            "Q2 had higher sales (150 vs 100).",
            "  The pie chart shows 40% for A.  ",
            "Growth was 1.5x. Then it slowed.",
            "",
        ];
        for input in inputs {
            let once = clean_answer(input);
            assert_eq!(clean_answer(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(clean_answer(""), "");
        assert_eq!(clean_answer("   "), "");
    }
}
