//! The text notation: `C(1) D(0.5) Ebp(0.25)`, one melody line per text line.
//!
//! A token is a note name followed by a parenthesized duration in seconds.
//! Anything between tokens is ignored, so `C(1), D(1) -- E(2)` and
//! `C(1)D(1)E(2)` parse the same. Lines may carry an editor tag such as
//! `{3}| ` (or `{*3*}|` for the highlighted line), which is stripped first.

use std::sync::OnceLock;

use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::NotationError;
use crate::sequencing::notes::Note;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"([A-Za-z]+(?:b|p)?)\((\d*\.?\d+)\)").expect("token pattern is valid")
    })
}

fn line_tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\{?\*?\d+\*?\}?\|\s*").expect("line tag pattern is valid"))
}

/// One `Name(duration)` token. The name is kept as written.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct NoteToken {
    pub name: String,
    pub duration_seconds: f64,
}

impl NoteToken {
    pub fn new(name: impl Into<String>, duration_seconds: f64) -> Self {
        Self {
            name: name.into(),
            duration_seconds,
        }
    }

    /// Catalog entry for this token, if the name is mapped.
    pub fn note(&self) -> Option<Note> {
        Note::from_name(&self.name)
    }
}

/// A parsed composition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    /// Non-empty melody lines, in input order.
    pub lines: Vec<Vec<NoteToken>>,
    /// Names with no catalog entry, deduplicated, first-seen order.
    pub unmapped: Vec<String>,
    /// Lines dropped because a token carried an unusable duration.
    pub rejected: Vec<NotationError>,
}

impl Composition {
    pub fn tokens(&self) -> impl Iterator<Item = &NoteToken> {
        self.lines.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of every token's duration.
    pub fn total_seconds(&self) -> f64 {
        self.tokens().map(|t| t.duration_seconds).sum()
    }
}

/// Remove a leading `{n}|` / `{*n*}|` editor tag.
pub fn strip_line_tag(line: &str) -> &str {
    match line_tag_pattern().find(line) {
        Some(tag) => &line[tag.end()..],
        None => line,
    }
}

/// Parse one line (tag already stripped or absent).
pub fn parse_line(line: &str, line_number: usize) -> Result<Vec<NoteToken>, NotationError> {
    token_pattern()
        .captures_iter(line)
        .map(|caps| {
            let name = &caps[1];
            let raw = &caps[2];
            match raw.parse::<f64>() {
                Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
                    Ok(NoteToken::new(name, seconds))
                }
                _ => Err(NotationError::InvalidDuration {
                    line: line_number,
                    token: caps[0].to_string(),
                }),
            }
        })
        .collect()
}

/// Parse a whole composition.
///
/// Unmapped names are flagged but their tokens stay in the output. A line
/// holding a zero-length token is rejected as a whole and reported in
/// [`Composition::rejected`]; the other lines still parse.
pub fn parse(text: &str) -> Composition {
    let mut composition = Composition::default();

    for (index, raw) in text.lines().enumerate() {
        let line = strip_line_tag(raw);
        let tokens = match parse_line(line, index + 1) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!("dropping notation line: {err}");
                composition.rejected.push(err);
                continue;
            }
        };

        if tokens.is_empty() {
            continue;
        }

        for token in &tokens {
            if token.note().is_none() && !composition.unmapped.contains(&token.name) {
                composition.unmapped.push(token.name.clone());
            }
        }
        composition.lines.push(tokens);
    }

    if !composition.unmapped.is_empty() {
        warn!(unmapped = ?composition.unmapped, "notation uses unmapped notes");
    }
    debug!(
        lines = composition.lines.len(),
        tokens = composition.tokens().count(),
        "notation parsed"
    );
    composition
}

/// Re-tag every line as `{i}| `, replacing whatever tag it had.
pub fn number_lines(text: &str) -> String {
    text.lines()
        .enumerate()
        .map(|(index, line)| format!("{{{}}}| {}", index + 1, strip_line_tag(line)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(line: &[(&str, f64)]) -> Vec<NoteToken> {
        line.iter().map(|&(n, d)| NoteToken::new(n, d)).collect()
    }

    #[test]
    fn tagged_lines_parse_in_order() {
        let composition = parse("{1}| C(1) D(0.5)\n{2}| R(2)");
        assert_eq!(
            composition.lines,
            vec![tokens(&[("C", 1.0), ("D", 0.5)]), tokens(&[("R", 2.0)])]
        );
        assert!(composition.unmapped.is_empty());
    }

    #[test]
    fn blank_lines_are_dropped_not_kept_empty() {
        let composition = parse("{1}| C(1)\n{2}| \n\n{4}| just words\nD(1)");
        assert_eq!(composition.lines.len(), 2);
        assert_eq!(composition.lines[1], tokens(&[("D", 1.0)]));
    }

    #[test]
    fn unmapped_names_are_flagged_and_kept() {
        let composition = parse("Xx(1) C(1) Xx(2)");
        assert_eq!(
            composition.lines[0],
            tokens(&[("Xx", 1.0), ("C", 1.0), ("Xx", 2.0)])
        );
        assert_eq!(composition.unmapped, vec!["Xx".to_string()]);
    }

    #[test]
    fn suffixed_names_are_one_greedy_token() {
        let composition = parse("Dbp(0.25)Fsmm(.5)");
        assert_eq!(composition.lines[0], tokens(&[("Dbp", 0.25), ("Fsmm", 0.5)]));
        assert!(composition.unmapped.is_empty());
    }

    #[test]
    fn noise_between_tokens_is_ignored() {
        let composition = parse("  C(1), -- D(2)!! E(x) F()");
        assert_eq!(composition.lines[0], tokens(&[("C", 1.0), ("D", 2.0)]));
    }

    #[test]
    fn zero_duration_rejects_only_its_line() {
        let composition = parse("C(1)\nD(0) E(1)\nF(2)");
        assert_eq!(composition.lines, vec![tokens(&[("C", 1.0)]), tokens(&[("F", 2.0)])]);
        assert_eq!(
            composition.rejected,
            vec![NotationError::InvalidDuration {
                line: 2,
                token: "D(0)".into()
            }]
        );
    }

    #[test]
    fn highlighted_tags_are_stripped() {
        assert_eq!(strip_line_tag("{*12*}| G(1)"), "G(1)");
        assert_eq!(strip_line_tag("3|G(1)"), "G(1)");
        assert_eq!(strip_line_tag("G(1)"), "G(1)");
    }

    #[test]
    fn number_lines_retags_every_line() {
        let numbered = number_lines("{7}| C(1)\nD(1)\n{*2*}| E(1)");
        assert_eq!(numbered, "{1}| C(1)\n{2}| D(1)\n{3}| E(1)");
        assert_eq!(parse(&numbered).lines.len(), 3);
    }

    #[test]
    fn total_seconds_sums_all_lines() {
        assert!((parse("C(1) D(0.5)\nR(2)").total_seconds() - 3.5).abs() < 1e-12);
    }
}
