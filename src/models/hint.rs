//! Hint models and the strict parser for generated hint text.
//!
//! The hint backend returns free-form text that is expected to be one of:
//! - a JSON array of `{"hint": "..."}` objects, bare or inside a fenced block
//! - a sequence of `### Hint N` markdown sections
//!
//! Anything else is returned as [`ParsedHints::Unparsed`] for the caller to
//! display verbatim.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// A single progressive hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub hint: String,
}

/// Tagged result of [`parse_hints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedHints {
    Structured(Vec<Hint>),
    Unparsed(String),
}

fn fenced_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[ \t]*(?:json)?[ \t]*\r?\n(.*?)```").expect("valid fenced block regex")
    })
}

fn hint_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*###[ \t]*Hint[ \t]*\d+[ \t]*:?").expect("valid heading regex")
    })
}

/// Parse generated hint text without guessing at unknown formats.
pub fn parse_hints(text: &str) -> ParsedHints {
    let trimmed = text.trim();

    if let Some(caps) = fenced_block().captures(trimmed) {
        return match parse_json_hints(caps[1].trim()) {
            Some(hints) => ParsedHints::Structured(hints),
            None => {
                tracing::warn!("Fenced hint block is not a valid hint array");
                ParsedHints::Unparsed(text.to_string())
            }
        };
    }

    if trimmed.starts_with('[') {
        return match parse_json_hints(trimmed) {
            Some(hints) => ParsedHints::Structured(hints),
            None => ParsedHints::Unparsed(text.to_string()),
        };
    }

    if hint_heading().is_match(trimmed) {
        let hints: Vec<Hint> = hint_heading()
            .split(trimmed)
            .skip(1) // text before the first heading
            .map(str::trim)
            .filter(|section| !section.is_empty())
            .map(|section| Hint {
                hint: section.to_string(),
            })
            .collect();

        if !hints.is_empty() {
            tracing::debug!(count = hints.len(), "Parsed markdown hints");
            return ParsedHints::Structured(hints);
        }
    }

    ParsedHints::Unparsed(text.to_string())
}

fn parse_json_hints(json: &str) -> Option<Vec<Hint>> {
    let hints: Vec<Hint> = serde_json::from_str(json).ok()?;
    if hints.is_empty() || hints.iter().any(|h| h.hint.trim().is_empty()) {
        return None;
    }
    Some(hints)
}

/// Progressive reveal over a list of hints. The first hint is shown immediately.
#[derive(Debug, Clone)]
pub struct HintSession {
    hints: Vec<Hint>,
    revealed: usize,
}

impl HintSession {
    pub fn new(hints: Vec<Hint>) -> Self {
        let revealed = usize::from(!hints.is_empty());
        Self { hints, revealed }
    }

    /// Hints shown so far, in order.
    pub fn revealed(&self) -> &[Hint] {
        &self.hints[..self.revealed]
    }

    pub fn remaining(&self) -> usize {
        self.hints.len() - self.revealed
    }

    /// Reveal the next hint, or `None` once every hint is visible.
    pub fn reveal_next(&mut self) -> Option<&Hint> {
        if self.revealed >= self.hints.len() {
            return None;
        }
        self.revealed += 1;
        self.hints.get(self.revealed - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the hint chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}
