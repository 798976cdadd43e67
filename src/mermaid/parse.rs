//! Diagram text entry point: input limits, header detection, and dispatch to
//! the flowchart or sequence line parsers.

use super::ast::{Diagram, Direction};
use super::{flow, sequence};
use crate::ErrorCode;

/// Inputs above this size are rejected before any line is looked at.
pub const MAX_INPUT_BYTES: usize = 50 * 1024;
pub const MAX_LINES: usize = 500;
pub const MAX_LINE_LENGTH: usize = 2000;

const HEADER_PREVIEW_CHARS: usize = 50;

// =============================================================================
// ERRORS
// =============================================================================

/// Fatal parse failures. Each one aborts generation before any canvas call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("diagram input is empty")]
    EmptyInput,
    #[error("diagram must start with a valid header, found `{found}`")]
    InvalidHeader { found: String, hint: Option<&'static str> },
    #[error("diagram input is {size} bytes, exceeding the limit of {limit}", limit = MAX_INPUT_BYTES)]
    InputTooLarge { size: usize },
    #[error("diagram has {count} lines, exceeding the limit of {limit}", limit = MAX_LINES)]
    TooManyLines { count: usize },
    #[error("line {line} has {length} characters, exceeding the limit of {limit}", limit = MAX_LINE_LENGTH)]
    LineTooLong { line: usize, length: usize },
}

impl ParseError {
    /// Actionable advice for fixing the input.
    #[must_use]
    pub fn suggestion(&self) -> String {
        match self {
            Self::EmptyInput => "Provide diagram code starting with 'flowchart TB' or 'sequenceDiagram'".into(),
            Self::InvalidHeader { hint, .. } => {
                let base = "Use 'flowchart TB', 'flowchart LR', 'graph TD', or 'sequenceDiagram'";
                match hint {
                    Some(hint) => format!("{base}. {hint}"),
                    None => base.into(),
                }
            }
            Self::InputTooLarge { .. } => "Reduce diagram size or split it into several smaller diagrams".into(),
            Self::TooManyLines { .. } => "Reduce the number of lines or split it into several diagrams".into(),
            Self::LineTooLong { .. } => "Split long labels or node names into shorter segments".into(),
        }
    }
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyInput => "E_EMPTY_INPUT",
            Self::InvalidHeader { .. } => "E_INVALID_HEADER",
            Self::InputTooLarge { .. } => "E_INPUT_TOO_LARGE",
            Self::TooManyLines { .. } => "E_TOO_MANY_LINES",
            Self::LineTooLong { .. } => "E_LINE_TOO_LONG",
        }
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Header {
    Flow(Direction),
    Sequence,
}

/// Parse Mermaid diagram text into a [`Diagram`].
///
/// Lines that match no statement form are skipped; only the header is strict.
///
/// # Errors
///
/// Returns a [`ParseError`] when the input is empty, exceeds the size limits,
/// or does not open with a `flowchart`/`graph`/`sequenceDiagram` header.
pub fn parse(input: &str) -> Result<Diagram, ParseError> {
    if input.len() > MAX_INPUT_BYTES {
        return Err(ParseError::InputTooLarge { size: input.len() });
    }

    let text = input.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let count = text.lines().count();
    if count > MAX_LINES {
        return Err(ParseError::TooManyLines { count });
    }
    if let Some((idx, line)) = text
        .lines()
        .enumerate()
        .find(|(_, line)| line.len() > MAX_LINE_LENGTH)
    {
        return Err(ParseError::LineTooLong { line: idx + 1, length: line.len() });
    }

    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_comment(l));

    let first = lines.next().unwrap_or_default();
    let header = parse_header(first)
        .ok_or_else(|| ParseError::InvalidHeader { found: preview(first), hint: header_hint(text) })?;

    let body: Vec<&str> = lines.collect();
    let diagram = match header {
        Header::Flow(direction) => Diagram::Flow(flow::parse_flow(direction, &body)),
        Header::Sequence => Diagram::Sequence(sequence::parse_sequence(&body)),
    };

    tracing::debug!(
        kind = ?diagram.kind(),
        nodes = diagram.node_count(),
        edges = diagram.edge_count(),
        "parsed diagram"
    );
    Ok(diagram)
}

/// Recognize `flowchart [DIR]`, `graph [DIR]` or `sequenceDiagram`.
fn parse_header(line: &str) -> Option<Header> {
    let line = line.trim_end_matches(';').trim();
    if line.eq_ignore_ascii_case("sequenceDiagram") {
        return Some(Header::Sequence);
    }

    let mut words = line.split_whitespace();
    let keyword = words.next()?;
    if !keyword.eq_ignore_ascii_case("flowchart") && !keyword.eq_ignore_ascii_case("graph") {
        return None;
    }
    let direction = match words.next() {
        Some(token) => Direction::from_token(token)?,
        None => Direction::TopToBottom,
    };
    if words.next().is_some() {
        return None;
    }
    Some(Header::Flow(direction))
}

/// Point at the likely mistake when the header is missing.
fn header_hint(text: &str) -> Option<&'static str> {
    let lower = text.to_ascii_lowercase();
    if lower.contains("participant") || lower.contains("->>") {
        return Some("Sequence diagrams must start with 'sequenceDiagram'");
    }
    if lower.contains("-->") || lower.contains("subgraph") {
        return Some("Flowcharts must start with 'flowchart TB' or 'graph TD'");
    }
    None
}

fn preview(line: &str) -> String {
    if line.chars().count() <= HEADER_PREVIEW_CHARS {
        return line.to_owned();
    }
    let head: String = line.chars().take(HEADER_PREVIEW_CHARS - 3).collect();
    format!("{head}...")
}

fn is_comment(line: &str) -> bool {
    line.starts_with("%%")
}

/// Strip a keyword prefix (case-insensitive) and return the rest.
pub(super) fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    if head.eq_ignore_ascii_case(keyword) {
        let rest = &line[keyword.len()..];
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            return Some(rest.trim());
        }
    }
    None
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
