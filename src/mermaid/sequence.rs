//! Line parser for Mermaid sequence diagram syntax.

use tracing::debug;

use super::ast::{Activation, ArrowStyle, Message, Participant, ParticipantKind, SequenceDiagram};
use super::parse::strip_keyword;

/// Arrow patterns, longest first so `-->>` is not read as `-->`.
const ARROWS: &[(&str, ArrowStyle)] = &[
    ("-->>", ArrowStyle::Dashed),
    ("--)", ArrowStyle::DashedAsync),
    ("--x", ArrowStyle::DashedCross),
    ("-->", ArrowStyle::DashedOpen),
    ("->>", ArrowStyle::Solid),
    ("-)", ArrowStyle::SolidAsync),
    ("-x", ArrowStyle::SolidCross),
    ("->", ArrowStyle::SolidOpen),
];

/// Statements that carry no participants or messages.
const SKIPPED_KEYWORDS: &[&str] = &[
    "note",
    "activate",
    "deactivate",
    "loop",
    "alt",
    "else",
    "opt",
    "par",
    "and",
    "critical",
    "option",
    "break",
    "rect",
    "end",
    "autonumber",
    "title",
];

/// Build a sequence diagram from the lines following the header.
pub(super) fn parse_sequence(lines: &[&str]) -> SequenceDiagram {
    let mut diagram = SequenceDiagram::default();

    for &line in lines {
        if let Some(rest) = strip_keyword(line, "participant") {
            register_participant(&mut diagram, rest, ParticipantKind::Participant);
            continue;
        }
        if let Some(rest) = strip_keyword(line, "actor") {
            register_participant(&mut diagram, rest, ParticipantKind::Actor);
            continue;
        }
        if is_skipped(line) {
            debug!(line, "skipping sequence statement");
            continue;
        }
        if let Some(msg) = try_parse_message(line, &mut diagram) {
            diagram.messages.push(msg);
            continue;
        }
        debug!(line, "ignoring unrecognized sequence line");
    }

    diagram
}

/// Block and note statements. A line like `Title ->> X: hi` is still a message:
/// its sender is the keyword word alone, directly followed by an arrow.
fn is_skipped(line: &str) -> bool {
    let keyword = line
        .split_whitespace()
        .next()
        .is_some_and(|word| SKIPPED_KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)));
    if !keyword {
        return false;
    }

    let head = line.split_once(':').map_or(line, |(head, _)| head);
    !find_arrow(head).is_some_and(|(idx, _, _)| !line[..idx].trim().contains(char::is_whitespace))
}

/// Parse `From ARROW [+|-]To[: text]`. The arrow is searched before the first `:`.
fn try_parse_message(line: &str, diagram: &mut SequenceDiagram) -> Option<Message> {
    let head = line.split_once(':').map_or(line, |(head, _)| head);
    let (idx, pattern, arrow) = find_arrow(head)?;

    let from = line[..idx].trim();
    let rest = line[idx + pattern.len()..].trim();
    let (to, text) = match rest.split_once(':') {
        Some((to, text)) => (to.trim(), text.trim()),
        None => (rest, ""),
    };
    let (to, activation) = if let Some(to) = to.strip_prefix('+') {
        (to.trim_start(), Some(Activation::Activate))
    } else if let Some(to) = to.strip_prefix('-') {
        (to.trim_start(), Some(Activation::Deactivate))
    } else {
        (to, None)
    };

    if from.is_empty() || to.is_empty() {
        return None;
    }

    ensure_participant(diagram, from);
    ensure_participant(diagram, to);

    Some(Message { from: from.to_owned(), to: to.to_owned(), text: text.to_owned(), arrow, activation })
}

/// Earliest dash that starts an arrow, taking the longest pattern there.
fn find_arrow(head: &str) -> Option<(usize, &'static str, ArrowStyle)> {
    head.match_indices('-').find_map(|(idx, _)| {
        let tail = &head[idx..];
        ARROWS
            .iter()
            .find(|(pattern, _)| tail.starts_with(*pattern))
            .map(|&(pattern, arrow)| (idx, pattern, arrow))
    })
}

/// Register a participant from a declaration like `Alice` or `Alice as The Alice`.
fn register_participant(diagram: &mut SequenceDiagram, rest: &str, kind: ParticipantKind) {
    let (id, label) = match rest.split_once(" as ") {
        Some((name, alias)) => (name.trim(), alias.trim().trim_matches('"')),
        None => (rest.trim(), rest.trim()),
    };

    if !id.is_empty() && !diagram.participants.contains_key(id) {
        diagram
            .participants
            .insert(id.to_owned(), Participant { id: id.to_owned(), label: label.to_owned(), kind });
    }
}

/// Ensure a participant exists by id, creating it if necessary.
fn ensure_participant(diagram: &mut SequenceDiagram, id: &str) {
    if !diagram.participants.contains_key(id) {
        diagram.participants.insert(
            id.to_owned(),
            Participant { id: id.to_owned(), label: id.to_owned(), kind: ParticipantKind::Participant },
        );
    }
}
