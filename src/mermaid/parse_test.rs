use super::*;
use crate::mermaid::ast::{
    Activation, ArrowCap, ArrowStyle, ConnectorStyle, Diagram, DiagramKind, Direction, FlowGraph, NodeShapeKind,
    ParticipantKind, SequenceDiagram,
};

fn flow(input: &str) -> FlowGraph {
    match parse(input).unwrap() {
        Diagram::Flow(graph) => graph,
        Diagram::Sequence(_) => panic!("expected flowchart"),
    }
}

fn sequence(input: &str) -> SequenceDiagram {
    match parse(input).unwrap() {
        Diagram::Sequence(seq) => seq,
        Diagram::Flow(_) => panic!("expected sequence diagram"),
    }
}

// =============================================================================
// INPUT LIMITS AND HEADERS
// =============================================================================

#[test]
fn empty_and_whitespace_input_is_empty() {
    assert_eq!(parse(""), Err(ParseError::EmptyInput));
    assert_eq!(parse("   \n  "), Err(ParseError::EmptyInput));
}

#[test]
fn empty_input_is_distinct_from_bad_header() {
    let err = parse("hello world").unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader { ref found, hint: None } if found == "hello world"));
    assert_ne!(err.error_code(), ParseError::EmptyInput.error_code());
}

#[test]
fn missing_sequence_header_hints_at_sequence() {
    let err = parse("Alice->>Bob: Hi").unwrap_err();
    let ParseError::InvalidHeader { hint, .. } = &err else {
        panic!("expected InvalidHeader, got {err:?}");
    };
    assert!(hint.is_some_and(|h| h.contains("sequenceDiagram")));
    assert!(err.suggestion().contains("sequenceDiagram"));
}

#[test]
fn missing_flow_header_hints_at_flowchart() {
    let err = parse("A --> B").unwrap_err();
    let ParseError::InvalidHeader { hint, found } = err else {
        panic!("expected InvalidHeader");
    };
    assert_eq!(found, "A --> B");
    assert!(hint.is_some_and(|h| h.contains("flowchart")));
}

#[test]
fn comment_only_input_has_no_header() {
    let err = parse("%% nothing here").unwrap_err();
    assert!(matches!(err, ParseError::InvalidHeader { ref found, .. } if found.is_empty()));
}

#[test]
fn long_header_is_truncated_in_error() {
    let line = "x".repeat(120);
    let ParseError::InvalidHeader { found, .. } = parse(&line).unwrap_err() else {
        panic!("expected InvalidHeader");
    };
    assert_eq!(found.chars().count(), 50);
    assert!(found.ends_with("..."));
}

#[test]
fn unknown_direction_is_invalid_header() {
    assert!(matches!(parse("flowchart XY\nA-->B"), Err(ParseError::InvalidHeader { .. })));
    assert!(matches!(parse("graph TD extra"), Err(ParseError::InvalidHeader { .. })));
}

#[test]
fn header_variants() {
    assert_eq!(flow("flowchart TB\nA").direction, Direction::TopToBottom);
    assert_eq!(flow("graph TD\nA").direction, Direction::TopToBottom);
    assert_eq!(flow("graph BT\nA").direction, Direction::TopToBottom);
    assert_eq!(flow("flowchart LR\nA").direction, Direction::LeftToRight);
    assert_eq!(flow("flowchart rl;\nA").direction, Direction::LeftToRight);
    assert_eq!(flow("flowchart\nA").direction, Direction::TopToBottom);
    assert_eq!(parse("SEQUENCEDIAGRAM").unwrap().kind(), DiagramKind::SequenceDiagram);
}

#[test]
fn header_may_follow_blank_and_comment_lines() {
    let graph = flow("\n%% title\n\nflowchart LR\nA --> B");
    assert_eq!(graph.direction, Direction::LeftToRight);
    assert_eq!(graph.nodes.len(), 2);
}

#[test]
fn input_too_large() {
    let input = format!("flowchart TB\n{}", "A\n".repeat(MAX_INPUT_BYTES / 2));
    assert!(matches!(parse(&input), Err(ParseError::InputTooLarge { size }) if size == input.len()));
}

#[test]
fn too_many_lines() {
    let input = format!("flowchart TB\n{}", "A\n".repeat(MAX_LINES));
    assert_eq!(parse(&input), Err(ParseError::TooManyLines { count: MAX_LINES + 1 }));
}

#[test]
fn line_too_long() {
    let input = format!("flowchart TB\nA[{}]", "x".repeat(MAX_LINE_LENGTH));
    assert_eq!(parse(&input), Err(ParseError::LineTooLong { line: 2, length: MAX_LINE_LENGTH + 3 }));
}

#[test]
fn error_codes() {
    assert_eq!(ParseError::EmptyInput.error_code(), "E_EMPTY_INPUT");
    assert_eq!(ParseError::TooManyLines { count: 1 }.error_code(), "E_TOO_MANY_LINES");
    assert!(!ParseError::EmptyInput.retryable());
}

// =============================================================================
// FLOWCHART
// =============================================================================

#[test]
fn shape_inference_from_brackets() {
    let graph = flow(
        "flowchart TB
        a{X}
        b((X))
        c[X]
        d
        e(X)
        f([X])
        g[(X)]
        h{{X}}
        i[/X/]
        j[\\X\\]
        k>X]",
    );
    let shapes: Vec<NodeShapeKind> = graph.nodes.values().map(|n| n.shape).collect();
    assert_eq!(
        shapes,
        vec![
            NodeShapeKind::Decision,
            NodeShapeKind::Circle,
            NodeShapeKind::Rectangle,
            NodeShapeKind::Rectangle,
            NodeShapeKind::RoundedRectangle,
            NodeShapeKind::Stadium,
            NodeShapeKind::Cylinder,
            NodeShapeKind::Hexagon,
            NodeShapeKind::Parallelogram,
            NodeShapeKind::Trapezoid,
            NodeShapeKind::Parallelogram,
        ]
    );
    assert!(graph.nodes.values().all(|n| n.id == "d" || n.label == "X"));
    assert_eq!(graph.nodes["d"].label, "d");
}

#[test]
fn decision_example() {
    let graph = flow(
        "flowchart TB
        A[Start] --> B{Decision}
        B -->|Yes| C[Success]
        B -->|No| D[Retry]",
    );
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 3);
    assert_eq!(graph.nodes["B"].shape, NodeShapeKind::Decision);
    assert_eq!(graph.nodes["B"].label, "Decision");
    assert_eq!(graph.edges[1].label.as_deref(), Some("Yes"));
    assert_eq!(graph.edges[2].label.as_deref(), Some("No"));
    assert_eq!(graph.edges[0].label, None);
    assert!(graph.edges.iter().all(|e| e.end_cap == ArrowCap::Arrow && e.start_cap == ArrowCap::None));
}

#[test]
fn implicit_node_is_upgraded_by_later_annotation() {
    let graph = flow("flowchart TB\nA --> B\nB{Check}");
    assert_eq!(graph.nodes["B"].shape, NodeShapeKind::Decision);
    assert_eq!(graph.nodes["B"].label, "Check");
    assert_eq!(graph.nodes.get_index_of("B"), Some(1));
}

#[test]
fn annotation_is_never_overwritten() {
    let graph = flow("flowchart TB\nB{Check}\nA --> B[Other]\nB");
    assert_eq!(graph.nodes["B"].shape, NodeShapeKind::Decision);
    assert_eq!(graph.nodes["B"].label, "Check");
}

#[test]
fn rectangle_annotation_is_upgraded_by_specific_shape() {
    let graph = flow("flowchart TB\nA[Start]\nA{Check}\nA[Again]");
    assert_eq!(graph.nodes["A"].shape, NodeShapeKind::Decision);
    assert_eq!(graph.nodes["A"].label, "Check");

    let graph = flow("flowchart TB\nA[Start] --> B\nB --> A((Done))");
    assert_eq!(graph.nodes["A"].shape, NodeShapeKind::Circle);
    assert_eq!(graph.nodes["A"].label, "Done");
}

#[test]
fn rectangle_annotation_keeps_first_label() {
    let graph = flow("flowchart TB\nA[Start]\nA[Other]");
    assert_eq!(graph.nodes["A"].shape, NodeShapeKind::Rectangle);
    assert_eq!(graph.nodes["A"].label, "Start");
}

#[test]
fn edges_reference_known_nodes() {
    let graph = flow("flowchart LR\nA --> B --> C\nC --> A\nD");
    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.edges.len(), 3);
    for edge in &graph.edges {
        assert!(graph.nodes.contains_key(&edge.from));
        assert!(graph.nodes.contains_key(&edge.to));
    }
    assert_eq!((graph.edges[1].from.as_str(), graph.edges[1].to.as_str()), ("B", "C"));
}

#[test]
fn link_operators() {
    let graph = flow(
        "flowchart TB
        A --- B
        A -.-> C
        A -.- D
        A ==> E
        A --o F
        A --x G
        A -- label text --> H
        A == heavy ==> I
        A---->J",
    );
    let links: Vec<(ConnectorStyle, ArrowCap)> = graph.edges.iter().map(|e| (e.style, e.end_cap)).collect();
    assert_eq!(
        links,
        vec![
            (ConnectorStyle::Solid, ArrowCap::None),
            (ConnectorStyle::Dotted, ArrowCap::Arrow),
            (ConnectorStyle::Dotted, ArrowCap::None),
            (ConnectorStyle::Thick, ArrowCap::Arrow),
            (ConnectorStyle::Solid, ArrowCap::FilledCircle),
            (ConnectorStyle::Solid, ArrowCap::Cross),
            (ConnectorStyle::Solid, ArrowCap::Arrow),
            (ConnectorStyle::Thick, ArrowCap::Arrow),
            (ConnectorStyle::Solid, ArrowCap::Arrow),
        ]
    );
    assert_eq!(graph.edges[6].label.as_deref(), Some("label text"));
    assert_eq!(graph.edges[7].label.as_deref(), Some("heavy"));
    assert_eq!(graph.nodes.len(), 10);
}

#[test]
fn quoted_labels_and_semicolons() {
    let graph = flow("flowchart TB\nA[\"Hello, world\"] -->|\"go\"| B;");
    assert_eq!(graph.nodes["A"].label, "Hello, world");
    assert_eq!(graph.edges[0].label.as_deref(), Some("go"));
    assert!(graph.nodes.contains_key("B"));
}

#[test]
fn unparseable_lines_are_ignored() {
    let graph = flow(
        "flowchart TB
        A[unclosed --> B
        classDef green fill:#9f6
        C --> D
        E -> F
        click C callback",
    );
    let ids: Vec<&str> = graph.nodes.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["C", "D"]);
    assert_eq!(graph.edges.len(), 1);
}

#[test]
fn subgraphs_collect_first_mentions() {
    let graph = flow(
        "flowchart TB
        A --> B
        subgraph one [Group One]
          B --> C
          C --> D
        end
        subgraph two
          E
        end
        D --> E",
    );
    assert_eq!(graph.subgraphs.len(), 2);
    assert_eq!(graph.subgraphs[0].id, "one");
    assert_eq!(graph.subgraphs[0].title, "Group One");
    assert_eq!(graph.subgraphs[0].nodes, vec!["C", "D"]);
    assert_eq!(graph.subgraphs[1].title, "two");
    assert_eq!(graph.subgraphs[1].nodes, vec!["E"]);
    assert_eq!(graph.nodes["B"].subgraph, None);
    assert_eq!(graph.nodes["C"].subgraph, Some(0));
}

#[test]
fn nested_subgraph_members_belong_to_innermost() {
    let graph = flow(
        "flowchart TB
        subgraph outer
          A
          subgraph inner
            B
          end
          C
        end",
    );
    assert_eq!(graph.subgraphs[0].nodes, vec!["A", "C"]);
    assert_eq!(graph.subgraphs[1].nodes, vec!["B"]);
}

#[test]
fn stray_end_is_harmless() {
    let graph = flow("flowchart TB\nend\nA --> B");
    assert_eq!(graph.nodes.len(), 2);
    assert!(graph.subgraphs.is_empty());
}

// =============================================================================
// SEQUENCE
// =============================================================================

#[test]
fn sequence_message_registers_participants() {
    let seq = sequence("sequenceDiagram\nAlice->>Bob: Hello\nBob-->>Alice: Hi back");
    let ids: Vec<&str> = seq.participants.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["Alice", "Bob"]);
    assert_eq!(seq.messages.len(), 2);
    assert_eq!(seq.messages[0].text, "Hello");
    assert_eq!(seq.messages[0].arrow, ArrowStyle::Solid);
    assert_eq!(seq.messages[1].arrow, ArrowStyle::Dashed);
}

#[test]
fn sequence_arrow_styles() {
    let seq = sequence(
        "sequenceDiagram
        A->>B: a
        A->B: b
        A-->>B: c
        A-->B: d
        A-xB: e
        A--xB: f
        A-)B: g
        A--)B: h",
    );
    let arrows: Vec<ArrowStyle> = seq.messages.iter().map(|m| m.arrow).collect();
    assert_eq!(
        arrows,
        vec![
            ArrowStyle::Solid,
            ArrowStyle::SolidOpen,
            ArrowStyle::Dashed,
            ArrowStyle::DashedOpen,
            ArrowStyle::SolidCross,
            ArrowStyle::DashedCross,
            ArrowStyle::SolidAsync,
            ArrowStyle::DashedAsync,
        ]
    );
    assert_eq!(seq.participants.len(), 2);
}

#[test]
fn sequence_declarations_and_aliases() {
    let seq = sequence(
        "sequenceDiagram
        actor U as User
        participant S as \"Web Server\"
        participant S as Ignored
        U->>S: GET /",
    );
    assert_eq!(seq.participants["U"].kind, ParticipantKind::Actor);
    assert_eq!(seq.participants["U"].label, "User");
    assert_eq!(seq.participants["S"].label, "Web Server");
    assert_eq!(seq.messages[0].to, "S");
}

#[test]
fn sequence_activation_prefix_and_missing_text() {
    let seq = sequence("sequenceDiagram\nA->>+B: work\nB-->>-A\nA->>B: time: 10:00");
    assert_eq!(seq.messages[0].to, "B");
    assert_eq!(seq.messages[0].activation, Some(Activation::Activate));
    assert_eq!(seq.messages[1].to, "A");
    assert_eq!(seq.messages[1].activation, Some(Activation::Deactivate));
    assert_eq!(seq.messages[1].text, "");
    assert_eq!(seq.messages[2].text, "time: 10:00");
    assert_eq!(seq.participants.len(), 2);
}

#[test]
fn sequence_skips_blocks_and_notes() {
    let seq = sequence(
        "sequenceDiagram
        autonumber
        Note over A,B: hello
        loop Every minute
          A->>B: ping
        end
        alt ok
          B->>A: pong
        else error
          B-xA: fail
        end
        activate A
        gibberish line",
    );
    assert_eq!(seq.messages.len(), 3);
    assert_eq!(seq.participants.len(), 2);
}

#[test]
fn sequence_sender_named_like_keyword_is_a_message() {
    let seq = sequence(
        "sequenceDiagram
        Option ->> Bob: hi
        Title->>X: there
        title Order flow
        loop retry ->> forever
        end",
    );
    let pairs: Vec<(&str, &str)> = seq.messages.iter().map(|m| (m.from.as_str(), m.to.as_str())).collect();
    assert_eq!(pairs, vec![("Option", "Bob"), ("Title", "X")]);
    assert_eq!(seq.participants.len(), 4);
}
