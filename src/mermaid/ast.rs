//! AST types for Mermaid flowcharts and sequence diagrams.

use indexmap::IndexMap;
use serde::Serialize;

/// Which diagram family a text declared in its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagramKind {
    FlowGraph,
    SequenceDiagram,
}

/// Layout axis for flowcharts. `BT` and `RL` collapse onto these two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    TopToBottom,
    LeftToRight,
}

impl Direction {
    /// Map a header direction token (`TB`, `TD`, `BT`, `LR`, `RL`).
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "TB" | "TD" | "BT" => Some(Self::TopToBottom),
            "LR" | "RL" => Some(Self::LeftToRight),
            _ => None,
        }
    }
}

/// Node shape, inferred from the brackets around a node label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum NodeShapeKind {
    /// `A[text]` or a bare `A`
    #[default]
    #[serde(rename = "rectangle")]
    Rectangle,
    /// `A(text)`
    #[serde(rename = "round_rectangle")]
    RoundedRectangle,
    /// `A([text])`
    #[serde(rename = "pill")]
    Stadium,
    /// `A{text}`
    #[serde(rename = "diamond")]
    Decision,
    /// `A((text))`
    #[serde(rename = "circle")]
    Circle,
    /// `A{{text}}`
    #[serde(rename = "hexagon")]
    Hexagon,
    /// `A[/text/]` or the flag form `A>text]`
    #[serde(rename = "parallelogram")]
    Parallelogram,
    /// `A[\text\]`
    #[serde(rename = "trapezoid")]
    Trapezoid,
    /// `A[(text)]`
    #[serde(rename = "can")]
    Cylinder,
}

impl NodeShapeKind {
    /// Shape name in the canvas service's vocabulary.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::RoundedRectangle => "round_rectangle",
            Self::Stadium => "pill",
            Self::Decision => "diamond",
            Self::Circle => "circle",
            Self::Hexagon => "hexagon",
            Self::Parallelogram => "parallelogram",
            Self::Trapezoid => "trapezoid",
            Self::Cylinder => "can",
        }
    }

    /// Flowchart stencil name, grouping shapes by their flowchart role.
    #[must_use]
    pub fn stencil_name(self) -> &'static str {
        match self {
            Self::Circle | Self::Stadium => "flow_chart_terminator",
            Self::Decision => "flow_chart_decision",
            Self::Rectangle | Self::RoundedRectangle => "flow_chart_process",
            Self::Parallelogram => "flow_chart_input_output",
            Self::Hexagon => "flow_chart_preparation",
            Self::Cylinder => "flow_chart_database",
            Self::Trapezoid => "flow_chart_manual_operation",
        }
    }
}

/// Stroke of a connecting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorStyle {
    #[default]
    Solid,
    Dotted,
    Thick,
}

/// Decoration at either end of a connecting line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ArrowCap {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "arrow")]
    Arrow,
    #[serde(rename = "open_arrow")]
    OpenArrow,
    #[serde(rename = "filled_circle")]
    FilledCircle,
    /// The canvas has no cross cap; a diamond stands in for it.
    #[serde(rename = "diamond")]
    Cross,
}

impl ArrowCap {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Arrow => "arrow",
            Self::OpenArrow => "open_arrow",
            Self::FilledCircle => "filled_circle",
            Self::Cross => "diamond",
        }
    }
}

// =============================================================================
// FLOWCHART
// =============================================================================

/// A flowchart node, keyed by its user-chosen id.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub shape: NodeShapeKind,
    /// Set once a bracket annotation has supplied the label and shape.
    pub annotated: bool,
    /// Index into [`FlowGraph::subgraphs`] of the group the node was first seen in.
    pub subgraph: Option<usize>,
}

/// A directed connection between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub style: ConnectorStyle,
    pub start_cap: ArrowCap,
    pub end_cap: ArrowCap,
}

/// A `subgraph ... end` grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct Subgraph {
    pub id: String,
    pub title: String,
    /// Member node ids, in first-mention order.
    pub nodes: Vec<String>,
}

/// A parsed flowchart. Node order is first-mention order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowGraph {
    pub direction: Direction,
    pub nodes: IndexMap<String, Node>,
    pub edges: Vec<Edge>,
    pub subgraphs: Vec<Subgraph>,
}

// =============================================================================
// SEQUENCE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticipantKind {
    #[default]
    Participant,
    Actor,
}

/// One lifeline column in a sequence diagram.
#[derive(Debug, Clone, PartialEq)]
pub struct Participant {
    pub id: String,
    pub label: String,
    pub kind: ParticipantKind,
}

/// Arrow style for messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowStyle {
    /// `->>` solid line with filled arrowhead
    Solid,
    /// `->` solid line with open arrowhead
    SolidOpen,
    /// `-->>` dashed line with filled arrowhead
    Dashed,
    /// `-->` dashed line with open arrowhead
    DashedOpen,
    /// `-x` solid line with cross
    SolidCross,
    /// `--x` dashed line with cross
    DashedCross,
    /// `-)` solid line, async open arrow
    SolidAsync,
    /// `--)` dashed line, async open arrow
    DashedAsync,
}

impl ArrowStyle {
    #[must_use]
    pub fn is_dashed(self) -> bool {
        matches!(self, Self::Dashed | Self::DashedOpen | Self::DashedCross | Self::DashedAsync)
    }

    #[must_use]
    pub fn connector_style(self) -> ConnectorStyle {
        if self.is_dashed() { ConnectorStyle::Dotted } else { ConnectorStyle::Solid }
    }

    #[must_use]
    pub fn end_cap(self) -> ArrowCap {
        match self {
            Self::Solid | Self::Dashed => ArrowCap::Arrow,
            Self::SolidOpen | Self::DashedOpen | Self::SolidAsync | Self::DashedAsync => ArrowCap::OpenArrow,
            Self::SolidCross | Self::DashedCross => ArrowCap::Cross,
        }
    }
}

/// Activation change requested by a `+`/`-` receiver prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activate,
    Deactivate,
}

/// A message arrow between two participants.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    pub arrow: ArrowStyle,
    pub activation: Option<Activation>,
}

/// A parsed sequence diagram. Participant order is first-appearance order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceDiagram {
    pub participants: IndexMap<String, Participant>,
    pub messages: Vec<Message>,
}

// =============================================================================
// DIAGRAM
// =============================================================================

/// The full parse result.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagram {
    Flow(FlowGraph),
    Sequence(SequenceDiagram),
}

impl Diagram {
    #[must_use]
    pub fn kind(&self) -> DiagramKind {
        match self {
            Self::Flow(_) => DiagramKind::FlowGraph,
            Self::Sequence(_) => DiagramKind::SequenceDiagram,
        }
    }

    /// Sequence diagrams always run participants left to right.
    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            Self::Flow(graph) => graph.direction,
            Self::Sequence(_) => Direction::LeftToRight,
        }
    }

    /// Nodes for flowcharts, participants for sequence diagrams.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            Self::Flow(graph) => graph.nodes.len(),
            Self::Sequence(seq) => seq.participants.len(),
        }
    }

    /// Edges for flowcharts, messages for sequence diagrams.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        match self {
            Self::Flow(graph) => graph.edges.len(),
            Self::Sequence(seq) => seq.messages.len(),
        }
    }
}
