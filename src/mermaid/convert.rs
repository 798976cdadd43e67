//! Converter: positioned diagram → ordered canvas creation requests.
//!
//! DESIGN
//! ======
//! Requests reference each other by run-local index because remote ids do
//! not exist yet: a box names its container by position in `containers`, a
//! line names its endpoints by position in `boxes`. Coordinates are item
//! centers, which is how the canvas addresses items.

use serde::Serialize;

use super::ast::{ArrowCap, ConnectorStyle, Diagram, FlowGraph, NodeShapeKind, ParticipantKind, SequenceDiagram};
use super::layout::{PositionedDiagram, PositionedFrame, Rect};

const SUBGRAPH_COLOR: &str = "#F5F5F5";
const PARTICIPANT_COLOR: &str = "#E3F2FD";
const ACTOR_COLOR: &str = "#FFF9C4";
const LIFELINE_COLOR: &str = "#F1F8FE";
const ANCHOR_COLOR: &str = "#90CAF9";
/// Smallest shape the canvas accepts.
const ANCHOR_SIZE: f64 = 8.0;

/// How a connecting line is routed between its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineRouting {
    #[default]
    Elbowed,
    Straight,
}

impl LineRouting {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elbowed => "elbowed",
            Self::Straight => "straight",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerRequest {
    pub title: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Option<String>,
}

/// Converter switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    /// Draw flowchart nodes as flowchart stencils with a border color.
    pub use_stencils: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxRequest {
    pub shape: NodeShapeKind,
    /// Use the stencil vocabulary for `shape`.
    pub stencil: bool,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Index into [`ConvertedDiagram::containers`].
    pub container: Option<usize>,
}

impl BoxRequest {
    /// Shape name in the canvas vocabulary this box was converted for.
    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        if self.stencil { self.shape.stencil_name() } else { self.shape.as_str() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineRequest {
    /// Index into [`ConvertedDiagram::boxes`].
    pub from: usize,
    /// Index into [`ConvertedDiagram::boxes`].
    pub to: usize,
    pub label: Option<String>,
    pub style: ConnectorStyle,
    pub routing: LineRouting,
    pub start_cap: ArrowCap,
    pub end_cap: ArrowCap,
}

/// Everything to create, in creation order per kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConvertedDiagram {
    pub containers: Vec<ContainerRequest>,
    pub boxes: Vec<BoxRequest>,
    pub lines: Vec<LineRequest>,
    pub width: f64,
    pub height: f64,
}

/// Convert a positioned diagram into creation requests with basic shapes.
#[must_use]
pub fn convert(positioned: &PositionedDiagram) -> ConvertedDiagram {
    convert_with(positioned, &ConvertOptions::default())
}

/// Convert a positioned diagram into creation requests.
///
/// Stencils apply to flowchart nodes only; sequence headers and anchors keep
/// their basic shapes.
#[must_use]
pub fn convert_with(positioned: &PositionedDiagram, options: &ConvertOptions) -> ConvertedDiagram {
    let mut out = ConvertedDiagram { width: positioned.width, height: positioned.height, ..ConvertedDiagram::default() };
    match &positioned.diagram {
        Diagram::Flow(graph) => convert_flow(graph, positioned, options, &mut out),
        Diagram::Sequence(seq) => convert_sequence(seq, positioned, &mut out),
    }
    out
}

fn convert_flow(graph: &FlowGraph, positioned: &PositionedDiagram, options: &ConvertOptions, out: &mut ConvertedDiagram) {
    // Frames are emitted in order, so a node's container index is the index
    // of the frame listing it.
    let mut container_of: Vec<Option<usize>> = vec![None; graph.nodes.len()];
    for (idx, frame) in positioned.frames.iter().enumerate() {
        out.containers.push(container(frame, SUBGRAPH_COLOR));
        for &member in &frame.members {
            container_of[member] = Some(idx);
        }
    }

    for ((node, rect), container) in graph.nodes.values().zip(&positioned.nodes).zip(container_of) {
        let mut request = boxed(node.shape, &node.label, rect, Some(shape_color(node.shape)), container);
        if options.use_stencils {
            request.stencil = true;
            request.color = Some(stencil_color(node.shape).to_owned());
            request.border_color = Some(stencil_border_color(node.shape).to_owned());
        }
        out.boxes.push(request);
    }

    // Box index == node index, so endpoints resolve through the node map.
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (graph.nodes.get_index_of(&edge.from), graph.nodes.get_index_of(&edge.to))
        else {
            continue;
        };
        out.lines.push(LineRequest {
            from,
            to,
            label: edge.label.clone(),
            style: edge.style,
            routing: LineRouting::Elbowed,
            start_cap: edge.start_cap,
            end_cap: edge.end_cap,
        });
    }
}

fn convert_sequence(seq: &SequenceDiagram, positioned: &PositionedDiagram, out: &mut ConvertedDiagram) {
    // One lifeline frame per participant, in participant order.
    for frame in &positioned.frames {
        out.containers.push(container(frame, LIFELINE_COLOR));
    }

    for (i, (participant, rect)) in seq.participants.values().zip(&positioned.nodes).enumerate() {
        let (shape, color) = match participant.kind {
            ParticipantKind::Participant => (NodeShapeKind::Rectangle, PARTICIPANT_COLOR),
            ParticipantKind::Actor => (NodeShapeKind::Circle, ACTOR_COLOR),
        };
        out.boxes.push(boxed(shape, &participant.label, rect, Some(color), Some(i)));
    }

    for (msg, &row_y) in seq.messages.iter().zip(&positioned.rows) {
        let (Some(from), Some(to)) =
            (seq.participants.get_index_of(&msg.from), seq.participants.get_index_of(&msg.to))
        else {
            continue;
        };

        let from_anchor = push_anchor(out, positioned.frames[from].rect.center_x(), row_y, from);
        let to_anchor = push_anchor(out, positioned.frames[to].rect.center_x(), row_y, to);

        out.lines.push(LineRequest {
            from: from_anchor,
            to: to_anchor,
            label: if msg.text.is_empty() { None } else { Some(msg.text.clone()) },
            style: msg.arrow.connector_style(),
            routing: LineRouting::Straight,
            start_cap: ArrowCap::None,
            end_cap: msg.arrow.end_cap(),
        });
    }
}

/// Small circle on a lifeline for a message line to attach to.
fn push_anchor(out: &mut ConvertedDiagram, center_x: f64, center_y: f64, lifeline: usize) -> usize {
    let index = out.boxes.len();
    out.boxes.push(BoxRequest {
        shape: NodeShapeKind::Circle,
        stencil: false,
        label: String::new(),
        x: center_x,
        y: center_y,
        width: ANCHOR_SIZE,
        height: ANCHOR_SIZE,
        color: Some(ANCHOR_COLOR.to_owned()),
        border_color: None,
        container: Some(lifeline),
    });
    index
}

fn container(frame: &PositionedFrame, color: &str) -> ContainerRequest {
    ContainerRequest {
        title: Some(frame.title.clone()),
        x: frame.rect.center_x(),
        y: frame.rect.center_y(),
        width: frame.rect.width,
        height: frame.rect.height,
        color: Some(color.to_owned()),
    }
}

fn boxed(
    shape: NodeShapeKind,
    label: &str,
    rect: &Rect,
    color: Option<&str>,
    container: Option<usize>,
) -> BoxRequest {
    BoxRequest {
        shape,
        stencil: false,
        label: label.to_owned(),
        x: rect.center_x(),
        y: rect.center_y(),
        width: rect.width,
        height: rect.height,
        color: color.map(ToOwned::to_owned),
        border_color: None,
        container,
    }
}

/// Default fill per shape.
fn shape_color(shape: NodeShapeKind) -> &'static str {
    match shape {
        NodeShapeKind::Decision => "#FFE066",
        NodeShapeKind::Circle => "#B8E986",
        NodeShapeKind::Stadium => "#B3E5FC",
        NodeShapeKind::Parallelogram => "#E1BEE7",
        NodeShapeKind::Hexagon => "#FFCCBC",
        NodeShapeKind::Cylinder => "#B2EBF2",
        NodeShapeKind::Rectangle
        | NodeShapeKind::RoundedRectangle
        | NodeShapeKind::Trapezoid => "#E3F2FD",
    }
}

/// Stencil fill per flowchart role.
fn stencil_color(shape: NodeShapeKind) -> &'static str {
    match shape {
        NodeShapeKind::Circle | NodeShapeKind::Stadium => "#C8E6C9",
        NodeShapeKind::Decision => "#FFF9C4",
        NodeShapeKind::Rectangle | NodeShapeKind::RoundedRectangle => "#BBDEFB",
        NodeShapeKind::Parallelogram => "#E1BEE7",
        NodeShapeKind::Hexagon => "#FFE0B2",
        NodeShapeKind::Cylinder => "#B3E5FC",
        NodeShapeKind::Trapezoid => "#FFCCBC",
    }
}

/// Darker outline matching [`stencil_color`].
fn stencil_border_color(shape: NodeShapeKind) -> &'static str {
    match shape {
        NodeShapeKind::Circle | NodeShapeKind::Stadium => "#4CAF50",
        NodeShapeKind::Decision => "#FFC107",
        NodeShapeKind::Rectangle | NodeShapeKind::RoundedRectangle => "#2196F3",
        NodeShapeKind::Parallelogram => "#9C27B0",
        NodeShapeKind::Hexagon => "#FF9800",
        NodeShapeKind::Cylinder => "#00BCD4",
        NodeShapeKind::Trapezoid => "#FF5722",
    }
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
