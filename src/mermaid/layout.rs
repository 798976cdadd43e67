//! Layout engine: assigns every node a rectangle and every group a frame.
//!
//! DESIGN
//! ======
//! Pure and deterministic. Flowcharts are layered by breadth-first depth from
//! their roots; sequence diagrams get one column per participant and one row
//! per message. Coordinates are top-left corners in canvas units.

use std::collections::VecDeque;

use serde::Serialize;

use super::ast::{Diagram, DiagramKind, Direction, FlowGraph, ParticipantKind, SequenceDiagram};

/// Padding between a subgraph frame and its member nodes.
const FRAME_PADDING: f64 = 40.0;
/// Extra room above the padded members for the frame title.
const FRAME_TITLE_HEIGHT: f64 = 30.0;

// =============================================================================
// CONFIG
// =============================================================================

/// Geometry knobs for one layout run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub start_x: f64,
    pub start_y: f64,
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between adjacent cells along X.
    pub spacing_x: f64,
    /// Gap between adjacent cells along Y.
    pub spacing_y: f64,
}

impl LayoutConfig {
    #[must_use]
    pub fn flow() -> Self {
        Self { start_x: 0.0, start_y: 0.0, node_width: 180.0, node_height: 70.0, spacing_x: 80.0, spacing_y: 120.0 }
    }

    #[must_use]
    pub fn sequence() -> Self {
        Self { start_x: 0.0, start_y: 0.0, node_width: 120.0, node_height: 50.0, spacing_x: 60.0, spacing_y: 60.0 }
    }

    #[must_use]
    pub fn for_kind(kind: DiagramKind) -> Self {
        match kind {
            DiagramKind::FlowGraph => Self::flow(),
            DiagramKind::SequenceDiagram => Self::sequence(),
        }
    }

    /// Apply caller overrides field by field. Unusable values are skipped
    /// individually and never disturb the other fields.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &LayoutOverrides) -> Self {
        let finite = |v: &f64| v.is_finite();
        let positive = |v: &f64| v.is_finite() && *v > 0.0;
        let non_negative = |v: &f64| v.is_finite() && *v >= 0.0;

        if let Some(v) = overrides.start_x.filter(finite) {
            self.start_x = v;
        }
        if let Some(v) = overrides.start_y.filter(finite) {
            self.start_y = v;
        }
        if let Some(v) = overrides.node_width.filter(positive) {
            self.node_width = v;
        }
        if let Some(v) = overrides.node_height.filter(positive) {
            self.node_height = v;
        }
        if let Some(v) = overrides.spacing_x.filter(non_negative) {
            self.spacing_x = v;
        }
        if let Some(v) = overrides.spacing_y.filter(non_negative) {
            self.spacing_y = v;
        }
        self
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::flow()
    }
}

/// Optional per-field replacements for [`LayoutConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutOverrides {
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub spacing_x: Option<f64>,
    pub spacing_y: Option<f64>,
}

impl LayoutOverrides {
    /// Layer `other` on top of `self`; fields set in `other` win.
    #[must_use]
    pub fn merged(self, other: &LayoutOverrides) -> Self {
        Self {
            start_x: other.start_x.or(self.start_x),
            start_y: other.start_y.or(self.start_y),
            node_width: other.node_width.or(self.node_width),
            node_height: other.node_height.or(self.node_height),
            spacing_x: other.spacing_x.or(self.spacing_x),
            spacing_y: other.spacing_y.or(self.spacing_y),
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

/// Axis-aligned rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Smallest rectangle covering all of `rects`, or `None` when empty.
    pub fn union<'a>(rects: impl IntoIterator<Item = &'a Rect>) -> Option<Rect> {
        rects.into_iter().fold(None, |acc: Option<Rect>, r| {
            Some(match acc {
                None => *r,
                Some(a) => {
                    let x = a.x.min(r.x);
                    let y = a.y.min(r.y);
                    Rect { x, y, width: a.right().max(r.right()) - x, height: a.bottom().max(r.bottom()) - y }
                }
            })
        })
    }
}

/// A labeled container: a flowchart subgraph or a sequence lifeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedFrame {
    pub title: String,
    pub rect: Rect,
    /// Indices into [`PositionedDiagram::nodes`] drawn inside this frame.
    pub members: Vec<usize>,
}

/// A diagram with geometry attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedDiagram {
    pub diagram: Diagram,
    /// One rect per flowchart node or sequence participant, in declaration order.
    pub nodes: Vec<Rect>,
    pub frames: Vec<PositionedFrame>,
    /// Y coordinate of each sequence message row; empty for flowcharts.
    pub rows: Vec<f64>,
    pub width: f64,
    pub height: f64,
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Position every node, group and message row of `diagram`.
#[must_use]
pub fn layout(diagram: Diagram, config: &LayoutConfig) -> PositionedDiagram {
    let (nodes, frames, rows, bounds) = match &diagram {
        Diagram::Flow(graph) => {
            let nodes = layout_flow(graph, config);
            let frames = subgraph_frames(graph, &nodes);
            let bounds = Rect::union(&nodes);
            (nodes, frames, Vec::new(), bounds)
        }
        Diagram::Sequence(seq) => layout_sequence(seq, config),
    };

    let bounds = bounds.unwrap_or_default();
    PositionedDiagram { diagram, nodes, frames, rows, width: bounds.width, height: bounds.height }
}

// =============================================================================
// FLOWCHART
// =============================================================================

/// Breadth-first depth from every root. First depth assigned wins; nodes never
/// reached (pure cycles) sit at depth 0.
fn depths(graph: &FlowGraph) -> Vec<usize> {
    let n = graph.nodes.len();
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut has_incoming = vec![false; n];

    for edge in &graph.edges {
        let (Some(from), Some(to)) = (graph.nodes.get_index_of(&edge.from), graph.nodes.get_index_of(&edge.to))
        else {
            continue;
        };
        outgoing[from].push(to);
        has_incoming[to] = true;
    }

    let mut depth: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();
    for (idx, _) in has_incoming.iter().enumerate().filter(|(_, incoming)| !**incoming) {
        depth[idx] = Some(0);
        queue.push_back(idx);
    }

    while let Some(node) = queue.pop_front() {
        let next = depth[node].unwrap_or(0) + 1;
        for &neighbor in &outgoing[node] {
            if depth[neighbor].is_none() {
                depth[neighbor] = Some(next);
                queue.push_back(neighbor);
            }
        }
    }

    depth.into_iter().map(|d| d.unwrap_or(0)).collect()
}

fn layout_flow(graph: &FlowGraph, config: &LayoutConfig) -> Vec<Rect> {
    let depth = depths(graph);
    let layer_count = depth.iter().max().map_or(0, |d| d + 1);

    // Declaration order within each layer.
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
    for (idx, &d) in depth.iter().enumerate() {
        layers[d].push(idx);
    }
    let widest = layers.iter().map(Vec::len).max().unwrap_or(0);

    let step_x = config.node_width + config.spacing_x;
    let step_y = config.node_height + config.spacing_y;
    let (depth_step, breadth_step) = match graph.direction {
        Direction::TopToBottom => (step_y, step_x),
        Direction::LeftToRight => (step_x, step_y),
    };

    let mut rects = vec![Rect::default(); graph.nodes.len()];
    for (layer_idx, layer) in layers.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let offset = (widest - layer.len()) as f64 * breadth_step / 2.0;
        #[allow(clippy::cast_precision_loss)]
        let along_depth = layer_idx as f64 * depth_step;

        for (slot, &node) in layer.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let along_breadth = offset + slot as f64 * breadth_step;
            let (dx, dy) = match graph.direction {
                Direction::TopToBottom => (along_breadth, along_depth),
                Direction::LeftToRight => (along_depth, along_breadth),
            };
            rects[node] = Rect {
                x: config.start_x + dx,
                y: config.start_y + dy,
                width: config.node_width,
                height: config.node_height,
            };
        }
    }

    rects
}

fn subgraph_frames(graph: &FlowGraph, nodes: &[Rect]) -> Vec<PositionedFrame> {
    graph
        .subgraphs
        .iter()
        .filter_map(|sg| {
            let members: Vec<usize> = sg
                .nodes
                .iter()
                .filter_map(|id| graph.nodes.get_index_of(id))
                .collect();
            let inner = Rect::union(members.iter().map(|&i| &nodes[i]))?;
            let rect = Rect {
                x: inner.x - FRAME_PADDING,
                y: inner.y - FRAME_PADDING - FRAME_TITLE_HEIGHT,
                width: inner.width + 2.0 * FRAME_PADDING,
                height: inner.height + 2.0 * FRAME_PADDING + FRAME_TITLE_HEIGHT,
            };
            Some(PositionedFrame { title: sg.title.clone(), rect, members })
        })
        .collect()
}

// =============================================================================
// SEQUENCE
// =============================================================================

type SequenceLayout = (Vec<Rect>, Vec<PositionedFrame>, Vec<f64>, Option<Rect>);

fn layout_sequence(seq: &SequenceDiagram, config: &LayoutConfig) -> SequenceLayout {
    if seq.participants.is_empty() {
        return (Vec::new(), Vec::new(), Vec::new(), None);
    }

    let column_step = config.node_width + config.spacing_x;
    let header_bottom = config.start_y + config.node_height;

    let rows: Vec<f64> = (0..seq.messages.len())
        .map(|j| {
            #[allow(clippy::cast_precision_loss)]
            let row = j as f64 + 0.5;
            header_bottom + row * config.spacing_y
        })
        .collect();

    #[allow(clippy::cast_precision_loss)]
    let lifeline_bottom = header_bottom + seq.messages.len().max(1) as f64 * config.spacing_y;

    let mut nodes = Vec::with_capacity(seq.participants.len());
    let mut frames = Vec::with_capacity(seq.participants.len());
    for (i, participant) in seq.participants.values().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let column_x = config.start_x + i as f64 * column_step;

        let header = match participant.kind {
            ParticipantKind::Participant => {
                Rect { x: column_x, y: config.start_y, width: config.node_width, height: config.node_height }
            }
            ParticipantKind::Actor => {
                let side = config.node_height.min(config.node_width);
                Rect { x: column_x + (config.node_width - side) / 2.0, y: config.start_y, width: side, height: side }
            }
        };
        nodes.push(header);

        frames.push(PositionedFrame {
            title: participant.label.clone(),
            rect: Rect {
                x: column_x,
                y: config.start_y,
                width: config.node_width,
                height: lifeline_bottom - config.start_y,
            },
            members: vec![i],
        });
    }

    let bounds = Rect::union(frames.iter().map(|f| &f.rect));
    (nodes, frames, rows, bounds)
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
