//! Diagram service: Mermaid text → layout → frames, shapes and connectors on a board.
//!
//! DESIGN
//! ======
//! Fatal problems (missing board, unparsable text) are returned before the
//! first canvas call. After that nothing fails the run: each creation call
//! yields an `Outcome`, failures are logged and skipped, and the result
//! reports what actually landed.
//!
//! Phases run strictly containers → boxes → lines. Within a phase up to
//! `concurrency` calls are in flight, but results are collected in emission
//! order, so the index → id maps are deterministic and complete before the
//! next phase reads them.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use futures::{StreamExt, stream};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::canvas::{CanvasService, CreateBox, CreateLine};
use crate::ErrorCode;
use crate::config::DiagramConfig;
use crate::mermaid::convert::{ConvertOptions, ConvertedDiagram};
use crate::mermaid::{self, LayoutOverrides, ParseError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagramError {
    #[error("board_id is required")]
    MissingBoard,
    #[error("failed to parse diagram: {0}")]
    Parse(#[from] ParseError),
}

impl ErrorCode for DiagramError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingBoard => "E_MISSING_BOARD",
            Self::Parse(e) => e.error_code(),
        }
    }
}

/// A request to draw Mermaid text onto a board.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateDiagramRequest {
    pub board_id: String,
    pub diagram: String,
    pub start_x: Option<f64>,
    pub start_y: Option<f64>,
    pub node_width: Option<f64>,
    /// Frame to place top-level shapes in.
    pub parent_id: Option<String>,
    /// Draw flowchart nodes as flowchart stencils.
    #[serde(default)]
    pub use_stencils: bool,
}

impl GenerateDiagramRequest {
    fn overrides(&self) -> LayoutOverrides {
        LayoutOverrides {
            start_x: self.start_x,
            start_y: self.start_y,
            node_width: self.node_width,
            ..LayoutOverrides::default()
        }
    }
}

/// What a run actually created.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiagramCreationResult {
    pub nodes_created: usize,
    pub connectors_created: usize,
    pub frames_created: usize,
    pub node_ids: Vec<String>,
    pub connector_ids: Vec<String>,
    pub frame_ids: Vec<String>,
    pub diagram_width: f64,
    pub diagram_height: f64,
    pub message: String,
    /// The run stopped early on cancellation or deadline.
    pub cancelled: bool,
}

/// Cloneable stop flag shared between a run and whoever may abort it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Parent for boxes that belong to no diagram frame.
    pub parent_id: Option<String>,
    pub concurrency: usize,
    pub cancel: CancelToken,
    pub deadline: Option<Instant>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self { parent_id: None, concurrency: 1, cancel: CancelToken::default(), deadline: None }
    }
}

impl RunOptions {
    fn should_stop(&self) -> bool {
        self.cancel.is_cancelled() || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Per-item result of one creation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    Created(String),
    Failed,
    /// A line whose endpoint box was never created.
    Unresolved,
    /// Not attempted because the run was stopped.
    Stopped,
}

impl Outcome {
    fn id(&self) -> Option<String> {
        match self {
            Self::Created(id) => Some(id.clone()),
            Self::Failed | Self::Unresolved | Self::Stopped => None,
        }
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

/// Parse, lay out and create `request.diagram` on `request.board_id`.
///
/// Layout overrides come from `config` first, then from the request.
///
/// # Errors
///
/// Returns [`DiagramError`] for a blank board id or unparsable text. Canvas
/// failures never surface here; they are reflected in the result counts.
pub async fn generate_diagram(
    canvas: &dyn CanvasService,
    request: &GenerateDiagramRequest,
    config: &DiagramConfig,
    cancel: CancelToken,
) -> Result<DiagramCreationResult, DiagramError> {
    if request.board_id.trim().is_empty() {
        return Err(DiagramError::MissingBoard);
    }

    let overrides = config.layout.merged(&request.overrides());
    let convert_options = ConvertOptions { use_stencils: request.use_stencils };
    let converted = mermaid::compile_with(&request.diagram, &overrides, &convert_options)?;

    let options = RunOptions {
        parent_id: request.parent_id.clone(),
        concurrency: config.create_concurrency,
        cancel,
        deadline: deadline_after(config.create_timeout),
    };
    Ok(run(canvas, &request.board_id, &converted, &options).await)
}

/// Create every request in `converted`, tolerating per-item failure.
pub async fn run(
    canvas: &dyn CanvasService,
    board_id: &str,
    converted: &ConvertedDiagram,
    options: &RunOptions,
) -> DiagramCreationResult {
    info!(
        %board_id,
        containers = converted.containers.len(),
        boxes = converted.boxes.len(),
        lines = converted.lines.len(),
        "diagram: creating"
    );

    let frames = create_phase(&converted.containers, options, |idx, request| async move {
        match canvas.create_container(board_id, request).await {
            Ok(id) => Outcome::Created(id),
            Err(e) => {
                warn!(index = idx, error = %e, "diagram: create frame failed");
                Outcome::Failed
            }
        }
    })
    .await;
    let frame_ids: Vec<Option<String>> = frames.iter().map(Outcome::id).collect();

    let shapes = create_phase(&converted.boxes, options, |idx, request| {
        let parent_id = match request.container {
            Some(container) => frame_ids.get(container).cloned().flatten(),
            None => options.parent_id.clone(),
        };
        let create = CreateBox {
            shape: request.shape,
            stencil: request.stencil,
            label: request.label.clone(),
            x: request.x,
            y: request.y,
            width: request.width,
            height: request.height,
            color: request.color.clone(),
            border_color: request.border_color.clone(),
            parent_id,
        };
        async move {
            match canvas.create_box(board_id, &create).await {
                Ok(id) => Outcome::Created(id),
                Err(e) => {
                    warn!(index = idx, label = %create.label, error = %e, "diagram: create shape failed");
                    Outcome::Failed
                }
            }
        }
    })
    .await;
    let shape_ids: Vec<Option<String>> = shapes.iter().map(Outcome::id).collect();

    let connectors = create_phase(&converted.lines, options, |idx, request| {
        let endpoints = shape_ids
            .get(request.from)
            .cloned()
            .flatten()
            .zip(shape_ids.get(request.to).cloned().flatten());
        async move {
            let Some((from_id, to_id)) = endpoints else {
                debug!(index = idx, from = request.from, to = request.to, "diagram: connector endpoint missing");
                return Outcome::Unresolved;
            };
            let create = CreateLine {
                from_id,
                to_id,
                label: request.label.clone(),
                style: request.style,
                routing: request.routing,
                start_cap: request.start_cap,
                end_cap: request.end_cap,
            };
            match canvas.create_line(board_id, &create).await {
                Ok(id) => Outcome::Created(id),
                Err(e) => {
                    warn!(index = idx, error = %e, "diagram: create connector failed");
                    Outcome::Failed
                }
            }
        }
    })
    .await;

    let cancelled = [&frames, &shapes, &connectors]
        .iter()
        .any(|phase| phase.contains(&Outcome::Stopped));
    let frame_ids = created(&frames);
    let node_ids = created(&shapes);
    let connector_ids = created(&connectors);
    let message = summary_message(node_ids.len(), connector_ids.len(), frame_ids.len());

    info!(
        %board_id,
        nodes = node_ids.len(),
        connectors = connector_ids.len(),
        frames = frame_ids.len(),
        cancelled,
        "diagram: {message}"
    );

    DiagramCreationResult {
        nodes_created: node_ids.len(),
        connectors_created: connector_ids.len(),
        frames_created: frame_ids.len(),
        node_ids,
        connector_ids,
        frame_ids,
        diagram_width: converted.width,
        diagram_height: converted.height,
        message,
        cancelled,
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Run `create` for every item, at most `options.concurrency` at a time,
/// returning outcomes in item order. Items reached after a stop are skipped.
async fn create_phase<'a, T, F, Fut>(items: &'a [T], options: &RunOptions, create: F) -> Vec<Outcome>
where
    F: Fn(usize, &'a T) -> Fut,
    Fut: Future<Output = Outcome>,
{
    let create = &create;
    stream::iter(items.iter().enumerate())
        .map(|(idx, item)| async move {
            if options.should_stop() {
                return Outcome::Stopped;
            }
            create(idx, item).await
        })
        .buffered(options.concurrency.max(1))
        .collect()
        .await
}

/// `None` when there is no timeout or it reaches past what `Instant` can hold.
fn deadline_after(timeout: Option<Duration>) -> Option<Instant> {
    timeout.and_then(|timeout| Instant::now().checked_add(timeout))
}

fn created(outcomes: &[Outcome]) -> Vec<String> {
    outcomes.iter().filter_map(Outcome::id).collect()
}

/// Human-readable summary naming only the non-zero counts.
fn summary_message(nodes: usize, connectors: usize, frames: usize) -> String {
    let parts: Vec<String> = [(nodes, "nodes"), (connectors, "connectors"), (frames, "frames")]
        .into_iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, noun)| format!("{count} {noun}"))
        .collect();

    if parts.is_empty() {
        "No diagram items were created".to_owned()
    } else {
        format!("Created diagram with {}", parts.join(", "))
    }
}

#[cfg(test)]
#[path = "diagram_test.rs"]
mod tests;
