//! Canvas seam: the three creation calls diagram generation needs.
//!
//! Transport and retry policy live behind this trait.
//! Every call stands alone: it either yields the new item's id or an error
//! scoped to that one item.

use serde::Serialize;

use crate::ErrorCode;
use crate::mermaid::ast::{ArrowCap, ConnectorStyle, NodeShapeKind};
use crate::mermaid::convert::{ContainerRequest, LineRouting};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanvasError {
    #[error("board not found: {0}")]
    BoardNotFound(String),
    #[error("canvas rejected item: {0}")]
    Rejected(String),
    #[error("canvas unavailable: {0}")]
    Unavailable(String),
}

impl ErrorCode for CanvasError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::BoardNotFound(_) => "E_BOARD_NOT_FOUND",
            Self::Rejected(_) => "E_CANVAS_REJECTED",
            Self::Unavailable(_) => "E_CANVAS_UNAVAILABLE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A shape to place. `x`/`y` are the shape's center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBox {
    pub shape: NodeShapeKind,
    /// Draw `shape` as a flowchart stencil instead of a basic shape.
    pub stencil: bool,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Option<String>,
    pub border_color: Option<String>,
    pub parent_id: Option<String>,
}

impl CreateBox {
    /// Shape name to send to the board.
    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        if self.stencil { self.shape.stencil_name() } else { self.shape.as_str() }
    }
}

/// A connector between two items that already exist on the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLine {
    pub from_id: String,
    pub to_id: String,
    pub label: Option<String>,
    pub style: ConnectorStyle,
    pub routing: LineRouting,
    pub start_cap: ArrowCap,
    pub end_cap: ArrowCap,
}

/// Board-side creation calls. Enables mocking in tests.
#[async_trait::async_trait]
pub trait CanvasService: Send + Sync {
    /// Create a shape and return its id.
    ///
    /// # Errors
    ///
    /// Returns a [`CanvasError`] if this one item could not be created.
    async fn create_box(&self, board_id: &str, request: &CreateBox) -> Result<String, CanvasError>;

    /// Create a connector between two existing items and return its id.
    ///
    /// # Errors
    ///
    /// Returns a [`CanvasError`] if this one item could not be created.
    async fn create_line(&self, board_id: &str, request: &CreateLine) -> Result<String, CanvasError>;

    /// Create a frame and return its id.
    ///
    /// # Errors
    ///
    /// Returns a [`CanvasError`] if this one item could not be created.
    async fn create_container(&self, board_id: &str, request: &ContainerRequest) -> Result<String, CanvasError>;
}
