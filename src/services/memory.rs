//! In-process canvas. Used by the CLI and as a realistic collaborator in tests.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use super::canvas::{CanvasError, CanvasService, CreateBox, CreateLine};
use crate::mermaid::convert::ContainerRequest;

/// One item as it landed on the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CanvasItem {
    Container { id: String, board_id: String, request: ContainerRequest },
    Shape { id: String, board_id: String, request: CreateBox },
    Line { id: String, board_id: String, request: CreateLine },
}

impl CanvasItem {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Container { id, .. } | Self::Shape { id, .. } | Self::Line { id, .. } => id,
        }
    }
}

/// Board contents keyed by nothing but insertion order.
///
/// Rejects what a real board would: non-positive sizes, unknown parents, and
/// lines whose endpoints do not exist.
#[derive(Debug, Default)]
pub struct MemoryCanvas {
    inner: Mutex<Board>,
}

#[derive(Debug, Default)]
struct Board {
    items: Vec<CanvasItem>,
    containers: HashSet<String>,
    shapes: HashSet<String>,
}

impl MemoryCanvas {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything created so far, in creation order.
    ///
    /// A lock poisoned by a panicking writer still yields the items recorded
    /// before the panic.
    #[must_use]
    pub fn items(&self) -> Vec<CanvasItem> {
        let board = self.inner.lock().unwrap_or_else(|poisoned| {
            warn!("memory canvas: board lock poisoned, reading last state");
            poisoned.into_inner()
        });
        board.items.clone()
    }

    fn with_board<T>(&self, f: impl FnOnce(&mut Board) -> Result<T, CanvasError>) -> Result<T, CanvasError> {
        let mut board = self
            .inner
            .lock()
            .map_err(|_| CanvasError::Unavailable("board state poisoned".into()))?;
        f(&mut board)
    }
}

fn check_size(width: f64, height: f64) -> Result<(), CanvasError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(CanvasError::Rejected(format!("invalid size {width}x{height}")))
    }
}

fn check_board(board_id: &str) -> Result<(), CanvasError> {
    if board_id.trim().is_empty() {
        return Err(CanvasError::BoardNotFound(board_id.to_owned()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl CanvasService for MemoryCanvas {
    async fn create_box(&self, board_id: &str, request: &CreateBox) -> Result<String, CanvasError> {
        check_board(board_id)?;
        check_size(request.width, request.height)?;
        self.with_board(|board| {
            if let Some(parent) = &request.parent_id {
                if !board.containers.contains(parent) {
                    return Err(CanvasError::Rejected(format!("unknown parent {parent}")));
                }
            }
            let id = Uuid::new_v4().to_string();
            board.shapes.insert(id.clone());
            board
                .items
                .push(CanvasItem::Shape { id: id.clone(), board_id: board_id.to_owned(), request: request.clone() });
            Ok(id)
        })
    }

    async fn create_line(&self, board_id: &str, request: &CreateLine) -> Result<String, CanvasError> {
        check_board(board_id)?;
        self.with_board(|board| {
            for endpoint in [&request.from_id, &request.to_id] {
                if !board.shapes.contains(endpoint) {
                    return Err(CanvasError::Rejected(format!("unknown endpoint {endpoint}")));
                }
            }
            let id = Uuid::new_v4().to_string();
            board
                .items
                .push(CanvasItem::Line { id: id.clone(), board_id: board_id.to_owned(), request: request.clone() });
            Ok(id)
        })
    }

    async fn create_container(&self, board_id: &str, request: &ContainerRequest) -> Result<String, CanvasError> {
        check_board(board_id)?;
        check_size(request.width, request.height)?;
        self.with_board(|board| {
            let id = Uuid::new_v4().to_string();
            board.containers.insert(id.clone());
            board.items.push(CanvasItem::Container {
                id: id.clone(),
                board_id: board_id.to_owned(),
                request: request.clone(),
            });
            Ok(id)
        })
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
