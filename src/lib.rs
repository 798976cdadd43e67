//! boardgram: Mermaid diagrams to whiteboard objects.
//!
//! ARCHITECTURE
//! ============
//! `parse → layout → convert` is a pure pipeline over owned values. The
//! orchestrator in `services::diagram` is the only stage that talks to the
//! outside world, through the `CanvasService` trait.

pub mod config;
pub mod error;
pub mod mermaid;
pub mod services;

pub use error::ErrorCode;
