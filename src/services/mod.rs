//! Services that drive a remote canvas.
//!
//! ARCHITECTURE
//! ============
//! `canvas` defines the seam to the board service, `memory` is an in-process
//! implementation of it, and `diagram` orchestrates a full generation run
//! on top of whichever implementation it is handed.

pub mod canvas;
pub mod diagram;
pub mod memory;
