//! tackboard-core library.
//!
//! An ordered kanban board: tasks live in columns, and every column's task
//! order stays dense (`0..N-1`) across reorders, moves, creation and
//! deletion.
//!
//! # Conventions
//!
//! - **Errors**: board operations return [`error::BoardError`]; storage and
//!   config plumbing use `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub mod board;
pub mod config;
pub mod db;
pub mod error;
pub mod lock;
pub mod model;
pub mod ordering;
pub mod store;

pub use board::{ActionResult, MoveOutcome, MoveRequest, ReorderOutcome, TaskBoard};
pub use error::{BoardError, ErrorCode};
pub use store::{BoardStore, MemoryStore};
