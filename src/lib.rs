// BoardStore - In-memory kanban board with invariant-preserving snapshots

pub mod board;
pub mod command;
pub mod ids;
pub mod jsonl;
pub mod render;
pub mod seed;
pub mod store;

// Re-export main types for convenience
pub use board::{Board, Column, Task, TaskLocation};
pub use command::{Command, Rejection};
pub use ids::{IdKind, IdSource, SequentialIds, UuidIds};
pub use store::{BoardCommands, BoardStore};
