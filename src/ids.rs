// Fresh id generation for columns and tasks

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// What an id is being generated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Column,
    Task,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Column => "column",
            IdKind::Task => "task",
        }
    }
}

/// Source of new ids
///
/// Implementations only need to be unique in practice; the store re-draws
/// any id already present on the board.
pub trait IdSource: Send + Sync {
    fn next_id(&self, kind: IdKind) -> String;
}

/// Time-ordered UUIDv7 ids, e.g. `task-0192b6f0-...`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&self, kind: IdKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::now_v7())
    }
}

/// Deterministic `column-N` / `task-N` ids, counted per kind from 1
#[derive(Debug)]
pub struct SequentialIds {
    columns: AtomicU64,
    tasks: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            columns: AtomicU64::new(first),
            tasks: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIds {
    fn next_id(&self, kind: IdKind) -> String {
        let counter = match kind {
            IdKind::Column => &self.columns,
            IdKind::Task => &self.tasks,
        };
        let n = counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", kind.prefix(), n)
    }
}
