// Board data model, read accessors and snapshot transforms

use crate::command::Rejection;
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single card on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    /// Id of the column that currently owns this task
    pub column_id: String,
    /// Zero-based rank within the owning column
    pub order: usize,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, column_id: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            column_id: column_id.into(),
            order,
        }
    }
}

/// An ordered container of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    /// Zero-based rank among all columns
    pub order: usize,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    /// Create an empty column
    pub fn new(id: impl Into<String>, title: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            order,
            tasks: Vec::new(),
        }
    }

    /// Position of a task within this column, if it lives here
    pub fn position_of(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }

    fn rerank(&mut self) {
        for (i, task) in self.tasks.iter_mut().enumerate() {
            task.order = i;
        }
    }
}

/// Where a task sits on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskLocation {
    pub column_index: usize,
    pub task_index: usize,
}

/// Root aggregate holding every column
///
/// A `Board` is a plain value. The transform methods (`with_*`, `without_*`)
/// never touch `self`; they derive the next snapshot or return the reason the
/// command was declined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Board {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    // ========================================================================
    // Read model
    // ========================================================================

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// True when the board has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, id: &str) -> Option<&Column> {
        self.find_column(id).map(|(_, column)| column)
    }

    pub fn column_at(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Find a column by id, returning its index alongside it
    pub fn find_column(&self, id: &str) -> Option<(usize, &Column)> {
        self.columns.iter().enumerate().find(|(_, c)| c.id == id)
    }

    /// Locate a task anywhere on the board
    pub fn find_task(&self, id: &str) -> Option<TaskLocation> {
        self.columns.iter().enumerate().find_map(|(column_index, column)| {
            column.position_of(id).map(|task_index| TaskLocation {
                column_index,
                task_index,
            })
        })
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.find_task(id)
            .map(|loc| &self.columns[loc.column_index].tasks[loc.task_index])
    }

    /// True if any column or task already uses this id
    pub fn contains_id(&self, id: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.id == id || c.tasks.iter().any(|t| t.id == id))
    }

    /// Verify ordering, uniqueness and containment
    ///
    /// Returns an error describing the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let mut column_ids = HashSet::new();
        let mut task_ids = HashSet::new();

        for (i, column) in self.columns.iter().enumerate() {
            if column.order != i {
                return Err(eyre!(
                    "Column {} has order {} but sits at position {}",
                    column.id,
                    column.order,
                    i
                ));
            }
            if !column_ids.insert(column.id.as_str()) {
                return Err(eyre!("Duplicate column id: {}", column.id));
            }

            for (j, task) in column.tasks.iter().enumerate() {
                if task.order != j {
                    return Err(eyre!(
                        "Task {} in column {} has order {} but sits at position {}",
                        task.id,
                        column.id,
                        task.order,
                        j
                    ));
                }
                if task.column_id != column.id {
                    return Err(eyre!(
                        "Task {} is stored in column {} but claims column {}",
                        task.id,
                        column.id,
                        task.column_id
                    ));
                }
                if !task_ids.insert(task.id.as_str()) {
                    return Err(eyre!("Duplicate task id: {}", task.id));
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // Snapshot transforms
    // ========================================================================

    /// Append a new empty column
    ///
    /// `new_id` is only called once the title has been accepted.
    pub fn with_column(&self, title: &str, new_id: impl FnOnce() -> String) -> Result<Board, Rejection> {
        require_title(title)?;
        let id = new_id();
        if self.contains_id(&id) {
            return Err(Rejection::DuplicateId(id));
        }

        let mut next = self.clone();
        let order = next.columns.len();
        next.columns.push(Column::new(id, title, order));
        Ok(next)
    }

    /// Append a new task to the end of a column
    pub fn with_task(&self, column_id: &str, title: &str, new_id: impl FnOnce() -> String) -> Result<Board, Rejection> {
        let (column_index, _) = self
            .find_column(column_id)
            .ok_or_else(|| Rejection::ColumnNotFound(column_id.to_string()))?;
        require_title(title)?;
        let id = new_id();
        if self.contains_id(&id) {
            return Err(Rejection::DuplicateId(id));
        }

        let mut next = self.clone();
        let column = &mut next.columns[column_index];
        let order = column.tasks.len();
        column.tasks.push(Task::new(id, title, column_id, order));
        Ok(next)
    }

    /// Replace a task's title
    pub fn with_task_title(&self, task_id: &str, title: &str) -> Result<Board, Rejection> {
        let loc = self
            .find_task(task_id)
            .ok_or_else(|| Rejection::TaskNotFound(task_id.to_string()))?;
        require_title(title)?;

        let mut next = self.clone();
        next.columns[loc.column_index].tasks[loc.task_index].title = title.to_string();
        Ok(next)
    }

    /// Remove a task and close the gap it leaves in its column
    pub fn without_task(&self, task_id: &str) -> Result<Board, Rejection> {
        let loc = self
            .find_task(task_id)
            .ok_or_else(|| Rejection::TaskNotFound(task_id.to_string()))?;

        let mut next = self.clone();
        let column = &mut next.columns[loc.column_index];
        column.tasks.remove(loc.task_index);
        column.rerank();
        Ok(next)
    }

    /// Move a task to `new_index` in the target column
    ///
    /// The task is removed from the source first, so for a move within one
    /// column `new_index` counts positions after the removal. `new_index` is
    /// clamped to the end of the target sequence.
    pub fn with_task_moved(
        &self,
        task_id: &str,
        source_column_id: &str,
        target_column_id: &str,
        new_index: usize,
    ) -> Result<Board, Rejection> {
        let (source_index, source) = self
            .find_column(source_column_id)
            .ok_or_else(|| Rejection::ColumnNotFound(source_column_id.to_string()))?;
        let (target_index, _) = self
            .find_column(target_column_id)
            .ok_or_else(|| Rejection::ColumnNotFound(target_column_id.to_string()))?;
        let task_index = source.position_of(task_id).ok_or_else(|| {
            if self.find_task(task_id).is_some() {
                Rejection::TaskNotInColumn {
                    task_id: task_id.to_string(),
                    column_id: source_column_id.to_string(),
                }
            } else {
                Rejection::TaskNotFound(task_id.to_string())
            }
        })?;

        let mut next = self.clone();

        let source = &mut next.columns[source_index];
        let mut task = source.tasks.remove(task_index);
        source.rerank();

        task.column_id = target_column_id.to_string();
        let target = &mut next.columns[target_index];
        let at = new_index.min(target.tasks.len());
        target.tasks.insert(at, task);
        target.rerank();

        Ok(next)
    }

    /// Move the column at `source_index` so it ends up at `target_index`
    pub fn with_column_moved(&self, source_index: usize, target_index: usize) -> Result<Board, Rejection> {
        let len = self.columns.len();
        for index in [source_index, target_index] {
            if index >= len {
                return Err(Rejection::IndexOutOfRange { index, len });
            }
        }

        let mut next = self.clone();
        let column = next.columns.remove(source_index);
        next.columns.insert(target_index, column);
        for (i, column) in next.columns.iter_mut().enumerate() {
            column.order = i;
        }
        Ok(next)
    }
}

fn require_title(title: &str) -> Result<(), Rejection> {
    if title.trim().is_empty() {
        return Err(Rejection::BlankTitle);
    }
    Ok(())
}
