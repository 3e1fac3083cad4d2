// Board commands and the reasons a command can be declined

use serde::{Deserialize, Serialize};

/// A single board mutation
///
/// Serialized with an `op` tag so command scripts stay readable:
/// `{"op":"add_task","column_id":"todo","title":"Write tests"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    AddColumn {
        title: String,
    },
    AddTask {
        column_id: String,
        title: String,
    },
    EditTaskTitle {
        task_id: String,
        title: String,
    },
    DeleteTask {
        task_id: String,
    },
    MoveTask {
        task_id: String,
        source_column_id: String,
        target_column_id: String,
        new_index: usize,
    },
    MoveColumn {
        source_index: usize,
        target_index: usize,
    },
}

impl Command {
    /// Short operation name, matching the serialized `op` tag
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddColumn { .. } => "add_column",
            Command::AddTask { .. } => "add_task",
            Command::EditTaskTitle { .. } => "edit_task_title",
            Command::DeleteTask { .. } => "delete_task",
            Command::MoveTask { .. } => "move_task",
            Command::MoveColumn { .. } => "move_column",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::AddColumn { title } => write!(f, "add column {:?}", title),
            Command::AddTask { column_id, title } => write!(f, "add task {:?} to {}", title, column_id),
            Command::EditTaskTitle { task_id, title } => write!(f, "rename {} to {:?}", task_id, title),
            Command::DeleteTask { task_id } => write!(f, "delete {}", task_id),
            Command::MoveTask {
                task_id,
                source_column_id,
                target_column_id,
                new_index,
            } => write!(
                f,
                "move {} from {} to {} at {}",
                task_id, source_column_id, target_column_id, new_index
            ),
            Command::MoveColumn {
                source_index,
                target_index,
            } => write!(f, "move column {} to {}", source_index, target_index),
        }
    }
}

/// Why a command left the board unchanged
///
/// Only ever logged; the command surface reports a plain applied/unchanged
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    BlankTitle,
    ColumnNotFound(String),
    TaskNotFound(String),
    TaskNotInColumn { task_id: String, column_id: String },
    IndexOutOfRange { index: usize, len: usize },
    DuplicateId(String),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::BlankTitle => write!(f, "title is blank"),
            Rejection::ColumnNotFound(id) => write!(f, "column not found: {}", id),
            Rejection::TaskNotFound(id) => write!(f, "task not found: {}", id),
            Rejection::TaskNotInColumn { task_id, column_id } => {
                write!(f, "task {} is not in column {}", task_id, column_id)
            }
            Rejection::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for {} columns", index, len)
            }
            Rejection::DuplicateId(id) => write!(f, "id already in use: {}", id),
        }
    }
}
