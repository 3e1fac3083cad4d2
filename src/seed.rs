// Seed boards: the built-in sample and JSON/YAML seed files

use crate::board::{Board, Column, Task};
use eyre::{Context, Result, WrapErr, eyre};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The board a fresh session starts with when no seed file is given
pub fn sample_board() -> Board {
    let columns = [
        (
            "todo",
            "To Do",
            vec![
                ("task-1", "Research user requirements"),
                ("task-2", "Create wireframes"),
                ("task-3", "Design UI components"),
            ],
        ),
        (
            "in-progress",
            "In Progress",
            vec![
                ("task-4", "Implement drag and drop"),
                ("task-5", "Add column management"),
            ],
        ),
        (
            "done",
            "Done",
            vec![
                ("task-6", "Set up project"),
                ("task-7", "Configure CI/CD pipeline"),
                ("task-8", "Install dependencies"),
            ],
        ),
    ];

    let columns = columns
        .into_iter()
        .enumerate()
        .map(|(order, (id, title, tasks))| Column {
            id: id.to_string(),
            title: title.to_string(),
            order,
            tasks: tasks
                .into_iter()
                .enumerate()
                .map(|(i, (task_id, task_title))| Task::new(task_id, task_title, id, i))
                .collect(),
        })
        .collect();

    Board::new(columns)
}

/// Default seed location: `<config dir>/boardstore/board.yaml`
pub fn default_seed_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("boardstore").join("board.yaml"))
}

/// Read a seed board from a `.json`, `.yaml` or `.yml` file
///
/// The board is parsed only; call [`Board::check_invariants`] (or hand it to
/// [`crate::BoardStore::init`]) to validate it.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Board> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read seed file {}", path.display()))?;

    let board = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => parse_json(&content),
        Some("yaml") | Some("yml") => parse_yaml(&content),
        other => Err(eyre!(
            "Unsupported seed format {:?} for {} (expected .json, .yaml or .yml)",
            other.unwrap_or(""),
            path.display()
        )),
    }
    .with_context(|| format!("Failed to parse seed file {}", path.display()))?;

    info!(
        file = ?path,
        columns = board.column_count(),
        tasks = board.task_count(),
        "Loaded seed board"
    );
    Ok(board)
}

/// Check a seed board against the board invariants
pub fn validate(board: &Board) -> Result<()> {
    board.check_invariants().wrap_err("Board is invalid")
}

pub fn parse_json(content: &str) -> Result<Board> {
    serde_json::from_str(content).context("Invalid JSON board")
}

pub fn parse_yaml(content: &str) -> Result<Board> {
    serde_yaml::from_str(content).context("Invalid YAML board")
}

/// Rewrite ranks and ownership from the board's layout
///
/// Columns and tasks are stably sorted by their stored `order`, then given
/// dense ranks; every task's `column_id` is set to the column that holds it.
/// Ids are left alone, so duplicates still fail validation.
pub fn normalize(mut board: Board) -> Board {
    board.columns.sort_by_key(|c| c.order);
    for (i, column) in board.columns.iter_mut().enumerate() {
        column.order = i;
        column.tasks.sort_by_key(|t| t.order);
        for (j, task) in column.tasks.iter_mut().enumerate() {
            if task.column_id != column.id {
                debug!(task_id = %task.id, column_id = %column.id, "Reassigning task to containing column");
                task.column_id = column.id.clone();
            }
            task.order = j;
        }
    }
    board
}
