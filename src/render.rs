// Terminal and machine-readable views of a board snapshot

use crate::board::Board;
use colored::Colorize;
use eyre::{Context, Result};
use std::fmt::{self, Write};

/// Render a board as indented text, one column header per block
///
/// ```text
/// [0] To Do (todo) - 2 tasks
///     0. Research user requirements  task-1
///     1. Create wireframes  task-2
/// ```
pub fn to_text(board: &Board) -> String {
    let mut out = String::new();
    write_text(&mut out, board).expect("writing to a String cannot fail");
    out
}

fn write_text(out: &mut impl Write, board: &Board) -> fmt::Result {
    if board.is_empty() {
        return writeln!(out, "{}", "(empty board)".dimmed());
    }

    for column in &board.columns {
        let count = match column.tasks.len() {
            1 => "1 task".to_string(),
            n => format!("{} tasks", n),
        };
        writeln!(
            out,
            "[{}] {} ({}) - {}",
            column.order,
            column.title.bold(),
            column.id.cyan(),
            count
        )?;
        for task in &column.tasks {
            writeln!(out, "    {}. {}  {}", task.order, task.title, task.id.dimmed())?;
        }
    }

    Ok(())
}

pub fn to_json(board: &Board) -> Result<String> {
    serde_json::to_string_pretty(board).context("Failed to serialize board as JSON")
}

pub fn to_yaml(board: &Board) -> Result<String> {
    serde_yaml::to_string(board).context("Failed to serialize board as YAML")
}
