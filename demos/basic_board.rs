//! Demo: Basic Board Operations
//!
//! This demo walks through every board command against the sample board,
//! printing the board after each step.
//!
//! Run with: cargo run --example basic_board

use boardstore::{BoardStore, SequentialIds, render, seed};
use eyre::Result;

fn main() -> Result<()> {
    println!("BoardStore Basic Example");
    println!("========================\n");

    let store = BoardStore::with_ids(seed::sample_board(), SequentialIds::starting_at(100))?;
    print!("{}", render::to_text(&store.snapshot()));
    println!();

    println!("1. ADD COLUMN - \"Review\"");
    store.add_column("Review");
    let review_id = store.snapshot().column_at(3).map(|c| c.id.clone()).unwrap_or_default();
    println!("   New column id: {}\n", review_id);

    println!("2. ADD TASK - \"Check accessibility\" to Review");
    store.add_task(&review_id, "Check accessibility");

    println!("3. EDIT TASK - task-2 becomes \"Create hi-fi wireframes\"");
    store.edit_task_title("task-2", "Create hi-fi wireframes");

    println!("4. MOVE TASK - task-4 from In Progress to the top of Done");
    store.move_task("task-4", "in-progress", "done", 0);

    println!("5. DELETE TASK - task-8");
    store.delete_task("task-8");

    println!("6. MOVE COLUMN - Review to the front");
    store.move_column(3, 0);

    println!("7. INVALID COMMANDS - all ignored");
    let ignored = [
        store.add_column("   "),
        store.add_task("nonexistent-column", "X"),
        store.delete_task("task-999"),
        store.move_column(0, 42),
    ];
    println!("   applied: {:?}\n", ignored);

    let board = store.snapshot();
    println!("Final board (revision {}):", store.revision());
    print!("{}", render::to_text(&board));

    board.check_invariants()?;
    println!("\nAll invariants hold.");

    Ok(())
}
