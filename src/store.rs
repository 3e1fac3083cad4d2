// Board store: single-writer owner of the current board snapshot

use crate::board::Board;
use crate::command::{Command, Rejection};
use crate::ids::{IdKind, IdSource, UuidIds};
use eyre::{Context, Result};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tracing::{debug, info};

const MAX_ID_DRAWS: usize = 64;

/// Owns the board for the lifetime of the process
///
/// Every accepted command derives a new `Board` from the current one and
/// publishes it as a fresh `Arc`, so a snapshot handed out by [`snapshot`]
/// never changes underneath its reader. Mutations hold the write lock while
/// they derive and publish, which makes the store the one writer.
///
/// [`snapshot`]: BoardStore::snapshot
pub struct BoardStore {
    current: RwLock<Published>,
    ids: Box<dyn IdSource>,
}

struct Published {
    board: Arc<Board>,
    revision: u64,
}

impl BoardStore {
    /// Take ownership of the seed board, generating UUIDv7 ids
    pub fn init(seed: Board) -> Result<Self> {
        Self::with_ids(seed, UuidIds)
    }

    /// Take ownership of the seed board with a custom id source
    ///
    /// Fails if the seed breaks any board invariant.
    pub fn with_ids<I: IdSource + 'static>(seed: Board, ids: I) -> Result<Self> {
        seed.check_invariants().context("Seed board is not valid")?;

        info!(
            columns = seed.column_count(),
            tasks = seed.task_count(),
            "Board store initialized"
        );

        Ok(Self {
            current: RwLock::new(Published {
                board: Arc::new(seed),
                revision: 0,
            }),
            ids: Box::new(ids),
        })
    }

    /// Current board snapshot
    pub fn snapshot(&self) -> Arc<Board> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current.board)
    }

    /// Number of snapshots published since init
    pub fn revision(&self) -> u64 {
        self.current.read().unwrap_or_else(PoisonError::into_inner).revision
    }

    /// Apply a command, returning true if a new snapshot was published
    ///
    /// Commands that reference unknown ids, use out-of-range indices or carry
    /// a blank title leave the board untouched, as do commands whose result is
    /// identical to the current board.
    pub fn apply(&self, command: &Command) -> bool {
        let mut current = self.write();
        let board = Arc::clone(&current.board);

        match self.derive(&board, command) {
            Ok(next) if next == *board => {
                debug!(command = command.name(), "Command left board unchanged");
                false
            }
            Ok(next) => {
                current.board = Arc::new(next);
                current.revision += 1;
                debug!(
                    command = command.name(),
                    revision = current.revision,
                    "Published board snapshot"
                );
                true
            }
            Err(rejection) => {
                debug!(command = command.name(), %rejection, "Command declined");
                false
            }
        }
    }

    /// Apply commands in order, returning how many published a snapshot
    pub fn apply_all<'a>(&self, commands: impl IntoIterator<Item = &'a Command>) -> usize {
        commands.into_iter().filter(|command| self.apply(command)).count()
    }

    pub fn add_column(&self, title: &str) -> bool {
        self.apply(&Command::AddColumn {
            title: title.to_string(),
        })
    }

    pub fn add_task(&self, column_id: &str, title: &str) -> bool {
        self.apply(&Command::AddTask {
            column_id: column_id.to_string(),
            title: title.to_string(),
        })
    }

    pub fn edit_task_title(&self, task_id: &str, title: &str) -> bool {
        self.apply(&Command::EditTaskTitle {
            task_id: task_id.to_string(),
            title: title.to_string(),
        })
    }

    pub fn delete_task(&self, task_id: &str) -> bool {
        self.apply(&Command::DeleteTask {
            task_id: task_id.to_string(),
        })
    }

    /// Move a task; `new_index` is its final position in the target column
    pub fn move_task(&self, task_id: &str, source_column_id: &str, target_column_id: &str, new_index: usize) -> bool {
        self.apply(&Command::MoveTask {
            task_id: task_id.to_string(),
            source_column_id: source_column_id.to_string(),
            target_column_id: target_column_id.to_string(),
            new_index,
        })
    }

    pub fn move_column(&self, source_index: usize, target_index: usize) -> bool {
        self.apply(&Command::MoveColumn {
            source_index,
            target_index,
        })
    }

    // ========================================================================
    // Helper methods
    // ========================================================================

    fn derive(&self, board: &Board, command: &Command) -> Result<Board, Rejection> {
        match command {
            Command::AddColumn { title } => board.with_column(title, || self.fresh_id(board, IdKind::Column)),
            Command::AddTask { column_id, title } => {
                board.with_task(column_id, title, || self.fresh_id(board, IdKind::Task))
            }
            Command::EditTaskTitle { task_id, title } => board.with_task_title(task_id, title),
            Command::DeleteTask { task_id } => board.without_task(task_id),
            Command::MoveTask {
                task_id,
                source_column_id,
                target_column_id,
                new_index,
            } => board.with_task_moved(task_id, source_column_id, target_column_id, *new_index),
            Command::MoveColumn {
                source_index,
                target_index,
            } => board.with_column_moved(*source_index, *target_index),
        }
    }

    /// Draw ids until one is unused on this board
    ///
    /// Gives up after `MAX_ID_DRAWS` attempts and returns the last id drawn,
    /// which the board transform then declines as a duplicate.
    fn fresh_id(&self, board: &Board, kind: IdKind) -> String {
        let mut id = self.ids.next_id(kind);
        for _ in 1..MAX_ID_DRAWS {
            if !board.contains_id(&id) {
                return id;
            }
            debug!(id = %id, "Generated id already on board, drawing another");
            id = self.ids.next_id(kind);
        }
        id
    }

    // The guarded value is only ever replaced whole, so a poisoned lock still
    // holds a consistent snapshot.
    fn write(&self) -> RwLockWriteGuard<'_, Published> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoardStore")
            .field("revision", &self.revision())
            .field("board", &self.snapshot())
            .finish_non_exhaustive()
    }
}

/// The command surface offered to presentation code
///
/// Methods return futures so a networked backend can stand in for the
/// in-memory store without touching callers. [`BoardStore`] never suspends:
/// each future is ready on its first poll.
pub trait BoardCommands {
    fn add_column(&self, title: &str) -> impl Future<Output = bool> + Send;

    fn add_task(&self, column_id: &str, title: &str) -> impl Future<Output = bool> + Send;

    fn edit_task_title(&self, task_id: &str, title: &str) -> impl Future<Output = bool> + Send;

    fn delete_task(&self, task_id: &str) -> impl Future<Output = bool> + Send;

    fn move_task(
        &self,
        task_id: &str,
        source_column_id: &str,
        target_column_id: &str,
        new_index: usize,
    ) -> impl Future<Output = bool> + Send;

    fn move_column(&self, source_index: usize, target_index: usize) -> impl Future<Output = bool> + Send;

    fn get_board(&self) -> impl Future<Output = Arc<Board>> + Send;
}

impl BoardCommands for BoardStore {
    async fn add_column(&self, title: &str) -> bool {
        BoardStore::add_column(self, title)
    }

    async fn add_task(&self, column_id: &str, title: &str) -> bool {
        BoardStore::add_task(self, column_id, title)
    }

    async fn edit_task_title(&self, task_id: &str, title: &str) -> bool {
        BoardStore::edit_task_title(self, task_id, title)
    }

    async fn delete_task(&self, task_id: &str) -> bool {
        BoardStore::delete_task(self, task_id)
    }

    async fn move_task(&self, task_id: &str, source_column_id: &str, target_column_id: &str, new_index: usize) -> bool {
        BoardStore::move_task(self, task_id, source_column_id, target_column_id, new_index)
    }

    async fn move_column(&self, source_index: usize, target_index: usize) -> bool {
        BoardStore::move_column(self, source_index, target_index)
    }

    async fn get_board(&self) -> Arc<Board> {
        self.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Column, Task};
    use crate::ids::SequentialIds;
    use std::pin::pin;
    use std::task::{Context as TaskContext, Poll, Waker};

    fn column(id: &str, order: usize, task_ids: &[&str]) -> Column {
        let mut column = Column::new(id, id, order);
        column.tasks = task_ids
            .iter()
            .enumerate()
            .map(|(i, t)| Task::new(*t, *t, id, i))
            .collect();
        column
    }

    fn test_store() -> BoardStore {
        let seed = Board::new(vec![
            column("todo", 0, &["A", "B"]),
            column("in-progress", 1, &["X"]),
            column("done", 2, &["C"]),
        ]);
        BoardStore::with_ids(seed, SequentialIds::new()).unwrap()
    }

    fn column_order(board: &Board) -> Vec<(String, usize)> {
        board.columns.iter().map(|c| (c.id.clone(), c.order)).collect()
    }

    fn tasks(board: &Board, column_id: &str) -> Vec<(String, usize, String)> {
        board
            .column(column_id)
            .unwrap()
            .tasks
            .iter()
            .map(|t| (t.id.clone(), t.order, t.column_id.clone()))
            .collect()
    }

    #[test]
    fn test_init_rejects_invalid_seed() {
        let mut seed = Board::new(vec![column("todo", 0, &["A"])]);
        seed.columns[0].order = 1;

        let err = BoardStore::init(seed).unwrap_err();
        assert!(format!("{:#}", err).contains("Seed board is not valid"));
    }

    #[test]
    fn test_init_starts_at_revision_zero() {
        let store = test_store();
        assert_eq!(store.revision(), 0);
        assert_eq!(store.snapshot().column_count(), 3);
    }

    #[test]
    fn test_move_column_to_front() {
        let store = test_store();
        assert!(store.move_column(2, 0));

        let board = store.snapshot();
        assert_eq!(
            column_order(&board),
            vec![
                ("done".to_string(), 0),
                ("todo".to_string(), 1),
                ("in-progress".to_string(), 2)
            ]
        );
    }

    #[test]
    fn test_delete_task_reranks_column() {
        let store = test_store();
        assert!(store.delete_task("A"));

        let board = store.snapshot();
        assert_eq!(tasks(&board, "todo"), vec![("B".to_string(), 0, "todo".to_string())]);
    }

    #[test]
    fn test_move_task_between_columns() {
        let store = test_store();
        assert!(store.move_task("A", "todo", "done", 0));

        let board = store.snapshot();
        assert_eq!(tasks(&board, "todo"), vec![("B".to_string(), 0, "todo".to_string())]);
        assert_eq!(
            tasks(&board, "done"),
            vec![
                ("A".to_string(), 0, "done".to_string()),
                ("C".to_string(), 1, "done".to_string())
            ]
        );
    }

    #[test]
    fn test_add_task_to_unknown_column_is_noop() {
        let store = test_store();
        let before = store.snapshot();

        assert!(!store.add_task("nonexistent-column", "X"));

        let after = store.snapshot();
        assert_eq!(*after, *before);
        assert!(Arc::ptr_eq(&after, &before));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_add_blank_column_is_noop() {
        let store = test_store();
        assert!(!store.add_column(""));
        assert!(!store.add_column("   "));
        assert_eq!(store.snapshot().column_count(), 3);
    }

    #[test]
    fn test_add_column_and_task() {
        let store = test_store();
        assert!(store.add_column("Review"));

        let board = store.snapshot();
        let review = board.column_at(3).unwrap();
        assert_eq!(review.id, "column-1");
        assert_eq!(review.title, "Review");
        assert_eq!(review.order, 3);

        assert!(store.add_task("column-1", "Check PR"));
        let board = store.snapshot();
        let task = &board.column("column-1").unwrap().tasks[0];
        assert_eq!(task.id, "task-1");
        assert_eq!(task.column_id, "column-1");
        assert_eq!(task.order, 0);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_edit_task_title() {
        let store = test_store();
        assert!(store.edit_task_title("X", "Implement drag and drop"));
        assert_eq!(store.snapshot().task("X").unwrap().title, "Implement drag and drop");

        assert!(!store.edit_task_title("missing", "Nope"));
        assert!(!store.edit_task_title("X", ""));
        // same title again publishes nothing
        assert!(!store.edit_task_title("X", "Implement drag and drop"));
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_identity_moves_publish_nothing() {
        let store = test_store();
        let before = store.snapshot();

        assert!(!store.move_column(1, 1));
        assert!(!store.move_task("B", "todo", "todo", 1));

        assert!(Arc::ptr_eq(&store.snapshot(), &before));
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_invalid_references_leave_board_unchanged() {
        let store = test_store();
        let before = store.snapshot();

        assert!(!store.delete_task("missing"));
        assert!(!store.move_task("A", "missing", "done", 0));
        assert!(!store.move_task("A", "todo", "missing", 0));
        assert!(!store.move_task("C", "todo", "done", 0));
        assert!(!store.move_column(0, 3));
        assert!(!store.move_column(7, 0));

        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_generated_ids_skip_existing() {
        let seed = Board::new(vec![column("column-1", 0, &["task-1", "task-2"])]);
        let store = BoardStore::with_ids(seed, SequentialIds::new()).unwrap();

        assert!(store.apply(&Command::AddTask {
            column_id: "column-1".into(),
            title: "Fresh".into(),
        }));
        assert!(store.apply(&Command::AddColumn { title: "Next".into() }));

        let board = store.snapshot();
        assert_eq!(board.column("column-1").unwrap().tasks[2].id, "task-3");
        assert_eq!(board.column_at(1).unwrap().id, "column-2");
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn test_snapshots_are_stable() {
        let store = test_store();
        let held = store.snapshot();

        store.apply(&Command::DeleteTask { task_id: "A".into() });

        assert!(held.task("A").is_some());
        assert!(store.snapshot().task("A").is_none());
    }

    #[test]
    fn test_apply_all_counts_published() {
        let store = test_store();
        let commands = vec![
            Command::AddColumn { title: "Review".into() },
            Command::AddColumn { title: "".into() },
            Command::DeleteTask { task_id: "B".into() },
            Command::DeleteTask { task_id: "B".into() },
        ];

        assert_eq!(store.apply_all(&commands), 2);
        assert_eq!(store.revision(), 2);
    }

    #[test]
    fn test_futures_complete_without_suspending() {
        let store = test_store();
        let mut cx = TaskContext::from_waker(Waker::noop());

        let mut fut = pin!(BoardCommands::add_column(&store, "Immediate"));
        assert_eq!(fut.as_mut().poll(&mut cx), Poll::Ready(true));

        let mut fut = pin!(store.get_board());
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(board) => assert_eq!(board.column_count(), 4),
            Poll::Pending => panic!("get_board suspended"),
        }
    }

    async fn ship_first_task<C: BoardCommands>(commands: &C) -> bool {
        let board = commands.get_board().await;
        let first = board.column("todo").unwrap().tasks[0].id.clone();
        commands.move_task(&first, "todo", "done", 0).await
    }

    #[tokio::test]
    async fn test_async_surface_matches_sync_methods() {
        let store = test_store();
        assert!(ship_first_task(&store).await);
        assert!(BoardCommands::add_column(&store, "Review").await);
        assert!(!BoardCommands::move_column(&store, 0, 9).await);

        let board = store.snapshot();
        assert_eq!(board.column("done").unwrap().tasks[0].id, "A");
        assert_eq!(board.column_count(), 4);
        assert_eq!(store.revision(), 2);
    }

    struct StuckIds;

    impl IdSource for StuckIds {
        fn next_id(&self, _kind: IdKind) -> String {
            "todo".to_string()
        }
    }

    #[test]
    fn test_exhausted_id_source_declines_command() {
        let seed = Board::new(vec![column("todo", 0, &["A"])]);
        let store = BoardStore::with_ids(seed, StuckIds).unwrap();
        let before = store.snapshot();

        assert!(!store.add_column("Review"));
        assert!(!store.add_task("todo", "Another"));

        assert_eq!(*store.snapshot(), *before);
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn test_concurrent_writers_are_serialized() {
        let store = Arc::new(test_store());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        store.apply(&Command::AddTask {
                            column_id: "todo".into(),
                            title: format!("t{}-{}", i, j),
                        });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let board = store.snapshot();
        assert_eq!(board.column("todo").unwrap().tasks.len(), 82);
        assert_eq!(store.revision(), 80);
        assert!(board.check_invariants().is_ok());
    }
}
