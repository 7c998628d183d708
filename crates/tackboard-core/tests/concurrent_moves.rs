//! Moves racing on the same columns are serialized and leave dense order.

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tackboard_core::db::SqliteStore;
use tackboard_core::lock::ColumnLocks;
use tackboard_core::model::{Actor, ColumnId, TaskId};
use tackboard_core::{MemoryStore, MoveRequest, TaskBoard};

use generators::*;

const WORKERS: usize = 8;

fn assert_dense_and_complete<S: tackboard_core::BoardStore>(
    board: &TaskBoard<S>,
    columns: &[ColumnId],
    expected: &BTreeSet<TaskId>,
) {
    let mut seen = BTreeSet::new();
    for column in columns {
        board.check_density(column).expect("column stays dense");
        for id in column_ids(board, column) {
            assert!(seen.insert(id), "task listed twice");
        }
    }
    assert_eq!(&seen, expected);
}

#[test]
fn same_column_moves_serialize_on_sqlite() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(&dir.path().join("board.db")).expect("open store");
    let (board, columns) = empty_board(store, 1);
    let actor = Actor::new("seed");
    let titles: Vec<String> = (0..WORKERS).map(|i| format!("Apt {i} inspection")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let ids = seed_tasks(&board, &actor, &columns[0], &refs);

    let board = Arc::new(board);
    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, task_id)| {
            let board = Arc::clone(&board);
            let barrier = Arc::clone(&barrier);
            let column = columns[0].clone();
            thread::spawn(move || {
                let actor = Actor::new(format!("worker-{i}"));
                barrier.wait();
                board.move_task(
                    &actor,
                    &MoveRequest {
                        task_id,
                        source_column_id: column.clone(),
                        destination_column_id: column,
                        destination_index: i64::try_from(WORKERS - i).expect("small"),
                    },
                )
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked").expect("move succeeds");
    }

    assert_dense_and_complete(&board, &columns, &ids.into_iter().collect());
}

#[test]
fn criss_cross_moves_do_not_deadlock() {
    let locks = ColumnLocks::in_process(Duration::from_secs(10));
    let (seed, columns) = empty_board(MemoryStore::new(), 2);
    let actor = Actor::new("seed");
    let left = seed_tasks(&seed, &actor, &columns[0], &["l0", "l1", "l2", "l3"]);
    let right = seed_tasks(&seed, &actor, &columns[1], &["r0", "r1", "r2", "r3"]);
    let board = Arc::new(TaskBoard::with_locks(seed.into_store(), locks));

    let barrier = Arc::new(Barrier::new(left.len() + right.len()));
    let jobs = left
        .iter()
        .map(|id| (id.clone(), 0_usize, 1_usize))
        .chain(right.iter().map(|id| (id.clone(), 1, 0)));
    let handles: Vec<_> = jobs
        .map(|(task_id, from, to)| {
            let board = Arc::clone(&board);
            let barrier = Arc::clone(&barrier);
            let columns = columns.clone();
            thread::spawn(move || {
                barrier.wait();
                board.move_task(
                    &Actor::new("mover"),
                    &MoveRequest {
                        task_id,
                        source_column_id: columns[from].clone(),
                        destination_column_id: columns[to].clone(),
                        destination_index: 1,
                    },
                )
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked").expect("move succeeds");
    }

    let everything: BTreeSet<TaskId> = left.into_iter().chain(right).collect();
    assert_dense_and_complete(&board, &columns, &everything);
    assert_eq!(column_ids(&board, &columns[0]).len(), 4);
    assert_eq!(column_ids(&board, &columns[1]).len(), 4);
}

#[test]
fn separate_board_instances_serialize_through_lock_dir() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("board.db");
    let lock_dir = dir.path().join("locks");

    let (board, columns) = empty_board(SqliteStore::open(&db_path).expect("open store"), 2);
    let actor = Actor::new("seed");
    let titles: Vec<String> = (0..WORKERS).map(|i| format!("Lease {i}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let ids = seed_tasks(&board, &actor, &columns[0], &refs);
    drop(board);

    // One service per worker, each with its own connection and lock
    // registry, like separate processes sharing a project directory.
    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, task_id)| {
            let barrier = Arc::clone(&barrier);
            let columns = columns.clone();
            let db_path = db_path.clone();
            let lock_dir = lock_dir.clone();
            thread::spawn(move || {
                let board = TaskBoard::with_locks(
                    SqliteStore::open(&db_path).expect("open store"),
                    ColumnLocks::with_lock_dir(lock_dir, Duration::from_secs(20)),
                );
                barrier.wait();
                board.move_task(
                    &Actor::new(format!("process-{i}")),
                    &MoveRequest {
                        task_id,
                        source_column_id: columns[0].clone(),
                        destination_column_id: columns[1].clone(),
                        destination_index: 0,
                    },
                )
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked").expect("move succeeds");
    }

    let board = TaskBoard::new(SqliteStore::open(&db_path).expect("reopen"));
    assert_dense_and_complete(&board, &columns, &ids.into_iter().collect());
    assert!(column_ids(&board, &columns[0]).is_empty());
    assert_eq!(column_orders(&board, &columns[1]).len(), WORKERS);
}
