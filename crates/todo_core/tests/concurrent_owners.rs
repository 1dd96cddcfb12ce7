use std::path::Path;
use std::thread;
use todo_core::db::open_db;
use todo_core::{OwnerId, SqliteTodoStore, TodoError, TodoResult, TodoService};
use uuid::Uuid;

const WORKERS: usize = 4;
const ROUNDS: usize = 15;

// Caller-side retry policy; core never retries on its own.
fn with_retry<T>(mut attempt: impl FnMut() -> TodoResult<T>) -> TodoResult<T> {
    let mut tries = 0;
    loop {
        match attempt() {
            Err(err) if err.is_retryable() && tries < 20 => tries += 1,
            other => return other,
        }
    }
}

fn run_worker(path: &Path, owner: OwnerId, worker: usize) {
    let conn = open_db(path).unwrap();
    let service = TodoService::new(SqliteTodoStore::try_new(&conn).unwrap());

    for round in 0..ROUNDS {
        let text = format!("w{worker} r{round}");
        let created = with_retry(|| service.create(owner, &text)).unwrap();
        let target = ((worker + round) % 5) as i64;
        with_retry(|| service.move_todo(owner, created.id, target)).unwrap();

        if round % 3 == 0 {
            with_retry(|| service.toggle_completed(owner, created.id)).unwrap();
        }
        if round % 5 == 4 {
            match with_retry(|| service.delete(owner, created.id)) {
                Ok(_) | Err(TodoError::NotFound(_)) => {}
                Err(err) => panic!("unexpected delete failure: {err}"),
            }
        }
        if round % 7 == 6 {
            with_retry(|| service.clear_completed(owner)).unwrap();
        }
    }
}

#[test]
fn concurrent_writers_on_one_owner_keep_positions_dense() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    drop(open_db(&path).unwrap());
    let owner = Uuid::new_v4();

    thread::scope(|scope| {
        for worker in 0..WORKERS {
            let path = path.as_path();
            scope.spawn(move || run_worker(path, owner, worker));
        }
    });

    let conn = open_db(&path).unwrap();
    let service = TodoService::new(SqliteTodoStore::try_new(&conn).unwrap());
    let report = service.verify_ordering(owner).unwrap();
    assert!(report.dense, "ordering broke under contention: {report:?}");

    let positions = service
        .list(owner)
        .unwrap()
        .iter()
        .map(|todo| todo.position)
        .collect::<Vec<_>>();
    assert_eq!(positions, (0..report.count as i64).collect::<Vec<_>>());
}

#[test]
fn concurrent_writers_on_different_owners_do_not_interfere() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("owners.db");
    drop(open_db(&path).unwrap());
    let owners = (0..WORKERS).map(|_| Uuid::new_v4()).collect::<Vec<_>>();

    thread::scope(|scope| {
        for (worker, owner) in owners.iter().copied().enumerate() {
            let path = path.as_path();
            scope.spawn(move || run_worker(path, owner, worker));
        }
    });

    let conn = open_db(&path).unwrap();
    let service = TodoService::new(SqliteTodoStore::try_new(&conn).unwrap());
    for owner in owners {
        let todos = service.list(owner).unwrap();
        assert!(todos.iter().all(|todo| todo.owner_id == owner));
        assert!(service.verify_ordering(owner).unwrap().dense);
    }
}
