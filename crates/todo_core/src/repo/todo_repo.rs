//! Ordered todo store contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide owner-scoped reads of ordered snapshots.
//! - Provide transactional row writes (insert, delete, position batch,
//!   completion flag, text).
//! - Keep SQL details and transaction mechanics inside the repository
//!   boundary.
//!
//! # Invariants
//! - Snapshots are ordered by `position ASC, id ASC`.
//! - `write_transaction` commits only when its work returns `Ok`; any error,
//!   panic or early drop rolls every write back.
//! - Write transactions start with `BEGIN IMMEDIATE`, so the snapshot read
//!   inside one cannot be stale with respect to another committed writer.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::todo::{OwnerId, Todo, TodoId};
use crate::ordering::position::PositionUpdate;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TODO_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    text,
    completed,
    position
FROM todos";

/// Result type used by todo store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from todo store operations.
#[derive(Debug)]
pub enum StoreError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// A position write matched no row owned by the scoped owner.
    RowNotOwned { id: TodoId, owner_id: OwnerId },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Persisted data cannot be converted to a valid todo.
    InvalidData(String),
}

impl StoreError {
    /// Returns whether the failure is lock contention that a fresh attempt may
    /// not hit again.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Db(err) => err.is_busy(),
            _ => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::RowNotOwned { id, owner_id } => {
                write!(f, "todo {id} is not owned by {owner_id}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "todo store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "todo store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "todo store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Row-level operations available inside one write transaction.
pub trait TodoRows {
    /// Loads all todos of `owner_id` ordered by `(position, id)`.
    fn fetch_owned_ordered(&self, owner_id: OwnerId) -> StoreResult<Vec<Todo>>;
    /// Loads one todo scoped to `(id, owner_id)`.
    fn fetch_one(&self, id: TodoId, owner_id: OwnerId) -> StoreResult<Option<Todo>>;
    /// Writes a batch of new positions; fails if any id is not owned.
    fn apply_position_updates(
        &self,
        owner_id: OwnerId,
        updates: &[PositionUpdate],
    ) -> StoreResult<usize>;
    /// Inserts one uncompleted todo and returns it with its assigned id.
    fn insert_row(&self, owner_id: OwnerId, text: &str, position: i64) -> StoreResult<Todo>;
    /// Deletes the owned rows among `ids` and returns how many were removed.
    fn delete_rows(&self, owner_id: OwnerId, ids: &[TodoId]) -> StoreResult<usize>;
    /// Sets the completion flag. Returns `false` when no owned row matched.
    fn set_completed(&self, id: TodoId, owner_id: OwnerId, completed: bool) -> StoreResult<bool>;
    /// Replaces the text. Returns `false` when no owned row matched.
    fn set_text(&self, id: TodoId, owner_id: OwnerId, text: &str) -> StoreResult<bool>;
}

/// Transactional store holding every owner's ordered todo rows.
pub trait TodoStore {
    /// Reads one owner's ordered snapshot outside any write transaction.
    fn read_ordered(&self, owner_id: OwnerId) -> StoreResult<Vec<Todo>>;

    /// Reads one owned todo outside any write transaction.
    fn read_one(&self, id: TodoId, owner_id: OwnerId) -> StoreResult<Option<Todo>>;

    /// Runs `work` inside one write transaction.
    ///
    /// Commits when `work` returns `Ok`; rolls back on `Err` and on unwind.
    fn write_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn TodoRows) -> Result<T, E>,
        E: From<StoreError>;
}

/// SQLite-backed todo store bound to one connection.
pub struct SqliteTodoStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoStore<'conn> {
    /// Creates store from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_todo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoStore for SqliteTodoStore<'_> {
    fn read_ordered(&self, owner_id: OwnerId) -> StoreResult<Vec<Todo>> {
        fetch_owned_ordered(self.conn, owner_id)
    }

    fn read_one(&self, id: TodoId, owner_id: OwnerId) -> StoreResult<Option<Todo>> {
        fetch_one(self.conn, id, owner_id)
    }

    fn write_transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn TodoRows) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(StoreError::from)?;
        let rows = SqliteTodoRows { conn: &tx };
        let value = work(&rows)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(value)
    }
}

/// Row operations executed on a connection that already holds an open
/// transaction.
struct SqliteTodoRows<'tx> {
    conn: &'tx Connection,
}

impl TodoRows for SqliteTodoRows<'_> {
    fn fetch_owned_ordered(&self, owner_id: OwnerId) -> StoreResult<Vec<Todo>> {
        fetch_owned_ordered(self.conn, owner_id)
    }

    fn fetch_one(&self, id: TodoId, owner_id: OwnerId) -> StoreResult<Option<Todo>> {
        fetch_one(self.conn, id, owner_id)
    }

    fn apply_position_updates(
        &self,
        owner_id: OwnerId,
        updates: &[PositionUpdate],
    ) -> StoreResult<usize> {
        let mut stmt = self.conn.prepare_cached(
            "UPDATE todos
             SET position = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND owner_id = ?2;",
        )?;
        let owner = owner_id.to_string();
        for update in updates {
            let changed = stmt.execute(params![update.id, owner, update.position])?;
            if changed == 0 {
                return Err(StoreError::RowNotOwned {
                    id: update.id,
                    owner_id,
                });
            }
        }
        Ok(updates.len())
    }

    fn insert_row(&self, owner_id: OwnerId, text: &str, position: i64) -> StoreResult<Todo> {
        self.conn.execute(
            "INSERT INTO todos (owner_id, text, completed, position)
             VALUES (?1, ?2, 0, ?3);",
            params![owner_id.to_string(), text, position],
        )?;
        let id = self.conn.last_insert_rowid();
        fetch_one(self.conn, id, owner_id)?.ok_or_else(|| {
            StoreError::InvalidData(format!("inserted todo {id} could not be read back"))
        })
    }

    fn delete_rows(&self, owner_id: OwnerId, ids: &[TodoId]) -> StoreResult<usize> {
        let mut stmt = self.conn.prepare_cached(
            "DELETE FROM todos
             WHERE id = ?1
               AND owner_id = ?2;",
        )?;
        let owner = owner_id.to_string();
        let mut removed = 0;
        for id in ids {
            removed += stmt.execute(params![id, owner])?;
        }
        Ok(removed)
    }

    fn set_completed(&self, id: TodoId, owner_id: OwnerId, completed: bool) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET completed = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id, owner_id.to_string(), bool_to_int(completed)],
        )?;
        Ok(changed > 0)
    }

    fn set_text(&self, id: TodoId, owner_id: OwnerId, text: &str) -> StoreResult<bool> {
        let changed = self.conn.execute(
            "UPDATE todos
             SET text = ?3,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1
               AND owner_id = ?2;",
            params![id, owner_id.to_string(), text],
        )?;
        Ok(changed > 0)
    }
}

fn fetch_owned_ordered(conn: &Connection, owner_id: OwnerId) -> StoreResult<Vec<Todo>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{TODO_SELECT_SQL}
         WHERE owner_id = ?1
         ORDER BY position ASC, id ASC;"
    ))?;
    let mut rows = stmt.query([owner_id.to_string()])?;

    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_todo_row(row)?);
    }
    Ok(items)
}

fn fetch_one(conn: &Connection, id: TodoId, owner_id: OwnerId) -> StoreResult<Option<Todo>> {
    let mut stmt = conn.prepare_cached(&format!(
        "{TODO_SELECT_SQL}
         WHERE id = ?1
           AND owner_id = ?2;"
    ))?;
    let mut rows = stmt.query(params![id, owner_id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_todo_row(row)?));
    }
    Ok(None)
}

fn parse_todo_row(row: &Row<'_>) -> StoreResult<Todo> {
    let owner_text: String = row.get("owner_id")?;
    let owner_id = Uuid::parse_str(&owner_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid `{owner_text}` in todos.owner_id"))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid completed value `{other}` in todos.completed"
            )));
        }
    };

    let position: i64 = row.get("position")?;
    if position < 0 {
        return Err(StoreError::InvalidData(format!(
            "negative position `{position}` in todos.position"
        )));
    }

    Ok(Todo {
        id: row.get("id")?,
        owner_id,
        text: row.get("text")?,
        completed,
        position,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

fn ensure_todo_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todos")? {
        return Err(StoreError::MissingRequiredTable("todos"));
    }

    for column in [
        "id",
        "owner_id",
        "text",
        "completed",
        "position",
        "created_at",
        "updated_at",
    ] {
        if !table_has_column(conn, "todos", column)? {
            return Err(StoreError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
