//! SQLite-backed persistence for todo lists and items.
//!
//! # Design
//! One `RwLock<()>` guards the whole store. Reads (`get_all`,
//! `get_list_by_id`) take it shared, writes (`post`, `create_list`,
//! `add_item_to_list`) take it exclusive, so at most one writer touches the
//! tables at a time and its statements never interleave with another
//! operation.
//!
//! `rusqlite::Connection` is `Send` but not `Sync`, so connections cannot be
//! shared between concurrent readers. The store keeps a small stack of idle
//! connections to the same file; each operation checks one out after taking
//! the lock and puts it back when done.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::types::{TodoItem, TodoList};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS todo_list (
    id INTEGER PRIMARY KEY,
    todo_items INTEGER REFERENCES todo_item(id)
);

CREATE TABLE IF NOT EXISTS todo_item (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    list_id INTEGER REFERENCES todo_list(id)
);

CREATE INDEX IF NOT EXISTS idx_todo_item_list_id ON todo_item(list_id);
"#;

/// Idle connections kept around after use. Extra connections opened under
/// read contention are closed instead of pooled.
const MAX_IDLE_CONNECTIONS: usize = 4;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Operations the HTTP layer needs from persistence.
///
/// Implementations must be safe to share across request workers.
pub trait TodoStore: Send + Sync {
    /// Every item regardless of list. The returned list has `id == 0`.
    fn get_all(&self) -> StoreResult<TodoList>;

    /// Inserts an item that belongs to no list and returns its id.
    fn post(&self, item: &TodoItem) -> StoreResult<i64>;

    /// Inserts an empty list and returns its id. Fields of `list` are ignored.
    fn create_list(&self, list: &TodoList) -> StoreResult<i64>;

    /// The list with `id` and the items referencing it.
    ///
    /// Fails with [`StoreError::NotFound`] when no such list exists.
    fn get_list_by_id(&self, id: i64) -> StoreResult<TodoList>;

    /// Inserts an item attached to `list_id` and returns the item id.
    ///
    /// Fails with [`StoreError::NotFound`] when the list does not exist.
    fn add_item_to_list(&self, list_id: i64, item: &TodoItem) -> StoreResult<i64>;
}

pub struct SqliteStore {
    path: PathBuf,
    lock: RwLock<()>,
    idle: Mutex<Vec<Connection>>,
}

impl SqliteStore {
    /// Open or create the database at `path` and ensure both tables exist.
    ///
    /// Safe to call repeatedly against the same file; existing rows are kept.
    /// `path` must name a file: every pooled connection opens it separately,
    /// so `:memory:` or an empty path would give each one its own database.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if is_private_database(&path) {
            return Err(StoreError::NotAFile(path));
        }
        let conn = open_connection(&path)?;
        conn.execute_batch(SCHEMA)?;
        info!(path = %path.display(), "todo store ready");

        Ok(Self {
            path,
            lock: RwLock::new(()),
            idle: Mutex::new(vec![conn]),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `f` on a pooled connection. Callers hold the store lock.
    fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let pooled = self
            .idle
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .pop();
        let conn = match pooled {
            Some(conn) => conn,
            None => open_connection(&self.path)?,
        };

        let result = f(&conn);

        let mut idle = self.idle.lock().map_err(|_| StoreError::LockPoisoned)?;
        if idle.len() < MAX_IDLE_CONNECTIONS {
            idle.push(conn);
        }
        result
    }

    fn read<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let _shared = self.lock.read().map_err(|_| StoreError::LockPoisoned)?;
        self.with_connection(f)
    }

    fn write<T>(&self, f: impl FnOnce(&Connection) -> StoreResult<T>) -> StoreResult<T> {
        let _exclusive = self.lock.write().map_err(|_| StoreError::LockPoisoned)?;
        self.with_connection(f)
    }
}

impl TodoStore for SqliteStore {
    fn get_all(&self) -> StoreResult<TodoList> {
        self.read(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, list_id FROM todo_item ORDER BY id",
            )?;
            let todo_items = stmt
                .query_map([], item_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(TodoList { id: 0, todo_items })
        })
    }

    fn post(&self, item: &TodoItem) -> StoreResult<i64> {
        self.write(|conn| {
            conn.execute(
                "INSERT INTO todo_item (title, description) VALUES (?1, ?2)",
                params![item.title, item.description],
            )?;
            let id = conn.last_insert_rowid();
            debug!(item_id = id, "inserted unassigned item");
            Ok(id)
        })
    }

    fn create_list(&self, _list: &TodoList) -> StoreResult<i64> {
        self.write(|conn| {
            conn.execute("INSERT INTO todo_list DEFAULT VALUES", [])?;
            let id = conn.last_insert_rowid();
            debug!(list_id = id, "created list");
            Ok(id)
        })
    }

    fn get_list_by_id(&self, id: i64) -> StoreResult<TodoList> {
        self.read(|conn| {
            if !list_exists(conn, id)? {
                return Err(StoreError::NotFound(id));
            }

            let mut stmt = conn.prepare(
                "SELECT id, title, description, list_id FROM todo_item
                 WHERE list_id = ?1 ORDER BY id",
            )?;
            let todo_items = stmt
                .query_map(params![id], item_from_row)?
                .collect::<Result<Vec<_>, _>>()?;

            Ok(TodoList { id, todo_items })
        })
    }

    fn add_item_to_list(&self, list_id: i64, item: &TodoItem) -> StoreResult<i64> {
        self.write(|conn| {
            let tx = conn.unchecked_transaction()?;
            if !list_exists(&tx, list_id)? {
                return Err(StoreError::NotFound(list_id));
            }

            tx.execute(
                "INSERT INTO todo_item (list_id, title, description) VALUES (?1, ?2, ?3)",
                params![list_id, item.title, item.description],
            )?;
            let id = tx.last_insert_rowid();
            tx.commit()?;

            debug!(list_id, item_id = id, "added item to list");
            Ok(id)
        })
    }
}

fn open_connection(path: &Path) -> StoreResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Paths SQLite resolves to a database private to one connection.
fn is_private_database(path: &Path) -> bool {
    let raw = path.to_string_lossy();
    raw.is_empty()
        || raw == ":memory:"
        || raw.starts_with("file::memory:")
        || raw.contains("mode=memory")
}

fn list_exists(conn: &Connection, id: i64) -> StoreResult<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM todo_list WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<TodoItem> {
    Ok(TodoItem {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        list_id: row.get(3)?,
    })
}
