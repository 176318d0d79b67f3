//! Error types for the persistence layer.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers distinguish "the list
//! does not exist" from a failing database. Engine errors are carried through
//! unchanged in `Sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// No list row has the requested identity.
    #[error("list {0} not found")]
    NotFound(i64),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The path does not name a database file shared by all connections.
    #[error("store needs a database file, got {0:?}")]
    NotAFile(PathBuf),

    /// A thread panicked while holding the store lock or the connection pool.
    #[error("store lock poisoned")]
    LockPoisoned,
}

pub type StoreResult<T> = Result<T, StoreError>;
