//! # tableq-sqlx — SQLx backend for tableq
//!
//! This crate runs table queries inside a database through
//! [SQLx](https://github.com/launchbadge/sqlx). It depends on [`tableq-core`]
//! for the engine and the SQL translation, and adds the pool-backed data
//! source and error bridging needed to talk to a real database.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SqlxSource`] | Pushdown-capable data source over one table of an `sqlx::Pool<DB>` |
//! | [`dialect_for`] | SQL dialect matching an SQLx driver |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `TableError` (`.into_table_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, TableError>` |
//!
//! # Feature flags
//!
//! | Feature    | Driver |
//! |------------|--------|
//! | `sqlite`   | SQLite via `sqlx/sqlite` |
//! | `postgres` | PostgreSQL via `sqlx/postgres` |
//! | `mysql`    | MySQL via `sqlx/mysql` |
//!
//! # Quick start
//!
//! ```toml
//! [dependencies]
//! tableq-sqlx = { version = "0.1", features = ["sqlite"] }
//! ```
//!
//! ```ignore
//! use tableq_core::{Converter, Parser, TableParams};
//! use tableq_sqlx::SqlxSource;
//! use sqlx::Sqlite;
//!
//! let params = TableParams::from_query_str(query);
//! let source = SqlxSource::<Person, Sqlite>::new(pool.clone(), "people");
//! let result = Parser::new(&params, person_schema(), source)?
//!     .with_converter(
//!         "BirthDate",
//!         Converter::new(|p: &Person| p.birth_date.format("%m/%d/%Y").to_string())
//!             .backend_expr("strftime('%m/%d/%Y', birth_date)"),
//!     )
//!     .parse_async()
//!     .await?;
//! ```
//!
//! # Blocking
//!
//! The engine is synchronous. [`SqlxSource`] blocks on the ambient Tokio
//! runtime with `block_in_place`, so it needs a multi-threaded runtime.
//! `parse_async` keeps the blocking work off the async worker threads. On a
//! current-thread runtime calls fail with `TableError::Unsupported`.

pub mod error;
pub mod source;

pub use error::{SqlxErrorExt, SqlxResult};
pub use source::{dialect_for, SqlxSource};

/// Re-exports of the most commonly used types from both `tableq-core` and this crate.
pub mod prelude {
    pub use crate::{SqlxErrorExt, SqlxSource};
    pub use tableq_core::prelude::*;
}
