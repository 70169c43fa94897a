use std::borrow::Cow;
use std::future::Future;
use std::marker::PhantomData;

use sqlx::{Database, Encode, Executor, FromRow, IntoArguments, Pool, Type};
use tokio::runtime::RuntimeFlavor;
use tableq_core::sql::{Dialect, IdentifierPolicy, SqlQuery};
use tableq_core::{Criterion, DataSource, PushdownQuery, TableError};

use crate::error::SqlxErrorExt;

/// The SQL dialect matching an SQLx driver.
pub fn dialect_for<DB: Database>() -> Dialect {
    match DB::NAME {
        "SQLite" => Dialect::Sqlite,
        "PostgreSQL" => Dialect::Postgres,
        "MySQL" => Dialect::MySql,
        _ => Dialect::Generic,
    }
}

/// A database table queried through an `sqlx::Pool<DB>`.
///
/// Filters, sort and paging are translated to SQL and run by the database.
/// Calls block the current thread on the ambient Tokio runtime, which must be
/// multi-threaded. On a current-thread runtime every call fails with
/// `TableError::Unsupported`.
///
/// # Example
///
/// ```ignore
/// let source = SqlxSource::<Person, Sqlite>::new(pool.clone(), "people");
/// let result = Parser::new(&params, person_schema(), source)?.parse()?;
/// ```
pub struct SqlxSource<T, DB: Database> {
    pool: Pool<DB>,
    table: String,
    select: Vec<String>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
    conversion_pushdown: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T, DB: Database> SqlxSource<T, DB> {
    pub fn new(pool: Pool<DB>, table: &str) -> Self {
        Self {
            pool,
            table: table.to_string(),
            select: vec!["*".to_string()],
            dialect: dialect_for::<DB>(),
            identifier_policy: IdentifierPolicy::Validate,
            conversion_pushdown: false,
            _marker: PhantomData,
        }
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    /// Let numeric and temporal columns filter in the database through a text cast.
    ///
    /// In-process rendering follows SQLite's casts (`250.0`, `1953-09-03`).
    /// Other databases may render floats and timestamps differently, so local
    /// and database results are not guaranteed to agree there. Off by default.
    pub fn conversion_pushdown(mut self, enabled: bool) -> Self {
        self.conversion_pushdown = enabled;
        self
    }

    /// Columns to select instead of `*`.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.select = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    fn query(&self) -> SqlQuery {
        SqlQuery::new(&self.table)
            .dialect(self.dialect)
            .identifier_policy(self.identifier_policy)
    }

    fn select_list(&self) -> Vec<&str> {
        self.select.iter().map(String::as_str).collect()
    }
}

impl<T, DB: Database> Clone for SqlxSource<T, DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            table: self.table.clone(),
            select: self.select.clone(),
            dialect: self.dialect,
            identifier_policy: self.identifier_policy,
            conversion_pushdown: self.conversion_pushdown,
            _marker: PhantomData,
        }
    }
}

/// Run `future` to completion from synchronous code.
///
/// `block_in_place` needs the multi-threaded runtime; a current-thread
/// runtime is reported as unsupported.
fn block_on<F: Future>(future: F) -> Result<F::Output, TableError> {
    let handle = tokio::runtime::Handle::try_current().map_err(TableError::source_error)?;
    if handle.runtime_flavor() == RuntimeFlavor::CurrentThread {
        tracing::warn!("sqlx source called from a current-thread runtime");
        return Err(TableError::Unsupported(
            "blocking calls on a current-thread runtime",
        ));
    }
    Ok(tokio::task::block_in_place(|| handle.block_on(future)))
}

impl<T, DB> SqlxSource<T, DB>
where
    DB: Database,
    T: for<'r> FromRow<'r, DB::Row> + Send + Unpin,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> String: Encode<'q, DB> + Type<DB>,
    (i64,): for<'r> FromRow<'r, DB::Row>,
{
    async fn fetch_rows(&self, sql: &str, params: Vec<String>) -> Result<Vec<T>, TableError> {
        tracing::debug!(sql, ?params, "fetching rows");
        let mut query = sqlx::query_as::<DB, T>(sql);
        for param in params {
            query = query.bind(param);
        }
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_table_error())
    }

    async fn fetch_count(&self, sql: &str, params: Vec<String>) -> Result<u64, TableError> {
        tracing::debug!(sql, ?params, "counting rows");
        let mut query = sqlx::query_scalar::<DB, i64>(sql);
        for param in params {
            query = query.bind(param);
        }
        let count = query
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.into_table_error())?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

impl<T, DB> DataSource<T> for SqlxSource<T, DB>
where
    DB: Database,
    T: for<'r> FromRow<'r, DB::Row> + Clone + Send + Unpin,
    for<'q> DB::Arguments<'q>: IntoArguments<'q, DB>,
    for<'c> &'c mut DB::Connection: Executor<'c, Database = DB>,
    for<'q> String: Encode<'q, DB> + Type<DB>,
    (i64,): for<'r> FromRow<'r, DB::Row>,
{
    fn supports_predicate_pushdown(&self) -> bool {
        true
    }

    fn supports_conversion_pushdown(&self) -> bool {
        self.conversion_pushdown
    }

    fn count(&self) -> Result<u64, TableError> {
        let (sql, params) = self.query().build_count()?;
        block_on(self.fetch_count(&sql, params))?
    }

    fn records(&self) -> Result<Cow<'_, [T]>, TableError> {
        let (sql, params) = self.query().build_select(&self.select_list())?;
        block_on(self.fetch_rows(&sql, params))?.map(Cow::Owned)
    }

    fn count_matching(&self, filter: &Criterion) -> Result<u64, TableError> {
        let (sql, params) = self.query().filter(filter.clone()).build_count()?;
        block_on(self.fetch_count(&sql, params))?
    }

    fn fetch(&self, query: &PushdownQuery) -> Result<Vec<T>, TableError> {
        let (sql, params) = SqlQuery::from_pushdown(&self.table, query)
            .dialect(self.dialect)
            .identifier_policy(self.identifier_policy)
            .build_select(&self.select_list())?;
        block_on(self.fetch_rows(&sql, params))?
    }
}
