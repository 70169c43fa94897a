//! SQL rendering of a pushed-down table query.
//!
//! # Example
//!
//! ```
//! use tableq_core::sql::{Dialect, SqlQuery};
//!
//! let (sql, params) = SqlQuery::new("people")
//!     .dialect(Dialect::Sqlite)
//!     .order_by("last_name", true)
//!     .limit(10)
//!     .offset(20)
//!     .build_select(&["*"])
//!     .unwrap();
//! assert_eq!(sql, "SELECT * FROM people ORDER BY last_name ASC LIMIT 10 OFFSET 20");
//! assert!(params.is_empty());
//! ```

use crate::criterion::{Criterion, Operand};
use crate::filter::MatchMode;
use crate::source::PushdownQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Generic SQL using `?` placeholders (default).
    #[default]
    Generic,
    /// SQLite-style `?` placeholders.
    Sqlite,
    /// MySQL-style `?` placeholders with backtick quoting.
    MySql,
    /// Postgres-style `$1, $2, ...` placeholders.
    Postgres,
}

impl Dialect {
    fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${index}"),
            Dialect::Generic | Dialect::Sqlite | Dialect::MySql => "?".to_string(),
        }
    }

    fn quote_char(self) -> char {
        match self {
            Dialect::MySql => '`',
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => '"',
        }
    }

    /// `ESCAPE` literal selecting backslash as the LIKE escape character.
    fn like_escape(self) -> &'static str {
        match self {
            Dialect::MySql => r"'\\'",
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => r"'\'",
        }
    }

    fn text_type(self) -> &'static str {
        match self {
            Dialect::MySql => "CHAR",
            Dialect::Generic | Dialect::Sqlite | Dialect::Postgres => "TEXT",
        }
    }

    /// `LIMIT` to emit when only an offset is requested.
    fn unbounded_limit(self) -> Option<&'static str> {
        match self {
            Dialect::Sqlite => Some("-1"),
            Dialect::MySql => Some("18446744073709551615"),
            Dialect::Generic | Dialect::Postgres => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierPolicy {
    /// Do not validate or quote identifiers.
    Raw,
    /// Validate identifiers against a conservative pattern.
    #[default]
    Validate,
    /// Validate and quote identifiers using the dialect quoting style.
    Quote,
}

#[derive(Debug, Clone)]
pub struct SqlQuery {
    table: String,
    filter: Option<Criterion>,
    order: Vec<(String, bool)>,
    limit_val: Option<u64>,
    offset_val: Option<u64>,
    dialect: Dialect,
    identifier_policy: IdentifierPolicy,
}

impl SqlQuery {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filter: None,
            order: Vec::new(),
            limit_val: None,
            offset_val: None,
            dialect: Dialect::Generic,
            identifier_policy: IdentifierPolicy::Validate,
        }
    }

    /// Translate a pushdown request against `table`.
    pub fn from_pushdown(table: &str, query: &PushdownQuery) -> Self {
        let mut sql = Self::new(table);
        sql.filter = query.filter.clone();
        for key in &query.sort {
            sql = sql.order_by(&key.column, key.direction.is_ascending());
        }
        if let Some(take) = query.take {
            sql = sql.limit(take);
        }
        if query.skip > 0 {
            sql = sql.offset(query.skip);
        }
        sql
    }

    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn identifier_policy(mut self, policy: IdentifierPolicy) -> Self {
        self.identifier_policy = policy;
        self
    }

    pub fn filter(mut self, criterion: Criterion) -> Self {
        self.filter = Some(criterion);
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit_val = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset_val = Some(offset);
        self
    }

    /// Build the page query, returning `(sql, bind_values)`.
    pub fn build_select(&self, columns: &[&str]) -> Result<(String, Vec<String>), QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        let columns = self.format_column_list(columns)?;

        let mut sql = format!("SELECT {columns} FROM {table}");
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params)?;
        self.append_order(&mut sql)?;
        self.append_limit_offset(&mut sql);
        Ok((sql, params))
    }

    /// Build the count query. Ordering and paging are not applied.
    pub fn build_count(&self) -> Result<(String, Vec<String>), QueryError> {
        let table = self.format_identifier(&self.table, false, "table")?;
        let mut sql = format!("SELECT COUNT(*) FROM {table}");
        let mut params = Vec::new();
        self.append_where(&mut sql, &mut params)?;
        Ok((sql, params))
    }

    fn append_where(&self, sql: &mut String, params: &mut Vec<String>) -> Result<(), QueryError> {
        let Some(filter) = &self.filter else {
            return Ok(());
        };
        sql.push_str(" WHERE ");
        let rendered = self.render_criterion(filter, params)?;
        sql.push_str(&rendered);
        Ok(())
    }

    fn render_criterion(&self, criterion: &Criterion, params: &mut Vec<String>) -> Result<String, QueryError> {
        match criterion {
            Criterion::All(items) if items.is_empty() => Ok("1 = 1".to_string()),
            Criterion::Any(items) if items.is_empty() => Ok("1 = 0".to_string()),
            Criterion::All(items) => self.render_group(items, " AND ", params),
            Criterion::Any(items) => self.render_group(items, " OR ", params),
            Criterion::Match {
                operand,
                mode,
                needle,
            } => {
                params.push(like_pattern(*mode, needle));
                let placeholder = self.dialect.placeholder(params.len());
                let escape = self.dialect.like_escape();
                match operand {
                    Operand::Text { column } => {
                        let col = self.format_identifier(column, false, "column")?;
                        Ok(format!("LOWER({col}) LIKE {placeholder} ESCAPE {escape}"))
                    }
                    Operand::Rendered { column } => {
                        let col = self.format_identifier(column, false, "column")?;
                        let ty = self.dialect.text_type();
                        Ok(format!(
                            "({col} IS NOT NULL AND LOWER(CAST({col} AS {ty})) LIKE {placeholder} ESCAPE {escape})"
                        ))
                    }
                    Operand::Expression(expr) => {
                        Ok(format!("LOWER({expr}) LIKE {placeholder} ESCAPE {escape}"))
                    }
                }
            }
        }
    }

    fn render_group(
        &self,
        items: &[Criterion],
        separator: &str,
        params: &mut Vec<String>,
    ) -> Result<String, QueryError> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            parts.push(self.render_criterion(item, params)?);
        }
        Ok(format!("({})", parts.join(separator)))
    }

    fn append_order(&self, sql: &mut String) -> Result<(), QueryError> {
        if self.order.is_empty() {
            return Ok(());
        }
        sql.push_str(" ORDER BY ");
        let mut clauses = Vec::with_capacity(self.order.len());
        for (col, asc) in &self.order {
            let col = self.format_identifier(col, false, "column")?;
            if *asc {
                clauses.push(format!("{col} ASC"));
            } else {
                clauses.push(format!("{col} DESC"));
            }
        }
        sql.push_str(&clauses.join(", "));
        Ok(())
    }

    fn append_limit_offset(&self, sql: &mut String) {
        match (self.limit_val, self.offset_val) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(_)) => {
                if let Some(unbounded) = self.dialect.unbounded_limit() {
                    sql.push_str(&format!(" LIMIT {unbounded}"));
                }
            }
            (None, None) => {}
        }
        if let Some(offset) = self.offset_val {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
    }

    fn format_column_list(&self, columns: &[&str]) -> Result<String, QueryError> {
        let mut out = Vec::with_capacity(columns.len());
        for col in columns {
            out.push(self.format_identifier(col, true, "column")?);
        }
        Ok(out.join(", "))
    }

    fn format_identifier(&self, ident: &str, allow_star: bool, kind: &'static str) -> Result<String, QueryError> {
        match self.identifier_policy {
            IdentifierPolicy::Raw => Ok(ident.to_string()),
            IdentifierPolicy::Validate | IdentifierPolicy::Quote if !is_valid_identifier(ident, allow_star) => {
                Err(QueryError::InvalidIdentifier {
                    kind,
                    ident: ident.to_string(),
                })
            }
            IdentifierPolicy::Validate => Ok(ident.to_string()),
            IdentifierPolicy::Quote => Ok(quote_identifier(ident, self.dialect, allow_star)),
        }
    }
}

#[derive(Debug, Clone)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
        }
    }
}

impl std::error::Error for QueryError {}

/// LIKE pattern for a lower-cased needle, with `%`, `_` and `\` escaped.
pub fn like_pattern(mode: MatchMode, needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    match mode {
        MatchMode::Contains => format!("%{escaped}%"),
        MatchMode::StartsWith => format!("{escaped}%"),
        MatchMode::EndsWith => format!("%{escaped}"),
    }
}

fn is_valid_identifier(ident: &str, allow_star: bool) -> bool {
    if ident.is_empty() {
        return false;
    }
    let parts: Vec<&str> = ident.split('.').collect();
    for (idx, part) in parts.iter().enumerate() {
        if allow_star && *part == "*" {
            return idx + 1 == parts.len();
        }
        if !is_valid_segment(part) {
            return false;
        }
    }
    true
}

fn is_valid_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(ident: &str, dialect: Dialect, allow_star: bool) -> String {
    let quote = dialect.quote_char();
    let parts: Vec<&str> = ident.split('.').collect();
    let last_idx = parts.len().saturating_sub(1);
    parts
        .into_iter()
        .enumerate()
        .map(|(idx, part)| {
            if allow_star && part == "*" && idx == last_idx {
                part.to_string()
            } else {
                format!("{quote}{part}{quote}")
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}
