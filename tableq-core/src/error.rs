use crate::sql::QueryError;

/// Errors raised by the table query engine.
///
/// Malformed scalar parameters never show up here: they are replaced by safe
/// defaults while the request is read. Only configuration problems and
/// data-source failures are reported.
#[derive(Debug)]
pub enum TableError {
    /// None of the `columns[i][data]` values named a property of the record type.
    NoMappableColumns,
    /// The request carried no `draw` parameter.
    MissingDrawToken,
    /// Invalid parser options.
    Config(String),
    /// An identifier rejected by SQL translation.
    InvalidIdentifier { kind: &'static str, ident: String },
    /// The data source was asked for an operation it does not advertise.
    Unsupported(&'static str),
    /// The data source failed.
    Source(Box<dyn std::error::Error + Send + Sync>),
    /// The worker running a non-blocking parse failed or was cancelled.
    Task(String),
}

impl TableError {
    /// Wrap any backend error as a `Source` variant.
    ///
    /// Used by backend crates (e.g. `tableq-sqlx`) to wrap driver-specific errors.
    pub fn source_error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        TableError::Source(Box::new(err))
    }
}

impl std::fmt::Display for TableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::NoMappableColumns => {
                write!(f, "No column maps to a property of the record type")
            }
            TableError::MissingDrawToken => write!(f, "Missing draw parameter"),
            TableError::Config(msg) => write!(f, "Invalid parser options: {msg}"),
            TableError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            TableError::Unsupported(op) => write!(f, "Data source does not support {op}"),
            TableError::Source(err) => write!(f, "Data source error: {err}"),
            TableError::Task(msg) => write!(f, "Parse task failed: {msg}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TableError::Source(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<QueryError> for TableError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidIdentifier { kind, ident } => {
                TableError::InvalidIdentifier { kind, ident }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_source_error_is_chained() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = TableError::source_error(io);
        assert_eq!(err.to_string(), "Data source error: disk gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn test_query_error_conversion() {
        let err: TableError = QueryError::InvalidIdentifier {
            kind: "column",
            ident: "a;b".into(),
        }
        .into();
        assert!(matches!(err, TableError::InvalidIdentifier { kind: "column", .. }));
        assert!(err.source().is_none());
    }
}
