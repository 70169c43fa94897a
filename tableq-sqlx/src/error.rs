use tableq_core::TableError;

/// Extension trait for converting `sqlx::Error` into `TableError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for TableError`
/// in this crate. Use `.into_table_error()` instead.
pub trait SqlxErrorExt {
    fn into_table_error(self) -> TableError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_table_error(self) -> TableError {
        TableError::source_error(self)
    }
}

/// Convenience alias for backend results using `TableError`.
pub type SqlxResult<T> = Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sqlx_error_is_chained() {
        let err = sqlx::Error::RowNotFound.into_table_error();
        assert!(matches!(err, TableError::Source(_)));
        assert!(err.source().is_some());
    }
}
