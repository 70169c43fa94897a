use serde::Serialize;

use crate::error::TableError;

/// One page of a table query, in the shape the grid widget expects.
///
/// Serializes as `{"draw", "recordsTotal", "recordsFiltered", "data"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet<T> {
    /// Echo of the request's `draw` token.
    pub draw: i64,
    /// Record count before filtering.
    #[serde(rename = "recordsTotal")]
    pub total_count: u64,
    /// Record count after filtering, before paging.
    #[serde(rename = "recordsFiltered")]
    pub filtered_count: u64,
    #[serde(rename = "data")]
    pub page: Vec<T>,
}

impl<T> ResultSet<T> {
    /// Project every record of the page, keeping the counts.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ResultSet<U> {
        ResultSet {
            draw: self.draw,
            total_count: self.total_count,
            filtered_count: self.filtered_count,
            page: self.page.into_iter().map(f).collect(),
        }
    }
}

impl<T: Serialize> ResultSet<T> {
    pub fn to_json(&self) -> Result<serde_json::Value, TableError> {
        serde_json::to_value(self).map_err(TableError::source_error)
    }
}
