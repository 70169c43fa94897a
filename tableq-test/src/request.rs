use tableq_core::params;
use tableq_core::TableParams;

/// Fluent builder for table request parameters.
///
/// ```ignore
/// let params = TableRequest::people().search("*|Cr").length(3).build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct TableRequest {
    params: TableParams,
}

impl TableRequest {
    /// An empty request: no draw, no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard request over [`Person`](crate::Person).
    ///
    /// Columns 0-6 are `FirstName`, `LastName`, `BirthDate`, `Weight`,
    /// `Height` (which maps to nothing), `Children` and `TotalRedBloodCells`,
    /// all searchable and orderable. Draw is 1, page size 10, and the single
    /// order instruction sorts column 0 with direction `0`.
    pub fn people() -> Self {
        let mut request = Self::new().draw("1").start(0).length(10);
        let columns = [
            "FirstName",
            "LastName",
            "BirthDate",
            "Weight",
            "Height",
            "Children",
            "TotalRedBloodCells",
        ];
        for (index, property) in columns.into_iter().enumerate() {
            request = request.column(index, property, true, true);
        }
        request
            .search("")
            .param("search[regex]", "false")
            .order(0, 0, "0")
    }

    pub fn draw(self, draw: &str) -> Self {
        self.param(params::DRAW, draw)
    }

    pub fn start(self, start: i64) -> Self {
        self.param(params::START, start.to_string())
    }

    pub fn length(self, length: i64) -> Self {
        self.param(params::LENGTH, length.to_string())
    }

    /// Global filter text.
    pub fn search(self, value: &str) -> Self {
        self.param(params::SEARCH_VALUE, value)
    }

    /// Declare column `index` bound to `property`, with an empty filter.
    pub fn column(self, index: usize, property: &str, searchable: bool, orderable: bool) -> Self {
        self.param(params::column_data_key(index), property)
            .param(params::column_searchable_key(index), searchable.to_string())
            .param(params::column_orderable_key(index), orderable.to_string())
            .param(params::column_search_key(index), "")
            .param(format!("columns[{index}][search][regex]"), "false")
    }

    /// Per-column filter text.
    pub fn column_search(self, index: usize, value: &str) -> Self {
        self.param(params::column_search_key(index), value)
    }

    /// Set the order instruction at `priority`.
    pub fn order(self, priority: usize, column: usize, dir: &str) -> Self {
        self.param(params::order_column_key(priority), column.to_string())
            .param(params::order_dir_key(priority), dir)
    }

    /// Set any parameter, replacing its previous value.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.set(key, value);
        self
    }

    /// Drop a parameter.
    pub fn without(mut self, key: &str) -> Self {
        self.params.remove(key);
        self
    }

    /// URL-encoded form of the request, as a browser would send it.
    pub fn query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.params.iter() {
            serializer.append_pair(key, value);
        }
        serializer.finish()
    }

    pub fn build(self) -> TableParams {
        self.params
    }
}
