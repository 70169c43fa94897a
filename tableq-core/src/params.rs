//! Request parameters following the DataTables server-side key grammar.

/// Correlation token echoed back in the result.
pub const DRAW: &str = "draw";
/// Number of records to skip.
pub const START: &str = "start";
/// Number of records to take.
pub const LENGTH: &str = "length";
/// `"false"` disables the default ordering.
pub const ORDERING: &str = "ordering";
/// Global filter text.
pub const SEARCH_VALUE: &str = "search[value]";

/// Direction value selecting a descending sort.
pub const DESCENDING: &str = "desc";

/// `columns[{index}][data]`
pub fn column_data_key(index: usize) -> String {
    format!("columns[{index}][data]")
}

/// `columns[{index}][searchable]`
pub fn column_searchable_key(index: usize) -> String {
    format!("columns[{index}][searchable]")
}

/// `columns[{index}][orderable]`
pub fn column_orderable_key(index: usize) -> String {
    format!("columns[{index}][orderable]")
}

/// `columns[{index}][search][value]`
pub fn column_search_key(index: usize) -> String {
    format!("columns[{index}][search][value]")
}

/// `order[{index}][column]`
pub fn order_column_key(index: usize) -> String {
    format!("order[{index}][column]")
}

/// `order[{index}][dir]`
pub fn order_dir_key(index: usize) -> String {
    format!("order[{index}][dir]")
}

/// Index of a `columns[i][data]` key, if `key` has exactly that shape.
pub fn parse_column_data_key(key: &str) -> Option<usize> {
    parse_indexed_key(key, "columns[", "][data]")
}

/// Index of an `order[i][column]` key, if `key` has exactly that shape.
pub fn parse_order_column_key(key: &str) -> Option<usize> {
    parse_indexed_key(key, "order[", "][column]")
}

fn parse_indexed_key(key: &str, head: &str, tail: &str) -> Option<usize> {
    let digits = key.strip_prefix(head)?.strip_suffix(tail)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// A flat, insertion-ordered, possibly multi-valued parameter map.
///
/// Lookups follow "first value, trimmed" semantics. Insertion order is kept so
/// that `order[i][column]` entries are visited in the order the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableParams {
    entries: Vec<(String, Vec<String>)>,
}

impl TableParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a URL-encoded query string or form body.
    ///
    /// ```
    /// use tableq_core::TableParams;
    ///
    /// let params = TableParams::from_query_str("draw=3&search%5Bvalue%5D=%20ann%20");
    /// assert_eq!(params.get("draw"), Some("3"));
    /// assert_eq!(params.get("search[value]"), Some("ann"));
    /// ```
    pub fn from_query_str(query: &str) -> Self {
        form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Append a value, keeping any values already stored under `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Replace every value of `key` with `value`. An existing key keeps its position.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, values)) => *values = vec![value],
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Remove `key` and all its values.
    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    /// First value of `key`, trimmed.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(|v| v.trim())
    }

    /// All raw values of `key`.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// `(key, first value trimmed)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().filter_map(|(k, values)| {
            values.first().map(|v| (k.as_str(), v.trim()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TableParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = TableParams::new();
        for (k, v) in iter {
            params.append(k, v);
        }
        params
    }
}

impl<K, V> Extend<(K, V)> for TableParams
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.append(k, v);
        }
    }
}
