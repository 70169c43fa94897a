use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::params::{self, TableParams};
use crate::schema::{Converter, PropertyRef, Schema};
use crate::value::Category;

/// A request column bound to a record property.
pub struct ColumnDescriptor<T> {
    index: usize,
    property: Arc<PropertyRef<T>>,
    searchable: bool,
    orderable: bool,
    filter_text: String,
    converter: Option<Converter<T>>,
}

impl<T> ColumnDescriptor<T> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn property(&self) -> &Arc<PropertyRef<T>> {
        &self.property
    }

    pub fn property_name(&self) -> &str {
        self.property.name()
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn is_orderable(&self) -> bool {
        self.orderable
    }

    /// Per-column filter text (`columns[i][search][value]`), empty if absent.
    pub fn filter_text(&self) -> &str {
        &self.filter_text
    }

    pub fn converter(&self) -> Option<&Converter<T>> {
        self.converter.as_ref()
    }

    /// `Custom` once a converter is attached, the property's own category otherwise.
    pub fn category(&self) -> Category {
        if self.converter.is_some() {
            Category::Custom
        } else {
            self.property.category()
        }
    }

    pub(crate) fn set_converter(&mut self, converter: Converter<T>) {
        self.converter = Some(converter);
    }
}

impl<T> fmt::Debug for ColumnDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("index", &self.index)
            .field("property", &self.property.name())
            .field("searchable", &self.searchable)
            .field("orderable", &self.orderable)
            .field("filter_text", &self.filter_text)
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// Bind every `columns[i][data]` parameter naming a property of the schema.
///
/// Unknown property names are dropped. A repeated index keeps the last match.
pub fn map_columns<T>(params: &TableParams, schema: &Schema<T>) -> BTreeMap<usize, ColumnDescriptor<T>> {
    let mut columns = BTreeMap::new();
    for (key, value) in params.iter() {
        let Some(index) = params::parse_column_data_key(key) else {
            continue;
        };
        let Some(property) = schema.property(value) else {
            tracing::debug!(index, property = value, "column names no known property, dropped");
            continue;
        };
        let descriptor = ColumnDescriptor {
            index,
            property: Arc::clone(property),
            searchable: params.get(&params::column_searchable_key(index)) == Some("true"),
            orderable: params.get(&params::column_orderable_key(index)) == Some("true"),
            filter_text: params
                .get(&params::column_search_key(index))
                .unwrap_or_default()
                .to_string(),
            converter: None,
        };
        columns.insert(index, descriptor);
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        a: String,
        b: i32,
    }

    fn schema() -> Arc<Schema<Row>> {
        Schema::builder()
            .field("A", |r: &Row| r.a.clone())
            .field("B", |r: &Row| r.b)
            .build()
    }

    #[test]
    fn test_maps_known_properties_with_flags() {
        let params = TableParams::from_iter([
            ("columns[0][data]", "A"),
            ("columns[0][searchable]", "true"),
            ("columns[0][orderable]", "false"),
            ("columns[0][search][value]", " x "),
            ("columns[1][data]", "B"),
            ("columns[1][orderable]", "true"),
        ]);
        let columns = map_columns(&params, &schema());
        assert_eq!(columns.len(), 2);

        let a = &columns[&0];
        assert_eq!(a.property_name(), "A");
        assert!(a.is_searchable());
        assert!(!a.is_orderable());
        assert_eq!(a.filter_text(), "x");

        let b = &columns[&1];
        assert!(!b.is_searchable());
        assert!(b.is_orderable());
        assert_eq!(b.filter_text(), "");
        assert_eq!(b.category(), Category::Numeric);
    }

    #[test]
    fn test_unknown_and_case_mismatched_names_dropped() {
        let params = TableParams::from_iter([
            ("columns[0][data]", "a"),
            ("columns[1][data]", "Missing"),
            ("columns[2][data]", "B"),
        ]);
        let columns = map_columns(&params, &schema());
        assert_eq!(columns.keys().copied().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn test_non_column_keys_ignored() {
        let params = TableParams::from_iter([("columns[x][data]", "A"), ("data", "A")]);
        assert!(map_columns(&params, &schema()).is_empty());
    }

    #[test]
    fn test_converter_marks_custom() {
        let params = TableParams::from_iter([("columns[0][data]", "B")]);
        let mut columns = map_columns(&params, &schema());
        let col = columns.get_mut(&0).unwrap();
        col.set_converter(Converter::new(|r: &Row| format!("#{}", r.b)));
        assert_eq!(col.category(), Category::Custom);
    }
}
