//! Resolved property table for a record type.
//!
//! A [`Schema`] replaces runtime reflection: each named property is a getter
//! closure tagged with its [`Category`], nullability, writability and the
//! backend column it maps to. Build it once per record type and share it.
//!
//! ```
//! use std::sync::Arc;
//! use tableq_core::{Category, Schema};
//!
//! struct Person {
//!     first_name: String,
//!     children: i32,
//! }
//!
//! let schema: Arc<Schema<Person>> = Schema::builder()
//!     .field_as("FirstName", "first_name", |p: &Person| p.first_name.clone())
//!     .field("Children", |p: &Person| p.children)
//!     .build();
//!
//! assert_eq!(schema.property("Children").unwrap().category(), Category::Numeric);
//! assert!(schema.property("children").is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::value::{Category, FieldType, FieldValue};

type Getter<T> = Arc<dyn Fn(&T) -> FieldValue + Send + Sync>;
type Projection<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// A named, readable property of `T`.
pub struct PropertyRef<T> {
    name: String,
    column: String,
    category: Category,
    nullable: bool,
    writable: bool,
    getter: Getter<T>,
}

impl<T> PropertyRef<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend column used when the filter or sort is pushed down.
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn get(&self, record: &T) -> FieldValue {
        (self.getter)(record)
    }
}

impl<T> fmt::Debug for PropertyRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyRef")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("category", &self.category)
            .field("nullable", &self.nullable)
            .field("writable", &self.writable)
            .finish()
    }
}

/// Caller-supplied rendering of a property as a string.
///
/// When registered for a property, it replaces the default rendering in both
/// the global and the per-column clause. The optional backend expression is
/// what pushdown translation emits instead of the column (for SQL backends, a
/// raw SQL expression such as `strftime('%m/%d/%Y', birth_date)`).
pub struct Converter<T> {
    projection: Projection<T>,
    backend_expr: Option<String>,
}

impl<T> Converter<T> {
    pub fn new<F>(projection: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            projection: Arc::new(projection),
            backend_expr: None,
        }
    }

    /// Expression the backend evaluates to produce the same string.
    ///
    /// The expression is emitted verbatim; it must not contain user input.
    pub fn backend_expr(mut self, expr: impl Into<String>) -> Self {
        self.backend_expr = Some(expr.into());
        self
    }

    pub fn render(&self, record: &T) -> String {
        (self.projection)(record)
    }

    pub fn expression(&self) -> Option<&str> {
        self.backend_expr.as_deref()
    }
}

impl<T> Clone for Converter<T> {
    fn clone(&self) -> Self {
        Self {
            projection: Arc::clone(&self.projection),
            backend_expr: self.backend_expr.clone(),
        }
    }
}

impl<T> fmt::Debug for Converter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("backend_expr", &self.backend_expr)
            .finish_non_exhaustive()
    }
}

/// The resolved property table of a record type.
pub struct Schema<T> {
    properties: Vec<Arc<PropertyRef<T>>>,
    by_name: HashMap<String, usize>,
}

impl<T> Schema<T> {
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder {
            properties: Vec::new(),
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn property(&self, name: &str) -> Option<&Arc<PropertyRef<T>>> {
        self.by_name.get(name).map(|&i| &self.properties[i])
    }

    pub fn properties(&self) -> impl Iterator<Item = &Arc<PropertyRef<T>>> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.properties.iter()).finish()
    }
}

pub struct SchemaBuilder<T> {
    properties: Vec<PropertyRef<T>>,
}

impl<T> SchemaBuilder<T> {
    /// Writable property backed by a column of the same name.
    pub fn field<F, G>(self, name: &str, getter: G) -> Self
    where
        F: FieldType,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.push(name, name, true, getter)
    }

    /// Writable property backed by a differently named column.
    pub fn field_as<F, G>(self, name: &str, column: &str, getter: G) -> Self
    where
        F: FieldType,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.push(name, column, true, getter)
    }

    /// Read-only property. It can be displayed and sorted but never filters.
    pub fn computed<F, G>(self, name: &str, getter: G) -> Self
    where
        F: FieldType,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.push(name, name, false, getter)
    }

    fn push<F, G>(mut self, name: &str, column: &str, writable: bool, getter: G) -> Self
    where
        F: FieldType,
        G: Fn(&T) -> F + Send + Sync + 'static,
    {
        self.properties.push(PropertyRef {
            name: name.to_string(),
            column: column.to_string(),
            category: F::CATEGORY,
            nullable: F::NULLABLE,
            writable,
            getter: Arc::new(move |record: &T| getter(record).into_field_value()),
        });
        self
    }

    /// Finish the table. A later property with a repeated name replaces the earlier one.
    pub fn build(self) -> Arc<Schema<T>> {
        let mut properties: Vec<Arc<PropertyRef<T>>> = Vec::with_capacity(self.properties.len());
        let mut by_name = HashMap::new();
        for prop in self.properties {
            match by_name.get(&prop.name) {
                Some(&i) => properties[i] = Arc::new(prop),
                None => {
                    by_name.insert(prop.name.clone(), properties.len());
                    properties.push(Arc::new(prop));
                }
            }
        }
        Arc::new(Schema {
            properties,
            by_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        name: String,
        score: Option<i64>,
        active: bool,
    }

    fn schema() -> Arc<Schema<Row>> {
        Schema::builder()
            .field_as("Name", "name", |r: &Row| r.name.clone())
            .field("Score", |r: &Row| r.score)
            .computed("Active", |r: &Row| r.active)
            .build()
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let schema = schema();
        assert!(schema.property("Name").is_some());
        assert!(schema.property("name").is_none());
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_property_metadata() {
        let schema = schema();
        let name = schema.property("Name").unwrap();
        assert_eq!(name.column(), "name");
        assert_eq!(name.category(), Category::String);
        assert!(name.is_writable());

        let score = schema.property("Score").unwrap();
        assert_eq!(score.column(), "Score");
        assert!(score.is_nullable());

        let active = schema.property("Active").unwrap();
        assert_eq!(active.category(), Category::Opaque);
        assert!(!active.is_writable());
    }

    #[test]
    fn test_getters_read_values() {
        let schema = schema();
        let row = Row {
            name: "Ann".into(),
            score: None,
            active: true,
        };
        assert_eq!(
            schema.property("Name").unwrap().get(&row),
            FieldValue::Text("Ann".into())
        );
        assert!(schema.property("Score").unwrap().get(&row).is_null());
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let schema: Arc<Schema<Row>> = Schema::builder()
            .field("Name", |r: &Row| r.name.clone())
            .field_as("Name", "full_name", |r: &Row| r.name.clone())
            .build();
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.property("Name").unwrap().column(), "full_name");
    }

    #[test]
    fn test_converter() {
        let conv = Converter::new(|r: &Row| format!("<{}>", r.name)).backend_expr("upper(name)");
        let row = Row {
            name: "x".into(),
            score: Some(1),
            active: false,
        };
        assert_eq!(conv.render(&row), "<x>");
        assert_eq!(conv.expression(), Some("upper(name)"));
    }
}
