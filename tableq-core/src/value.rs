use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// How a property's value type takes part in filtering.
///
/// Resolved once per property from the accessor's return type, never
/// re-derived per comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Compared as-is.
    String,
    /// Integer or floating point, compared through its default rendering.
    Numeric,
    /// Date, time or timestamp, compared through its default rendering.
    Temporal,
    /// Rendered by a caller-supplied converter.
    Custom,
    /// Sortable but never filtered.
    Opaque,
}

impl Category {
    /// Whether the category can be filtered without a custom converter.
    pub fn is_translatable(self) -> bool {
        matches!(self, Category::String | Category::Numeric | Category::Temporal)
    }
}

/// A value read from a record through a property accessor.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Default string rendering used for comparison. `None` for absent values.
    pub fn render(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Int(n) => Some(n.to_string()),
            FieldValue::Float(n) => Some(render_float(*n)),
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            FieldValue::Time(t) => Some(t.format("%H:%M:%S%.f").to_string()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::Float(_) => 2,
            FieldValue::Date(_) | FieldValue::DateTime(_) | FieldValue::Time(_) => 3,
            FieldValue::Text(_) => 4,
        }
    }

    /// Total order used by sorting. Absent values sort first.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        use FieldValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Text(a), Text(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Int(a), Float(b)) => (*a as f64).total_cmp(b),
            (Float(a), Int(b)) => a.total_cmp(&(*b as f64)),
            (Bool(a), Bool(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (DateTime(a), DateTime(b)) => a.cmp(b),
            (Time(a), Time(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// Whole numbers keep one decimal place (`250.0`), as SQL `REAL` to text casts do.
fn render_float(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

/// A Rust type a property accessor may return.
///
/// The implementation fixes the property's [`Category`] and nullability at the
/// type level, so a schema knows how to treat each column without inspecting
/// values.
pub trait FieldType {
    const CATEGORY: Category;
    const NULLABLE: bool = false;

    fn into_field_value(self) -> FieldValue;
}

impl FieldType for String {
    const CATEGORY: Category = Category::String;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

macro_rules! integer_field {
    ($($ty:ty),*) => {
        $(
            impl FieldType for $ty {
                const CATEGORY: Category = Category::Numeric;

                fn into_field_value(self) -> FieldValue {
                    FieldValue::Int(i64::from(self))
                }
            }
        )*
    };
}

integer_field!(i8, i16, i32, i64, u8, u16, u32);

impl FieldType for f32 {
    const CATEGORY: Category = Category::Numeric;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(f64::from(self))
    }
}

impl FieldType for f64 {
    const CATEGORY: Category = Category::Numeric;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(self)
    }
}

impl FieldType for bool {
    const CATEGORY: Category = Category::Opaque;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Bool(self)
    }
}

impl FieldType for NaiveDate {
    const CATEGORY: Category = Category::Temporal;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Date(self)
    }
}

impl FieldType for NaiveDateTime {
    const CATEGORY: Category = Category::Temporal;

    fn into_field_value(self) -> FieldValue {
        FieldValue::DateTime(self)
    }
}

impl FieldType for NaiveTime {
    const CATEGORY: Category = Category::Temporal;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Time(self)
    }
}

impl<F: FieldType> FieldType for Option<F> {
    const CATEGORY: Category = F::CATEGORY;
    const NULLABLE: bool = true;

    fn into_field_value(self) -> FieldValue {
        match self {
            Some(v) => v.into_field_value(),
            None => FieldValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category_of<F: FieldType>(_: F) -> (Category, bool) {
        (F::CATEGORY, F::NULLABLE)
    }

    #[test]
    fn test_categories_follow_types() {
        assert_eq!(category_of(String::new()), (Category::String, false));
        assert_eq!(category_of(3i32), (Category::Numeric, false));
        assert_eq!(category_of(2.5f64), (Category::Numeric, false));
        assert_eq!(category_of(Some(3i64)), (Category::Numeric, true));
        assert_eq!(category_of(true), (Category::Opaque, false));
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(category_of(Some(date)), (Category::Temporal, true));
    }

    #[test]
    fn test_render() {
        assert_eq!(FieldValue::Int(15).render().as_deref(), Some("15"));
        assert_eq!(FieldValue::Float(5.4).render().as_deref(), Some("5.4"));
        assert_eq!(FieldValue::Float(250.0).render().as_deref(), Some("250.0"));
        assert_eq!(FieldValue::Float(-3.0).render().as_deref(), Some("-3.0"));
        let date = NaiveDate::from_ymd_opt(1960, 5, 3).unwrap();
        assert_eq!(FieldValue::Date(date).render().as_deref(), Some("1960-05-03"));
        let dt = date.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(
            FieldValue::DateTime(dt).render().as_deref(),
            Some("1960-05-03 08:30:00")
        );
        assert_eq!(FieldValue::Null.render(), None);
    }

    #[test]
    fn test_null_sorts_first() {
        assert_eq!(FieldValue::Null.sort_cmp(&FieldValue::Int(0)), Ordering::Less);
        assert_eq!(
            FieldValue::Text("a".into()).sort_cmp(&FieldValue::Null),
            Ordering::Greater
        );
    }

    #[test]
    fn test_mixed_numeric_compare() {
        assert_eq!(FieldValue::Int(2).sort_cmp(&FieldValue::Float(2.5)), Ordering::Less);
        assert_eq!(FieldValue::Float(3.0).sort_cmp(&FieldValue::Int(3)), Ordering::Equal);
    }

    #[test]
    fn test_translatable() {
        assert!(Category::String.is_translatable());
        assert!(Category::Temporal.is_translatable());
        assert!(!Category::Custom.is_translatable());
        assert!(!Category::Opaque.is_translatable());
    }
}
