use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tableq_core::Schema;

/// Fixture record shared by the engine and backend tests.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "sqlite", derive(sqlx::FromRow))]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub weight: f64,
    pub height: f64,
    pub children: i64,
    pub total_red_blood_cells: Option<i64>,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// The six fixture people, in insertion order.
pub fn people() -> Vec<Person> {
    let rows = [
        ("James", "Jamie", date(1960, 5, 3), 250.5, 5.4, 5, Some(4_800_000)),
        ("Tony", "Tonia", date(1961, 7, 3), 150.5, 4.4, 3, None),
        ("Bandy", "Momin", date(1970, 8, 3), 250.5, 5.4, 1, Some(5_100_000)),
        ("Tannie", "Tanner", date(1950, 2, 3), 350.5, 6.4, 0, None),
        ("Cromie", "Crammer", date(1953, 9, 3), 120.5, 6.2, 15, Some(4_500_000)),
        ("Xorie", "Zera", date(1974, 10, 3), 175.5, 5.9, 2, None),
    ];
    rows.into_iter()
        .enumerate()
        .map(|(i, (first, last, birth_date, weight, height, children, cells))| Person {
            id: i as i64 + 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
            birth_date,
            weight,
            height,
            children,
            total_red_blood_cells: cells,
        })
        .collect()
}

/// Property table of [`Person`].
///
/// Property names are the client-facing names; `height` is deliberately lower
/// case, so a request column named `Height` maps to nothing. `FullName` is
/// read-only.
pub fn person_schema() -> Arc<Schema<Person>> {
    Schema::builder()
        .field_as("Id", "id", |p: &Person| p.id)
        .field_as("FirstName", "first_name", |p: &Person| p.first_name.clone())
        .field_as("LastName", "last_name", |p: &Person| p.last_name.clone())
        .field_as("BirthDate", "birth_date", |p: &Person| p.birth_date)
        .field_as("Weight", "weight", |p: &Person| p.weight)
        .field_as("height", "height", |p: &Person| p.height)
        .field_as("Children", "children", |p: &Person| p.children)
        .field_as("TotalRedBloodCells", "total_red_blood_cells", |p: &Person| {
            p.total_red_blood_cells
        })
        .computed("FullName", |p: &Person| format!("{} {}", p.first_name, p.last_name))
        .build()
}
