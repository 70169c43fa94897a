use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use crate::people::people;

pub const PEOPLE_TABLE: &str = "people";

pub const PEOPLE_DDL: &str = "CREATE TABLE people (
    id INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    weight REAL NOT NULL,
    height REAL NOT NULL,
    children INTEGER NOT NULL,
    total_red_blood_cells INTEGER
)";

/// In-memory SQLite pool. One connection, so every query sees the same database.
pub async fn memory_pool() -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
}

/// Create the `people` table and insert the fixture rows.
pub async fn seed_people(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(PEOPLE_DDL).execute(pool).await?;
    for p in people() {
        sqlx::query(
            "INSERT INTO people (id, first_name, last_name, birth_date, weight, height, children, total_red_blood_cells) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(p.id)
        .bind(&p.first_name)
        .bind(&p.last_name)
        .bind(p.birth_date)
        .bind(p.weight)
        .bind(p.height)
        .bind(p.children)
        .bind(p.total_red_blood_cells)
        .execute(pool)
        .await?;
    }
    Ok(())
}
