mod json;
mod people;
mod request;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use json::{resolve_path, tokenize_path, JsonAssert, PathToken};
pub use people::{people, person_schema, Person};
pub use request::TableRequest;
#[cfg(feature = "sqlite")]
pub use sqlite::{memory_pool, seed_people, PEOPLE_DDL, PEOPLE_TABLE};
