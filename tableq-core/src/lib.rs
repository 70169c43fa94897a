pub mod column;
pub mod config;
pub mod criterion;
pub mod error;
pub mod filter;
pub mod options;
pub mod page;
pub mod params;
pub mod parser;
pub mod schema;
pub mod sort;
pub mod source;
pub mod sql;
pub mod value;

pub use column::ColumnDescriptor;
pub use config::QueryConfig;
pub use criterion::{Criterion, Operand};
pub use error::TableError;
pub use filter::{Capabilities, FilterPlan, MatchMode, SearchTerm};
pub use options::ParserOptions;
pub use page::ResultSet;
pub use params::TableParams;
pub use parser::{Parser, QueryPlan};
pub use schema::{Converter, PropertyRef, Schema, SchemaBuilder};
pub use sort::{SortDirection, SortPlan};
pub use source::{DataSource, PushdownQuery, SortKey};
pub use sql::{Dialect, IdentifierPolicy, SqlQuery};
pub use value::{Category, FieldType, FieldValue};

pub mod prelude {
    //! Re-exports of the most commonly used types.
    pub use crate::{
        Converter, DataSource, Parser, ParserOptions, ResultSet, Schema, TableError, TableParams,
    };
}
