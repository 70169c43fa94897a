//! tableq — server-side processing for DataTables-style grids.
//!
//! This facade crate re-exports the tableq sub-crates through a single
//! dependency with feature flags. Import everything you need with:
//!
//! ```ignore
//! use tableq::prelude::*;
//! ```
//!
//! # Feature flags
//!
//! | Feature    | Default | Crate                  |
//! |------------|---------|------------------------|
//! | `sqlx`     | no      | `tableq-sqlx`          |
//! | `sqlite`   | no      | `tableq-sqlx/sqlite`   |
//! | `postgres` | no      | `tableq-sqlx/postgres` |
//! | `mysql`    | no      | `tableq-sqlx/mysql`    |

pub extern crate tableq_core;

// Re-export everything from tableq-core at the top level for convenience.
pub use tableq_core::*;

#[cfg(feature = "sqlx")]
pub use tableq_sqlx;

/// Unified prelude — import everything with `use tableq::prelude::*`.
pub mod prelude {
    pub use tableq_core::prelude::*;

    #[cfg(feature = "sqlx")]
    pub use tableq_sqlx::prelude::*;
}
