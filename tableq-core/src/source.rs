use std::borrow::Cow;
use std::sync::Arc;

use crate::criterion::Criterion;
use crate::error::TableError;
use crate::sort::SortDirection;

/// One backend sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

/// Filter, sort and page handed to a pushdown-capable source in one piece.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushdownQuery {
    pub sort: Vec<SortKey>,
    pub filter: Option<Criterion>,
    pub skip: u64,
    /// `None` means no limit.
    pub take: Option<u64>,
}

/// A finite collection of records the engine can query.
///
/// Every source must count and enumerate. A source that can evaluate a
/// [`Criterion`] itself advertises it through
/// [`supports_predicate_pushdown`](DataSource::supports_predicate_pushdown)
/// and implements [`count_matching`](DataSource::count_matching) and
/// [`fetch`](DataSource::fetch); the engine then never enumerates it.
///
/// Calls are synchronous. Sources backed by async drivers block on them.
pub trait DataSource<T: Clone> {
    fn supports_predicate_pushdown(&self) -> bool {
        false
    }

    /// Whether numeric and temporal columns can be rendered as text by the backend.
    fn supports_conversion_pushdown(&self) -> bool {
        false
    }

    /// Total number of records, ignoring any filter.
    fn count(&self) -> Result<u64, TableError>;

    /// Every record, in source order.
    fn records(&self) -> Result<Cow<'_, [T]>, TableError>;

    /// Number of records matching `filter`.
    fn count_matching(&self, _filter: &Criterion) -> Result<u64, TableError> {
        Err(TableError::Unsupported("count_matching"))
    }

    /// Filtered, sorted and paged records.
    fn fetch(&self, _query: &PushdownQuery) -> Result<Vec<T>, TableError> {
        Err(TableError::Unsupported("fetch"))
    }
}

impl<T: Clone> DataSource<T> for [T] {
    fn count(&self) -> Result<u64, TableError> {
        Ok(self.len() as u64)
    }

    fn records(&self) -> Result<Cow<'_, [T]>, TableError> {
        Ok(Cow::Borrowed(self))
    }
}

impl<T: Clone> DataSource<T> for Vec<T> {
    fn count(&self) -> Result<u64, TableError> {
        self.as_slice().count()
    }

    fn records(&self) -> Result<Cow<'_, [T]>, TableError> {
        self.as_slice().records()
    }
}

macro_rules! forward_data_source {
    ($($wrapper:ty),*) => {
        $(
            impl<T: Clone, S: DataSource<T> + ?Sized> DataSource<T> for $wrapper {
                fn supports_predicate_pushdown(&self) -> bool {
                    (**self).supports_predicate_pushdown()
                }

                fn supports_conversion_pushdown(&self) -> bool {
                    (**self).supports_conversion_pushdown()
                }

                fn count(&self) -> Result<u64, TableError> {
                    (**self).count()
                }

                fn records(&self) -> Result<Cow<'_, [T]>, TableError> {
                    (**self).records()
                }

                fn count_matching(&self, filter: &Criterion) -> Result<u64, TableError> {
                    (**self).count_matching(filter)
                }

                fn fetch(&self, query: &PushdownQuery) -> Result<Vec<T>, TableError> {
                    (**self).fetch(query)
                }
            }
        )*
    };
}

forward_data_source!(&S, Arc<S>, Box<S>);
