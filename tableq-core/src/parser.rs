//! The request parser and query executor.
//!
//! A [`Parser`] binds one request to a [`Schema`] and a [`DataSource`]. It is
//! built once, may be given converters, and then produces a [`ResultSet`].
//! Parsing never mutates the parser, so repeated calls return the same result
//! for an unchanged source.
//!
//! ```
//! use tableq_core::{Parser, Schema, TableParams};
//!
//! #[derive(Clone)]
//! struct City {
//!     name: String,
//! }
//!
//! let schema = Schema::builder().field("Name", |c: &City| c.name.clone()).build();
//! let cities = vec![
//!     City { name: "Lyon".into() },
//!     City { name: "Lille".into() },
//!     City { name: "Nantes".into() },
//! ];
//! let params = TableParams::from_query_str(
//!     "draw=1&columns%5B0%5D%5Bdata%5D=Name&columns%5B0%5D%5Bsearchable%5D=true&search%5Bvalue%5D=*%7CL",
//! );
//!
//! let result = Parser::new(&params, schema, cities).unwrap().parse().unwrap();
//! assert_eq!(result.total_count, 3);
//! assert_eq!(result.filtered_count, 2);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::column::{map_columns, ColumnDescriptor};
use crate::config::QueryConfig;
use crate::error::TableError;
use crate::filter::{Capabilities, FilterPlan};
use crate::options::ParserOptions;
use crate::page::ResultSet;
use crate::params::TableParams;
use crate::schema::{Converter, Schema};
use crate::sort::SortPlan;
use crate::source::{DataSource, PushdownQuery, SortKey};

/// Everything a request resolves to before it touches the data.
pub struct QueryPlan<T> {
    pub sort: SortPlan<T>,
    pub filter: FilterPlan<T>,
    pub skip: u64,
    pub take: Option<u64>,
    pub capabilities: Capabilities,
}

impl<T> QueryPlan<T> {
    pub fn is_pushdown(&self) -> bool {
        self.capabilities.pushdown
    }

    /// The plan in backend terms: sort keys by column, filter as a criterion.
    pub fn to_pushdown(&self) -> PushdownQuery {
        PushdownQuery {
            sort: self
                .sort
                .instructions()
                .iter()
                .map(|ins| SortKey {
                    column: ins.property.column().to_string(),
                    direction: ins.direction,
                })
                .collect(),
            filter: self.filter.criterion(),
            skip: self.skip,
            take: self.take,
        }
    }
}

impl<T> fmt::Debug for QueryPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryPlan")
            .field("sort", &self.sort)
            .field("filter", &self.filter)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

pub struct Parser<T, S> {
    schema: Arc<Schema<T>>,
    source: S,
    options: ParserOptions,
    config: QueryConfig,
    columns: BTreeMap<usize, ColumnDescriptor<T>>,
    params: TableParams,
}

impl<T, S> Parser<T, S>
where
    T: Clone,
    S: DataSource<T>,
{
    /// Bind a request with default options.
    pub fn new(params: &TableParams, schema: Arc<Schema<T>>, source: S) -> Result<Self, TableError> {
        Self::with_options(params, schema, source, ParserOptions::default())
    }

    /// Bind a request.
    ///
    /// Fails with [`TableError::NoMappableColumns`] when no `columns[i][data]`
    /// names a property of the schema, and with [`TableError::Config`] for
    /// invalid options. Malformed scalars fall back to defaults.
    pub fn with_options(
        params: &TableParams,
        schema: Arc<Schema<T>>,
        source: S,
        options: ParserOptions,
    ) -> Result<Self, TableError> {
        options.validate()?;
        let columns = map_columns(params, &schema);
        if columns.is_empty() {
            return Err(TableError::NoMappableColumns);
        }
        let config = QueryConfig::from_params(params, &options);
        tracing::debug!(columns = columns.len(), ?config, "table request bound");
        Ok(Self {
            schema,
            source,
            options,
            config,
            columns,
            params: params.clone(),
        })
    }

    /// Replace the string rendering of `property` in every column bound to it.
    pub fn with_converter(mut self, property: &str, converter: Converter<T>) -> Self {
        let mut bound = 0;
        for column in self.columns.values_mut() {
            if column.property_name() == property {
                column.set_converter(converter.clone());
                bound += 1;
            }
        }
        if bound == 0 {
            tracing::debug!(property, "converter registered for an unmapped property");
        }
        self
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn schema(&self) -> &Arc<Schema<T>> {
        &self.schema
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn columns(&self) -> &BTreeMap<usize, ColumnDescriptor<T>> {
        &self.columns
    }

    pub fn capabilities(&self) -> Capabilities {
        let pushdown = self.source.supports_predicate_pushdown();
        Capabilities {
            pushdown,
            conversion_pushdown: pushdown && self.source.supports_conversion_pushdown(),
        }
    }

    /// Resolve sort and filter without touching the data.
    pub fn plan(&self) -> QueryPlan<T> {
        let capabilities = self.capabilities();
        QueryPlan {
            sort: SortPlan::build(&self.params, &self.columns, &self.config),
            filter: FilterPlan::build(
                &self.columns,
                &self.config.global_search,
                &self.options,
                capabilities,
            ),
            skip: self.config.skip,
            take: self.config.take,
            capabilities,
        }
    }

    /// Run the request against the source.
    pub fn parse(&self) -> Result<ResultSet<T>, TableError> {
        let draw = self.config.draw.ok_or(TableError::MissingDrawToken)?;
        let plan = self.plan();
        let total_count = self.source.count()?;

        let (filtered_count, page) = if plan.is_pushdown() {
            self.execute_pushdown(&plan, total_count)?
        } else {
            self.execute_local(&plan, total_count)?
        };

        tracing::debug!(
            draw,
            total_count,
            filtered_count,
            returned = page.len(),
            pushdown = plan.is_pushdown(),
            "table query parsed"
        );
        Ok(ResultSet {
            draw,
            total_count,
            filtered_count,
            page,
        })
    }

    /// Run [`parse`](Self::parse) on the blocking thread pool.
    pub async fn parse_async(self) -> Result<ResultSet<T>, TableError>
    where
        T: Send + 'static,
        S: Send + 'static,
    {
        tokio::task::spawn_blocking(move || self.parse())
            .await
            .map_err(|e| TableError::Task(e.to_string()))?
    }

    fn execute_local(&self, plan: &QueryPlan<T>, total_count: u64) -> Result<(u64, Vec<T>), TableError> {
        let records = self.source.records()?;
        let predicate = plan.filter.predicate();
        let mut rows: Vec<&T> = records.iter().filter(|r| predicate(*r)).collect();
        let filtered_count = if plan.filter.is_active() {
            rows.len() as u64
        } else {
            total_count
        };

        plan.sort.apply(&mut rows);

        let skip = usize::try_from(plan.skip).unwrap_or(usize::MAX);
        let take = plan
            .take
            .map_or(usize::MAX, |t| usize::try_from(t).unwrap_or(usize::MAX));
        let page = rows.into_iter().skip(skip).take(take).cloned().collect();
        Ok((filtered_count, page))
    }

    fn execute_pushdown(&self, plan: &QueryPlan<T>, total_count: u64) -> Result<(u64, Vec<T>), TableError> {
        let query = plan.to_pushdown();
        let filtered_count = match &query.filter {
            Some(criterion) => self.source.count_matching(criterion)?,
            None => total_count,
        };
        let page = self.source.fetch(&query)?;
        Ok((filtered_count, page))
    }
}

impl<T, S> fmt::Debug for Parser<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}
