//! Filter predicate builder.
//!
//! The final filter is `global AND column_a AND column_b ...`, where `global`
//! is an OR across every eligible searchable column and each column clause
//! exists only when that column received its own filter text. The same plan
//! renders either as local closures or as a [`Criterion`] for pushdown, so both
//! execution paths evaluate one structure.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::column::ColumnDescriptor;
use crate::criterion::{Criterion, Operand};
use crate::options::ParserOptions;
use crate::schema::{Converter, PropertyRef};
use crate::value::{Category, FieldValue};

/// A boolean test over one record.
pub type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + Send + Sync + 'a>;

/// Predicate that accepts every record.
pub fn always<'a, T: 'a>() -> Predicate<'a, T> {
    Box::new(|_: &T| true)
}

/// True when at least one predicate is. Empty means false.
pub fn any<'a, T: 'a>(predicates: Vec<Predicate<'a, T>>) -> Predicate<'a, T> {
    Box::new(move |record: &T| predicates.iter().any(|p| p(record)))
}

/// True when every predicate is. Empty means true.
pub fn all<'a, T: 'a>(predicates: Vec<Predicate<'a, T>>) -> Predicate<'a, T> {
    Box::new(move |record: &T| predicates.iter().all(|p| p(record)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Contains,
    StartsWith,
    EndsWith,
}

/// Filter text with its match mode resolved and tokens stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    pub mode: MatchMode,
    /// Lower-cased comparison value.
    pub needle: String,
}

impl SearchTerm {
    /// Resolve the match mode of raw filter text.
    ///
    /// Only a leading starts-with token selects starts-with, only a trailing
    /// ends-with token selects ends-with; both, neither or tokens elsewhere
    /// select contains. Returns `None` when nothing is left to match.
    pub fn parse(raw: &str, options: &ParserOptions) -> Option<Self> {
        let prefix = options.starts_with_token.as_str();
        let suffix = options.ends_with_token.as_str();
        let leading = raw.starts_with(prefix);
        let trailing = raw.ends_with(suffix);
        let mode = match (leading, trailing) {
            (true, false) => MatchMode::StartsWith,
            (false, true) => MatchMode::EndsWith,
            _ => MatchMode::Contains,
        };
        // The edge tokens overlap, so nothing but tokens was sent.
        if leading && trailing && raw.len() < prefix.len() + suffix.len() {
            return None;
        }
        let mut inner = raw;
        if leading {
            inner = inner.strip_prefix(prefix).unwrap_or(inner);
        }
        if trailing {
            inner = inner.strip_suffix(suffix).unwrap_or(inner);
        }
        let needle = inner.replace(prefix, "").replace(suffix, "").to_lowercase();
        if needle.trim().is_empty() {
            return None;
        }
        Some(Self { mode, needle })
    }

    /// `haystack` must already be lower-cased.
    pub fn matches(&self, haystack: &str) -> bool {
        match self.mode {
            MatchMode::Contains => haystack.contains(&self.needle),
            MatchMode::StartsWith => haystack.starts_with(&self.needle),
            MatchMode::EndsWith => haystack.ends_with(&self.needle),
        }
    }
}

/// What the execution path can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// The filter runs on the backend rather than in process.
    pub pushdown: bool,
    /// The backend can render numeric and temporal values as text.
    pub conversion_pushdown: bool,
}

impl Capabilities {
    pub fn local() -> Self {
        Self::default()
    }
}

/// How a column produces its comparable string.
pub enum FilterTarget<T> {
    Text(Arc<PropertyRef<T>>),
    Rendered(Arc<PropertyRef<T>>),
    Custom {
        property: Arc<PropertyRef<T>>,
        converter: Converter<T>,
    },
}

impl<T> FilterTarget<T> {
    /// Resolve the target of a column, or `None` when it cannot filter on this path.
    pub fn resolve(column: &ColumnDescriptor<T>, caps: Capabilities) -> Option<Self> {
        let property = column.property();
        if !column.is_searchable() || !property.is_writable() {
            return None;
        }
        if let Some(converter) = column.converter() {
            if caps.pushdown && converter.expression().is_none() {
                return None;
            }
            return Some(FilterTarget::Custom {
                property: Arc::clone(property),
                converter: converter.clone(),
            });
        }
        match property.category() {
            Category::String => Some(FilterTarget::Text(Arc::clone(property))),
            Category::Numeric | Category::Temporal => {
                if caps.pushdown && !caps.conversion_pushdown {
                    None
                } else {
                    Some(FilterTarget::Rendered(Arc::clone(property)))
                }
            }
            Category::Custom | Category::Opaque => None,
        }
    }

    pub fn property(&self) -> &Arc<PropertyRef<T>> {
        match self {
            FilterTarget::Text(p) | FilterTarget::Rendered(p) => p,
            FilterTarget::Custom { property, .. } => property,
        }
    }

    /// Lower-cased comparable string. `None` for absent values, which never match.
    pub fn comparable(&self, record: &T) -> Option<String> {
        match self {
            FilterTarget::Text(p) => match p.get(record) {
                FieldValue::Null => None,
                FieldValue::Text(s) => Some(s.to_lowercase()),
                other => other.render().map(|s| s.to_lowercase()),
            },
            FilterTarget::Rendered(p) => p.get(record).render().map(|s| s.to_lowercase()),
            FilterTarget::Custom { converter, .. } => Some(converter.render(record).to_lowercase()),
        }
    }

    /// True when the comparable string of a record matches `term`.
    pub fn predicate<'a>(&'a self, term: &'a SearchTerm) -> Predicate<'a, T> {
        Box::new(move |record: &T| {
            self.comparable(record)
                .is_some_and(|haystack| term.matches(&haystack))
        })
    }

    pub fn operand(&self) -> Option<Operand> {
        match self {
            FilterTarget::Text(p) => Some(Operand::Text {
                column: p.column().to_string(),
            }),
            FilterTarget::Rendered(p) => Some(Operand::Rendered {
                column: p.column().to_string(),
            }),
            FilterTarget::Custom { converter, .. } => {
                converter.expression().map(|e| Operand::Expression(e.to_string()))
            }
        }
    }
}

impl<T> fmt::Debug for FilterTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            FilterTarget::Text(_) => "Text",
            FilterTarget::Rendered(_) => "Rendered",
            FilterTarget::Custom { .. } => "Custom",
        };
        write!(f, "{kind}({})", self.property().name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseScope {
    Global,
    Column(usize),
}

/// One AND-ed clause: true when any of its targets matches the term.
pub struct FilterClause<T> {
    pub scope: ClauseScope,
    pub term: SearchTerm,
    pub targets: Vec<FilterTarget<T>>,
}

impl<T> fmt::Debug for FilterClause<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterClause")
            .field("scope", &self.scope)
            .field("term", &self.term)
            .field("targets", &self.targets)
            .finish()
    }
}

impl<T> FilterClause<T> {
    fn predicate(&self) -> Predicate<'_, T> {
        any(self.targets.iter().map(|target| target.predicate(&self.term)).collect())
    }

    fn criterion(&self) -> Criterion {
        Criterion::Any(
            self.targets
                .iter()
                .filter_map(|target| target.operand())
                .map(|operand| Criterion::Match {
                    operand,
                    mode: self.term.mode,
                    needle: self.term.needle.clone(),
                })
                .collect(),
        )
    }
}

/// The compound filter of one request.
pub struct FilterPlan<T> {
    clauses: Vec<FilterClause<T>>,
}

impl<T> fmt::Debug for FilterPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPlan").field("clauses", &self.clauses).finish()
    }
}

impl<T> FilterPlan<T> {
    pub fn build(
        columns: &BTreeMap<usize, ColumnDescriptor<T>>,
        global_search: &str,
        options: &ParserOptions,
        caps: Capabilities,
    ) -> Self {
        let mut clauses = Vec::new();

        if let Some(term) = SearchTerm::parse(global_search, options) {
            let targets: Vec<_> = columns
                .values()
                .filter_map(|column| FilterTarget::resolve(column, caps))
                .collect();
            if targets.is_empty() {
                tracing::debug!("global search has no eligible column and matches nothing");
            }
            clauses.push(FilterClause {
                scope: ClauseScope::Global,
                term,
                targets,
            });
        }

        for column in columns.values() {
            let Some(term) = SearchTerm::parse(column.filter_text(), options) else {
                continue;
            };
            match FilterTarget::resolve(column, caps) {
                Some(target) => clauses.push(FilterClause {
                    scope: ClauseScope::Column(column.index()),
                    term,
                    targets: vec![target],
                }),
                None => tracing::debug!(
                    index = column.index(),
                    property = column.property_name(),
                    "column filter ignored, column cannot filter on this path"
                ),
            }
        }

        Self { clauses }
    }

    /// Whether any clause exists. An inactive plan accepts every record.
    pub fn is_active(&self) -> bool {
        !self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[FilterClause<T>] {
        &self.clauses
    }

    /// The whole plan as one closure.
    pub fn predicate(&self) -> Predicate<'_, T> {
        if self.clauses.is_empty() {
            return always();
        }
        all(self.clauses.iter().map(FilterClause::predicate).collect())
    }

    /// The whole plan as a backend criterion; `None` when inactive.
    pub fn criterion(&self) -> Option<Criterion> {
        if self.clauses.is_empty() {
            return None;
        }
        Some(Criterion::All(self.clauses.iter().map(FilterClause::criterion).collect()).simplify())
    }
}
