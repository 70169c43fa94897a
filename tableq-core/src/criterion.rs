//! Backend-neutral filter expression handed to pushdown-capable data sources.

use crate::filter::MatchMode;

/// What a `Match` compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A string column, compared as-is.
    Text { column: String },
    /// A non-string column, compared through the backend's text rendering.
    /// Absent values never match.
    Rendered { column: String },
    /// A caller-supplied backend expression producing a string.
    Expression(String),
}

/// A boolean filter over backend rows.
///
/// Every `Match` is case-insensitive: `needle` is already lower-cased and the
/// backend must lower-case the operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Conjunction. Empty means "always true".
    All(Vec<Criterion>),
    /// Disjunction. Empty means "always false".
    Any(Vec<Criterion>),
    Match {
        operand: Operand,
        mode: MatchMode,
        needle: String,
    },
}

impl Criterion {
    /// Collapse single-element groups.
    pub fn simplify(self) -> Self {
        match self {
            Criterion::All(mut items) if items.len() == 1 => items.remove(0).simplify(),
            Criterion::Any(mut items) if items.len() == 1 => items.remove(0).simplify(),
            Criterion::All(items) => Criterion::All(items.into_iter().map(Criterion::simplify).collect()),
            Criterion::Any(items) => Criterion::Any(items.into_iter().map(Criterion::simplify).collect()),
            m @ Criterion::Match { .. } => m,
        }
    }
}
