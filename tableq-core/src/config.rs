use crate::options::ParserOptions;
use crate::params::{self, TableParams};

/// Request-level scalars, read once when the parser is built.
///
/// Malformed values never fail: `start` falls back to `0`, `length` to the
/// configured default page size, and a non-numeric `draw` to `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// `None` when the request had no `draw` key at all.
    pub draw: Option<i64>,
    pub skip: u64,
    /// `None` means "no limit" (DataTables sends `length=-1` for "show all").
    pub take: Option<u64>,
    pub ordering_enabled: bool,
    pub global_search: String,
}

impl QueryConfig {
    pub fn from_params(params: &TableParams, options: &ParserOptions) -> Self {
        let draw = params.get(params::DRAW).map(|raw| {
            raw.parse::<i64>().unwrap_or_else(|_| {
                tracing::warn!(draw = raw, "non-numeric draw token, echoing 0");
                0
            })
        });

        let skip = match params.get(params::START) {
            None => 0,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => n as u64,
                _ => {
                    tracing::warn!(start = raw, "invalid start, using 0");
                    0
                }
            },
        };

        let take = match params.get(params::LENGTH) {
            None => Some(options.default_take),
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Some(n as u64),
                Ok(_) => None,
                Err(_) => {
                    tracing::warn!(length = raw, "invalid length, using default page size");
                    Some(options.default_take)
                }
            },
        };

        let ordering_enabled = params.get(params::ORDERING) != Some("false");

        let global_search = params
            .get(params::SEARCH_VALUE)
            .unwrap_or_default()
            .to_string();

        Self {
            draw,
            skip,
            take,
            ordering_enabled,
            global_search,
        }
    }
}
