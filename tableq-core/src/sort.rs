use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::column::ColumnDescriptor;
use crate::config::QueryConfig;
use crate::params::{self, TableParams};
use crate::schema::PropertyRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// `desc` (any case) is descending; anything else, including nothing, is ascending.
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some(dir) if dir.eq_ignore_ascii_case(params::DESCENDING) => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }
}

/// One key of the sort plan. `sequence` 0 is the primary sort, the rest break ties.
pub struct SortInstruction<T> {
    pub property: Arc<PropertyRef<T>>,
    pub direction: SortDirection,
    pub sequence: usize,
}

impl<T> SortInstruction<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        let ord = self.property.get(a).sort_cmp(&self.property.get(b));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

impl<T> Clone for SortInstruction<T> {
    fn clone(&self) -> Self {
        Self {
            property: Arc::clone(&self.property),
            direction: self.direction,
            sequence: self.sequence,
        }
    }
}

impl<T> fmt::Debug for SortInstruction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortInstruction")
            .field("property", &self.property.name())
            .field("direction", &self.direction)
            .field("sequence", &self.sequence)
            .finish()
    }
}

/// Ordered tie-break chain.
pub struct SortPlan<T> {
    instructions: Vec<SortInstruction<T>>,
}

impl<T> SortPlan<T> {
    /// Build the plan from `order[i][column]` / `order[i][dir]` in arrival order.
    ///
    /// Instructions naming an unknown or non-orderable column are skipped. When
    /// nothing valid remains, the first mapped column sorts ascending, unless
    /// ordering is disabled and no rows are skipped. With ordering disabled and
    /// no skip the plan is always empty.
    pub fn build(
        params: &TableParams,
        columns: &BTreeMap<usize, ColumnDescriptor<T>>,
        config: &QueryConfig,
    ) -> Self {
        if !config.ordering_enabled && config.skip == 0 {
            return Self {
                instructions: Vec::new(),
            };
        }

        let mut instructions = Vec::new();
        for (key, value) in params.iter() {
            let Some(priority) = params::parse_order_column_key(key) else {
                continue;
            };
            let Ok(column_index) = value.parse::<usize>() else {
                tracing::debug!(key, value, "unparsable sort column, skipped");
                continue;
            };
            let Some(column) = columns.get(&column_index).filter(|c| c.is_orderable()) else {
                tracing::debug!(column_index, "sort column missing or not orderable, skipped");
                continue;
            };
            let direction = SortDirection::from_param(params.get(&params::order_dir_key(priority)));
            instructions.push(SortInstruction {
                property: Arc::clone(column.property()),
                direction,
                sequence: instructions.len(),
            });
        }

        if instructions.is_empty() {
            if let Some(first) = columns.values().next() {
                tracing::debug!(property = first.property_name(), "no valid sort, falling back to first column");
                instructions.push(SortInstruction {
                    property: Arc::clone(first.property()),
                    direction: SortDirection::Ascending,
                    sequence: 0,
                });
            }
        }

        Self { instructions }
    }

    pub fn instructions(&self) -> &[SortInstruction<T>] {
        &self.instructions
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Compare two records along the whole chain.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.instructions
            .iter()
            .fold(Ordering::Equal, |ord, ins| ord.then_with(|| ins.compare(a, b)))
    }

    /// Stable in-place sort. Records equal on every key keep their relative order.
    pub fn apply(&self, rows: &mut [&T]) {
        if self.instructions.is_empty() {
            return;
        }
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

impl<T> Clone for SortPlan<T> {
    fn clone(&self) -> Self {
        Self {
            instructions: self.instructions.clone(),
        }
    }
}

impl<T> fmt::Debug for SortPlan<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.instructions.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::map_columns;
    use crate::options::ParserOptions;
    use crate::schema::Schema;

    #[derive(Debug, PartialEq)]
    struct Row {
        group: i32,
        name: &'static str,
    }

    fn plan(query: &str) -> SortPlan<Row> {
        let schema = Schema::builder()
            .field("Group", |r: &Row| r.group)
            .field("Name", |r: &Row| r.name.to_string())
            .build();
        let mut params = TableParams::from_query_str(
            "columns%5B0%5D%5Bdata%5D=Group&columns%5B0%5D%5Borderable%5D=true\
             &columns%5B1%5D%5Bdata%5D=Name&columns%5B1%5D%5Borderable%5D=true",
        );
        params.extend(TableParams::from_query_str(query).iter().map(|(k, v)| (k.to_string(), v.to_string())));
        let columns = map_columns(&params, &schema);
        let config = QueryConfig::from_params(&params, &ParserOptions::default());
        SortPlan::build(&params, &columns, &config)
    }

    fn summary(plan: &SortPlan<Row>) -> Vec<(String, SortDirection, usize)> {
        plan.instructions()
            .iter()
            .map(|i| (i.property.name().to_string(), i.direction, i.sequence))
            .collect()
    }

    #[test]
    fn test_arrival_order_decides_precedence() {
        let plan = plan(
            "order%5B1%5D%5Bcolumn%5D=0&order%5B1%5D%5Bdir%5D=desc\
             &order%5B0%5D%5Bcolumn%5D=1&order%5B0%5D%5Bdir%5D=asc",
        );
        assert_eq!(
            summary(&plan),
            vec![
                ("Group".to_string(), SortDirection::Descending, 0),
                ("Name".to_string(), SortDirection::Ascending, 1),
            ]
        );
    }

    #[test]
    fn test_invalid_instructions_skipped_and_sequence_compacted() {
        let plan = plan(
            "order%5B0%5D%5Bcolumn%5D=9&order%5B1%5D%5Bcolumn%5D=abc\
             &order%5B2%5D%5Bcolumn%5D=1&order%5B2%5D%5Bdir%5D=DESC",
        );
        assert_eq!(
            summary(&plan),
            vec![("Name".to_string(), SortDirection::Descending, 0)]
        );
    }

    #[test]
    fn test_non_desc_direction_is_ascending() {
        let plan = plan("order%5B0%5D%5Bcolumn%5D=1&order%5B0%5D%5Bdir%5D=0");
        assert_eq!(summary(&plan)[0].1, SortDirection::Ascending);
    }

    #[test]
    fn test_fallback_to_first_column() {
        let plan = plan("");
        assert_eq!(
            summary(&plan),
            vec![("Group".to_string(), SortDirection::Ascending, 0)]
        );
    }

    #[test]
    fn test_disabled_ordering_without_skip_is_empty() {
        let plan = plan("ordering=false&order%5B0%5D%5Bcolumn%5D=1");
        assert!(plan.is_empty());
    }

    #[test]
    fn test_disabled_ordering_with_skip_still_sorts() {
        let plan = plan("ordering=false&start=5");
        assert_eq!(summary(&plan).len(), 1);
    }

    #[test]
    fn test_apply_is_stable_with_tie_breaks() {
        let rows = vec![
            Row { group: 2, name: "b" },
            Row { group: 1, name: "z" },
            Row { group: 2, name: "a" },
            Row { group: 1, name: "z" },
        ];
        let plan = plan(
            "order%5B0%5D%5Bcolumn%5D=0&order%5B1%5D%5Bcolumn%5D=1&order%5B1%5D%5Bdir%5D=desc",
        );
        let mut refs: Vec<&Row> = rows.iter().collect();
        plan.apply(&mut refs);
        assert!(std::ptr::eq(refs[0], &rows[1]));
        assert!(std::ptr::eq(refs[1], &rows[3]));
        assert_eq!(refs[2].name, "b");
        assert_eq!(refs[3].name, "a");
    }
}
