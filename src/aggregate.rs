//! Frequency tables and per-column summaries.
//!
//! Everything here is derived and ephemeral: tables are rebuilt from the
//! current snapshot on every request. Ordering is deterministic (count
//! descending, ties broken by first appearance in the source sequence) so
//! "top answer" is well-defined even under ties.

use crate::config::BotConfig;
use crate::dataset::{extract_numeric, Dataset};
use std::collections::HashMap;

/// Occurrence counts per distinct value of a column, missing cells excluded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<(String, usize)>,
    total: usize,
}

impl FrequencyTable {
    /// Builds a table from values in record order.
    pub fn from_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut total = 0usize;
        for value in values.into_iter().flatten() {
            total += 1;
            match index.get(value) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(value.to_string(), entries.len());
                    entries.push((value.to_string(), 1));
                }
            }
        }
        // Stable sort keeps first-seen order within equal counts.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries, total }
    }

    /// Total non-missing responses.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn distinct_count(&self) -> usize {
        self.entries.len()
    }

    /// Ranked `(value, count)` pairs, count descending.
    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    /// Highest-count value with its count.
    pub fn top(&self) -> Option<(&str, usize)> {
        self.entries.first().map(|(v, c)| (v.as_str(), *c))
    }

    /// Count for an exact value label, zero when absent.
    pub fn count_of(&self, value: &str) -> usize {
        self.entries
            .iter()
            .find(|(v, _)| v == value)
            .map_or(0, |(_, c)| *c)
    }

    /// Share of the total as a percentage. Guarded: an empty table yields 0.
    pub fn percentage(&self, count: usize) -> f64 {
        percentage(count, self.total)
    }
}

/// `count / total × 100`, defined as 0 when the total is 0.
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Summary of a numeric column after digit extraction.
#[derive(Clone, Debug, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// The 3 most frequent distinct values with counts, ties first-seen.
    pub top_values: Vec<(f64, usize)>,
}

/// Per-column aggregation result. `Empty` is the sentinel for an empty
/// snapshot or an all-missing column, never an error.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnSummary {
    Categorical(FrequencyTable),
    Numeric(NumericSummary),
    Empty,
}

impl ColumnSummary {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Summarizes one resolved column, choosing the numeric path for columns the
/// configuration designates as numeric and the categorical path otherwise.
pub fn summarize_column(dataset: &Dataset, column: &str, config: &BotConfig) -> ColumnSummary {
    let Some(values) = dataset.column(column) else {
        return ColumnSummary::Empty;
    };
    if config.is_numeric_column(column) {
        match numeric_summary(&extract_numeric(&values)) {
            Some(summary) => ColumnSummary::Numeric(summary),
            None => ColumnSummary::Empty,
        }
    } else {
        let table = FrequencyTable::from_values(values);
        if table.is_empty() {
            ColumnSummary::Empty
        } else {
            ColumnSummary::Categorical(table)
        }
    }
}

/// Frequency table for a column, or `None` when the column is unknown.
pub fn frequency_table(dataset: &Dataset, column: &str) -> Option<FrequencyTable> {
    dataset.column(column).map(FrequencyTable::from_values)
}

/// Computes count, mean, median, min, max and the 3 most frequent values.
/// Returns `None` for an empty input.
pub fn numeric_summary(values: &[f64]) -> Option<NumericSummary> {
    if values.is_empty() {
        return None;
    }
    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median = if count % 2 == 1 {
        sorted[count / 2]
    } else {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    };
    let min = sorted[0];
    let max = sorted[count - 1];

    let mut entries: Vec<(f64, usize)> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();
    for &v in values {
        match index.get(&v.to_bits()) {
            Some(&i) => entries[i].1 += 1,
            None => {
                index.insert(v.to_bits(), entries.len());
                entries.push((v, 1));
            }
        }
    }
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(3);

    Some(NumericSummary {
        count,
        mean,
        median,
        min,
        max,
        top_values: entries,
    })
}
