//! Compact statistics digest sent to the language model instead of raw rows.

use crate::aggregate::{numeric_summary, FrequencyTable};
use crate::config::BotConfig;
use crate::dataset::{extract_numeric, Dataset};
use crate::report::fmt_num;

/// Number of runner-up values listed after the top answer.
const RUNNER_UP_LIMIT: usize = 3;

/// One line per column: categorical columns get the total, the top value and
/// up to three runners-up; designated numeric columns get count, mean, median
/// and range. Columns without usable values are skipped.
pub fn survey_digest(dataset: &Dataset, config: &BotConfig) -> String {
    let mut out = String::new();
    for column in dataset.columns() {
        let Some(values) = dataset.column(column) else {
            continue;
        };
        if config.is_numeric_column(column) {
            let numbers = extract_numeric(&values);
            if let Some(summary) = numeric_summary(&numbers) {
                out.push_str(&format!(
                    "\n- {}: ответов {}, среднее {:.1}, медиана {:.1}, диапазон {}-{}",
                    column,
                    summary.count,
                    summary.mean,
                    summary.median,
                    fmt_num(summary.min),
                    fmt_num(summary.max)
                ));
            }
            continue;
        }
        let table = FrequencyTable::from_values(values);
        let Some((top, top_count)) = table.top() else {
            continue;
        };
        out.push_str(&format!(
            "\n- {}: всего {}, топ: '{}' ({}, {:.1}%)",
            column,
            table.total(),
            top,
            top_count,
            table.percentage(top_count)
        ));
        if table.distinct_count() > 1 {
            let others: Vec<String> = table
                .entries()
                .iter()
                .skip(1)
                .take(RUNNER_UP_LIMIT)
                .map(|(value, count)| format!("{} ({})", value, count))
                .collect();
            out.push_str(&format!(", другие: {}", others.join(", ")));
        }
    }
    out
}
