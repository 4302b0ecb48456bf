//! In-memory survey snapshot and loading from spreadsheet exports.
//!
//! A [`Dataset`] is an ordered sequence of records, each mapping a column name
//! to an optional string value: `None` is a missing cell, `Some("")` a present
//! but empty one. Snapshots are loaded fresh per request and never written
//! back; the source of truth stays in the external spreadsheet.

use calamine::{open_workbook_auto, Data, Reader};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use polars::prelude::*;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Input file format, detected from the path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Comma-separated values
    Csv,
    /// Excel (.xls, .xlsx, .xlsm, .xlsb)
    Excel,
}

impl InputFormat {
    /// Detect the format from a path extension. Returns None when the
    /// extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?;
        match ext.to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xls" | "xlsx" | "xlsm" | "xlsb" => Some(Self::Excel),
            _ => None,
        }
    }
}

/// An immutable snapshot of the survey responses.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl Dataset {
    /// Creates an empty dataset with the given header. Column names must be
    /// unique.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(eyre!("Duplicate column name: {}", name));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Creates a dataset from a header and rows; rows are padded or truncated
    /// to the header width.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        let mut ds = Self::new(columns)?;
        for row in rows {
            ds.push_row(row);
        }
        Ok(ds)
    }

    /// Appends a record, padding missing trailing cells with `None`.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Number of records in the snapshot.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Returns the snapshot's own copy of a column name, useful when the
    /// caller needs a reference that outlives its lookup key.
    pub fn column_name(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.as_str() == name)
            .map(|c| c.as_str())
    }

    /// All values of a column in record order, or `None` for an unknown column.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).and_then(|v| v.as_deref()))
                .collect(),
        )
    }

    /// Numbers extracted from a column's cells (first digit run per cell).
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        self.column(name).map(|values| extract_numeric(&values))
    }

    /// Loads a snapshot from a file, dispatching on the extension. `sheet`
    /// selects an Excel worksheet by name or zero-based index.
    pub fn load(path: &Path, sheet: Option<&str>) -> Result<Self> {
        match InputFormat::from_path(path) {
            Some(InputFormat::Csv) => Self::from_csv(path),
            Some(InputFormat::Excel) => Self::from_excel(path, sheet),
            None => Err(eyre!(
                "Unsupported file format: {} (expected .csv or an Excel extension)",
                path.display()
            )),
        }
    }

    /// Reads a CSV export. Schema inference is disabled so every cell stays a
    /// string; empty fields come back as missing cells.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let pl_path = PlPath::Local(Arc::from(path));
        let lf = LazyCsvReader::new(pl_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .finish()?;
        let df = lf.collect()?;
        Self::from_dataframe(&df)
    }

    /// Converts a polars DataFrame into a snapshot. Nulls become missing
    /// cells; non-string columns are rendered through their display value.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let columns: Vec<String> = df
            .get_columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let height = df.height();
        let mut column_values: Vec<Vec<Option<String>>> = Vec::with_capacity(columns.len());
        for col in df.get_columns() {
            let series = col.as_materialized_series();
            let values: Vec<Option<String>> = if let Ok(ca) = series.str() {
                ca.iter().map(|v| v.map(|s| s.to_string())).collect()
            } else {
                (0..height)
                    .map(|i| match series.get(i) {
                        Ok(AnyValue::Null) | Err(_) => None,
                        Ok(av) => Some(av.str_value().to_string()),
                    })
                    .collect()
            };
            column_values.push(values);
        }
        let rows = (0..height)
            .map(|i| column_values.iter().map(|col| col[i].clone()).collect())
            .collect();
        Self::from_rows(columns, rows)
    }

    /// Reads an Excel worksheet. The first row is the header; empty header
    /// cells get positional fallback names.
    pub fn from_excel(path: &Path, sheet: Option<&str>) -> Result<Self> {
        let mut workbook =
            open_workbook_auto(path).map_err(|e| eyre!("Excel: {}", e))?;
        let range = if let Some(selector) = sheet {
            if let Ok(idx) = selector.parse::<usize>() {
                workbook
                    .worksheet_range_at(idx)
                    .ok_or_else(|| eyre!("Excel: no sheet at index {}", idx))?
                    .map_err(|e| eyre!("Excel: {}", e))?
            } else {
                workbook
                    .worksheet_range(selector)
                    .map_err(|e| eyre!("Excel: {}", e))?
            }
        } else {
            workbook
                .worksheet_range_at(0)
                .ok_or_else(|| eyre!("Excel: no first sheet"))?
                .map_err(|e| eyre!("Excel: {}", e))?
        };
        let mut rows = range.rows();
        let header = match rows.next() {
            Some(h) => h,
            None => return Dataset::new(Vec::new()),
        };
        let columns: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let name = calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string());
                if name.is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    name
                }
            })
            .collect();
        let mut ds = Dataset::new(columns)?;
        for row in rows {
            let record = row
                .iter()
                .map(|cell| match cell {
                    Data::Empty => None,
                    c => Some(calamine::DataType::as_string(c).unwrap_or_else(|| c.to_string())),
                })
                .collect();
            ds.push_row(record);
        }
        Ok(ds)
    }
}

/// Extracts the first run of digits from each cell and parses it as a number.
/// Cells without digits are dropped, never zero-filled, so the output length
/// is at most the input length.
pub fn extract_numeric(values: &[Option<&str>]) -> Vec<f64> {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit regex"));
    values
        .iter()
        .filter_map(|v| v.as_ref())
        .filter_map(|s| re.find(s))
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_rows(
            vec!["Пол".to_string(), "Возраст".to_string()],
            vec![
                vec![Some("Мужской".to_string()), Some("25 лет".to_string())],
                vec![Some("Женский".to_string()), None],
                vec![None, Some("30".to_string())],
            ],
        )
        .unwrap()
    }

    #[test]
    fn column_access_preserves_order_and_missing_cells() {
        let ds = sample();
        let values = ds.column("Пол").unwrap();
        assert_eq!(values, vec![Some("Мужской"), Some("Женский"), None]);
        assert!(ds.column("Банк").is_none());
    }

    #[test]
    fn duplicate_columns_rejected() {
        let result = Dataset::new(vec!["a".to_string(), "a".to_string()]);
        assert!(result.is_err());
    }

    #[test]
    fn short_rows_padded_with_missing() {
        let mut ds = Dataset::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        ds.push_row(vec![Some("x".to_string())]);
        assert_eq!(ds.column("b").unwrap(), vec![None]);
    }

    #[test]
    fn extract_numeric_drops_cells_without_digits() {
        let values = vec![Some("25 лет"), Some("30 лет"), Some("25 лет"), Some("abc")];
        assert_eq!(extract_numeric(&values), vec![25.0, 30.0, 25.0]);
    }

    #[test]
    fn extract_numeric_takes_first_digit_run() {
        let values = vec![Some("от 5 до 10 минут"), None, Some("")];
        assert_eq!(extract_numeric(&values), vec![5.0]);
    }

    #[test]
    fn extract_numeric_never_grows() {
        let values = vec![Some("1"), None, Some("x"), Some("2y3")];
        let numbers = extract_numeric(&values);
        assert!(numbers.len() <= values.len());
        assert_eq!(numbers, vec![1.0, 2.0]);
    }

    #[test]
    fn input_format_detection() {
        assert_eq!(
            InputFormat::from_path(Path::new("data.csv")),
            Some(InputFormat::Csv)
        );
        assert_eq!(
            InputFormat::from_path(Path::new("Ответы.xlsx")),
            Some(InputFormat::Excel)
        );
        assert_eq!(InputFormat::from_path(Path::new("data.parquet")), None);
        assert_eq!(InputFormat::from_path(Path::new("data")), None);
    }
}
