//! Reference result tables.
//!
//! A table is comma separated text with one header row. The first column holds
//! the time index and is dropped; every other column is a reference series.
//! Rows are stacked per averaging day, 24 hourly rows per day block, so the
//! second block of a table holding days 1, 10 and 60 is day 10.

use std::path::Path;

use crate::error::ReferenceError;

/// Hourly rows per day block.
pub const ROWS_PER_DAY: usize = 24;

/// Parsed reference values, without the time column.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTable {
    header: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl ReferenceTable {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ReferenceError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses table text. Blank lines are skipped; semicolons and tabs are
    /// accepted as delimiters besides commas. Every data row must hold as many
    /// values as the header names after the time column.
    pub fn parse(content: &str) -> Result<Self, ReferenceError> {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header_line) = lines.next().ok_or(ReferenceError::MissingHeader)?;
        let header: Vec<String> = split(header_line)
            .skip(1)
            .map(|name| name.trim_matches('"').to_string())
            .collect();

        let mut rows = Vec::new();
        for (index, line) in lines {
            let line_no = index + 1;
            let values = split(line)
                .map(|field| {
                    field.parse::<f64>().map_err(|e| ReferenceError::Parse {
                        line: line_no,
                        reason: format!("'{}': {}", field, e),
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;

            if values.len() < 2 {
                return Err(ReferenceError::Parse {
                    line: line_no,
                    reason: "expected a time index and at least one value".to_string(),
                });
            }
            // Every row must match the header so that column names stay aligned.
            if values.len() - 1 != header.len() {
                return Err(ReferenceError::Parse {
                    line: line_no,
                    reason: format!(
                        "header names {} columns, found {} values",
                        header.len(),
                        values.len() - 1
                    ),
                });
            }
            rows.push(values[1..].to_vec());
        }

        if rows.is_empty() {
            return Err(ReferenceError::Empty);
        }
        Ok(ReferenceTable { header, rows })
    }

    /// Column names after the time column.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Number of complete day blocks.
    pub fn num_days(&self) -> usize {
        self.rows.len() / ROWS_PER_DAY
    }

    /// Values of one data column, zero-based after the time column.
    pub fn column(&self, column: usize) -> Result<Vec<f64>, ReferenceError> {
        if column >= self.num_columns() {
            return Err(ReferenceError::MissingColumn {
                column,
                available: self.num_columns(),
            });
        }
        Ok(self.rows.iter().map(|row| row[column]).collect())
    }

    /// The 24 hourly values of `column` in day block `block` (zero-based).
    pub fn day_block(&self, block: usize, column: usize) -> Result<Vec<f64>, ReferenceError> {
        let values = self.column(column)?;
        let start = block * ROWS_PER_DAY;
        values
            .get(start..start + ROWS_PER_DAY)
            .map(<[f64]>::to_vec)
            .ok_or(ReferenceError::MissingBlock {
                block,
                rows: self.rows.len(),
                rows_per_block: ROWS_PER_DAY,
            })
    }
}

fn split(line: &str) -> impl Iterator<Item = &str> {
    line.split([',', ';', '\t']).map(str::trim)
}
