use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::month::{month_name, MonthTable};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub month: String,
    pub orders: u64,
    pub rows: usize,
    pub line_items: usize,
    pub header_duplicates: usize,
    pub blanks: usize,
    pub file: String,
}

impl MonthSummary {
    pub fn new(table: &MonthTable, file: &Path) -> Result<Self> {
        Ok(MonthSummary {
            month: month_name(table.month)?.to_string(),
            orders: table.order_count,
            rows: table.rows.len(),
            line_items: table.item_count(),
            header_duplicates: table.header_duplicate_count(),
            blanks: table.blank_count(),
            file: file.display().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub year: i32,
    pub seed: Option<u64>,
    pub first_order_id: u64,
    pub next_order_id: u64,
    pub elapsed_secs: f64,
    pub months: Vec<MonthSummary>,
}

impl RunSummary {
    pub fn total_rows(&self) -> usize {
        self.months.iter().map(|m| m.rows).sum()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Row;

    #[test]
    fn month_summary_counts_sentinels() {
        let table = MonthTable {
            month: 11,
            year: 2020,
            order_count: 0,
            rows: vec![Row::Blank, Row::HeaderDuplicate, Row::Blank],
        };
        let summary = MonthSummary::new(&table, Path::new("data/November_2020.csv")).unwrap();
        assert_eq!(summary.month, "November");
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.line_items, 0);
        assert_eq!(summary.blanks, 2);
        assert_eq!(summary.header_duplicates, 1);
    }

    #[test]
    fn serializes_to_json() {
        let run = RunSummary {
            year: 2020,
            seed: Some(1),
            first_order_id: 123456,
            next_order_id: 123460,
            elapsed_secs: 0.5,
            months: vec![MonthSummary {
                month: "January".to_string(),
                orders: 4,
                rows: 5,
                line_items: 4,
                header_duplicates: 0,
                blanks: 1,
                file: "data/January_2020.csv".to_string(),
            }],
        };
        let json = serde_json::to_string(&run).unwrap();
        assert!(json.contains("\"next_order_id\":123460"));
        let back: RunSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
        assert_eq!(back.total_rows(), 5);
    }
}
