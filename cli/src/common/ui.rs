//! # Terminal Helpers
//!
//! File: cli/src/common/ui.rs
//!
//! Small stdout/stdin helpers: a yes/no confirmation prompt and a plain
//! column-aligned table used by the listing commands.
//!
use crate::core::error::{PhpierError, Result};
use anyhow::anyhow;
use std::io::{self, BufRead, Write};

/// Asks a yes/no question on the terminal. Only `y`/`yes` (case-insensitive)
/// count as confirmation.
pub fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N]: ");
    io::stdout()
        .flush()
        .map_err(|e| anyhow!(PhpierError::FileSystem(e.to_string())))?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| anyhow!(PhpierError::FileSystem(e.to_string())))?;

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}

/// Column-aligned text table. Widths are computed from the widest cell per
/// column; there is no wrapping.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table with two spaces between columns and a dash rule
    /// under the header.
    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i >= widths.len() {
                    widths.push(cell.len());
                } else if cell.len() > widths[i] {
                    widths[i] = cell.len();
                }
            }
        }

        let render_row = |cells: &[String]| -> String {
            let mut line = String::new();
            for (i, cell) in cells.iter().enumerate() {
                if i > 0 {
                    line.push_str("  ");
                }
                if i + 1 == cells.len() {
                    line.push_str(cell);
                } else {
                    line.push_str(&format!("{cell:<width$}", width = widths[i]));
                }
            }
            line
        };

        let mut out = String::new();
        out.push_str(&render_row(&self.headers));
        out.push('\n');
        let rule_width = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        out.push_str(&"-".repeat(rule_width));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_row(row));
            out.push('\n');
        }
        out
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_alignment() {
        let mut table = Table::new(&["NAME", "STATUS"]);
        table.add_row(vec!["blog".into(), "running".into()]);
        table.add_row(vec!["my-long-project".into(), "exited".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("NAME"));
        assert!(lines[1].chars().all(|c| c == '-'));
        // STATUS column starts at the same offset in every row.
        let offset = lines[0].find("STATUS").unwrap();
        assert_eq!(&lines[2][offset..offset + 7], "running");
        assert_eq!(&lines[3][offset..offset + 6], "exited");
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new(&["A"]);
        assert!(table.is_empty());
    }
}
