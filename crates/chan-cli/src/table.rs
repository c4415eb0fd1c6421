//! Plain-text tables with multi-line cells

use std::fmt;

/// Left-aligned table: header row, dash rule, then rows
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Empty table with the given column headers
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing trailing cells render empty
    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// No rows pushed yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let width = cell.lines().map(|l| l.chars().count()).max().unwrap_or(0);
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[&str], widths: &[usize]) -> fmt::Result {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let cell = cells.get(i).copied().unwrap_or("");
        line.push_str(cell);
        line.extend(std::iter::repeat(' ').take(width.saturating_sub(cell.chars().count())));
    }
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        let headers: Vec<&str> = self.headers.iter().map(String::as_str).collect();
        write_line(f, &headers, &widths)?;
        let rules: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        let rules: Vec<&str> = rules.iter().map(String::as_str).collect();
        write_line(f, &rules, &widths)?;

        for row in &self.rows {
            let cell_lines: Vec<Vec<&str>> = row.iter().map(|c| c.lines().collect()).collect();
            let height = cell_lines.iter().map(Vec::len).max().unwrap_or(0).max(1);
            for line in 0..height {
                let cells: Vec<&str> = cell_lines
                    .iter()
                    .map(|lines| lines.get(line).copied().unwrap_or(""))
                    .collect();
                write_line(f, &cells, &widths)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn aligns_columns() {
        let mut table = Table::new(["Channel", "Reason"]);
        table.push(vec!["UHF".to_string(), "Channel disabled on satellite".to_string()]);
        table.push(vec!["X_TXO_LONG".to_string(), "ok".to_string()]);
        assert_eq!(
            table.to_string(),
            "Channel     Reason\n\
             ----------  -----------------------------\n\
             UHF         Channel disabled on satellite\n\
             X_TXO_LONG  ok\n"
        );
    }

    #[test]
    fn multi_line_cells_span_rows() {
        let mut table = Table::new(["A", "B"]);
        table.push(vec!["x".to_string(), "one\ntwo".to_string()]);
        assert_eq!(table.to_string(), "A  B\n-  ---\nx  one\n   two\n");
    }
}
