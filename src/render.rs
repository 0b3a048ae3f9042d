//! Markdown presentation of an interpreted table.

use chart_types::{ChartTable, HEADER_LABEL, HEADER_SUB_LABEL, TableRow};

fn pipe_line(cells: impl IntoIterator<Item = String>) -> String {
    format!("| {} |", cells.into_iter().collect::<Vec<_>>().join(" | "))
}

fn row_line(row: &TableRow) -> String {
    pipe_line(
        [row.label.clone(), row.sub_label.clone()]
            .into_iter()
            .chain(row.cells.iter().cloned()),
    )
}

/// Render `table` as a pipe-delimited Markdown table.
pub fn to_markdown(table: &ChartTable) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 2);
    lines.push(pipe_line(
        [HEADER_LABEL.to_string(), HEADER_SUB_LABEL.to_string()]
            .into_iter()
            .chain(table.columns.iter().cloned()),
    ));
    lines.push(pipe_line(
        ["----".to_string(), "---".to_string()]
            .into_iter()
            .chain(table.columns.iter().map(|_| "----".to_string())),
    ));
    lines.extend(table.rows.iter().map(row_line));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_layout() {
        let table = ChartTable {
            columns: vec!["丙寅".into(), "丁卯".into()],
            rows: vec![
                TableRow::new("", "主星", vec!["紫微/天府".into(), String::new()]),
                TableRow::new("本命", "宮位", vec!["命".into(), "兄".into()]),
            ],
        };
        let md = to_markdown(&table);
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| 原始資料 | 宮干支 | 丙寅 | 丁卯 |");
        assert_eq!(lines[1], "| ---- | --- | ---- | ---- |");
        assert_eq!(lines[2], "|  | 主星 | 紫微/天府 |  |");
        assert_eq!(lines[3], "| 本命 | 宮位 | 命 | 兄 |");
    }
}
