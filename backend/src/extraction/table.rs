//! Markdown table rendering
//!
//! Tables found in uploaded documents are flattened to markdown so the
//! row/column structure survives into prompts.

/// Render rows as a markdown table. The first row is the header; rows
/// are padded to the widest row. Returns an empty string when there is
/// no content.
pub fn table_to_markdown(rows: &[Vec<String>]) -> String {
    let num_cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    if num_cols == 0 || rows.iter().all(|row| row.iter().all(|c| c.trim().is_empty())) {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    let mut rows = rows.iter().filter(|row| !row.is_empty());

    if let Some(header) = rows.next() {
        lines.push(render_row(header, num_cols));
        lines.push(format!("|{}|", vec!["---"; num_cols].join("|")));
    }
    for row in rows {
        lines.push(render_row(row, num_cols));
    }

    lines.join("\n")
}

fn render_row(row: &[String], num_cols: usize) -> String {
    let cells: Vec<String> = (0..num_cols)
        .map(|i| {
            row.get(i)
                .map(|cell| cell.trim().replace('|', "\\|"))
                .unwrap_or_default()
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

/// Split a line of extracted text into columns. Columns are separated by
/// a tab or by a run of two or more spaces.
pub fn split_columns(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut spaces = 0;

    for ch in line.trim().chars() {
        match ch {
            '\t' => {
                push_cell(&mut cells, &mut current);
                spaces = 0;
            }
            ' ' => spaces += 1,
            _ => {
                if spaces >= 2 {
                    push_cell(&mut cells, &mut current);
                } else if spaces == 1 {
                    current.push(' ');
                }
                spaces = 0;
                current.push(ch);
            }
        }
    }
    push_cell(&mut cells, &mut current);

    cells
}

fn push_cell(cells: &mut Vec<String>, current: &mut String) {
    if !current.is_empty() {
        cells.push(std::mem::take(current));
    }
}

/// Rewrite runs of column-aligned lines as markdown tables.
///
/// Two or more consecutive lines that split into the same number (at
/// least two) of columns form a table; everything else passes through.
pub fn render_aligned_tables(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let columns = split_columns(lines[i]);
        if columns.len() < 2 {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        }

        let mut rows = vec![columns];
        let mut j = i + 1;
        while j < lines.len() {
            let next = split_columns(lines[j]);
            if next.len() != rows[0].len() {
                break;
            }
            rows.push(next);
            j += 1;
        }

        if rows.len() >= 2 {
            out.push(String::new());
            out.push(table_to_markdown(&rows));
            out.push(String::new());
        } else {
            out.push(lines[i].to_string());
        }
        i = j;
    }

    out.join("\n")
}
