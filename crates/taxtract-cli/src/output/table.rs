use taxtract_core::export::xlsx::{data_rows, header_row};
use taxtract_core::model::Batch;

/// Print the batch as an aligned table, numbered from 1.
pub fn print(batch: &Batch) {
    println!("{}", format_batch(batch));
}

pub fn format_batch(batch: &Batch) -> String {
    if batch.is_empty() {
        return "No files processed.".to_string();
    }

    let mut header = vec!["#".to_string()];
    header.extend(header_row());

    let rows: Vec<Vec<String>> = data_rows(batch)
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut cells = vec![(i + 1).to_string()];
            // Multi-line region text is shown on one line.
            cells.extend(row.into_iter().map(|c| c.replace('\n', " ")));
            cells
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_row(&header, &widths));
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );

    for (row, record) in rows.iter().zip(&batch.records) {
        out.push('\n');
        out.push_str(&format_row(row, &widths));
        if let Some(ref err) = record.error {
            out.push_str(&format!("  [failed: {err}]"));
        }
    }

    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| {
            let pad = w.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}
