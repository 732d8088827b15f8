//! Column-aligned table printing

use crate::error::Result;
use std::io::Write;

/// Spaces between two columns
const COLUMN_PADDING: usize = 3;

/// Print `rows` under `headers`, each column as wide as its widest cell
pub fn print_table<W, R, C>(out: &mut W, headers: &[&str], rows: R) -> Result<()>
where
    W: Write + ?Sized,
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    let rows: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(|c| c.as_ref().to_string()).collect())
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(width) => *width = (*width).max(len),
                None => widths.push(len),
            }
        }
    }

    write_line(out, &widths, headers.iter().copied())?;
    for row in &rows {
        write_line(out, &widths, row.iter().map(String::as_str))?;
    }
    Ok(())
}

fn write_line<'a, W>(
    out: &mut W,
    widths: &[usize],
    cells: impl Iterator<Item = &'a str>,
) -> Result<()>
where
    W: Write + ?Sized,
{
    let mut line = String::new();
    for (i, cell) in cells.enumerate() {
        if i > 0 {
            line.push_str(&" ".repeat(COLUMN_PADDING));
        }
        line.push_str(cell);
        let width = widths.get(i).copied().unwrap_or_default();
        line.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
    }
    writeln!(out, "{}", line.trim_end())?;
    Ok(())
}
