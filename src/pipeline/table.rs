//! Decode a tabular answer into a grid of cells.
//!
//! The model is asked for `Table:` followed by one comma-separated row per
//! line. Decoding is done with the `csv` crate rather than a bare split, so
//! a cell may hold a comma if the model quotes it (`"Smith, John",40`).
//! Unquoted commas always separate cells: a grid survives the trip through
//! text only when none of its cells contains a comma or a newline.
//!
//! Models also like to answer with GFM pipe tables despite the instructions;
//! when the first body line starts with `|` the body is read as a pipe table
//! instead.

use crate::error::PdfSectionError;
use crate::pipeline::classify::TABLE_MARKER;
use crate::pipeline::postprocess::clean_answer;
use tracing::debug;

/// Rows decoded from a tabular answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableGrid {
    /// Text after `Table:` on the marker line, if any.
    pub caption: Option<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableGrid {
    /// Widest row, in cells.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

/// Decode `answer` into a [`TableGrid`].
///
/// The answer is cleaned with [`clean_answer`] before decoding. Everything
/// before the marker is preamble and dropped. Without a marker the whole
/// answer is treated as the body.
pub fn parse_table(answer: &str) -> Result<TableGrid, PdfSectionError> {
    let cleaned = clean_answer(answer);
    let (caption, body) = split_at_marker(&cleaned);

    let pipe_table = body
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with('|'));

    let rows = if pipe_table {
        parse_pipe_rows(body)
    } else {
        parse_delimited_rows(body)?
    };

    debug!(
        "Decoded table: {} rows, {} columns, caption={:?}",
        rows.len(),
        rows.iter().map(Vec::len).max().unwrap_or(0),
        caption
    );
    Ok(TableGrid { caption, rows })
}

fn split_at_marker(answer: &str) -> (Option<String>, &str) {
    let Some(idx) = answer.find(TABLE_MARKER) else {
        return (None, answer);
    };
    let preamble = answer[..idx].trim();
    if !preamble.is_empty() {
        debug!("Dropping {} chars of preamble: {:?}", preamble.len(), preamble);
    }
    let after = &answer[idx + TABLE_MARKER.len()..];
    let (rest_of_line, body) = match after.find('\n') {
        Some(nl) => (&after[..nl], &after[nl + 1..]),
        None => (after, ""),
    };
    let caption = rest_of_line.trim();
    let caption = (!caption.is_empty()).then(|| caption.to_string());
    (caption, body)
}

fn parse_delimited_rows(body: &str) -> Result<Vec<Vec<String>>, PdfSectionError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| PdfSectionError::RenderFailed {
            format: "xlsx",
            detail: format!("row {}: {}", rows.len() + 1, e),
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn parse_pipe_rows(body: &str) -> Vec<Vec<String>> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_separator_row(l))
        .map(|l| {
            let inner = l.strip_prefix('|').unwrap_or(l);
            let inner = inner.strip_suffix('|').unwrap_or(inner);
            inner.split('|').map(|c| c.trim().to_string()).collect()
        })
        .collect()
}

fn is_separator_row(line: &str) -> bool {
    line.starts_with('|')
        && line.contains('-')
        && line
            .chars()
            .all(|c| c == '|' || c == '-' || c == ':' || c == ' ')
}
