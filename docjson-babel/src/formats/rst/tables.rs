//! Grid tables, simple tables and the CSV body of `csv-table`.
//!
//! Column spans are not reconstructed: cells are cut at the column
//! boundaries of the table's first border line.

use super::blocks::dedent_block;
use super::inline::parse_inline;
use super::parser::{Line, Parser};
use crate::tree::{Element, Node};

impl Parser {
    pub(super) fn grid_table(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let mut end = i;
        while end < lines.len() && lines[end].text.starts_with(['+', '|']) {
            end += 1;
        }

        let border: Vec<char> = lines[i].text.chars().collect();
        let boundaries: Vec<usize> = border
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '+')
            .map(|(index, _)| index)
            .collect();

        let mut rows = Vec::new();
        let mut pending: Vec<Vec<String>> = Vec::new();
        let mut pending_line = lines[i].number;

        for line in &lines[i + 1..end] {
            if line.text.starts_with('+') {
                if !pending.is_empty() {
                    rows.push(self.grid_row(&pending, pending_line));
                    pending.clear();
                }
                continue;
            }
            if pending.is_empty() {
                pending = vec![Vec::new(); boundaries.len().saturating_sub(1)];
                pending_line = line.number;
            }
            let chars: Vec<char> = line.text.chars().collect();
            for (column, window) in boundaries.windows(2).enumerate() {
                let start = (window[0] + 1).min(chars.len());
                let stop = window[1].min(chars.len());
                let cell: String = chars[start..stop].iter().collect();
                pending[column].push(cell.trim_end().to_string());
            }
        }
        if !pending.is_empty() {
            rows.push(self.grid_row(&pending, pending_line));
        }

        (vec![Node::element(Element::Table, rows)], end)
    }

    /// One grid row; each cell is a small body of its own.
    fn grid_row(&mut self, cells: &[Vec<String>], number: usize) -> Node {
        let cells = cells
            .iter()
            .map(|texts| {
                let cell_lines: Vec<Line<'_>> = texts
                    .iter()
                    .map(|text| Line {
                        text: text.as_str(),
                        number,
                    })
                    .collect();
                Node::element(Element::Cell, self.parse_body(&dedent_block(&cell_lines)))
            })
            .collect();
        Node::element(Element::Row, cells)
    }

    pub(super) fn simple_table(&mut self, lines: &[Line<'_>], i: usize) -> (Vec<Node>, usize) {
        let columns = column_ranges(lines[i].text);
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut end = lines.len();

        let mut j = i + 1;
        while j < lines.len() {
            let line = lines[j];
            if is_simple_border(line.text) {
                let closes = lines.get(j + 1).map_or(true, Line::is_blank);
                if closes {
                    end = j + 1;
                    break;
                }
                j += 1;
                continue;
            }
            if !line.is_blank() {
                let cells = split_columns(line.text, &columns);
                let continues_previous =
                    cells.first().is_some_and(String::is_empty) && !rows.is_empty();
                match rows.last_mut() {
                    Some(previous) if continues_previous => {
                        for (target, extra) in previous.iter_mut().zip(cells) {
                            if !extra.is_empty() {
                                target.push('\n');
                                target.push_str(&extra);
                            }
                        }
                    }
                    _ => rows.push(cells),
                }
            }
            j += 1;
        }

        let rows = rows.iter().map(|cells| text_row(cells)).collect();
        (vec![Node::element(Element::Table, rows)], end)
    }
}

/// Build a row whose cells hold inline text only.
pub(super) fn text_row(cells: &[String]) -> Node {
    let cells = cells
        .iter()
        .map(|cell| {
            let children = if cell.is_empty() {
                Vec::new()
            } else {
                vec![Node::paragraph(parse_inline(cell))]
            };
            Node::element(Element::Cell, children)
        })
        .collect();
    Node::element(Element::Row, cells)
}

fn is_simple_border(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| c == '=' || c == ' ') && text.starts_with('=')
}

/// Character ranges of the `=` runs of a simple-table border.
fn column_ranges(border: &str) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = None;
    for (index, c) in border.chars().enumerate() {
        match (c, start) {
            ('=', None) => start = Some(index),
            (' ', Some(begin)) => {
                ranges.push((begin, index));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = start {
        ranges.push((begin, border.chars().count()));
    }
    ranges
}

/// Cut a row line at the column ranges; the last column runs to the end.
fn split_columns(text: &str, columns: &[(usize, usize)]) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    columns
        .iter()
        .enumerate()
        .map(|(index, (start, _))| {
            let stop = if index + 1 == columns.len() {
                chars.len()
            } else {
                // Text may spill into the gap before the next column.
                columns[index + 1].0.min(chars.len())
            };
            let start = (*start).min(chars.len());
            chars[start..stop.max(start)]
                .iter()
                .collect::<String>()
                .trim()
                .to_string()
        })
        .collect()
}

/// Split one CSV record. Double quotes group fields and `""` escapes a quote.
pub(super) fn split_csv(record: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = record.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => {
                fields.push(field.trim().to_string());
                field.clear();
            }
            c => field.push(c),
        }
    }
    fields.push(field.trim().to_string());
    fields
}
