use std::borrow::Cow;
use std::fmt::Write as _;

use crate::formats::Alignment;

/// Renders an aligned plain-text table. Columns without an entry in
/// `alignments` are left aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>], alignments: &[Alignment]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(&sanitize_cell(cell)));
        }
    }

    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();

    let header_line = format_row(headers, &widths, &[]);
    let _ = writeln!(output, "{header_line}");

    let separator_cells = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &widths, &[]);
    let _ = writeln!(output, "{separator_line}");

    for row in rows {
        let row_line = format_row(row, &widths, alignments);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>], alignments: &[Alignment]) {
    let rendered = render_table(headers, rows, alignments);
    print!("{rendered}");
}

fn pad(cell: &str, width: usize, alignment: Alignment) -> String {
    let padding = width.saturating_sub(display_width(cell));
    let (left, right) = match alignment {
        Alignment::Left => (0, padding),
        Alignment::Right => (padding, 0),
        Alignment::Center => (padding / 2, padding - padding / 2),
    };
    format!("{}{cell}{}", " ".repeat(left), " ".repeat(right))
}

fn format_row(values: &[String], widths: &[usize], alignments: &[Alignment]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(idx, (value, width))| {
            let alignment = alignments.get(idx).copied().unwrap_or_default();
            pad(&sanitize_cell(value), *width, alignment)
        })
        .collect::<Vec<_>>();
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    let mut width = 0usize;
    let mut chars = value.chars();
    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            // ANSI escape sequence such as \x1b[31m
            for next in chars.by_ref() {
                if next == 'm' {
                    break;
                }
            }
        } else {
            width += 1;
        }
    }
    width
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_aligned_cells_pad_on_the_left() {
        let rendered = render_table(
            &["Name".to_string(), "Qty".to_string()],
            &[vec!["pen".to_string(), "7".to_string()]],
            &[Alignment::Left, Alignment::Right],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Name  Qty");
        assert_eq!(lines[1], "----  ---");
        assert_eq!(lines[2], "pen     7");
    }

    #[test]
    fn newlines_in_cells_become_spaces() {
        let rendered = render_table(&["A".to_string()], &[vec!["x\ny".to_string()]], &[]);
        assert!(rendered.contains("x y"));
    }

    #[test]
    fn ansi_sequences_do_not_count_towards_width() {
        assert_eq!(display_width("\u{1b}[31mred\u{1b}[0m"), 3);
    }
}
