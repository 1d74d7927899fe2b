//! Two-column help text for an option table, sized to the terminal.

use crate::error::{decorated, Error, Result};
use crate::option::{Opt, Role, Table};
use std::io::Write;

/// Widest the option column is allowed to get.
const LEFT_COLUMN_MAX_WIDTH: usize = 30;
/// Narrower than this and the help is not worth printing.
const LEFT_COLUMN_MIN_WIDTH: usize = 8;
/// Spaces between the two columns.
const COLUMN_SEPARATOR: &str = "  ";

const DEFAULT_COLUMNS: usize = 80;
const DEFAULT_ROWS: usize = 24;

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub columns: usize,
    pub rows: usize,
}

impl TerminalSize {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self { columns, rows }
    }

    /// Read `COLUMNS` and `LINES`, falling back to 80x24.
    pub fn from_env() -> Self {
        let read = |name: &str, default: usize| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(default)
        };
        Self::new(read("COLUMNS", DEFAULT_COLUMNS), read("LINES", DEFAULT_ROWS))
    }
}

impl Default for TerminalSize {
    fn default() -> Self {
        Self::new(DEFAULT_COLUMNS, DEFAULT_ROWS)
    }
}

/// Column widths derived from a terminal size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub left: usize,
    pub right: usize,
}

impl Layout {
    pub fn for_terminal(size: TerminalSize) -> Result<Self> {
        let half = size.columns / 2;
        let left = LEFT_COLUMN_MAX_WIDTH.min(half.saturating_sub(COLUMN_SEPARATOR.len()));
        if left < LEFT_COLUMN_MIN_WIDTH {
            return Err(Error::DisplayTooNarrow);
        }
        Ok(Self { left, right: half })
    }
}

/// Write the help table for every listed entry of `table`.
pub fn render_help<W: Write>(out: &mut W, table: &Table, size: TerminalSize) -> Result<()> {
    let layout = Layout::for_terminal(size)?;

    for opt in table.iter().filter(|opt| opt.is_listed()) {
        match opt.role() {
            Role::Heading => write!(out, "\n  {}\n\n", opt.description())?,
            Role::Text => writeln!(out, "{}", opt.description())?,
            Role::Normal => {
                let labels = word_wrap(&label(opt), layout.left);
                let descriptions = word_wrap(opt.description(), layout.right);
                // Rows pair up by index; the longer column is cut at the shorter one
                for (l, r) in labels.iter().zip(&descriptions) {
                    writeln!(out, "{}{}{}", pad(l, layout.left), COLUMN_SEPARATOR, r)?;
                }
            }
        }
    }

    Ok(())
}

/// Render the help table into a string.
pub fn generate_help(table: &Table, size: TerminalSize) -> Result<String> {
    let mut buf = Vec::new();
    render_help(&mut buf, table, size)?;
    String::from_utf8(buf)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

fn label(opt: &Opt) -> String {
    let mut s = decorated(opt.long_key());
    if let Some(short) = opt.short_key() {
        let short = short.to_string();
        if short != opt.long_key() {
            s.push_str(", ");
            s.push_str(&decorated(&short));
        }
    }
    s
}

/// Split `s` into rows of at most `width` characters, breaking after whitespace
/// where possible. A word longer than `width` is cut at `width`.
///
/// Whitespace at a break is dropped, so no row starts or ends with it.
pub fn word_wrap(s: &str, width: usize) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let width = width.max(1);
    let mut rows = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let mut end = chars.len().min(start + width);
        if end < chars.len() && !chars[end].is_whitespace() {
            let mut brk = end;
            while brk > start && !chars[brk - 1].is_whitespace() {
                brk -= 1;
            }
            if brk > start {
                end = brk;
            }
        }

        let row: String = chars[start..end].iter().collect();
        rows.push(row.trim_end().to_string());

        start = end;
        while start < chars.len() && chars[start].is_whitespace() {
            start += 1;
        }
    }

    rows
}

/// Right-pad `s` with spaces to `width` characters.
pub fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let mut padded = String::with_capacity(s.len() + width.saturating_sub(len));
    padded.push_str(s);
    padded.extend(std::iter::repeat(' ').take(width.saturating_sub(len)));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{heading, hidden, text};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_width_40() {
        let layout = Layout::for_terminal(TerminalSize::new(40, 24)).unwrap();
        assert_eq!(layout, Layout { left: 18, right: 20 });
    }

    #[test]
    fn test_layout_caps_left_column() {
        let layout = Layout::for_terminal(TerminalSize::new(120, 40)).unwrap();
        assert_eq!(layout, Layout { left: 30, right: 60 });
    }

    #[test]
    fn test_layout_smallest_allowed() {
        let layout = Layout::for_terminal(TerminalSize::new(20, 5)).unwrap();
        assert_eq!(layout, Layout { left: 8, right: 10 });
    }

    #[test]
    fn test_layout_too_narrow() {
        for columns in [0, 3, 10, 19] {
            let result = Layout::for_terminal(TerminalSize::new(columns, 24));
            assert!(matches!(result, Err(Error::DisplayTooNarrow)), "columns = {}", columns);
        }
    }

    #[test]
    fn test_render_too_narrow() {
        let table = Table::from(vec![Opt::new("help", 'h', "Show help.")]);
        let result = generate_help(&table, TerminalSize::new(10, 24));
        assert!(matches!(result, Err(Error::DisplayTooNarrow)));
    }

    #[test]
    fn test_word_wrap_breaks_at_whitespace() {
        assert_eq!(
            word_wrap("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn test_word_wrap_break_on_boundary() {
        assert_eq!(word_wrap("abcde fghij", 5), vec!["abcde", "fghij"]);
    }

    #[test]
    fn test_word_wrap_forces_long_words() {
        assert_eq!(word_wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_word_wrap_short_and_empty() {
        assert_eq!(word_wrap("fits", 10), vec!["fits"]);
        assert!(word_wrap("", 10).is_empty());
    }

    #[test]
    fn test_word_wrap_rows_within_width() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod";
        for width in 1..20 {
            for row in word_wrap(text, width) {
                assert!(row.chars().count() <= width, "{:?} wider than {}", row, width);
            }
        }
    }

    #[test]
    fn test_generate_help_keeps_multibyte_text() {
        let table = Table::from(vec![Opt::new("naïve", 'ü', "Größe ändern.")]);
        let help = generate_help(&table, TerminalSize::new(40, 24)).unwrap();
        assert_eq!(help, format!("{}  Größe ändern.\n", pad("--naïve, -ü", 18)));
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("ab", 5), "ab   ");
        assert_eq!(pad("abcdef", 3), "abcdef");
    }

    #[test]
    fn test_label() {
        assert_eq!(label(&Opt::new("help", 'h', "")), "--help, -h");
        assert_eq!(label(&Opt::long("verbose", "")), "--verbose");
        assert_eq!(label(&Opt::short('q', "")), "-q");
    }

    #[test]
    fn test_render_table() {
        let table = Table::from(vec![
            heading("Allowed options:"),
            Opt::new("help", 'h', "Show help."),
            Opt::new("count", 'c', "Number of times to repeat the greeting"),
            hidden(Opt::new("", '0', "positional")),
            text("Report bugs upstream."),
        ]);

        let help = generate_help(&table, TerminalSize::new(40, 24)).unwrap();
        let expected = concat!(
            "\n",
            "  Allowed options:\n",
            "\n",
            "--help, -h          Show help.\n",
            "--count, -c         Number of times to\n",
            "Report bugs upstream.\n",
        );
        assert_eq!(help, expected);
    }

    #[test]
    fn test_render_pairs_rows_by_index() {
        let table = Table::from(vec![Opt::long(
            "a-rather-long-option-name",
            "Short and sweet description text",
        )]);
        let help = generate_help(&table, TerminalSize::new(40, 24)).unwrap();
        let expected = concat!(
            "--a-rather-long-op  Short and sweet\n",
            "tion-name           description text\n",
        );
        assert_eq!(help, expected);
    }

    #[test]
    fn test_render_skips_hidden_entries() {
        let table = Table::from(vec![hidden(Opt::long("secret", "Not shown."))]);
        let help = generate_help(&table, TerminalSize::default()).unwrap();
        assert_eq!(help, "");
    }
}
