use std::io::{self, Write};
use std::mem::take;

pub const SEP: char = ',';

/* ---------------- Parsing ---------------- */

/// Quote-aware CSV reader (CRLF tolerant). Quoted fields may span lines, so
/// outline descriptions with embedded newlines come back as one field.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == SEP && !in_quotes => {
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without a newline, even if quotes were left open.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str) -> bool {
    field.contains(SEP) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write one row, `\n` terminated.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first {
            write!(w, "{}", SEP)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn quoted_fields_are_escaped_on_write() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["a", "b,c", "say \"hi\"", "two\nlines", ""]).expect("write");
        assert_eq!(
            String::from_utf8(buf).expect("utf8"),
            "a,\"b,c\",\"say \"\"hi\"\"\",\"two\nlines\",\n"
        );
    }

    #[test]
    fn parser_reads_back_what_writer_wrote() {
        let rows = vec![
            vec!["id".to_string(), "description".to_string()],
            vec!["1".to_string(), "first line\nsecond, with comma".to_string()],
            vec!["2".to_string(), String::new()],
        ];
        let mut buf = Vec::new();
        for r in &rows {
            write_row(&mut buf, r).expect("write");
        }
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(parse_rows(&text), rows);
    }

    #[test]
    fn parser_tolerates_crlf_and_missing_final_newline() {
        let rows = parse_rows("a,b\r\nc,d");
        assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
        assert!(parse_rows("").is_empty());
        assert!(parse_rows("\n\n").is_empty());
    }
}
