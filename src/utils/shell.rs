//! Light shell lexing for the command gate.
//!
//! `mask_literals` blanks out the parts of a command line that the shell
//! treats as data: the inside of single- and double-quoted strings and the
//! bodies of heredocs. Every masked character becomes spaces of the same
//! byte length, so byte offsets found in the masked text index the original
//! command unchanged. Operators like `&&`, `;` and `|` that survive masking
//! are real statement separators.
//!
//! This is not a shell parser. Command substitution, backticks and comments
//! are left as they are.

use std::ops::Range;

/// Blank quoted spans and heredoc bodies, preserving byte offsets.
pub fn mask_literals(command: &str) -> String {
    let ranges = literal_ranges(command);
    if ranges.is_empty() {
        return command.to_string();
    }

    let mut out = String::with_capacity(command.len());
    let mut current = ranges.iter().peekable();
    for (i, c) in command.char_indices() {
        while current.peek().is_some_and(|r| r.end <= i) {
            current.next();
        }
        let masked = current.peek().is_some_and(|r| r.contains(&i));
        if masked && c != '\n' {
            out.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            out.push(c);
        }
    }
    out
}

/// A heredoc whose body starts at the next unquoted newline.
struct PendingHeredoc {
    delimiter: String,
    strip_tabs: bool,
}

/// Byte ranges of literal text, sorted and non-overlapping. All range
/// bounds fall on ASCII characters or the end of the string.
fn literal_ranges(command: &str) -> Vec<Range<usize>> {
    let bytes = command.as_bytes();
    let mut ranges = Vec::new();
    let mut pending: Vec<PendingHeredoc> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\'' => {
                let end = find_byte(bytes, i + 1, b'\'');
                ranges.push(i + 1..end);
                i = end + 1;
            }
            b'"' => {
                let end = closing_double_quote(bytes, i + 1);
                ranges.push(i + 1..end);
                i = end + 1;
            }
            b'<' if bytes.get(i + 1) == Some(&b'<') => {
                if bytes.get(i + 2) == Some(&b'<') {
                    // here-string, no body
                    i += 3;
                    continue;
                }
                let (heredoc, next) = heredoc_operator(command, i + 2);
                pending.extend(heredoc);
                i = next;
            }
            b'\n' if !pending.is_empty() => {
                let mut pos = i + 1;
                for heredoc in pending.drain(..) {
                    let (body, next) = heredoc_body(command, pos, &heredoc);
                    ranges.push(body);
                    pos = next;
                }
                i = pos;
            }
            _ => i += 1,
        }
    }

    ranges.retain(|r| !r.is_empty());
    ranges
}

fn find_byte(bytes: &[u8], from: usize, needle: u8) -> usize {
    bytes[from.min(bytes.len())..]
        .iter()
        .position(|&b| b == needle)
        .map_or(bytes.len(), |p| from + p)
}

/// Index of the `"` closing a double-quoted string, honoring `\"`.
fn closing_double_quote(bytes: &[u8], from: usize) -> usize {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return i,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Parse the word after `<<` (`-`, optional quotes, `\WORD`). Returns the
/// heredoc, if the word is well formed, and where scanning resumes.
fn heredoc_operator(command: &str, from: usize) -> (Option<PendingHeredoc>, usize) {
    let bytes = command.as_bytes();
    let mut i = from;

    let strip_tabs = bytes.get(i) == Some(&b'-');
    if strip_tabs {
        i += 1;
    }
    while matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    if bytes.get(i) == Some(&b'\\') {
        i += 1;
    }

    let (start, end, next) = match bytes.get(i) {
        Some(&quote @ (b'\'' | b'"')) => {
            let end = find_byte(bytes, i + 1, quote);
            (i + 1, end, (end + 1).min(bytes.len()))
        }
        _ => {
            let len = bytes[i.min(bytes.len())..]
                .iter()
                .take_while(|&&b| !b.is_ascii_whitespace() && !b";|&<>()'\"".contains(&b))
                .count();
            (i, i + len, i + len)
        }
    };

    let delimiter = command.get(start..end).unwrap_or_default();
    if delimiter.is_empty() {
        return (None, next.max(from));
    }
    let heredoc = PendingHeredoc {
        delimiter: delimiter.to_string(),
        strip_tabs,
    };
    (Some(heredoc), next)
}

/// The body of a heredoc starting at `from`, terminator line included.
/// An unterminated heredoc runs to the end of the command.
fn heredoc_body(command: &str, from: usize, heredoc: &PendingHeredoc) -> (Range<usize>, usize) {
    let mut pos = from;
    while pos < command.len() {
        let line_end = command[pos..].find('\n').map_or(command.len(), |p| pos + p);
        let line = &command[pos..line_end];
        let line = if heredoc.strip_tabs {
            line.trim_start_matches('\t')
        } else {
            line
        };
        let next = (line_end + 1).min(command.len());
        if line.trim_end() == heredoc.delimiter {
            return (from..line_end, next);
        }
        pos = next;
    }
    (from..command.len(), command.len())
}
