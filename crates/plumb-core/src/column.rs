//! Column/tab model shared by every decree.
//!
//! Columns count Unicode scalar values, never bytes or UTF-16 units, so a line
//! containing emoji keeps the same column numbering as the front-end.

/// Effective column of the code point at `char_index`.
///
/// A tab advances to the next multiple of `tab_width`; every other code point
/// advances by one. Indices past the end of the line stop at its width.
#[must_use]
pub fn effective_column(line: &str, char_index: usize, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    line.chars()
        .take(char_index)
        .fold(0, |column, ch| advance(column, ch, tab_width))
}

/// Effective column of the first non-whitespace code point.
///
/// A line made only of whitespace yields its expanded length.
#[must_use]
pub fn line_start(line: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut column = 0;
    for ch in line.chars() {
        if !ch.is_whitespace() {
            break;
        }
        column = advance(column, ch, tab_width);
    }
    column
}

/// Code-point index of the first non-whitespace character.
#[must_use]
pub fn first_non_whitespace(line: &str) -> Option<usize> {
    line.chars().position(|ch| !ch.is_whitespace())
}

/// `true` when nothing but whitespace precedes `char_index`.
#[must_use]
pub fn is_blank_before(line: &str, char_index: usize) -> bool {
    line.chars().take(char_index).all(char::is_whitespace)
}

#[must_use]
pub fn is_blank(line: &str) -> bool {
    line.chars().all(char::is_whitespace)
}

const fn advance(column: usize, ch: char, tab_width: usize) -> usize {
    if ch == '\t' {
        (column / tab_width + 1) * tab_width
    } else {
        column + 1
    }
}
