//! Literal search over the editor buffer.
//!
//! A query is matched case-sensitively from the start of the text and only the
//! first occurrence is reported. Offsets are byte positions in the UTF-8
//! buffer; [`SearchMatch::char_range`] converts a match for widgets that select
//! by character index.

use std::ops::Range;

use thiserror::Error;

/// Error conditions raised by the search engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("search pattern cannot be empty")]
    EmptyPattern,
}

/// The first occurrence of a query in the buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Length of the match in bytes.
    pub len: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
}

impl SearchMatch {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn byte_range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// Converts the span to character indices within `text`.
    pub fn char_range(&self, text: &str) -> Range<usize> {
        let start = text[..self.start].chars().count();
        let len = text[self.byte_range()].chars().count();
        start..start + len
    }
}

/// Finds the first literal, case-sensitive occurrence of `query` in `text`.
///
/// Returns `Ok(None)` when the query does not occur.
pub fn find_first(text: &str, query: &str) -> Result<Option<SearchMatch>, SearchError> {
    if query.is_empty() {
        return Err(SearchError::EmptyPattern);
    }
    Ok(text.find(query).map(|start| {
        let (line, column) = line_and_column(text, start);
        SearchMatch {
            start,
            len: query.len(),
            line,
            column,
        }
    }))
}

fn line_and_column(text: &str, index: usize) -> (usize, usize) {
    let before = &text[..index];
    let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
    let line = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_span_of_first_match() {
        let found = find_first("hello world", "world").unwrap().unwrap();
        assert_eq!((found.start, found.len), (6, 5));
        assert_eq!(found.byte_range(), 6..11);
        assert_eq!((found.line, found.column), (1, 7));
    }

    #[test]
    fn returns_first_of_several_occurrences() {
        let found = find_first("abcabcabc", "bc").unwrap().unwrap();
        assert_eq!(found.start, 1);
    }

    #[test]
    fn match_at_position_k_spans_query_length() {
        let text = "0123456789needle--needle";
        for query in ["needle", "9n", "--"] {
            let k = text.find(query).unwrap();
            let found = find_first(text, query).unwrap().unwrap();
            assert_eq!(found.byte_range(), k..k + query.len());
        }
    }

    #[test]
    fn search_is_case_sensitive() {
        assert_eq!(find_first("Hello World", "world").unwrap(), None);
        assert!(find_first("Hello World", "World").unwrap().is_some());
    }

    #[test]
    fn absent_query_reports_no_match() {
        assert_eq!(find_first("alpha beta", "gamma").unwrap(), None);
        assert_eq!(find_first("", "x").unwrap(), None);
    }

    #[test]
    fn empty_query_is_rejected() {
        assert_eq!(find_first("anything", ""), Err(SearchError::EmptyPattern));
    }

    #[test]
    fn computes_line_and_column_across_lines() {
        let found = find_first("first\nsecond\nthird needle", "needle")
            .unwrap()
            .unwrap();
        assert_eq!((found.line, found.column), (3, 7));
    }

    #[test]
    fn char_range_accounts_for_multibyte_text() {
        let text = "日本語 text 日本";
        let found = find_first(text, "text").unwrap().unwrap();
        assert_eq!(found.start, 10);
        assert_eq!(found.char_range(text), 4..8);

        let found = find_first(text, "日本").unwrap().unwrap();
        assert_eq!(found.start, 0);
        assert_eq!(found.char_range(text), 0..2);
    }
}
