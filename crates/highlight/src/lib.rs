//! 依副檔名挑選的輕量語法高亮。 / Extension-keyed syntax highlighting.
//!
//! Tokens carry byte ranges into the source text; the caller decides how each
//! [`HighlightKind`] is painted.

mod language;

pub use language::{HighlightError, HighlightKind, HighlightToken, SyntaxMode};
