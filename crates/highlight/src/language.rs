use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

const NUMBER_PATTERN: &str = r"(?x)
    \b
    (?:
        0[xX][0-9A-Fa-f_]+ |
        0[bB][01_]+ |
        [0-9][0-9_]*(?:\.[0-9_]+)?(?:[eE][+-]?[0-9_]+)?
    )
    [fFlLdDuU]*
    \b
";

/// Highlight mode chosen from a file extension.
/// （依副檔名選擇的語法高亮模式。）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxMode {
    Java,
    Python,
    Cpp,
    Html,
    Css,
    PlainText,
}

impl SyntaxMode {
    pub const ALL: [SyntaxMode; 6] = [
        SyntaxMode::Java,
        SyntaxMode::Python,
        SyntaxMode::Cpp,
        SyntaxMode::Html,
        SyntaxMode::Css,
        SyntaxMode::PlainText,
    ];

    /// Maps an extension (without the dot, any case) to a mode.
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_ascii_lowercase().as_str() {
            "java" => SyntaxMode::Java,
            "py" => SyntaxMode::Python,
            "cpp" => SyntaxMode::Cpp,
            "html" => SyntaxMode::Html,
            "css" => SyntaxMode::Css,
            _ => SyntaxMode::PlainText,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(SyntaxMode::from_extension)
            .unwrap_or(SyntaxMode::PlainText)
    }

    pub fn label(self) -> &'static str {
        match self {
            SyntaxMode::Java => "Java",
            SyntaxMode::Python => "Python",
            SyntaxMode::Cpp => "C++",
            SyntaxMode::Html => "HTML",
            SyntaxMode::Css => "CSS",
            SyntaxMode::PlainText => "Plain Text",
        }
    }

    /// Tokens for the text, sorted by start offset; plain text yields none.
    pub fn highlight(self, input: &str) -> Vec<HighlightToken> {
        BUILTINS
            .get(&self)
            .map(|language| language.highlight(input))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Keyword,
    Comment,
    String,
    Number,
    Tag,
    Directive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightToken {
    pub range: Range<usize>,
    pub kind: HighlightKind,
}

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("regex compilation failed: {0}")]
    RegexCompilation(String),
}

#[derive(Debug, Clone, Copy)]
struct StringDelimiter {
    start: &'static str,
    end: &'static str,
    escape: Option<char>,
    multiline: bool,
}

impl StringDelimiter {
    const fn quoted(quote: &'static str) -> Self {
        Self {
            start: quote,
            end: quote,
            escape: Some('\\'),
            multiline: false,
        }
    }
}

/// Static description of one language's lexical rules.
struct LanguageRules {
    keywords: &'static [&'static str],
    line_comment: Option<&'static str>,
    block_comment: Option<(&'static str, &'static str)>,
    strings: &'static [StringDelimiter],
    numbers: bool,
    rules: &'static [(&'static str, HighlightKind)],
}

#[derive(Debug)]
struct LanguageDefinition {
    keyword_regex: Option<Regex>,
    number_regex: Option<Regex>,
    line_comment: Option<&'static str>,
    block_comment: Option<(&'static str, &'static str)>,
    strings: &'static [StringDelimiter],
    rules: Vec<(Regex, HighlightKind)>,
}

impl LanguageDefinition {
    fn compile(source: &LanguageRules) -> Result<Self, HighlightError> {
        let keyword_regex = build_keyword_regex(source.keywords)?;
        let number_regex = if source.numbers {
            Some(compile(NUMBER_PATTERN, false)?)
        } else {
            None
        };
        let rules = source
            .rules
            .iter()
            .map(|(pattern, kind)| Ok((compile(pattern, true)?, *kind)))
            .collect::<Result<Vec<_>, HighlightError>>()?;
        Ok(Self {
            keyword_regex,
            number_regex,
            line_comment: source.line_comment,
            block_comment: source.block_comment,
            strings: source.strings,
            rules,
        })
    }

    fn highlight(&self, input: &str) -> Vec<HighlightToken> {
        let mut tokens = Vec::new();
        if input.is_empty() {
            return tokens;
        }
        let mut occupied = vec![false; input.len()];

        self.scan_comments_and_strings(input, &mut tokens, &mut occupied);

        for (regex, kind) in &self.rules {
            highlight_with_regex(regex, *kind, input, &mut tokens, &mut occupied);
        }
        if let Some(regex) = &self.keyword_regex {
            highlight_with_regex(regex, HighlightKind::Keyword, input, &mut tokens, &mut occupied);
        }
        if let Some(regex) = &self.number_regex {
            highlight_with_regex(regex, HighlightKind::Number, input, &mut tokens, &mut occupied);
        }

        tokens.sort_by_key(|token| token.range.start);
        tokens
    }

    /// Single left-to-right pass so a comment marker inside a string (or the
    /// reverse) is never mistaken for the start of a token.
    fn scan_comments_and_strings(
        &self,
        input: &str,
        tokens: &mut Vec<HighlightToken>,
        occupied: &mut [bool],
    ) {
        let mut index = 0;
        while index < input.len() {
            let rest = &input[index..];

            if let Some((open, close)) = self.block_comment {
                if rest.starts_with(open) {
                    let body = index + open.len();
                    let end = input[body..]
                        .find(close)
                        .map_or(input.len(), |found| body + found + close.len());
                    push_token(tokens, occupied, index..end, HighlightKind::Comment);
                    index = end;
                    continue;
                }
            }

            if let Some(marker) = self.line_comment {
                if rest.starts_with(marker) {
                    let end = rest.find('\n').map_or(input.len(), |found| index + found);
                    push_token(tokens, occupied, index..end, HighlightKind::Comment);
                    index = end;
                    continue;
                }
            }

            if let Some(delimiter) = self.strings.iter().find(|d| rest.starts_with(d.start)) {
                let end = string_end(delimiter, input, index + delimiter.start.len());
                push_token(tokens, occupied, index..end, HighlightKind::String);
                index = end;
                continue;
            }

            index += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
}

fn string_end(delimiter: &StringDelimiter, input: &str, body: usize) -> usize {
    let mut escaped = false;
    for (offset, ch) in input[body..].char_indices() {
        let at = body + offset;
        if escaped {
            escaped = false;
            continue;
        }
        if Some(ch) == delimiter.escape {
            escaped = true;
            continue;
        }
        if ch == '\n' && !delimiter.multiline {
            return at;
        }
        if input[at..].starts_with(delimiter.end) {
            return at + delimiter.end.len();
        }
    }
    input.len()
}

fn push_token(
    tokens: &mut Vec<HighlightToken>,
    occupied: &mut [bool],
    range: Range<usize>,
    kind: HighlightKind,
) {
    mark_range(occupied, range.clone());
    tokens.push(HighlightToken { range, kind });
}

fn highlight_with_regex(
    regex: &Regex,
    kind: HighlightKind,
    input: &str,
    tokens: &mut Vec<HighlightToken>,
    occupied: &mut [bool],
) {
    for found in regex.find_iter(input) {
        let range = found.start()..found.end();
        if range.is_empty()
            || range
                .clone()
                .any(|index| occupied.get(index).copied().unwrap_or(false))
        {
            continue;
        }
        push_token(tokens, occupied, range, kind);
    }
}

fn mark_range(occupied: &mut [bool], range: Range<usize>) {
    let start = range.start.min(occupied.len());
    let end = range.end.min(occupied.len());
    for slot in &mut occupied[start..end] {
        *slot = true;
    }
}

fn compile(pattern: &str, multi_line: bool) -> Result<Regex, HighlightError> {
    RegexBuilder::new(pattern)
        .multi_line(multi_line)
        .build()
        .map_err(|err| HighlightError::RegexCompilation(format!("{pattern}: {err}")))
}

fn build_keyword_regex(keywords: &[&str]) -> Result<Option<Regex>, HighlightError> {
    if keywords.is_empty() {
        return Ok(None);
    }
    let pattern = keywords
        .iter()
        .map(|keyword| regex::escape(keyword))
        .collect::<Vec<_>>()
        .join("|");
    compile(&format!(r"\b(?:{pattern})\b"), false).map(Some)
}

const C_STYLE_STRINGS: &[StringDelimiter] = &[
    StringDelimiter::quoted("\""),
    StringDelimiter::quoted("'"),
];

const PYTHON_STRINGS: &[StringDelimiter] = &[
    StringDelimiter {
        start: "\"\"\"",
        end: "\"\"\"",
        escape: Some('\\'),
        multiline: true,
    },
    StringDelimiter {
        start: "'''",
        end: "'''",
        escape: Some('\\'),
        multiline: true,
    },
    StringDelimiter::quoted("\""),
    StringDelimiter::quoted("'"),
];

const HTML_STRINGS: &[StringDelimiter] = &[StringDelimiter {
    start: "\"",
    end: "\"",
    escape: None,
    multiline: true,
}];

const JAVA: LanguageRules = LanguageRules {
    keywords: &[
        "abstract", "boolean", "break", "byte", "case", "catch", "char", "class", "continue",
        "default", "do", "double", "else", "enum", "extends", "false", "final", "finally",
        "float", "for", "if", "implements", "import", "instanceof", "int", "interface", "long",
        "new", "null", "package", "private", "protected", "public", "record", "return", "short",
        "static", "super", "switch", "synchronized", "this", "throw", "throws", "true", "try",
        "var", "void", "volatile", "while",
    ],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    strings: C_STYLE_STRINGS,
    numbers: true,
    rules: &[(r"@[A-Za-z_][A-Za-z0-9_]*", HighlightKind::Directive)],
};

const PYTHON: LanguageRules = LanguageRules {
    keywords: &[
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ],
    line_comment: Some("#"),
    block_comment: None,
    strings: PYTHON_STRINGS,
    numbers: true,
    rules: &[(r"^\s*@[A-Za-z_][A-Za-z0-9_.]*", HighlightKind::Directive)],
};

const CPP: LanguageRules = LanguageRules {
    keywords: &[
        "auto", "bool", "break", "case", "catch", "char", "class", "const", "constexpr",
        "continue", "default", "delete", "do", "double", "else", "enum", "explicit", "false",
        "float", "for", "friend", "if", "inline", "int", "long", "namespace", "new", "nullptr",
        "operator", "private", "protected", "public", "return", "short", "signed", "sizeof",
        "static", "struct", "switch", "template", "this", "throw", "true", "try", "typedef",
        "typename", "union", "unsigned", "using", "virtual", "void", "volatile", "while",
    ],
    line_comment: Some("//"),
    block_comment: Some(("/*", "*/")),
    strings: C_STYLE_STRINGS,
    numbers: true,
    rules: &[(r"^[ \t]*#[ \t]*[A-Za-z]+", HighlightKind::Directive)],
};

const HTML: LanguageRules = LanguageRules {
    keywords: &[],
    line_comment: None,
    block_comment: Some(("<!--", "-->")),
    strings: HTML_STRINGS,
    numbers: false,
    rules: &[
        (r"<![A-Za-z]+|</?[A-Za-z][A-Za-z0-9-]*|/?>", HighlightKind::Tag),
        (r"&(?:[A-Za-z]+|#[0-9]+|#x[0-9A-Fa-f]+);", HighlightKind::Directive),
    ],
};

const CSS: LanguageRules = LanguageRules {
    keywords: &[],
    line_comment: None,
    block_comment: Some(("/*", "*/")),
    strings: C_STYLE_STRINGS,
    numbers: false,
    rules: &[
        (r"@[A-Za-z-]+", HighlightKind::Directive),
        (r"!important", HighlightKind::Keyword),
        (r"#[0-9A-Fa-f]{3,8}\b", HighlightKind::Number),
        (
            r"-?\b[0-9]+(?:\.[0-9]+)?(?:px|em|rem|vh|vw|pt|ms|s|%)?",
            HighlightKind::Number,
        ),
    ],
};

static BUILTINS: Lazy<HashMap<SyntaxMode, LanguageDefinition>> = Lazy::new(|| {
    [
        (SyntaxMode::Java, &JAVA),
        (SyntaxMode::Python, &PYTHON),
        (SyntaxMode::Cpp, &CPP),
        (SyntaxMode::Html, &HTML),
        (SyntaxMode::Css, &CSS),
    ]
    .into_iter()
    .map(|(mode, source)| {
        let definition = LanguageDefinition::compile(source)
            .unwrap_or_else(|err| panic!("built-in {} rules must compile: {err}", mode.label()));
        (mode, definition)
    })
    .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_of(mode: SyntaxMode, source: &str) -> Vec<(String, HighlightKind)> {
        mode.highlight(source)
            .into_iter()
            .map(|token| (source[token.range].to_string(), token.kind))
            .collect()
    }

    #[test]
    fn selects_mode_from_extension_case_insensitively() {
        assert_eq!(SyntaxMode::from_path("Main.java"), SyntaxMode::Java);
        assert_eq!(SyntaxMode::from_path("script.PY"), SyntaxMode::Python);
        assert_eq!(SyntaxMode::from_path("engine.cpp"), SyntaxMode::Cpp);
        assert_eq!(SyntaxMode::from_path("index.Html"), SyntaxMode::Html);
        assert_eq!(SyntaxMode::from_path("site.css"), SyntaxMode::Css);
        assert_eq!(SyntaxMode::from_path("notes.txt"), SyntaxMode::PlainText);
        assert_eq!(SyntaxMode::from_path("Makefile"), SyntaxMode::PlainText);
        assert_eq!(SyntaxMode::from_path("module.rs"), SyntaxMode::PlainText);
    }

    #[test]
    fn every_builtin_compiles() {
        for mode in SyntaxMode::ALL {
            let _ = mode.highlight("x");
        }
    }

    #[test]
    fn plain_text_has_no_tokens() {
        assert!(SyntaxMode::PlainText
            .highlight("class Foo { // nothing }")
            .is_empty());
    }

    #[test]
    fn java_keywords_comments_strings_and_numbers() {
        let tokens = kinds_of(
            SyntaxMode::Java,
            "public class A { // note\n  String s = \"x // y\"; int n = 42; }",
        );
        assert!(tokens.contains(&("public".into(), HighlightKind::Keyword)));
        assert!(tokens.contains(&("// note".into(), HighlightKind::Comment)));
        assert!(tokens.contains(&("\"x // y\"".into(), HighlightKind::String)));
        assert!(tokens.contains(&("42".into(), HighlightKind::Number)));
        assert!(!tokens.iter().any(|(text, _)| text == "String"));
    }

    #[test]
    fn keywords_inside_comments_are_not_rehighlighted() {
        let tokens = kinds_of(SyntaxMode::Java, "/* return null */ return;");
        assert_eq!(
            tokens,
            vec![
                ("/* return null */".to_string(), HighlightKind::Comment),
                ("return".to_string(), HighlightKind::Keyword),
            ]
        );
    }

    #[test]
    fn python_triple_quotes_and_hash_comments() {
        let source = "def f():\n    \"\"\"doc # not comment\n    more\"\"\"\n    return 1  # done";
        let tokens = kinds_of(SyntaxMode::Python, source);
        assert!(tokens.contains(&("def".into(), HighlightKind::Keyword)));
        assert!(tokens.contains(&(
            "\"\"\"doc # not comment\n    more\"\"\"".into(),
            HighlightKind::String
        )));
        assert!(tokens.contains(&("# done".into(), HighlightKind::Comment)));
    }

    #[test]
    fn cpp_preprocessor_lines_are_directives() {
        let tokens = kinds_of(SyntaxMode::Cpp, "#include <vector>\nint main() { return 0; }");
        assert!(tokens.contains(&("#include".into(), HighlightKind::Directive)));
        assert!(tokens.contains(&("int".into(), HighlightKind::Keyword)));
        assert!(tokens.contains(&("0".into(), HighlightKind::Number)));
    }

    #[test]
    fn html_tags_comments_and_entities() {
        let tokens = kinds_of(
            SyntaxMode::Html,
            "<!-- c --><p class=\"x\">a &amp; b</p>",
        );
        assert!(tokens.contains(&("<!-- c -->".into(), HighlightKind::Comment)));
        assert!(tokens.contains(&("<p".into(), HighlightKind::Tag)));
        assert!(tokens.contains(&("\"x\"".into(), HighlightKind::String)));
        assert!(tokens.contains(&("&amp;".into(), HighlightKind::Directive)));
        assert!(tokens.contains(&("</p".into(), HighlightKind::Tag)));
    }

    #[test]
    fn css_at_rules_colors_and_lengths() {
        let tokens = kinds_of(
            SyntaxMode::Css,
            "@media screen { a { color: #fff; margin: 12px !important; } }",
        );
        assert!(tokens.contains(&("@media".into(), HighlightKind::Directive)));
        assert!(tokens.contains(&("#fff".into(), HighlightKind::Number)));
        assert!(tokens.contains(&("12px".into(), HighlightKind::Number)));
        assert!(tokens.contains(&("!important".into(), HighlightKind::Keyword)));
    }

    #[test]
    fn multibyte_text_does_not_split_characters() {
        let source = "String s = \"日本語\"; // コメント";
        let tokens = SyntaxMode::Java.highlight(source);
        for token in &tokens {
            assert!(source.is_char_boundary(token.range.start));
            assert!(source.is_char_boundary(token.range.end));
        }
        assert_eq!(tokens.len(), 2);
    }
}
