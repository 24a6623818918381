//! Rich Text Format reader that keeps the text and discards formatting.
//!
//! The decoder walks the RTF token stream (groups, control words, control
//! symbols and plain text), drops destination groups such as font tables and
//! pictures, and maps the few control words that carry text (`\par`, `\tab`,
//! `\uN`, `\'hh`, typographic quotes) to their characters. Hex escapes are
//! decoded through the document code page announced by `\ansicpg`.

use encoding_rs::{
    Encoding as RsEncoding, BIG5, EUC_KR, GBK, MACINTOSH, SHIFT_JIS, UTF_8, WINDOWS_1252,
};
use thiserror::Error;

/// 解析 RTF 時可能發生的錯誤。 / Errors raised while decoding RTF markup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RtfError {
    #[error("input does not start with an {{\\rtf header")]
    MissingHeader,
    #[error("unbalanced closing brace at byte {offset}")]
    UnbalancedGroup { offset: usize },
    #[error("unexpected end of input inside a group")]
    UnexpectedEof,
    #[error("invalid hex escape at byte {offset}")]
    InvalidHex { offset: usize },
}

/// Destinations whose content never reaches the visible text.
const IGNORED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "object",
    "listtable",
    "listoverridetable",
    "generator",
    "themedata",
    "datastore",
    "latentstyles",
    "xmlnstbl",
    "rsidtbl",
    "filetbl",
    "revtbl",
    "fldinst",
];

/// 將 RTF 位元組轉為純文字。 / Decodes RTF bytes to plain text, discarding formatting.
pub fn decode(input: &[u8]) -> Result<String, RtfError> {
    let start = input
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(input.len());
    if !input[start..].starts_with(b"{\\rtf") {
        return Err(RtfError::MissingHeader);
    }
    Decoder::new(input, start).run()
}

#[derive(Debug, Clone, Copy)]
struct GroupState {
    skip: bool,
    unicode_skip: usize,
}

impl Default for GroupState {
    fn default() -> Self {
        Self {
            skip: false,
            unicode_skip: 1,
        }
    }
}

struct Decoder<'a> {
    input: &'a [u8],
    pos: usize,
    stack: Vec<GroupState>,
    group_start: bool,
    fallback_remaining: usize,
    high_surrogate: Option<u16>,
    codepage: &'static RsEncoding,
    pending: Vec<u8>,
    text: String,
}

impl<'a> Decoder<'a> {
    fn new(input: &'a [u8], start: usize) -> Self {
        Self {
            input,
            pos: start,
            stack: Vec::new(),
            group_start: false,
            fallback_remaining: 0,
            high_surrogate: None,
            codepage: WINDOWS_1252,
            pending: Vec::new(),
            text: String::new(),
        }
    }

    fn run(mut self) -> Result<String, RtfError> {
        while self.pos < self.input.len() {
            let byte = self.input[self.pos];
            self.pos += 1;
            match byte {
                b'{' => {
                    let inherited = self.stack.last().copied().unwrap_or_default();
                    self.stack.push(inherited);
                    self.group_start = true;
                    self.fallback_remaining = 0;
                    continue;
                }
                b'}' => {
                    self.flush();
                    if self.stack.pop().is_none() {
                        return Err(RtfError::UnbalancedGroup {
                            offset: self.pos - 1,
                        });
                    }
                    self.fallback_remaining = 0;
                    if self.stack.is_empty() {
                        self.release_surrogate();
                        return Ok(self.text);
                    }
                }
                b'\\' => self.control()?,
                // 原始換行僅作為排版用途。 / Raw line breaks are layout only.
                b'\r' | b'\n' => continue,
                other => self.plain_byte(other),
            }
            self.group_start = false;
        }
        Err(RtfError::UnexpectedEof)
    }

    fn skipping(&self) -> bool {
        self.stack.last().map_or(false, |state| state.skip)
    }

    fn skip_group(&mut self) {
        if let Some(state) = self.stack.last_mut() {
            state.skip = true;
        }
    }

    fn control(&mut self) -> Result<(), RtfError> {
        let Some(&next) = self.input.get(self.pos) else {
            return Err(RtfError::UnexpectedEof);
        };
        if next.is_ascii_alphabetic() {
            return self.control_word();
        }

        self.pos += 1;
        match next {
            b'\'' => {
                let offset = self.pos - 2;
                let hex = self
                    .input
                    .get(self.pos..self.pos + 2)
                    .ok_or(RtfError::UnexpectedEof)?;
                if !hex.iter().all(u8::is_ascii_hexdigit) {
                    return Err(RtfError::InvalidHex { offset });
                }
                let value = std::str::from_utf8(hex)
                    .ok()
                    .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                    .ok_or(RtfError::InvalidHex { offset })?;
                self.pos += 2;
                self.plain_byte(value);
            }
            b'*' => {
                if self.group_start {
                    self.skip_group();
                }
            }
            b'\\' | b'{' | b'}' => self.plain_byte(next),
            b'~' => self.push_char('\u{00A0}'),
            b'_' => self.push_char('-'),
            b'\r' | b'\n' => self.push_char('\n'),
            // `\-` 為選擇性連字號，其餘符號不產生文字。 / Optional hyphen and other symbols carry no text.
            _ => {}
        }
        Ok(())
    }

    fn control_word(&mut self) -> Result<(), RtfError> {
        let name_start = self.pos;
        while self
            .input
            .get(self.pos)
            .map_or(false, |byte| byte.is_ascii_alphabetic())
        {
            self.pos += 1;
        }
        let name = std::str::from_utf8(&self.input[name_start..self.pos]).unwrap_or_default();

        let param_start = self.pos;
        if self.input.get(self.pos) == Some(&b'-') {
            self.pos += 1;
        }
        while self
            .input
            .get(self.pos)
            .map_or(false, |byte| byte.is_ascii_digit())
        {
            self.pos += 1;
        }
        let param = std::str::from_utf8(&self.input[param_start..self.pos])
            .ok()
            .and_then(|digits| digits.parse::<i32>().ok());
        if self.input.get(self.pos) == Some(&b' ') {
            self.pos += 1;
        }

        if name == "bin" {
            let length = param.unwrap_or(0).max(0) as usize;
            self.pos = (self.pos + length).min(self.input.len());
            return Ok(());
        }

        if self.group_start && is_ignored_destination(name) {
            self.skip_group();
            return Ok(());
        }
        if self.skipping() {
            return Ok(());
        }

        match name {
            "par" | "line" | "sect" | "page" | "row" => self.push_char('\n'),
            "tab" | "cell" => self.push_char('\t'),
            "emdash" => self.push_char('\u{2014}'),
            "endash" => self.push_char('\u{2013}'),
            "emspace" => self.push_char('\u{2003}'),
            "enspace" => self.push_char('\u{2002}'),
            "qmspace" => self.push_char('\u{2005}'),
            "bullet" => self.push_char('\u{2022}'),
            "lquote" => self.push_char('\u{2018}'),
            "rquote" => self.push_char('\u{2019}'),
            "ldblquote" => self.push_char('\u{201C}'),
            "rdblquote" => self.push_char('\u{201D}'),
            "uc" => {
                if let Some(state) = self.stack.last_mut() {
                    state.unicode_skip = param.unwrap_or(1).max(0) as usize;
                }
            }
            "u" => {
                if let Some(value) = param {
                    self.unicode(value);
                }
            }
            "ansicpg" => {
                if let Some(encoding) = param.and_then(encoding_for_codepage) {
                    self.flush();
                    self.codepage = encoding;
                }
            }
            "mac" => {
                self.flush();
                self.codepage = MACINTOSH;
            }
            _ => {}
        }
        Ok(())
    }

    fn unicode(&mut self, value: i32) {
        let unit = (if value < 0 { value + 65_536 } else { value }) as u16;
        self.flush();
        match (self.high_surrogate.take(), unit) {
            (None, 0xD800..=0xDBFF) => self.high_surrogate = Some(unit),
            (Some(high), 0xDC00..=0xDFFF) => {
                let decoded: String = char::decode_utf16([high, unit])
                    .map(|res| res.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect();
                self.text.push_str(&decoded);
            }
            (previous, _) => {
                if previous.is_some() {
                    self.text.push(char::REPLACEMENT_CHARACTER);
                }
                let ch = char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER);
                self.text.push(ch);
            }
        }
        self.fallback_remaining = self
            .stack
            .last()
            .map_or(1, |state| state.unicode_skip);
    }

    fn plain_byte(&mut self, byte: u8) {
        if self.skipping() {
            return;
        }
        if self.fallback_remaining > 0 {
            self.fallback_remaining -= 1;
            return;
        }
        self.release_surrogate();
        self.pending.push(byte);
    }

    fn push_char(&mut self, ch: char) {
        if self.skipping() {
            return;
        }
        self.flush();
        self.release_surrogate();
        self.text.push(ch);
    }

    /// A high surrogate not followed by its low half becomes U+FFFD.
    fn release_surrogate(&mut self) {
        if self.high_surrogate.take().is_some() {
            self.text.push(char::REPLACEMENT_CHARACTER);
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let (decoded, _) = self.codepage.decode_without_bom_handling(&self.pending);
        self.text.push_str(&decoded);
        self.pending.clear();
    }
}

fn is_ignored_destination(name: &str) -> bool {
    IGNORED_DESTINATIONS.contains(&name) || name.starts_with("header") || name.starts_with("footer")
}

/// 將 Windows 代碼頁編號對應到 encoding_rs 編碼。 / Maps a Windows code page number to an `encoding_rs` encoding.
fn encoding_for_codepage(codepage: i32) -> Option<&'static RsEncoding> {
    match codepage {
        932 => Some(SHIFT_JIS),
        936 => Some(GBK),
        949 => Some(EUC_KR),
        950 => Some(BIG5),
        1252 => Some(WINDOWS_1252),
        10000 => Some(MACINTOSH),
        65001 => Some(UTF_8),
        874 | 1250..=1258 => RsEncoding::for_label(format!("windows-{codepage}").as_bytes()),
        _ => None,
    }
}
