//! Extension-based dispatch for reading and writing documents.
//!
//! Reads decode `.rtf` files to plain text and take every other file as raw
//! text. Writes render PDF for the PDF filter and raw UTF-8 text otherwise.
//! Every write goes through a sibling temporary file that is renamed over the
//! destination, so a failed save never leaves a partial file behind.

use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use chardetng::EncodingDetector;
use encoding_rs::{UTF_16BE, UTF_16LE};
use log::debug;
use textpad_printing::{export_single_page, PageSetup};

use crate::document::DocumentError;
use crate::format::{FileFormat, SaveFilter};
use crate::rtf;

/// Text produced by a read, with the details shown in the status bar.
/// 讀取後的文字與狀態列需要的中繼資料。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedText {
    pub text: String,
    pub encoding: &'static str,
    pub format: FileFormat,
}

/// 依副檔名讀取檔案內容。 / Reads a file, choosing the decoder from its extension.
pub fn read_text(path: impl AsRef<Path>) -> Result<LoadedText, DocumentError> {
    let path = path.as_ref();
    let bytes = read_bytes(path)?;
    let format = FileFormat::from_path(path);
    debug!("read {} bytes from {} as {}", bytes.len(), path.display(), format.name());

    match format {
        FileFormat::Rtf => {
            let text = rtf::decode(&bytes).map_err(|source| DocumentError::Rtf {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(LoadedText {
                text,
                encoding: "rtf",
                format,
            })
        }
        _ => {
            let (text, encoding) =
                decode_bytes(bytes).ok_or_else(|| DocumentError::InvalidEncoding {
                    path: path.to_path_buf(),
                })?;
            Ok(LoadedText {
                text,
                encoding,
                format,
            })
        }
    }
}

/// 依篩選器寫出文件並回傳實際路徑。 / Writes the text through the filter and returns the final path.
pub fn write_document(
    text: &str,
    path: impl AsRef<Path>,
    filter: SaveFilter,
    page_setup: &PageSetup,
) -> Result<PathBuf, DocumentError> {
    let target = filter.resolve_path(path);
    let bytes: Cow<'_, [u8]> = match filter {
        SaveFilter::Pdf => Cow::Owned(export_single_page(text, page_setup)?),
        SaveFilter::Text => Cow::Borrowed(text.as_bytes()),
    };
    write_atomically(&target, &bytes).map_err(|source| DocumentError::Io {
        path: target.clone(),
        source,
    })?;
    debug!("wrote {} bytes to {}", bytes.len(), target.display());
    Ok(target)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, DocumentError> {
    let io_error = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_error)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(io_error)?;
    Ok(bytes)
}

fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp_path = temporary_sibling(target)?;
    let result = (|| {
        // 先寫入暫存檔再重新命名，避免出現部分寫入的情況。 / Write to a temporary file, then rename, so partial writes never land.
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(bytes)?;
        tmp_file.sync_all()?;
        drop(tmp_file);
        fs::rename(&tmp_path, target)
    })();
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn temporary_sibling(target: &Path) -> io::Result<PathBuf> {
    let name = target.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", target.display()),
        )
    })?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(name);
    tmp_name.push(".textpad-tmp");
    Ok(target.with_file_name(tmp_name))
}

/// Decodes raw bytes; valid UTF-8 is taken verbatim so text saves round-trip exactly.
fn decode_bytes(bytes: Vec<u8>) -> Option<(String, &'static str)> {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return Some((text, "utf-8")),
        Err(err) => err.into_bytes(),
    };

    if let Some(rest) = bytes.strip_prefix(b"\xFF\xFE") {
        let (text, had_errors) = UTF_16LE.decode_without_bom_handling(rest);
        return (!had_errors).then(|| (text.into_owned(), "utf-16le"));
    }
    if let Some(rest) = bytes.strip_prefix(b"\xFE\xFF") {
        let (text, had_errors) = UTF_16BE.decode_without_bom_handling(rest);
        return (!had_errors).then(|| (text.into_owned(), "utf-16be"));
    }

    let mut detector = EncodingDetector::new();
    detector.feed(&bytes, true);
    let guess = detector.guess(None, true);
    let (text, had_errors) = guess.decode_without_bom_handling(&bytes);
    if had_errors {
        return None;
    }
    Some((text.into_owned(), guess.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::GBK;

    #[test]
    fn text_round_trip_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        let samples = [
            "",
            "abc",
            "line1\r\nline2\rline3\n",
            "\u{FEFF}bom kept",
            "tabs\tand\0nul",
            "中文 テスト 😀",
        ];
        for (index, sample) in samples.iter().enumerate() {
            let path = dir.path().join(format!("sample{index}.txt"));
            let written = write_document(sample, &path, SaveFilter::Text, &PageSetup::default())
                .unwrap();
            assert_eq!(written, path);
            let loaded = read_text(&path).unwrap();
            assert_eq!(loaded.text, *sample);
            assert_eq!(loaded.encoding, "utf-8");
        }
    }

    #[test]
    fn text_filter_appends_txt_to_bare_names() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_document(
            "abc",
            dir.path().join("out"),
            SaveFilter::Text,
            &PageSetup::default(),
        )
        .unwrap();
        assert_eq!(written, dir.path().join("out.txt"));
        assert_eq!(fs::read(&written).unwrap(), b"abc");
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn pdf_filter_appends_pdf_and_writes_pdf_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_document(
            "hello\nworld",
            dir.path().join("report"),
            SaveFilter::Pdf,
            &PageSetup::default(),
        )
        .unwrap();
        assert_eq!(written, dir.path().join("report.pdf"));
        assert!(fs::read(&written).unwrap().starts_with(b"%PDF-"));
    }

    #[test]
    fn failed_write_leaves_no_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing-dir").join("out.txt");
        let err = write_document("abc", &target, SaveFilter::Text, &PageSetup::default())
            .unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(!target.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn overwrite_replaces_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "old contents that are longer").unwrap();
        write_document("new", &path, SaveFilter::Text, &PageSetup::default()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".textpad-tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn reads_rtf_by_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letter.RTF");
        fs::write(&path, r"{\rtf1\ansi{\fonttbl{\f0 Arial;}}\f0 Hello\par World}").unwrap();
        let loaded = read_text(&path).unwrap();
        assert_eq!(loaded.text, "Hello\nWorld");
        assert_eq!(loaded.format, FileFormat::Rtf);
    }

    #[test]
    fn rtf_extension_with_plain_contents_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.rtf");
        fs::write(&path, "not rich text").unwrap();
        let err = read_text(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Rtf { .. }));
    }

    #[test]
    fn rtf_markup_in_other_extensions_is_read_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markup.txt");
        let raw = r"{\rtf1 raw}";
        fs::write(&path, raw).unwrap();
        assert_eq!(read_text(&path).unwrap().text, raw);
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("utf16.txt");
        fs::write(&path, b"\xFF\xFEh\x00i\x00").unwrap();
        let loaded = read_text(&path).unwrap();
        assert_eq!(loaded.text, "hi");
        assert_eq!(loaded.encoding, "utf-16le");
    }

    #[test]
    fn falls_back_to_detected_legacy_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gbk.txt");
        let (encoded, _, _) = GBK.encode("中文測試");
        fs::write(&path, encoded.as_ref()).unwrap();
        let loaded = read_text(&path).unwrap();
        assert_eq!(loaded.text, "中文測試");
        assert_eq!(loaded.encoding, "GBK");
    }

    #[test]
    fn missing_file_reports_io_error_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let err = read_text(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
        assert!(err.to_string().contains("absent.txt"));
    }
}
