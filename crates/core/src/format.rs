use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// 依副檔名判定的檔案格式。 / File format derived from a path's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Text,
    Rtf,
    Pdf,
    Other,
}

impl FileFormat {
    /// 以不分大小寫的方式比對最後一個副檔名。 / Matches the final extension case-insensitively.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match extension_of(path.as_ref()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => FileFormat::Text,
            Some(ext) if ext.eq_ignore_ascii_case("rtf") => FileFormat::Rtf,
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => FileFormat::Pdf,
            _ => FileFormat::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FileFormat::Text => "txt",
            FileFormat::Rtf => "rtf",
            FileFormat::Pdf => "pdf",
            FileFormat::Other => "other",
        }
    }
}

/// 使用者在儲存對話框中選擇的檔案類型。 / File type picked in the save dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFilter {
    Text,
    Pdf,
}

impl SaveFilter {
    /// 對話框篩選器使用的副檔名。 / Extension used by the dialog filter.
    pub fn extension(self) -> &'static str {
        match self {
            SaveFilter::Text => "txt",
            SaveFilter::Pdf => "pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SaveFilter::Text => "Text Files",
            SaveFilter::Pdf => "PDF Documents",
        }
    }

    /// Picks `Pdf` when the chosen name already ends in `.pdf`, otherwise `default`.
    pub fn infer(path: impl AsRef<Path>, default: SaveFilter) -> Self {
        match FileFormat::from_path(path) {
            FileFormat::Pdf => SaveFilter::Pdf,
            _ => default,
        }
    }

    /// 依篩選器補上缺少的副檔名。 / Appends the filter's extension when the chosen name lacks one.
    ///
    /// The text filter only appends `.txt` to names without any extension, so
    /// source files such as `Main.java` keep their suffix. The PDF filter
    /// appends `.pdf` unless the name already ends with it. A name ending in a
    /// bare dot (`archive.`) is completed rather than given a second dot.
    pub fn resolve_path(self, path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let needs_suffix = match self {
            SaveFilter::Text => extension_of(path).is_none(),
            SaveFilter::Pdf => FileFormat::from_path(path) != FileFormat::Pdf,
        };
        if !needs_suffix {
            return path.to_path_buf();
        }
        let mut raw: OsString = path.as_os_str().to_owned();
        if !ends_with_dot(path) {
            raw.push(".");
        }
        raw.push(self.extension());
        PathBuf::from(raw)
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
}

fn ends_with_dot(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or(false, |name| name.ends_with('.'))
}
