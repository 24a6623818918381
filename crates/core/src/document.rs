use std::io;
use std::path::{Path, PathBuf};

use textpad_printing::{PageSetup, PdfError};
use thiserror::Error;

use crate::file_io::{read_text, write_document};
use crate::format::{FileFormat, SaveFilter};
use crate::rtf::RtfError;

/// 文件載入或儲存時可能發生的錯誤。 / Errors that can occur while loading or saving a document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is not valid rich text: {source}")]
    Rtf {
        path: PathBuf,
        #[source]
        source: RtfError,
    },
    #[error("{path}: file encoding is not supported or data is invalid")]
    InvalidEncoding { path: PathBuf },
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

/// 編輯器唯一的文字緩衝區。 / The editor's single in-memory text buffer.
#[derive(Debug, Clone)]
pub struct Document {
    path: Option<PathBuf>,
    contents: String,
    encoding: &'static str,
    source_format: FileFormat,
    is_dirty: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// 建立一個空內容且尚未儲存的文件。 / Creates an unsaved document with empty contents.
    pub fn new() -> Self {
        Self {
            path: None,
            contents: String::new(),
            encoding: "utf-8",
            source_format: FileFormat::Text,
            is_dirty: false,
        }
    }

    /// 從磁碟載入文件，RTF 會轉為純文字。 / Loads a document from disk, decoding RTF to plain text.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let mut document = Self::new();
        document.load(path)?;
        Ok(document)
    }

    /// Replaces the buffer wholesale with the file's contents.
    ///
    /// On failure the buffer and its metadata are left exactly as they were.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let loaded = read_text(path)?;
        self.contents = loaded.text;
        self.encoding = loaded.encoding;
        self.source_format = loaded.format;
        self.path = Some(path.to_path_buf());
        self.is_dirty = false;
        Ok(())
    }

    /// 以預設頁面設定另存文件。 / Saves through the chosen filter with the default page setup.
    pub fn save_as(
        &mut self,
        path: impl AsRef<Path>,
        filter: SaveFilter,
    ) -> Result<PathBuf, DocumentError> {
        self.save_as_with(path, filter, &PageSetup::default())
    }

    /// Saves through the chosen filter and returns the path actually written.
    ///
    /// A text save makes the written file the document's path and clears the
    /// dirty flag. A PDF export leaves both untouched since the buffer cannot be
    /// read back from it.
    pub fn save_as_with(
        &mut self,
        path: impl AsRef<Path>,
        filter: SaveFilter,
        page_setup: &PageSetup,
    ) -> Result<PathBuf, DocumentError> {
        let written = write_document(&self.contents, path, filter, page_setup)?;
        if filter == SaveFilter::Text {
            self.path = Some(written.clone());
            self.source_format = FileFormat::from_path(&written);
            self.encoding = "utf-8";
            self.is_dirty = false;
        }
        Ok(written)
    }

    /// 取得目前文件內容。 / Returns the current buffer contents.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// 以新文字取代記憶體內容並標記文件為已修改。 / Replaces the in-memory contents, marking the document as dirty.
    pub fn set_contents(&mut self, text: impl Into<String>) {
        self.contents = text.into();
        self.is_dirty = true;
    }

    /// Mutable access for the text widget; callers report edits via [`Document::mark_dirty`].
    pub fn buffer_mut(&mut self) -> &mut String {
        &mut self.contents
    }

    /// 將文件標記為已修改。 / Marks the document as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    /// 判斷文件是否仍有未儲存變更。 / Returns whether the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// 取得文件所屬的檔案路徑（若存在）。 / Path of the last successful open or text save.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Encoding the buffer was decoded from (`"rtf"` for rich text sources).
    pub fn encoding(&self) -> &'static str {
        self.encoding
    }

    pub fn source_format(&self) -> FileFormat {
        self.source_format
    }

    /// File name for titles and dialogs, `Untitled` when the buffer has no path.
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string())
    }
}
