use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use textpad_printing::PageSetup;
use thiserror::Error;

const SETTINGS_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 編輯器的唯讀設定檔。 / Read-only editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub window: WindowSection,
    #[serde(default)]
    pub editor: EditorSection,
    #[serde(default)]
    pub pdf: PdfSection,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            window: WindowSection::default(),
            editor: EditorSection::default(),
            pdf: PdfSection::default(),
        }
    }
}

impl EditorSettings {
    /// Loads settings from `path`, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let contents = fs::read_to_string(&path).map_err(|source| SettingsError::Read {
            path: path.clone(),
            source,
        })?;
        let mut settings: EditorSettings =
            serde_json::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.clone(),
                source,
            })?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn sanitize(&mut self) {
        if self.version == 0 {
            self.version = SETTINGS_VERSION;
        }
        self.window.sanitize();
        self.editor.sanitize();
        self.pdf.sanitize();
    }

    pub fn page_setup(&self) -> PageSetup {
        self.pdf.to_page_setup()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSection {
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_title")]
    pub title: String,
}

fn default_width() -> f32 {
    800.0
}

fn default_height() -> f32 {
    600.0
}

fn default_title() -> String {
    "TextPad".to_string()
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
        }
    }
}

impl WindowSection {
    fn sanitize(&mut self) {
        self.width = clamp_or(self.width, 320.0, 7680.0, default_width());
        self.height = clamp_or(self.height, 240.0, 4320.0, default_height());
        if self.title.trim().is_empty() {
            self.title = default_title();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSection {
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default = "default_true")]
    pub monospace: bool,
}

fn default_font_size() -> f32 {
    14.0
}

fn default_true() -> bool {
    true
}

impl Default for EditorSection {
    fn default() -> Self {
        Self {
            font_size: default_font_size(),
            monospace: true,
        }
    }
}

impl EditorSection {
    fn sanitize(&mut self) {
        self.font_size = clamp_or(self.font_size, 6.0, 72.0, default_font_size());
    }
}

/// PDF 匯出版面（單位：點）。 / PDF export layout, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfSection {
    #[serde(default = "default_pdf_font_size")]
    pub font_size: f32,
    #[serde(default = "default_left_margin")]
    pub left_margin: f32,
    #[serde(default = "default_top")]
    pub top: f32,
    #[serde(default = "default_line_step")]
    pub line_step: f32,
}

fn default_pdf_font_size() -> f32 {
    PageSetup::default().font_size_pt
}

fn default_left_margin() -> f32 {
    PageSetup::default().left_margin_pt
}

fn default_top() -> f32 {
    PageSetup::default().top_pt
}

fn default_line_step() -> f32 {
    PageSetup::default().line_step_pt
}

impl Default for PdfSection {
    fn default() -> Self {
        Self {
            font_size: default_pdf_font_size(),
            left_margin: default_left_margin(),
            top: default_top(),
            line_step: default_line_step(),
        }
    }
}

impl PdfSection {
    fn sanitize(&mut self) {
        let page = PageSetup::default();
        self.font_size = clamp_or(self.font_size, 4.0, 72.0, default_pdf_font_size());
        self.left_margin = clamp_or(
            self.left_margin,
            0.0,
            page.page_width_pt / 2.0,
            default_left_margin(),
        );
        self.top = clamp_or(self.top, 72.0, page.page_height_pt, default_top());
        self.line_step = clamp_or(self.line_step, 1.0, 144.0, default_line_step());
    }

    pub fn to_page_setup(&self) -> PageSetup {
        PageSetup {
            font_size_pt: self.font_size,
            left_margin_pt: self.left_margin,
            top_pt: self.top,
            line_step_pt: self.line_step,
            ..PageSetup::default()
        }
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
