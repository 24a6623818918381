pub mod editor;

pub use editor::{EditorSection, EditorSettings, PdfSection, SettingsError, WindowSection};
