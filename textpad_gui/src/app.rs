use std::path::Path;
use std::process::Command;

use chrono::{DateTime, Local};
use eframe::{egui, App, Frame};
use egui::text::CCursor;
use egui::text_edit::CCursorRange;
use egui::{Align2, FontId, Id, Key, TextStyle};
use log::{info, warn};
use textpad_core::{Document, SaveFilter};
use textpad_highlight::SyntaxMode;
use textpad_printing::{print_text, SystemSpooler};
use textpad_search::{find_first, SearchError};
use textpad_settings::EditorSettings;

use crate::fonts;
use crate::highlighting::cached_layout_job;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn editor_id() -> Id {
    Id::new("textpad_editor")
}

/// 模態訊息視窗的內容。 / A pending modal message.
struct Message {
    title: String,
    body: String,
}

#[derive(Default)]
struct FindState {
    open: bool,
    query: String,
    focus_pending: bool,
}

pub struct TextPadApp {
    document: Document,
    syntax: SyntaxMode,
    settings: EditorSettings,
    opened_at: DateTime<Local>,
    status: String,
    message: Option<Message>,
    find: FindState,
    applied_title: String,
    fonts_installed: bool,
}

impl TextPadApp {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            document: Document::new(),
            syntax: SyntaxMode::PlainText,
            settings,
            opened_at: Local::now(),
            status: "Ready".to_string(),
            message: None,
            find: FindState::default(),
            applied_title: String::new(),
            fonts_installed: false,
        }
    }

    pub fn show_message(&mut self, title: impl Into<String>, body: impl Into<String>) {
        self.message = Some(Message {
            title: title.into(),
            body: body.into(),
        });
    }

    fn fail(&mut self, title: &str, body: String) {
        warn!("{title}: {body}");
        self.status = format!("{title}: {body}");
        self.show_message(title, body);
    }

    fn new_window(&mut self) {
        let spawned = std::env::current_exe().and_then(|exe| Command::new(exe).spawn());
        match spawned {
            Ok(child) => {
                info!("started new window (pid {})", child.id());
                self.status = "Opened a new window".to_string();
            }
            Err(err) => self.fail("New Window Failed", err.to_string()),
        }
    }

    fn open_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("Text Files", &["txt", "java", "py", "cpp", "html", "css"])
            .add_filter("Rich Text", &["rtf"])
            .add_filter("All Files", &["*"])
            .pick_file();
        if let Some(path) = picked {
            self.open_path(&path);
        }
    }

    /// Loads `path` into the buffer; on failure the buffer is left untouched.
    pub fn open_path(&mut self, path: &Path) {
        match self.document.load(path) {
            Ok(()) => {
                self.syntax = SyntaxMode::from_path(path);
                info!(
                    "opened {} ({}, {})",
                    path.display(),
                    self.document.encoding(),
                    self.syntax.label()
                );
                self.status = format!("Opened {}", path.display());
            }
            Err(err) => self.fail("Open Failed", err.to_string()),
        }
    }

    fn save_dialog(&mut self, default_filter: SaveFilter) {
        let filters = match default_filter {
            SaveFilter::Text => [SaveFilter::Text, SaveFilter::Pdf],
            SaveFilter::Pdf => [SaveFilter::Pdf, SaveFilter::Text],
        };
        let mut dialog = rfd::FileDialog::new();
        for filter in filters {
            dialog = dialog.add_filter(filter.label(), &[filter.extension()]);
        }
        let suggested = match default_filter {
            SaveFilter::Text => self.document.display_name(),
            SaveFilter::Pdf => format!("{}.pdf", self.document.display_name()),
        };
        dialog = dialog.set_file_name(suggested);
        if let Some(dir) = self.document.path().and_then(Path::parent) {
            dialog = dialog.set_directory(dir);
        }

        if let Some(path) = dialog.save_file() {
            let filter = SaveFilter::infer(&path, default_filter);
            self.save_to(&path, filter);
        }
    }

    fn save_to(&mut self, path: &Path, filter: SaveFilter) {
        let setup = self.settings.page_setup();
        match self.document.save_as_with(path, filter, &setup) {
            Ok(written) => {
                if filter == SaveFilter::Text {
                    self.syntax = SyntaxMode::from_path(&written);
                }
                info!("saved {} as {}", written.display(), filter.label());
                self.status = format!("Saved {}", written.display());
            }
            Err(err) => self.fail("Save Failed", err.to_string()),
        }
    }

    fn print(&mut self) {
        let mut setup = self.settings.page_setup();
        setup.title = self.document.display_name();
        match print_text(self.document.contents(), &setup, &SystemSpooler::detect()) {
            Ok(summary) => {
                info!("sent {} page(s) to the printer", summary.pages);
                self.status = format!("Sent {} page(s) to the printer", summary.pages);
            }
            Err(err) => self.fail("Print Failed", err.to_string()),
        }
    }

    fn find_next(&mut self, ctx: &egui::Context) {
        let query = self.find.query.clone();
        match find_first(self.document.contents(), &query) {
            Ok(Some(found)) => {
                let range = found.char_range(self.document.contents());
                let mut state = egui::TextEdit::load_state(ctx, editor_id()).unwrap_or_default();
                state.set_ccursor_range(Some(CCursorRange::two(
                    CCursor::new(range.start),
                    CCursor::new(range.end),
                )));
                state.store(ctx, editor_id());
                ctx.memory_mut(|memory| memory.request_focus(editor_id()));
                self.status = format!("Found at line {}, column {}", found.line, found.column);
            }
            Ok(None) => {
                info!("no match for {query:?}");
                self.status = format!("\"{query}\" not found");
                self.show_message("Find", format!("Cannot find \"{query}\"."));
            }
            Err(SearchError::EmptyPattern) => {
                self.status = "Enter text to find".to_string();
            }
        }
    }

    fn show_current_time(&mut self) {
        let now = Local::now().format(TIME_FORMAT).to_string();
        self.show_message("Current Time", format!("Current time: {now}"));
    }

    fn show_about(&mut self) {
        self.show_message(
            "About",
            format!(
                "TextPad {}\nA single-document text editor.\nBy the TextPad contributors.",
                env!("CARGO_PKG_VERSION")
            ),
        );
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let marker = if self.document.is_dirty() { "*" } else { "" };
        let title = format!(
            "{marker}{} - {}",
            self.document.display_name(),
            self.settings.window.title
        );
        if title != self.applied_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.applied_title = title;
        }
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New").clicked() {
                        self.new_window();
                        ui.close_menu();
                    }
                    if ui.button("Open...").clicked() {
                        self.open_dialog();
                        ui.close_menu();
                    }
                    if ui.button("Save...").clicked() {
                        self.save_dialog(SaveFilter::Text);
                        ui.close_menu();
                    }
                    if ui.button("Export PDF...").clicked() {
                        self.save_dialog(SaveFilter::Pdf);
                        ui.close_menu();
                    }
                    if ui.button("Print").clicked() {
                        self.print();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("Search", |ui| {
                    if ui.button("Find...").clicked() {
                        self.find.open = true;
                        self.find.focus_pending = true;
                        ui.close_menu();
                    }
                });
                ui.menu_button("View", |ui| {
                    if ui.button("Show Current Time").clicked() {
                        self.show_current_time();
                        ui.close_menu();
                    }
                });
                ui.menu_button("Help", |ui| {
                    if ui.button("About").clicked() {
                        self.show_about();
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.label(format!("Opened at: {}", self.opened_at.format(TIME_FORMAT)));
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(self.document.display_name());
                    ui.separator();
                    ui.label(self.document.encoding());
                    ui.separator();
                    ui.label(self.syntax.label());
                    ui.separator();
                    ui.label(&self.status);
                });
            });
    }

    fn show_editor(&mut self, ctx: &egui::Context) {
        let syntax = self.syntax;
        let font_id = if self.settings.editor.monospace {
            FontId::monospace(self.settings.editor.font_size)
        } else {
            FontId::proportional(self.settings.editor.font_size)
        };
        egui::CentralPanel::default().show(ctx, |ui| {
            let text_color = ui.visuals().text_color();
            let dark_mode = ui.visuals().dark_mode;
            let mut layouter = |ui: &egui::Ui, text: &str, wrap_width: f32| {
                let mut job =
                    cached_layout_job(ui.ctx(), syntax, text, &font_id, text_color, dark_mode);
                job.wrap.max_width = wrap_width;
                ui.fonts(|fonts| fonts.layout_job(job))
            };
            egui::ScrollArea::vertical().show(ui, |ui| {
                let editor = egui::TextEdit::multiline(self.document.buffer_mut())
                    .id(editor_id())
                    .font(TextStyle::Monospace)
                    .desired_width(f32::INFINITY)
                    .desired_rows(30)
                    .layouter(&mut layouter);
                let response = ui.add_sized(ui.available_size(), editor);
                if response.changed() {
                    self.document.mark_dirty();
                }
            });
        });
    }

    fn show_find_window(&mut self, ctx: &egui::Context) {
        if !self.find.open {
            return;
        }
        let mut open = true;
        let mut submit = false;
        egui::Window::new("Find")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Find what:");
                    let response = ui.text_edit_singleline(&mut self.find.query);
                    if self.find.focus_pending {
                        response.request_focus();
                        self.find.focus_pending = false;
                    }
                    if response.lost_focus() && ui.input(|input| input.key_pressed(Key::Enter)) {
                        submit = true;
                    }
                });
                if ui.button("Find").clicked() {
                    submit = true;
                }
            });
        self.find.open = open;
        if submit {
            self.find_next(ctx);
        }
    }

    fn show_message_window(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.message else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new(message.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message.body.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.message = None;
        }
    }
}

impl App for TextPadApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        if !self.fonts_installed {
            fonts::install(ctx);
            self.fonts_installed = true;
        }
        self.sync_title(ctx);

        self.show_menu_bar(ctx);
        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_editor(ctx);
        self.show_find_window(ctx);
        self.show_message_window(ctx);
    }
}
