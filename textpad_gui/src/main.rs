mod app;
mod fonts;
mod highlighting;

use std::path::PathBuf;

use clap::Parser;
use eframe::{egui, NativeOptions};
use log::warn;
use textpad_settings::EditorSettings;

use app::TextPadApp;

#[derive(Parser, Debug)]
#[command(name = "textpad", version, about = "Single-document text editor")]
struct Args {
    /// File opened at startup.
    file: Option<PathBuf>,
    /// JSON configuration file (window, font, PDF layout).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (settings, startup_error) = match EditorSettings::load(args.config.as_deref()) {
        Ok(settings) => (settings, None),
        Err(err) => {
            warn!("{err}; falling back to default settings");
            (EditorSettings::default(), Some(err.to_string()))
        }
    };

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([settings.window.width, settings.window.height])
            .with_title(settings.window.title.clone()),
        ..Default::default()
    };
    let title = settings.window.title.clone();
    let mut app = TextPadApp::new(settings);
    if let Some(message) = startup_error {
        app.show_message("Configuration Error", message);
    }
    if let Some(path) = args.file {
        app.open_path(&path);
    }

    eframe::run_native(&title, options, Box::new(|_cc| Box::new(app)))
}
