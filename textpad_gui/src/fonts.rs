use std::fs;
use std::path::PathBuf;

use eframe::egui;
use egui::{FontData, FontDefinitions, FontFamily};
use log::{debug, info};

const FALLBACK_FONT: &str = "cjk_fallback";

/// 安裝 CJK 後備字型，讓 GBK/Big5 等檔案可正確顯示。
/// Installs a CJK fallback font when one is found on the system.
pub fn install(ctx: &egui::Context) {
    let mut definitions = FontDefinitions::default();
    match load_cjk_font() {
        Some((path, bytes)) => {
            info!("using fallback font {}", path.display());
            definitions
                .font_data
                .insert(FALLBACK_FONT.to_string(), FontData::from_owned(bytes));
            for family in [FontFamily::Proportional, FontFamily::Monospace] {
                if let Some(fonts) = definitions.families.get_mut(&family) {
                    fonts.push(FALLBACK_FONT.to_string());
                }
            }
        }
        None => debug!("no CJK fallback font found; using egui defaults"),
    }
    ctx.set_fonts(definitions);
}

fn load_cjk_font() -> Option<(PathBuf, Vec<u8>)> {
    candidates()
        .into_iter()
        .filter(|path| path.exists())
        .find_map(|path| fs::read(&path).ok().map(|bytes| (path, bytes)))
}

fn candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("assets/fonts/NotoSansTC-Regular.otf")];

    #[cfg(target_os = "windows")]
    paths.extend(
        [r"C:\Windows\Fonts\msjh.ttc", r"C:\Windows\Fonts\msyh.ttc"]
            .into_iter()
            .map(PathBuf::from),
    );

    #[cfg(target_os = "macos")]
    paths.extend(
        [
            "/System/Library/Fonts/PingFang.ttc",
            "/System/Library/Fonts/Supplemental/Songti.ttc",
        ]
        .into_iter()
        .map(PathBuf::from),
    );

    #[cfg(target_os = "linux")]
    paths.extend(
        [
            "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
            "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
        ]
        .into_iter()
        .map(PathBuf::from),
    );

    paths
}
