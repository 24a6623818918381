use eframe::egui;
use egui::text::{LayoutJob, TextFormat};
use egui::util::cache::{ComputerMut, FrameCache};
use egui::{Color32, FontId};
use textpad_highlight::{HighlightKind, SyntaxMode};

/// 依高亮結果組出 egui 的排版工作。 / Builds a layout job from highlight tokens.
///
/// Gaps between tokens keep the default text color so the job always covers
/// the whole buffer.
pub fn layout_job(
    mode: SyntaxMode,
    text: &str,
    font_id: FontId,
    default_color: Color32,
    dark_mode: bool,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    let mut cursor = 0;
    for token in mode.highlight(text) {
        if token.range.start < cursor {
            continue;
        }
        if token.range.start > cursor {
            job.append(
                &text[cursor..token.range.start],
                0.0,
                TextFormat::simple(font_id.clone(), default_color),
            );
        }
        job.append(
            &text[token.range.clone()],
            0.0,
            TextFormat::simple(font_id.clone(), kind_color(token.kind, dark_mode)),
        );
        cursor = token.range.end;
    }
    if cursor < text.len() {
        job.append(
            &text[cursor..],
            0.0,
            TextFormat::simple(font_id, default_color),
        );
    }
    job
}

#[derive(Default)]
struct Highlighter;

impl ComputerMut<(SyntaxMode, &str, &FontId, Color32, bool), LayoutJob> for Highlighter {
    fn compute(
        &mut self,
        (mode, text, font_id, default_color, dark_mode): (SyntaxMode, &str, &FontId, Color32, bool),
    ) -> LayoutJob {
        layout_job(mode, text, font_id.clone(), default_color, dark_mode)
    }
}

type HighlightCache = FrameCache<LayoutJob, Highlighter>;

/// 以快取取得排版工作，內容未變時不重新高亮。 / Memoized [`layout_job`].
///
/// Keyed by buffer, mode, font and colors; entries unused for a frame are evicted.
pub fn cached_layout_job(
    ctx: &egui::Context,
    mode: SyntaxMode,
    text: &str,
    font_id: &FontId,
    default_color: Color32,
    dark_mode: bool,
) -> LayoutJob {
    ctx.memory_mut(|memory| {
        memory
            .caches
            .cache::<HighlightCache>()
            .get((mode, text, font_id, default_color, dark_mode))
    })
}

fn kind_color(kind: HighlightKind, dark_mode: bool) -> Color32 {
    match (kind, dark_mode) {
        (HighlightKind::Keyword, true) => Color32::from_rgb(0x56, 0x9C, 0xD6),
        (HighlightKind::Keyword, false) => Color32::from_rgb(0x00, 0x00, 0xC0),
        (HighlightKind::Comment, true) => Color32::from_rgb(0x6A, 0x99, 0x55),
        (HighlightKind::Comment, false) => Color32::from_rgb(0x3F, 0x7F, 0x5F),
        (HighlightKind::String, true) => Color32::from_rgb(0xCE, 0x91, 0x78),
        (HighlightKind::String, false) => Color32::from_rgb(0xA3, 0x15, 0x15),
        (HighlightKind::Number, true) => Color32::from_rgb(0xB5, 0xCE, 0xA8),
        (HighlightKind::Number, false) => Color32::from_rgb(0x09, 0x86, 0x58),
        (HighlightKind::Tag, true) => Color32::from_rgb(0x4E, 0xC9, 0xB0),
        (HighlightKind::Tag, false) => Color32::from_rgb(0x80, 0x00, 0x00),
        (HighlightKind::Directive, true) => Color32::from_rgb(0xC5, 0x86, 0xC0),
        (HighlightKind::Directive, false) => Color32::from_rgb(0x7F, 0x00, 0x55),
    }
}
