/// Points per millimetre (1pt = 1/72").
/// 每毫米對應的點數。
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Spaces substituted for a tab; the built-in PDF fonts have no tab glyph.
const TAB_WIDTH: usize = 4;

/// Page geometry and typography used for PDF export and printing.
/// 匯出 PDF 與列印時使用的頁面尺寸與字型設定。
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub title: String,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub font_size_pt: f32,
    pub left_margin_pt: f32,
    /// Baseline of the first line, measured from the bottom edge.
    pub top_pt: f32,
    pub line_step_pt: f32,
    pub bottom_margin_pt: f32,
}

impl Default for PageSetup {
    fn default() -> Self {
        // US Letter, 12pt Courier starting near the top margin.
        Self {
            title: "TextPad Document".into(),
            page_width_pt: 612.0,
            page_height_pt: 792.0,
            font_size_pt: 12.0,
            left_margin_pt: 25.0,
            top_pt: 725.0,
            line_step_pt: 15.0,
            bottom_margin_pt: 36.0,
        }
    }
}

impl PageSetup {
    /// Number of lines that fit between the first baseline and the bottom margin.
    /// 第一條基線至下邊界之間可容納的行數。
    pub fn lines_per_page(&self) -> usize {
        let step = self.line_step_pt.max(1.0);
        let usable = (self.top_pt - self.bottom_margin_pt).max(0.0);
        (usable / step).floor() as usize + 1
    }

    pub fn page_size_mm(&self) -> (f32, f32) {
        (
            self.page_width_pt / POINTS_PER_MM,
            self.page_height_pt / POINTS_PER_MM,
        )
    }
}

/// A single source line positioned on a page.
/// 已放置於頁面上的單一原始行。
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    /// Zero-based index of the line in the source text.
    pub source_line: usize,
    pub text: String,
    pub x_pt: f32,
    pub y_pt: f32,
}

/// Lines assigned to one page.
/// 單一頁面所包含的行。
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub page_number: u32,
    pub lines: Vec<PlacedLine>,
}

/// Places every line on a single page, stepping the baseline down per line.
///
/// Lines past the bottom margin keep descending and land below the page edge,
/// where viewers clip them.
pub fn layout_single_page(text: &str, setup: &PageSetup) -> PageLayout {
    let lines = printable_lines(text)
        .enumerate()
        .map(|(index, line)| PlacedLine {
            source_line: index,
            text: line,
            x_pt: setup.left_margin_pt,
            y_pt: setup.top_pt - index as f32 * setup.line_step_pt,
        })
        .collect();
    PageLayout {
        page_number: 1,
        lines,
    }
}

/// Splits the text over as many pages as needed; always yields at least one page.
/// 依頁面容量分頁；至少產生一頁。
pub fn paginate(text: &str, setup: &PageSetup) -> Vec<PageLayout> {
    let per_page = setup.lines_per_page();
    let mut pages: Vec<PageLayout> = Vec::new();

    for (index, line) in printable_lines(text).enumerate() {
        let slot = index % per_page;
        if slot == 0 {
            pages.push(PageLayout {
                page_number: pages.len() as u32 + 1,
                lines: Vec::new(),
            });
        }
        if let Some(page) = pages.last_mut() {
            page.lines.push(PlacedLine {
                source_line: index,
                text: line,
                x_pt: setup.left_margin_pt,
                y_pt: setup.top_pt - slot as f32 * setup.line_step_pt,
            });
        }
    }

    if pages.is_empty() {
        pages.push(PageLayout {
            page_number: 1,
            lines: Vec::new(),
        });
    }
    pages
}

fn printable_lines(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines().map(expand_tabs)
}

fn expand_tabs(line: &str) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let mut expanded = String::with_capacity(line.len() + TAB_WIDTH);
    let mut column = 0usize;
    for ch in line.chars() {
        if ch == '\t' {
            let pad = TAB_WIDTH - column % TAB_WIDTH;
            expanded.extend(std::iter::repeat(' ').take(pad));
            column += pad;
        } else {
            expanded.push(ch);
            column += 1;
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_steps_baseline_per_line() {
        let setup = PageSetup::default();
        let page = layout_single_page("first\nsecond\r\nthird", &setup);
        let positions: Vec<(f32, f32)> =
            page.lines.iter().map(|line| (line.x_pt, line.y_pt)).collect();
        assert_eq!(positions, vec![(25.0, 725.0), (25.0, 710.0), (25.0, 695.0)]);
        assert_eq!(page.lines[1].text, "second");
    }

    #[test]
    fn single_page_keeps_overflowing_lines_on_page_one() {
        let setup = PageSetup::default();
        let text = vec!["x"; 100].join("\n");
        let page = layout_single_page(&text, &setup);
        assert_eq!(page.page_number, 1);
        assert_eq!(page.lines.len(), 100);
        assert!(page.lines[99].y_pt < 0.0);
    }

    #[test]
    fn paginate_breaks_at_page_capacity() {
        let setup = PageSetup::default();
        let per_page = setup.lines_per_page();
        assert_eq!(per_page, 46);

        let text = (0..per_page + 3)
            .map(|index| format!("line {index}"))
            .collect::<Vec<_>>()
            .join("\n");
        let pages = paginate(&text, &setup);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines.len(), per_page);
        assert_eq!(pages[1].page_number, 2);
        assert_eq!(pages[1].lines[0].source_line, per_page);
        assert_eq!(pages[1].lines[0].y_pt, setup.top_pt);
    }

    #[test]
    fn paginate_empty_text_yields_blank_page() {
        let pages = paginate("", &PageSetup::default());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines.is_empty());
    }

    #[test]
    fn tabs_expand_to_next_stop() {
        assert_eq!(expand_tabs("a\tb"), "a   b");
        assert_eq!(expand_tabs("\tx"), "    x");
        assert_eq!(expand_tabs("abcd\te"), "abcd    e");
    }
}
