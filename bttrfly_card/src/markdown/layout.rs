//! Single-pass, top-to-bottom layout of the quick-guide markdown. Layout only
//! needs a way to measure text, so it runs without fonts in tests.

use super::parse::{
    MarkdownLine, RunStyle, TextRun, parse_inline, parse_line, split_bold_segments,
};

/// Measures the horizontal advance of a string in logical pixels.
pub trait TextMeasure {
    fn advance(&self, style: &RunStyle, text: &str) -> f32;
}

/// Monospace measurer: every character advances by `advance * size / 18`.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance {
    pub advance: f32,
}

impl FixedAdvance {
    pub const fn new(advance: f32) -> Self {
        Self { advance }
    }
}

impl TextMeasure for FixedAdvance {
    fn advance(&self, style: &RunStyle, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance * (style.size / BODY_FONT_SIZE)
    }
}

pub const BODY_FONT_SIZE: f32 = 18.0;

/// Page metrics for one texture. Defaults match the card's quick guide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkdownLayout {
    pub width: f32,
    pub height: f32,
    pub top: f32,
    pub line_height: f32,
    pub left_margin: f32,
    pub right_margin: f32,
    pub blank_line_factor: f32,
}

impl MarkdownLayout {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            top: 50.0,
            line_height: 28.0,
            left_margin: 30.0,
            right_margin: 100.0,
            blank_line_factor: 0.6,
        }
    }

    pub fn max_width(&self) -> f32 {
        self.width - self.right_margin
    }

    fn heading_style(level: u8) -> (RunStyle, f32) {
        match level {
            4 => (RunStyle::bold(18.0), 10.0),
            3 => (RunStyle::bold(20.0), 12.0),
            2 => (RunStyle::bold(22.0), 15.0),
            _ => (RunStyle::bold(24.0), 18.0),
        }
    }
}

impl Default for MarkdownLayout {
    fn default() -> Self {
        Self::new(512.0, 650.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub run: TextRun,
    pub x: f32,
}

/// One visual line: every run shares the same baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLine {
    pub baseline: f32,
    pub left: f32,
    pub runs: Vec<PlacedRun>,
}

impl LayoutLine {
    pub fn text(&self) -> String {
        self.runs.iter().map(|placed| placed.run.content.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownPage {
    pub layout: MarkdownLayout,
    pub lines: Vec<LayoutLine>,
    /// Vertical cursor after the last source line.
    pub cursor_y: f32,
}

impl MarkdownPage {
    pub fn runs(&self) -> impl Iterator<Item = &PlacedRun> {
        self.lines.iter().flat_map(|line| line.runs.iter())
    }
}

struct PageBuilder<'m> {
    layout: MarkdownLayout,
    measure: &'m dyn TextMeasure,
    lines: Vec<LayoutLine>,
    cursor_y: f32,
}

impl<'m> PageBuilder<'m> {
    fn place(&mut self, run: TextRun, x: f32, baseline: f32) {
        if run.content.is_empty() {
            return;
        }
        match self.lines.last_mut() {
            Some(line) if line.baseline == baseline => line.runs.push(PlacedRun { run, x }),
            _ => self.lines.push(LayoutLine {
                baseline,
                left: x,
                runs: vec![PlacedRun { run, x }],
            }),
        }
    }

    fn width(&self, style: &RunStyle, text: &str) -> f32 {
        self.measure.advance(style, text)
    }

    fn heading(&mut self, level: u8, text: &str) {
        let (style, extra) = MarkdownLayout::heading_style(level);
        let y = self.cursor_y;
        self.place(TextRun::text(text, style), self.layout.left_margin, y);
        self.cursor_y += self.layout.line_height + extra;
    }

    fn blank(&mut self) {
        self.cursor_y += self.layout.line_height * self.layout.blank_line_factor;
    }

    fn checklist(&mut self, checked: bool, text: &str) {
        if text.contains("**") {
            self.checklist_mixed(checked, text);
        } else {
            self.checklist_plain(checked, text);
        }
    }

    /// Bold and plain spans share a running cursor per visual line; wrapped
    /// lines hang under the text, past the checkbox glyph.
    fn checklist_mixed(&mut self, checked: bool, text: &str) {
        let regular = RunStyle::regular(BODY_FONT_SIZE);
        let marker = TextRun::checkbox(checked, regular);
        let marker_with_space = format!("{} ", marker.content);
        let marker_width = self.width(&regular, &marker_with_space);
        let left = self.layout.left_margin;
        let limit = left + self.layout.max_width();
        let indent = left + marker_width;

        let mut y = self.cursor_y;
        self.place(marker, left, y);
        let mut x = indent;

        for segment in split_bold_segments(text, BODY_FONT_SIZE) {
            let words: Vec<&str> = segment.content.split(' ').collect();
            let last = words.len().saturating_sub(1);
            for (index, word) in words.iter().enumerate() {
                if word.is_empty() {
                    continue;
                }
                let piece = if index < last {
                    format!("{word} ")
                } else {
                    (*word).to_string()
                };
                let piece_width = self.width(&segment.style, &piece);
                if x + piece_width > limit && x > indent {
                    y += self.layout.line_height;
                    x = indent;
                }
                self.place(TextRun::text(piece, segment.style), x, y);
                x += piece_width;
            }
        }

        self.cursor_y = y + self.layout.line_height;
    }

    fn checklist_plain(&mut self, checked: bool, text: &str) {
        let regular = RunStyle::regular(BODY_FONT_SIZE);
        let marker = TextRun::checkbox(checked, regular);
        let full = format!("{} {}", marker.content, text);
        let max_width = self.layout.max_width();
        let left = self.layout.left_margin;

        let mut first_line = true;
        let mut current = String::new();
        for word in full.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.width(&regular, &candidate) > max_width && !current.is_empty() {
                let finished = std::mem::replace(&mut current, word.to_string());
                self.emit_checklist_line(&marker, finished, first_line, left);
                first_line = false;
                self.cursor_y += self.layout.line_height;
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            self.emit_checklist_line(&marker, current, first_line, left);
        }

        self.cursor_y += self.layout.line_height;
    }

    /// The first wrapped line starts with the checkbox glyph; it is emitted as
    /// its own run so renderers and tests can tell it apart from the text.
    fn emit_checklist_line(&mut self, marker: &TextRun, line: String, first: bool, left: f32) {
        let y = self.cursor_y;
        let style = marker.style;
        if first {
            if let Some(rest) = line.strip_prefix(marker.content.as_str()) {
                self.place(marker.clone(), left, y);
                let offset = self.width(&style, &marker.content);
                self.place(TextRun::text(rest, style), left + offset, y);
                return;
            }
        }
        self.place(TextRun::text(line, style), left, y);
    }

    fn body(&mut self, text: &str) {
        if text.contains('*') {
            self.body_emphasis(text);
        } else {
            self.body_wrapped(text);
        }
        self.cursor_y += self.layout.line_height;
    }

    fn body_emphasis(&mut self, text: &str) {
        let y = self.cursor_y;
        let mut x = self.layout.left_margin;
        for run in parse_inline(text, BODY_FONT_SIZE) {
            let run_width = self.width(&run.style, &run.content);
            self.place(run, x, y);
            x += run_width;
        }
    }

    fn body_wrapped(&mut self, text: &str) {
        let style = RunStyle::regular(BODY_FONT_SIZE);
        let max_width = self.layout.max_width();
        let left = self.layout.left_margin;
        let mut current = String::new();
        for word in text.split(' ') {
            let candidate = format!("{current}{word} ");
            if self.width(&style, &candidate) > max_width && !current.is_empty() {
                let y = self.cursor_y;
                self.place(TextRun::text(current.trim(), style), left, y);
                self.cursor_y += self.layout.line_height;
                current = format!("{word} ");
            } else {
                current = candidate;
            }
        }
        if !current.is_empty() {
            let y = self.cursor_y;
            self.place(TextRun::text(current.trim(), style), left, y);
        }
    }
}

/// Lay out `source` line by line. Blank lines only move the cursor; words
/// wider than the wrap width are placed whole.
pub fn layout_markdown(
    source: &str,
    layout: &MarkdownLayout,
    measure: &dyn TextMeasure,
) -> MarkdownPage {
    let mut builder = PageBuilder {
        layout: *layout,
        measure,
        lines: Vec::new(),
        cursor_y: layout.top,
    };

    for raw in source.split('\n') {
        match parse_line(raw) {
            MarkdownLine::Blank => builder.blank(),
            MarkdownLine::Heading { level, text } => builder.heading(level, text),
            MarkdownLine::Checklist { checked, text } => builder.checklist(checked, text),
            MarkdownLine::Body { text } => builder.body(text),
        }
    }

    MarkdownPage {
        layout: *layout,
        lines: builder.lines,
        cursor_y: builder.cursor_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::parse::{FontWeight, RunKind};

    const MEASURE: FixedAdvance = FixedAdvance::new(10.0);

    fn page(source: &str) -> MarkdownPage {
        layout_markdown(source, &MarkdownLayout::default(), &MEASURE)
    }

    #[test]
    fn plain_lines_never_merge() {
        let source = "first line\nsecond line\nthird";
        let result = page(source);
        assert_eq!(result.lines.len(), 3);
        let texts: Vec<String> = result.lines.iter().map(LayoutLine::text).collect();
        assert_eq!(texts, vec!["first line", "second line", "third"]);
        assert_eq!(result.lines[1].baseline - result.lines[0].baseline, 28.0);
    }

    #[test]
    fn visual_lines_equal_breaks_plus_sources() {
        // 412px wrap width at 10px per char: 41 characters fit, and the
        // trailing space means 8 "word " groups (40 chars) per line.
        let long = "word ".repeat(20);
        let source = format!("{}\ntiny", long.trim());
        let result = page(&source);

        // 20 words wrap as 8 + 8 + 4: two breaks, two source lines.
        assert_eq!(result.lines.len(), 4);
        let words_per_line: Vec<usize> = result
            .lines
            .iter()
            .map(|line| line.text().split(' ').count())
            .collect();
        assert_eq!(words_per_line, vec![8, 8, 4, 1]);
        assert_eq!(result.lines[3].text(), "tiny");
        for line in &result.lines[..3] {
            assert!(MEASURE.advance(&RunStyle::regular(18.0), &line.text()) <= 412.0);
        }
    }

    #[test]
    fn overlong_word_is_not_split() {
        let word = "x".repeat(80);
        let result = page(&word);
        assert_eq!(result.lines.len(), 1);
        assert_eq!(result.lines[0].text(), word);
    }

    #[test]
    fn headings_advance_by_level() {
        let result = page("# One\n#### Four\nbody");
        assert_eq!(result.lines[0].text(), "One");
        assert_eq!(result.lines[0].baseline, 50.0);
        assert_eq!(result.lines[1].baseline, 50.0 + 28.0 + 18.0);
        assert_eq!(result.lines[2].baseline, 50.0 + 46.0 + 28.0 + 10.0);
        assert_eq!(result.lines[0].runs[0].run.style.size, 24.0);
        assert_eq!(result.lines[1].runs[0].run.style.weight, FontWeight::Bold);
    }

    #[test]
    fn blank_line_advances_a_fraction() {
        let result = page("a\n\nb");
        assert_eq!(result.lines.len(), 2);
        let gap = result.lines[1].baseline - result.lines[0].baseline;
        assert!((gap - (28.0 + 28.0 * 0.6)).abs() < 1e-4);
    }

    #[test]
    fn checklist_glyphs_match_marker() {
        let done = page("- [x] Done");
        let first = &done.lines[0].runs[0].run;
        assert_eq!(first.kind, RunKind::Checkbox { checked: true });
        assert_eq!(first.content, "☑");
        assert_eq!(done.lines[0].text(), "☑ Done");

        let todo = page("- [ ] Todo");
        let first = &todo.lines[0].runs[0].run;
        assert_eq!(first.kind, RunKind::Checkbox { checked: false });
        assert_eq!(first.content, "☐");
    }

    #[test]
    fn mixed_checklist_wraps_under_hanging_indent() {
        let text = format!("- [ ] **Bold lead:** {}", "wrap ".repeat(20).trim());
        let result = page(&text);
        assert!(result.lines.len() > 1);
        let indent = 30.0 + 20.0; // glyph plus space at 10px each
        let first_bold = &result.lines[0].runs[1];
        assert_eq!(first_bold.x, indent);
        assert_eq!(first_bold.run.style.weight, FontWeight::Bold);
        for line in &result.lines[1..] {
            assert_eq!(line.left, indent);
            assert!(line.runs.iter().all(|placed| !placed.run.is_checkbox()));
        }
    }

    #[test]
    fn emphasis_runs_share_a_cursor() {
        let result = page("go **fast** now");
        let line = &result.lines[0];
        assert_eq!(line.runs.len(), 3);
        assert_eq!(line.runs[0].x, 30.0);
        assert_eq!(line.runs[1].x, 30.0 + 30.0);
        assert_eq!(line.runs[2].x, 30.0 + 30.0 + 40.0);
    }
}
