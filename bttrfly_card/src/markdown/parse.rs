//! Line classifier for the quick-guide markdown subset. Only single-line
//! constructs are understood; there is no block nesting and no escaping.

use once_cell::sync::Lazy;
use regex::Regex;

static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*[^*]+\*|\*\*[^*]+\*\*").expect("emphasis pattern is valid")
});

pub const CHECKED_GLYPH: &str = "☑";
pub const UNCHECKED_GLYPH: &str = "☐";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontSlant {
    Normal,
    Italic,
}

/// Font selection for one run. Sizes are logical pixels before the device
/// scale factor is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStyle {
    pub weight: FontWeight,
    pub slant: FontSlant,
    pub size: f32,
}

impl RunStyle {
    pub const fn regular(size: f32) -> Self {
        Self {
            weight: FontWeight::Normal,
            slant: FontSlant::Normal,
            size,
        }
    }

    pub const fn bold(size: f32) -> Self {
        Self {
            weight: FontWeight::Bold,
            slant: FontSlant::Normal,
            size,
        }
    }

    pub const fn italic(size: f32) -> Self {
        Self {
            weight: FontWeight::Normal,
            slant: FontSlant::Italic,
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Text,
    Checkbox { checked: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub content: String,
    pub style: RunStyle,
    pub kind: RunKind,
}

impl TextRun {
    pub fn text(content: impl Into<String>, style: RunStyle) -> Self {
        Self {
            content: content.into(),
            style,
            kind: RunKind::Text,
        }
    }

    pub fn checkbox(checked: bool, style: RunStyle) -> Self {
        let glyph = if checked {
            CHECKED_GLYPH
        } else {
            UNCHECKED_GLYPH
        };
        Self {
            content: glyph.to_string(),
            style,
            kind: RunKind::Checkbox { checked },
        }
    }

    pub fn is_checkbox(&self) -> bool {
        matches!(self.kind, RunKind::Checkbox { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownLine<'a> {
    Blank,
    Heading { level: u8, text: &'a str },
    Checklist { checked: bool, text: &'a str },
    Body { text: &'a str },
}

/// Classify one source line. The line is trimmed first; heading prefixes are
/// tested from the deepest level so `#### x` is never read as a level-1
/// heading.
pub fn parse_line(raw: &str) -> MarkdownLine<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return MarkdownLine::Blank;
    }

    for (prefix, level) in [("#### ", 4u8), ("### ", 3), ("## ", 2), ("# ", 1)] {
        if let Some(text) = line.strip_prefix(prefix) {
            return MarkdownLine::Heading { level, text };
        }
    }

    if let Some(rest) = line.strip_prefix("- [x]") {
        return MarkdownLine::Checklist {
            checked: true,
            text: rest.trim_start(),
        };
    }
    if let Some(rest) = line.strip_prefix("- [ ]") {
        return MarkdownLine::Checklist {
            checked: false,
            text: rest.trim_start(),
        };
    }

    MarkdownLine::Body { text: line }
}

/// Split a body line into plain, `*italic*`, and `**bold**` runs. Stray
/// asterisks that do not close a span stay in the plain text.
pub fn parse_inline(text: &str, size: f32) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut cursor = 0;
    for found in EMPHASIS.find_iter(text) {
        push_part(&mut runs, &text[cursor..found.start()], size);
        push_part(&mut runs, found.as_str(), size);
        cursor = found.end();
    }
    push_part(&mut runs, &text[cursor..], size);
    runs
}

fn push_part(runs: &mut Vec<TextRun>, part: &str, size: f32) {
    if part.is_empty() {
        return;
    }
    runs.push(classify_part(part, size));
}

fn classify_part(part: &str, size: f32) -> TextRun {
    if part.len() >= 2 && part.starts_with("**") && part.ends_with("**") {
        TextRun::text(part.replace("**", ""), RunStyle::bold(size))
    } else if part.starts_with('*') && part.ends_with('*') {
        TextRun::text(part.replace('*', ""), RunStyle::italic(size))
    } else {
        TextRun::text(part, RunStyle::regular(size))
    }
}

/// Split checklist text on `**` delimiters. Even segments are regular and odd
/// segments bold; empty segments are dropped.
pub fn split_bold_segments(text: &str, size: f32) -> Vec<TextRun> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(index, part)| {
            let style = if index % 2 == 0 {
                RunStyle::regular(size)
            } else {
                RunStyle::bold(size)
            };
            TextRun::text(part, style)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_strip_prefix_by_depth() {
        assert_eq!(
            parse_line("#### Get started"),
            MarkdownLine::Heading {
                level: 4,
                text: "Get started"
            }
        );
        assert_eq!(
            parse_line("  # Quick Guide  "),
            MarkdownLine::Heading {
                level: 1,
                text: "Quick Guide"
            }
        );
        assert_eq!(
            parse_line("## "),
            MarkdownLine::Body { text: "##" },
            "trimmed marker without text falls through to body"
        );
    }

    #[test]
    fn checklist_markers_are_exact() {
        assert_eq!(
            parse_line("- [x] Done"),
            MarkdownLine::Checklist {
                checked: true,
                text: "Done"
            }
        );
        assert_eq!(
            parse_line("- [ ] Todo"),
            MarkdownLine::Checklist {
                checked: false,
                text: "Todo"
            }
        );
        assert_eq!(
            parse_line("- [X] upper"),
            MarkdownLine::Body {
                text: "- [X] upper"
            }
        );
    }

    #[test]
    fn blank_lines_are_whitespace_only() {
        assert_eq!(parse_line("   \t"), MarkdownLine::Blank);
        assert_eq!(parse_line(""), MarkdownLine::Blank);
    }

    #[test]
    fn inline_emphasis_splits_into_runs() {
        let runs = parse_inline("a **bold** and *slanted* tail", 18.0);
        let summary: Vec<(&str, FontWeight, FontSlant)> = runs
            .iter()
            .map(|run| (run.content.as_str(), run.style.weight, run.style.slant))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a ", FontWeight::Normal, FontSlant::Normal),
                ("bold", FontWeight::Bold, FontSlant::Normal),
                (" and ", FontWeight::Normal, FontSlant::Normal),
                ("slanted", FontWeight::Normal, FontSlant::Italic),
                (" tail", FontWeight::Normal, FontSlant::Normal),
            ]
        );
    }

    #[test]
    fn unmatched_asterisk_stays_plain() {
        let runs = parse_inline("5 * 3", 18.0);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].content, "5 * 3");
        assert_eq!(runs[0].style, RunStyle::regular(18.0));
    }

    #[test]
    fn bold_segments_alternate_by_parity() {
        let runs = split_bold_segments("**New note:** Press ⌘N", 18.0);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].content, "New note:");
        assert_eq!(runs[0].style.weight, FontWeight::Bold);
        assert_eq!(runs[1].content, " Press ⌘N");
        assert_eq!(runs[1].style.weight, FontWeight::Normal);
    }

    #[test]
    fn checkbox_runs_carry_the_glyph() {
        assert_eq!(TextRun::checkbox(true, RunStyle::regular(18.0)).content, "☑");
        assert_eq!(TextRun::checkbox(false, RunStyle::regular(18.0)).content, "☐");
    }
}
