//! Transcript export.
//!
//! Messages are labelled by role, wrapped to a fixed column width, and laid
//! out top to bottom on fixed-height pages. Layout units follow an A4 page in
//! millimetres so the page breaks land where a printed copy would break.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::message::Turn;

pub const DEFAULT_EXPORT_WIDTH: usize = 80;
pub const DEFAULT_EXPORT_FILENAME: &str = "loan_chat.txt";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportLayout {
    pub page_height: f32,
    /// Where the first line of the first page sits.
    pub first_line_y: f32,
    /// Top margin of later pages and bottom margin of every page.
    pub margin: f32,
    pub line_height: f32,
    /// Extra space after each message.
    pub message_gap: f32,
    /// Content width in terminal columns.
    pub content_width: usize,
}

impl Default for ExportLayout {
    fn default() -> Self {
        Self {
            page_height: 297.0,
            first_line_y: 20.0,
            margin: 15.0,
            line_height: 10.0,
            message_gap: 5.0,
            content_width: DEFAULT_EXPORT_WIDTH,
        }
    }
}

impl ExportLayout {
    pub fn with_width(mut self, content_width: usize) -> Self {
        self.content_width = content_width;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageLine {
    pub y: f32,
    pub message_index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Page {
    pub lines: Vec<PageLine>,
}

/// Greedy word wrap by display width. Explicit newlines are kept; words
/// wider than `width` are split across lines.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in paragraph.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);
            let needed = if current.is_empty() {
                word_width
            } else {
                current_width + 1 + word_width
            };

            if needed <= width {
                if !current.is_empty() {
                    current.push(' ');
                    current_width += 1;
                }
                current.push_str(word);
                current_width += word_width;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for ch in word.chars() {
                let ch_width = ch.width().unwrap_or(0);
                if current_width + ch_width > width && !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
        }

        lines.push(current);
    }

    lines
}

/// Lay out `turns` onto pages.
pub fn paginate(turns: &[Turn], layout: &ExportLayout) -> Vec<Page> {
    let mut pages = vec![Page::default()];
    let mut y = layout.first_line_y;
    let bottom = layout.page_height - layout.margin;

    for (message_index, turn) in turns.iter().enumerate() {
        let labelled = format!("{} {}", turn.role.label(), turn.text);
        for text in wrap_text(&labelled, layout.content_width) {
            if y + layout.line_height > bottom {
                pages.push(Page::default());
                y = layout.margin;
            }
            if let Some(page) = pages.last_mut() {
                page.lines.push(PageLine {
                    y,
                    message_index,
                    text,
                });
            }
            y += layout.line_height;
        }
        y += layout.message_gap;
    }

    if turns.is_empty() {
        pages.clear();
    }
    pages
}

/// Plain-text rendering: a header per page, form feeds between pages and a
/// blank line between messages on the same page.
pub fn render_document(pages: &[Page], title: &str) -> String {
    let total = pages.len();
    let mut out = String::new();

    for (index, page) in pages.iter().enumerate() {
        if index > 0 {
            out.push('\u{000C}');
        }
        out.push_str(&format!("{title} (page {} of {total})\n\n", index + 1));

        let mut previous_message = None;
        for line in &page.lines {
            if previous_message.is_some_and(|prev| prev != line.message_index) {
                out.push('\n');
            }
            out.push_str(&line.text);
            out.push('\n');
            previous_message = Some(line.message_index);
        }
    }

    out
}

#[derive(Debug)]
pub enum ExportError {
    /// Nothing has been said yet.
    EmptyTranscript,
    AlreadyExists(PathBuf),
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EmptyTranscript => {
                write!(f, "No conversation to export - the chat history is empty.")
            }
            ExportError::AlreadyExists(path) => write!(
                f,
                "File '{}' already exists. Please specify a different filename with /export <filename>.",
                path.display()
            ),
            ExportError::Io(err) => write!(f, "Export failed: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

/// Write the paginated transcript to `path`. Returns the page count.
pub fn export_transcript(
    turns: &[Turn],
    path: &Path,
    layout: &ExportLayout,
    overwrite: bool,
) -> Result<usize, ExportError> {
    if turns.is_empty() {
        return Err(ExportError::EmptyTranscript);
    }
    if !overwrite && path.exists() {
        return Err(ExportError::AlreadyExists(path.to_path_buf()));
    }

    let pages = paginate(turns, layout);
    let title = format!(
        "Loan chat transcript, exported {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M")
    );

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(render_document(&pages, &title).as_bytes())?;
    writer.flush()?;
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::sample_transcript;
    use tempfile::tempdir;

    #[test]
    fn wrap_respects_width_and_newlines() {
        let lines = wrap_text("the quick brown fox\njumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
        assert!(lines.iter().all(|line| line.width() <= 10));
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text("ab 1234567890123 cd", 5);
        assert_eq!(lines, vec!["ab", "12345", "67890", "123", "cd"]);
    }

    #[test]
    fn wrap_measures_wide_characters() {
        let lines = wrap_text("貸款貸款貸款", 4);
        assert_eq!(lines, vec!["貸款", "貸款", "貸款"]);
    }

    #[test]
    fn messages_are_labelled_by_role() {
        let pages = paginate(&sample_transcript(), &ExportLayout::default());
        assert_eq!(pages.len(), 1);
        let firsts: Vec<&str> = pages[0]
            .lines
            .iter()
            .filter(|line| line.text.starts_with("User:") || line.text.starts_with("Bot:"))
            .map(|line| &line.text[..4])
            .collect();
        assert_eq!(firsts, vec!["User", "Bot:", "User", "Bot:"]);
    }

    #[test]
    fn long_transcripts_break_onto_new_pages_within_margins() {
        let layout = ExportLayout::default().with_width(40);
        let turns: Vec<Turn> = (0..30)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("Question {i} about amortization schedules and fees"))
                } else {
                    Turn::model(format!("Answer {i}: ").repeat(8))
                }
            })
            .collect();

        let pages = paginate(&turns, &layout);
        assert!(pages.len() > 1);

        let bottom = layout.page_height - layout.margin;
        for (index, page) in pages.iter().enumerate() {
            let first_y = page.lines.first().map(|line| line.y).unwrap();
            let expected_top = if index == 0 { layout.first_line_y } else { layout.margin };
            assert_eq!(first_y, expected_top);
            for line in &page.lines {
                assert!(line.y + layout.line_height <= bottom);
                assert!(line.text.width() <= layout.content_width);
            }
        }

        // Every wrapped line appears exactly once, in order.
        let flattened: Vec<&str> = pages
            .iter()
            .flat_map(|page| page.lines.iter().map(|line| line.text.as_str()))
            .collect();
        let expected: Vec<String> = turns
            .iter()
            .flat_map(|turn| wrap_text(&format!("{} {}", turn.role.label(), turn.text), 40))
            .collect();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn render_separates_pages_and_messages() {
        let layout = ExportLayout {
            page_height: 60.0,
            ..ExportLayout::default()
        };
        let turns = vec![Turn::user("a"), Turn::model("b"), Turn::user("c")];
        let pages = paginate(&turns, &layout);
        // 60 - 15 = 45 usable: lines at y=20 and y=35 (after a 5 gap) fit, the third does not.
        assert_eq!(pages.len(), 2);

        let doc = render_document(&pages, "T");
        assert_eq!(
            doc,
            "T (page 1 of 2)\n\nUser: a\n\nBot: b\n\u{000C}T (page 2 of 2)\n\nUser: c\n"
        );
    }

    #[test]
    fn export_writes_file_and_refuses_to_clobber() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_EXPORT_FILENAME);

        let pages = export_transcript(&sample_transcript(), &path, &ExportLayout::default(), false)
            .unwrap();
        assert_eq!(pages, 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Loan chat transcript, exported"));
        assert!(contents.contains("User: What would I pay monthly"));

        assert!(matches!(
            export_transcript(&sample_transcript(), &path, &ExportLayout::default(), false),
            Err(ExportError::AlreadyExists(_))
        ));
        assert!(export_transcript(&sample_transcript(), &path, &ExportLayout::default(), true).is_ok());
    }

    #[test]
    fn empty_transcript_is_not_exported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.txt");
        assert!(matches!(
            export_transcript(&[], &path, &ExportLayout::default(), false),
            Err(ExportError::EmptyTranscript)
        ));
        assert!(!path.exists());
    }
}
