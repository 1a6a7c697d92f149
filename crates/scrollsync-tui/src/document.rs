//! Plain-text documents and wrapping to terminal width

use std::path::Path;

use anyhow::{Context, Result};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub lines: Vec<String>,
}

impl Document {
    pub fn from_text(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            lines: text.lines().map(|l| l.replace('\t', "    ")).collect(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let text = String::from_utf8_lossy(&bytes);
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::from_text(title, &text))
    }

    /// Wrap every line to `width` display columns
    ///
    /// Breaks at the last space when possible, otherwise mid-word. Empty
    /// source lines stay as empty rows.
    pub fn wrap(&self, width: u16) -> Vec<String> {
        let width = width.max(1) as usize;
        let mut rows = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            wrap_line(line, width, &mut rows);
        }
        rows
    }
}

fn wrap_line(line: &str, width: usize, rows: &mut Vec<String>) {
    if line.is_empty() {
        rows.push(String::new());
        return;
    }

    let mut current = String::new();
    let mut current_width = 0usize;
    // Byte index in `current` just after the last space, with the width up to it
    let mut last_break: Option<(usize, usize)> = None;

    for ch in line.chars() {
        let w = ch.width().unwrap_or(0);
        if current_width + w > width && !current.is_empty() {
            match last_break {
                Some((idx, break_width)) if idx < current.len() => {
                    let rest = current.split_off(idx);
                    rows.push(current.trim_end().to_string());
                    current = rest;
                    current_width -= break_width;
                }
                _ => {
                    rows.push(current.trim_end().to_string());
                    current.clear();
                    current_width = 0;
                }
            }
            last_break = None;
        }
        current.push(ch);
        current_width += w;
        if ch == ' ' {
            last_break = Some((current.len(), current_width));
        }
    }
    rows.push(current);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lines_untouched() {
        let doc = Document::from_text("t", "hello\n\nworld");
        assert_eq!(doc.wrap(80), vec!["hello", "", "world"]);
    }

    #[test]
    fn test_wraps_at_spaces() {
        let doc = Document::from_text("t", "the quick brown fox jumps");
        assert_eq!(doc.wrap(10), vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_breaks_long_words() {
        let doc = Document::from_text("t", "abcdefghij");
        assert_eq!(doc.wrap(4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wide_characters() {
        let doc = Document::from_text("t", "日本語のテキスト");
        let rows = doc.wrap(6);
        assert_eq!(rows, vec!["日本語", "のテキ", "スト"]);
    }

    #[test]
    fn test_zero_width_is_safe() {
        let doc = Document::from_text("t", "abc");
        assert_eq!(doc.wrap(0), vec!["a", "b", "c"]);
    }
}
