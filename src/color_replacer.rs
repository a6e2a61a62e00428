//! Sentinel color substitution over a line range
//!
//! Lines are split after each `\n` so line endings (including `\r\n`) and a
//! missing final newline survive untouched. Content is handled as bytes, so
//! files that are not valid UTF-8 are still rewritten faithfully.

use anyhow::{Context, Result};
use regex::bytes::Regex;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

/// Color every probed code is replaced with
pub const SENTINEL_COLOR: &str = "#ff0000";

/// `#` followed by 3 to 6 hex digits
const COLOR_CODE_PATTERN: &str = "#[0-9a-fA-F]{3,6}";

/// Result of rendering one replacement pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: Vec<u8>,
    /// Number of color codes replaced
    pub replaced: usize,
}

#[derive(Debug, Clone)]
pub struct ColorReplacer {
    pattern: Regex,
}

impl ColorReplacer {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(COLOR_CODE_PATTERN)
            .with_context(|| format!("Invalid color code pattern: {}", COLOR_CODE_PATTERN))?;
        Ok(Self { pattern })
    }

    /// Replace every color code on one line, returning the new line and the count
    pub fn replace_line(&self, line: &[u8]) -> (Vec<u8>, usize) {
        let replaced = self.pattern.find_iter(line).count();
        if replaced == 0 {
            return (line.to_vec(), 0);
        }
        let new_line = self
            .pattern
            .replace_all(line, SENTINEL_COLOR.as_bytes())
            .into_owned();
        (new_line, replaced)
    }

    /// Build new content from `original`, replacing colors only on lines in `range`
    ///
    /// Line indices are zero-based; lines outside the range are copied verbatim.
    pub fn render(&self, original: &[u8], range: RangeInclusive<usize>) -> Rendered {
        let mut content = Vec::with_capacity(original.len());
        let mut replaced = 0;

        for (index, line) in split_lines(original).into_iter().enumerate() {
            if range.contains(&index) {
                let (new_line, count) = self.replace_line(line);
                content.extend_from_slice(&new_line);
                replaced += count;
            } else {
                content.extend_from_slice(line);
            }
        }

        Rendered { content, replaced }
    }

    /// Rewrite `target` from the content of `backup`, coloring lines in `range`
    ///
    /// Always reads from the backup so passes never compound.
    pub fn apply(&self, backup: &Path, target: &Path, range: RangeInclusive<usize>) -> Result<usize> {
        let original = fs::read(backup)
            .with_context(|| format!("Failed to read backup: {}", backup.display()))?;

        let rendered = self.render(&original, range.clone());

        fs::write(target, &rendered.content)
            .with_context(|| format!("Failed to write file: {}", target.display()))?;

        tracing::debug!(
            first = range.start(),
            last = range.end(),
            replaced = rendered.replaced,
            "replacement pass written"
        );

        Ok(rendered.replaced)
    }
}

/// Split content into lines, each keeping its trailing `\n`
pub fn split_lines(content: &[u8]) -> Vec<&[u8]> {
    content.split_inclusive(|&b| b == b'\n').collect()
}

/// Number of lines in `content`; a final line without `\n` still counts
pub fn count_lines(content: &[u8]) -> usize {
    split_lines(content).len()
}
