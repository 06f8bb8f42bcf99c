//! Offset to line number lookup for diagnostics.

use text_size::TextSize;

/// Byte offsets of every line start in a source string.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn new(text: &str) -> Self {
        let line_starts = std::iter::once(TextSize::from(0))
            .chain(
                text.match_indices('\n')
                    .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
            )
            .collect();
        Self { line_starts }
    }

    /// Returns the 1-based line containing `offset`.
    pub fn line(&self, offset: TextSize) -> u32 {
        self.line_starts.partition_point(|&start| start <= offset) as u32
    }
}
