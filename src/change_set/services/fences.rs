//! Line-oriented scanner for fenced code blocks.

/// Minimum number of fence characters opening a block.
const MIN_FENCE_RUN: usize = 3;

/// A fenced code block located in generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    info: String,
    body: String,
    opening_line: usize,
    closing_line: Option<usize>,
}

impl FencedBlock {
    /// Returns the trimmed info string following the opening fence.
    #[must_use]
    pub fn info(&self) -> &str {
        &self.info
    }

    /// Returns the lines between the fences joined with `\n`.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Returns the zero-based line index of the opening fence.
    #[must_use]
    pub const fn opening_line(&self) -> usize {
        self.opening_line
    }

    /// Returns the zero-based line index of the closing fence.
    ///
    /// `None` when the block runs to the end of the text.
    #[must_use]
    pub const fn closing_line(&self) -> Option<usize> {
        self.closing_line
    }

    fn spans(&self, line: usize) -> bool {
        line >= self.opening_line && self.closing_line.is_none_or(|closing| line <= closing)
    }
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    run: usize,
}

impl Fence {
    fn open(line: &str) -> Option<(Self, String)> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
        let run = trimmed.chars().take_while(|c| *c == marker).count();
        if run < MIN_FENCE_RUN {
            return None;
        }
        let info = trimmed.trim_start_matches(marker).trim();
        if marker == '`' && info.contains('`') {
            return None;
        }
        Some((Self { marker, run }, info.to_owned()))
    }

    fn closes(self, line: &str) -> bool {
        let trimmed = line.trim();
        let run = trimmed.chars().take_while(|c| *c == self.marker).count();
        run >= self.run && trimmed.trim_start_matches(self.marker).is_empty()
    }
}

/// Generated text split into lines with its fenced blocks indexed.
///
/// Blocks never overlap; an unterminated fence extends to the end of the
/// text.
#[derive(Debug, Clone)]
pub struct ScannedText<'a> {
    lines: Vec<&'a str>,
    blocks: Vec<FencedBlock>,
}

impl<'a> ScannedText<'a> {
    /// Scans text for fenced blocks.
    #[must_use]
    pub fn scan(text: &'a str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        let mut blocks = Vec::new();
        let mut index = 0;

        while let Some(line) = lines.get(index) {
            let Some((fence, info)) = Fence::open(line) else {
                index += 1;
                continue;
            };

            let mut body_lines = Vec::new();
            let mut cursor = index + 1;
            let mut closing_line = None;
            while let Some(candidate) = lines.get(cursor) {
                if fence.closes(candidate) {
                    closing_line = Some(cursor);
                    break;
                }
                body_lines.push(*candidate);
                cursor += 1;
            }

            blocks.push(FencedBlock {
                info,
                body: body_lines.join("\n"),
                opening_line: index,
                closing_line,
            });
            index = closing_line.map_or(lines.len(), |closing| closing + 1);
        }

        Self { lines, blocks }
    }

    /// Returns the fenced blocks in text order.
    #[must_use]
    pub fn blocks(&self) -> &[FencedBlock] {
        &self.blocks
    }

    /// Returns a line by zero-based index.
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    /// Returns the line naming a block: the nearest non-blank line above its
    /// opening fence, provided that line is not part of another block.
    #[must_use]
    pub fn naming_line(&self, block: &FencedBlock) -> Option<&'a str> {
        let index = (0..block.opening_line())
            .rev()
            .find(|candidate| self.line(*candidate).is_some_and(|line| !line.trim().is_empty()))?;
        if self.blocks.iter().any(|other| other.spans(index)) {
            return None;
        }
        self.line(index)
    }
}
