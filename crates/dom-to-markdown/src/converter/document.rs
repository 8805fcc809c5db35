//! Block accumulator.
//!
//! Holds the segments of the block currently being built and the Markdown
//! produced so far. Each boundary renders the open buffer and appends it.

use std::borrow::Cow;

use super::render::{Piece, stringify};
use super::segment::{BlockKind, Segment};

/// How the next [`Document::finish`] renders the open buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pending {
    kind: BlockKind,
    quoted: bool,
}

/// Accumulates Markdown block by block.
#[derive(Debug, Default)]
pub struct Document {
    output: String,
    open: Vec<Segment>,
    pending: Pending,
}

impl Document {
    /// An empty document with an open paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the open buffer and declare how the next block renders.
    ///
    /// `quoted` blocks are prefixed with `> ` when finished.
    pub fn start(&mut self, kind: BlockKind, quoted: bool) {
        self.open.clear();
        self.pending = Pending { kind, quoted };
    }

    /// Append a segment to the open block.
    pub fn push(&mut self, segment: Segment) {
        self.open.push(segment);
    }

    /// Whether the open block holds any non-blank span.
    pub fn is_present(&self) -> bool {
        self.open.iter().any(|segment| match segment {
            Segment::Span(span) => span.is_present(),
            Segment::LineBreak => false,
        })
    }

    /// Render the open block and append it to the output.
    ///
    /// Blocks without visible text contribute nothing.
    pub fn finish(&mut self) {
        if !self.is_present() {
            self.open.clear();
            return;
        }
        let segments = std::mem::take(&mut self.open);

        let mut pieces = Vec::with_capacity(segments.len() + 3);
        if self.pending.quoted {
            pieces.push(Piece::Literal(Cow::Borrowed("> ")));
        }
        pieces.extend(self.pending.kind.render(&segments));
        self.output.push_str(&stringify(&pieces));
    }

    /// Finish the current block and start a new one.
    pub fn break_block(&mut self, kind: BlockKind, quoted: bool) {
        self.finish();
        self.start(kind, quoted);
    }

    /// Markdown accumulated so far.
    pub fn content(&self) -> &str {
        &self.output
    }

    /// Consume the document, returning its Markdown.
    pub fn into_content(self) -> String {
        self.output
    }
}
