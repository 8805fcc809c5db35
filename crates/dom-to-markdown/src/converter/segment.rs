//! Inline spans and block segments.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

use super::render::Piece;
use crate::text;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n(?:[ \t]*\r?\n)+").expect("valid regex"));

/// An inline unit of rendered text.
///
/// Text is escaped once, when the span is built; raw spans carry literal
/// Markdown syntax such as `**` or `[label](url)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    text: String,
}

impl Span {
    /// A span of source text, escaped for Markdown.
    pub fn text(source: &str) -> Self {
        Self {
            text: text::escape(source),
        }
    }

    /// A span whose text is already safe Markdown.
    pub fn raw(markdown: impl Into<String>) -> Self {
        Self { text: markdown.into() }
    }

    /// The rendered text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the span holds any non-whitespace text.
    pub fn is_present(&self) -> bool {
        text::is_present(&self.text)
    }
}

/// An entry of the open block buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Inline content.
    Span(Span),
    /// A literal in-block line break.
    LineBreak,
}

impl Segment {
    fn piece(&self) -> Piece<'_> {
        match self {
            Self::Span(span) => Piece::Inline(span.as_str()),
            Self::LineBreak => Piece::Literal(Cow::Borrowed("\n")),
        }
    }

    fn raw_text(&self) -> &str {
        match self {
            Self::Span(span) => span.as_str(),
            Self::LineBreak => "\n",
        }
    }
}

/// The structural kind of a block, with its rendering arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockKind {
    /// Running text.
    #[default]
    Paragraph,
    /// `#`-prefixed heading of level 1 to 6.
    Heading(u8),
    /// A list item; `ordinal` is set for ordered lists and is 1-based.
    ListItem {
        /// No element follows this item.
        is_last: bool,
        /// Position within an ordered list.
        ordinal: Option<usize>,
    },
    /// A definition-list term.
    DefinitionTerm,
    /// A definition-list description.
    DefinitionDescription {
        /// No element follows this description.
        is_last: bool,
    },
    /// Preformatted text, reflowed paragraph by paragraph.
    Preformatted,
}

impl BlockKind {
    /// Render `children` according to this block's rule.
    pub fn render<'a>(&self, children: &'a [Segment]) -> Vec<Piece<'a>> {
        let literal = |text: &'static str| Piece::Literal(Cow::Borrowed(text));
        let inline = children.iter().map(Segment::piece);

        match *self {
            Self::Paragraph => inline.chain([literal("\n\n")]).collect(),
            Self::Heading(level) => {
                let marker = format!("{} ", "#".repeat(usize::from(level.clamp(1, 6))));
                std::iter::once(Piece::Literal(Cow::Owned(marker)))
                    .chain(inline)
                    .chain([literal("\n\n")])
                    .collect()
            }
            Self::ListItem { is_last, ordinal } => {
                let prefix = match ordinal {
                    Some(number) => Cow::Owned(format!("{number}. ")),
                    None => Cow::Borrowed("* "),
                };
                let mut pieces: Vec<Piece<'a>> = std::iter::once(Piece::Literal(prefix))
                    .chain(inline)
                    .chain([literal("\n")])
                    .collect();
                if is_last {
                    pieces.push(literal("\n"));
                }
                pieces
            }
            Self::DefinitionTerm => inline.chain([literal(":\n")]).collect(),
            Self::DefinitionDescription { is_last } => {
                let mut pieces: Vec<Piece<'a>> = inline.chain([literal("\n")]).collect();
                if is_last {
                    pieces.push(literal("\n"));
                }
                pieces
            }
            Self::Preformatted => render_preformatted(children),
        }
    }
}

fn render_preformatted(children: &[Segment]) -> Vec<Piece<'static>> {
    let source: String = children.iter().map(Segment::raw_text).collect();
    let paragraphs: Vec<String> = PARAGRAPH_BREAK
        .split(&source)
        .map(text::normalise)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| text::escape(&paragraph))
        .collect();

    if paragraphs.is_empty() {
        return Vec::new();
    }
    let mut rendered = paragraphs.join("\n\n");
    rendered.push_str("\n\n");
    vec![Piece::Literal(Cow::Owned(rendered))]
}
