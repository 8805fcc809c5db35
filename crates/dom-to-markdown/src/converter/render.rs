//! Folding rendered pieces into text.

use std::borrow::Cow;

use crate::text;

/// One piece of rendered block output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece<'a> {
    /// Running inline text, subject to whitespace normalisation.
    Inline(&'a str),
    /// Structural Markdown (prefixes, separators, line breaks), kept verbatim.
    Literal(Cow<'a, str>),
}

/// Join `pieces` into a string.
///
/// Consecutive inline pieces are concatenated and normalised as a group so
/// that source whitespace collapses like running Markdown text; literal
/// pieces pass through untouched.
pub fn stringify(pieces: &[Piece<'_>]) -> String {
    let mut output = String::new();
    let mut inline_run = String::new();

    for piece in pieces {
        match piece {
            Piece::Inline(text) => inline_run.push_str(text),
            Piece::Literal(literal) => {
                flush_inline(&mut output, &mut inline_run);
                output.push_str(literal);
            }
        }
    }
    flush_inline(&mut output, &mut inline_run);
    output
}

fn flush_inline(output: &mut String, inline_run: &mut String) {
    if !inline_run.is_empty() {
        output.push_str(&text::normalise(inline_run));
        inline_run.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_groups_are_normalised() {
        let pieces = [Piece::Inline("  hello \n"), Piece::Inline("  world  ")];
        assert_eq!(stringify(&pieces), "hello world");
    }

    #[test]
    fn test_literals_survive_verbatim() {
        let pieces = [
            Piece::Literal(Cow::Borrowed("* ")),
            Piece::Inline(" a "),
            Piece::Literal(Cow::Borrowed("\n")),
            Piece::Inline(" b"),
            Piece::Literal(Cow::Borrowed("\n\n")),
        ];
        assert_eq!(stringify(&pieces), "* a\nb\n\n");
    }

    #[test]
    fn test_empty_sequence() {
        assert_eq!(stringify(&[]), "");
        assert_eq!(stringify(&[Piece::Inline("   ")]), "");
    }
}
