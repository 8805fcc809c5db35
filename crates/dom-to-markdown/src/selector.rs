//! Minimal CSS selector matching for the `exclude` option.
//!
//! Supports type, universal, `#id`, `.class`, `[attr]` and `[attr=value]`
//! simple selectors, compound selectors, descendant and child combinators,
//! and comma-separated lists.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{ConversionError, Result};
use crate::node::{MarkupNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn matches<N: MarkupNode>(&self, node: &N) -> bool {
        if node.kind() != NodeKind::Element {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.is_tag(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.attribute("id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = node.attribute("class").unwrap_or_default();
            let present: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|class| present.contains(&class.as_str())) {
                return false;
            }
        }
        self.attributes.iter().all(|attr| match (&attr.value, node.attribute(&attr.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => *expected == actual,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One complex selector, stored right to left: the subject compound first,
/// then each combinator with the compound to its left.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

impl Complex {
    fn matches<N: MarkupNode>(&self, node: &N) -> bool {
        self.subject.matches(node) && matches_ancestors(node, &self.ancestors)
    }
}

fn matches_ancestors<N: MarkupNode>(node: &N, remaining: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, compound), rest)) = remaining.split_first() else {
        return true;
    };
    let mut current = node.parent();
    while let Some(ancestor) = current {
        if compound.matches(&ancestor) && matches_ancestors(&ancestor, rest) {
            return true;
        }
        if *combinator == Combinator::Child {
            return false;
        }
        current = ancestor.parent();
    }
    false
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList {
    selectors: Vec<Complex>,
}

impl SelectorList {
    /// Parse every selector in `sources` into one list.
    pub fn parse_all<S: AsRef<str>>(sources: &[S]) -> Result<Self> {
        let mut selectors = Vec::new();
        for source in sources {
            selectors.extend(Self::parse(source.as_ref())?.selectors);
        }
        Ok(Self { selectors })
    }

    /// Parse a single (possibly comma-separated) selector string.
    pub fn parse(source: &str) -> Result<Self> {
        let invalid = |reason: &str| ConversionError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut selectors = Vec::new();
        for part in split_list(source) {
            let part = part.trim();
            if part.is_empty() {
                return Err(invalid("empty selector"));
            }
            selectors.push(parse_complex(part).map_err(|reason| invalid(&reason))?);
        }
        Ok(Self { selectors })
    }

    /// Whether no selectors were supplied.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Number of complex selectors in the list.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether any selector in the list matches `node`.
    pub fn matches<N: MarkupNode>(&self, node: &N) -> bool {
        self.selectors.iter().any(|selector| selector.matches(node))
    }
}

/// Split on commas that are not inside an attribute selector.
fn split_list(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (idx, ch) in source.char_indices() {
        match (quote, ch) {
            (Some(open), c) if c == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&source[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&source[start..]);
    parts
}

fn parse_complex(source: &str) -> std::result::Result<Complex, String> {
    let mut chars = source.chars().peekable();
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();

    loop {
        let saw_space = skip_whitespace(&mut chars);
        let Some(&next) = chars.peek() else { break };

        if next == '>' {
            chars.next();
            if compounds.is_empty() {
                return Err("selector starts with a combinator".to_string());
            }
            combinators.push(Combinator::Child);
            skip_whitespace(&mut chars);
            compounds.push(parse_compound(&mut chars)?);
            continue;
        }

        if !compounds.is_empty() {
            if !saw_space {
                return Err(format!("unexpected character `{next}`"));
            }
            combinators.push(Combinator::Descendant);
        }
        compounds.push(parse_compound(&mut chars)?);
    }

    let Some(subject) = compounds.pop() else {
        return Err("empty selector".to_string());
    };
    let ancestors = combinators.into_iter().rev().zip(compounds.into_iter().rev()).collect();
    Ok(Complex { subject, ancestors })
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) -> bool {
    let mut skipped = false;
    while chars.peek().is_some_and(|ch| ch.is_whitespace()) {
        chars.next();
        skipped = true;
    }
    skipped
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '-' || ch == '_'
}

fn read_ident(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<String, String> {
    let mut ident = String::new();
    while let Some(&ch) = chars.peek() {
        if !is_ident_char(ch) {
            break;
        }
        ident.push(ch);
        chars.next();
    }
    if ident.is_empty() {
        return Err("expected an identifier".to_string());
    }
    Ok(ident)
}

fn parse_compound(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<Compound, String> {
    let mut compound = Compound::default();
    let mut consumed = false;

    match chars.peek() {
        Some('*') => {
            chars.next();
            consumed = true;
        }
        Some(&ch) if is_ident_char(ch) => {
            compound.tag = Some(read_ident(chars)?.to_ascii_lowercase());
            consumed = true;
        }
        _ => {}
    }

    while let Some(&ch) = chars.peek() {
        match ch {
            '#' => {
                chars.next();
                compound.id = Some(read_ident(chars)?);
            }
            '.' => {
                chars.next();
                compound.classes.push(read_ident(chars)?);
            }
            '[' => {
                chars.next();
                compound.attributes.push(parse_attribute(chars)?);
            }
            _ => break,
        }
        consumed = true;
    }

    if consumed {
        Ok(compound)
    } else {
        match chars.peek() {
            Some(ch) => Err(format!("unexpected character `{ch}`")),
            None => Err("expected a selector".to_string()),
        }
    }
}

fn parse_attribute(chars: &mut Peekable<Chars<'_>>) -> std::result::Result<AttributeMatch, String> {
    skip_whitespace(chars);
    let name = read_ident(chars)?.to_ascii_lowercase();
    skip_whitespace(chars);

    let value = match chars.next() {
        Some(']') => return Ok(AttributeMatch { name, value: None }),
        Some('=') => {
            skip_whitespace(chars);
            let value = match chars.peek() {
                Some(&quote) if quote == '"' || quote == '\'' => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        match chars.next() {
                            Some(ch) if ch == quote => break,
                            Some(ch) => value.push(ch),
                            None => return Err("unterminated string".to_string()),
                        }
                    }
                    value
                }
                _ => read_ident(chars)?,
            };
            skip_whitespace(chars);
            value
        }
        Some(ch) => return Err(format!("unsupported attribute operator `{ch}`")),
        None => return Err("unterminated attribute selector".to_string()),
    };

    match chars.next() {
        Some(']') => Ok(AttributeMatch {
            name,
            value: Some(value),
        }),
        _ => Err("unterminated attribute selector".to_string()),
    }
}
