//! Main conversion pipeline for node trees to Markdown.
//!
//! This module implements the public conversion functions and the recursive tree
//! walker that dispatches on each node and feeds segments into a [`Document`].

use tracing::{debug, trace};

use super::document::Document;
use super::segment::{BlockKind, Segment, Span};
use crate::error::Result;
use crate::node::{Input, MarkupNode, NodeKind};
use crate::options::ConversionOptions;
use crate::selector::SelectorList;
use crate::text;
use crate::visibility::{BoxExtent, Geometry, Rect, VisibilityOracle};

/// Tags whose content never reaches the output.
const NON_CONTENT_TAGS: [&str; 4] = ["head", "noscript", "script", "style"];

/// Tags that start a new paragraph before and after their content.
const BLOCK_TAGS: [&str; 22] = [
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "div",
    "dl",
    "dt",
    "figure",
    "footer",
    "header",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "td",
    "th",
    "ul",
];

/// Heading level of an `h1`..`h6` tag name.
fn heading_level(tag_name: &str) -> Option<u8> {
    match tag_name.as_bytes() {
        [b'h', digit @ b'1'..=b'6'] => Some(digit - b'0'),
        _ => None,
    }
}

fn is_block_tag(tag_name: &str) -> bool {
    BLOCK_TAGS.contains(&tag_name)
}

/// Whether the tag ends the open block, which discards a pending `<br>`.
fn opens_block(tag_name: &str) -> bool {
    is_block_tag(tag_name) || heading_level(tag_name).is_some() || tag_name == "textarea"
}

/// Whether markdown link syntax cannot wrap this element.
fn is_block_or_heading<N: MarkupNode>(node: &N) -> bool {
    node.tag_name()
        .is_some_and(|tag| is_block_tag(&tag) || heading_level(&tag).is_some())
}

/// Geometry for trees without a layout engine. Never constructed.
enum NoGeometry {}

impl<N> Geometry<N> for NoGeometry {
    fn box_extent(&self, _node: &N) -> BoxExtent {
        match *self {}
    }

    fn bounding_rect(&self, _node: &N) -> Rect {
        match *self {}
    }

    fn scroll_size(&self, _node: &N) -> (f64, f64) {
        match *self {}
    }
}

/// Per-call configuration shared by every step of the walk.
struct Context<'a, 'g, G: ?Sized> {
    options: &'a ConversionOptions,
    /// Parsed `exclude` selectors.
    exclude: &'a SelectorList,
    /// Present only for layout-backed trees with `exclude_hidden` set.
    oracle: Option<&'a VisibilityOracle<'g, G>>,
}

/// Mutable state threaded through the recursive walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TraversalState {
    /// A single `<br>` was seen and not yet emitted.
    pub(crate) pending_break: bool,
    /// Blocks opened now are rendered as blockquote lines.
    pub(crate) in_blockquote: bool,
    /// The next block-initiating element joins the block already open.
    pub(crate) group_with_next: bool,
}

/// Converts a node tree to Markdown.
///
/// Visibility filtering is disabled because no layout backs the tree; use
/// [`convert_with_geometry`] for layout-backed trees.
pub fn convert<N: MarkupNode>(input: Input<N>, options: &ConversionOptions) -> Result<String> {
    convert_impl::<N, NoGeometry>(input, options, None)
}

/// Converts a layout-backed node tree to Markdown.
///
/// When `options.exclude_hidden` is set, elements the [`VisibilityOracle`]
/// reports as hidden are dropped with their subtree. Page bounds are computed
/// once for the call.
pub fn convert_with_geometry<N, G>(input: Input<N>, options: &ConversionOptions, geometry: &G) -> Result<String>
where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    convert_impl(input, options, Some(geometry))
}

fn convert_impl<N, G>(input: Input<N>, options: &ConversionOptions, geometry: Option<&G>) -> Result<String>
where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    let roots = input.into_roots();
    let exclude = SelectorList::parse_all(&options.exclude)?;

    let oracle = match geometry {
        Some(geometry) if options.exclude_hidden => Some(VisibilityOracle::new(&roots, geometry)),
        _ => None,
    };
    debug!(
        roots = roots.len(),
        exclude = exclude.len(),
        visibility_filter = oracle.is_some(),
        page_bounds = ?oracle.as_ref().and_then(VisibilityOracle::bounds),
        "starting conversion"
    );

    let ctx = Context {
        options,
        exclude: &exclude,
        oracle: oracle.as_ref(),
    };
    let mut document = Document::new();
    let mut state = TraversalState::default();

    for root in &roots {
        paragraph_break(&mut document, &mut state);
        walk_node(root, &mut document, &mut state, &ctx);
        paragraph_break(&mut document, &mut state);
    }

    Ok(document.into_content().trim().to_string())
}

/// Declare a block boundary; the only way the walk ends a block.
fn block_break(document: &mut Document, state: &mut TraversalState, kind: BlockKind) {
    state.pending_break = false;
    document.break_block(kind, state.in_blockquote);
}

fn paragraph_break(document: &mut Document, state: &mut TraversalState) {
    block_break(document, state, BlockKind::Paragraph);
}

/// Emit a deferred `<br>` as a literal newline.
fn flush_line_break(document: &mut Document, state: &mut TraversalState) {
    if state.pending_break {
        state.pending_break = false;
        document.push(Segment::LineBreak);
    }
}

fn should_skip<N, G>(node: &N, tag_name: &str, ctx: &Context<'_, '_, G>) -> bool
where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    if NON_CONTENT_TAGS.contains(&tag_name) {
        return true;
    }
    if ctx.exclude.matches(node) {
        trace!(tag = tag_name, "skipping excluded element");
        return true;
    }
    if ctx.oracle.is_some_and(|oracle| oracle.is_hidden(node)) {
        trace!(tag = tag_name, "skipping hidden element");
        return true;
    }
    false
}

/// Recursively walk a node and push its Markdown into `document`.
fn walk_node<N, G>(node: &N, document: &mut Document, state: &mut TraversalState, ctx: &Context<'_, '_, G>)
where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    match node.kind() {
        NodeKind::Element => {}
        NodeKind::Text => {
            let content = node.text();
            // Whitespace between two <br>s must not split them.
            if text::is_present(&content) {
                flush_line_break(document, state);
            }
            document.push(Segment::Span(Span::text(&content)));
            return;
        }
        NodeKind::Document => {
            walk_children(node, document, state, ctx);
            return;
        }
        NodeKind::Comment | NodeKind::Other => return,
    }

    let Some(tag_name) = node.tag_name().map(|tag| tag.into_owned()) else {
        return;
    };

    if should_skip(node, &tag_name, ctx) {
        return;
    }

    if tag_name == "br" {
        if state.pending_break {
            paragraph_break(document, state);
        } else {
            state.pending_break = true;
        }
        return;
    }
    if !opens_block(&tag_name) {
        flush_line_break(document, state);
    }

    match tag_name.as_str() {
        "strong" | "b" => walk_emphasis(node, "**", document, state, ctx),
        "em" | "i" => walk_emphasis(node, "*", document, state, ctx),

        "img" if ctx.options.images => {
            let alt = node.attribute("alt").unwrap_or_default();
            let src = node.attribute("src").unwrap_or_default();
            document.push(Segment::Span(Span::raw(format!("![{}]({src})", text::escape(&alt)))));
        }

        "a" if ctx.options.links => {
            if !text::is_present(&node.text()) {
                return;
            }
            match node.attribute("href") {
                // Markdown links cannot wrap block content.
                Some(href) if !node.has_descendant(&is_block_or_heading) => {
                    document.push(Segment::Span(Span::raw("[")));
                    walk_children(node, document, state, ctx);
                    document.push(Segment::Span(Span::raw(format!("]({href})"))));
                }
                _ => walk_children(node, document, state, ctx),
            }
        }

        "blockquote" => {
            let outer = state.in_blockquote;
            state.in_blockquote = true;
            paragraph_break(document, state);
            walk_flow(node, document, state, ctx);
            state.in_blockquote = outer;
            paragraph_break(document, state);
        }

        "li" => {
            let is_last = node.next_element_sibling().is_none();
            let ordinal = node
                .parent()
                .filter(|parent| parent.is_tag("ol"))
                .map(|_| node.preceding_element_siblings() + 1);
            block_break(document, state, BlockKind::ListItem { is_last, ordinal });
            walk_flow(node, document, state, ctx);
        }

        "dt" => {
            block_break(document, state, BlockKind::DefinitionTerm);
            walk_flow(node, document, state, ctx);
        }

        "dd" => {
            let is_last = node.next_element_sibling().is_none();
            block_break(document, state, BlockKind::DefinitionDescription { is_last });
            walk_flow(node, document, state, ctx);
        }

        "pre" | "textarea" => {
            block_break(document, state, BlockKind::Preformatted);
            let content = if tag_name == "textarea" {
                node.form_value().unwrap_or_else(|| node.text())
            } else {
                node.text()
            };
            document.push(Segment::Span(Span::raw(content)));
            paragraph_break(document, state);
        }

        tag if is_block_tag(tag) => {
            if state.group_with_next {
                state.group_with_next = false;
                state.pending_break = false;
            } else {
                paragraph_break(document, state);
            }
            walk_children(node, document, state, ctx);
            paragraph_break(document, state);
        }

        tag => {
            if let Some(level) = heading_level(tag) {
                block_break(document, state, BlockKind::Heading(level));
                walk_children(node, document, state, ctx);
                paragraph_break(document, state);
            } else {
                walk_children(node, document, state, ctx);
            }
        }
    }
}

fn walk_children<N, G>(node: &N, document: &mut Document, state: &mut TraversalState, ctx: &Context<'_, '_, G>)
where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    for child in node.children() {
        walk_node(&child, document, state, ctx);
    }
}

/// Walk the children of a container whose block is already open, so the
/// first nested block joins it instead of leaving an empty prefix behind.
fn walk_flow<N, G>(node: &N, document: &mut Document, state: &mut TraversalState, ctx: &Context<'_, '_, G>)
where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    state.group_with_next = true;
    walk_children(node, document, state, ctx);
    state.group_with_next = false;
    paragraph_break(document, state);
}

fn walk_emphasis<N, G>(
    node: &N,
    marker: &'static str,
    document: &mut Document,
    state: &mut TraversalState,
    ctx: &Context<'_, '_, G>,
) where
    N: MarkupNode,
    G: Geometry<N> + ?Sized,
{
    if !text::is_present(&node.text()) {
        return;
    }
    document.push(Segment::Span(Span::raw(marker)));
    walk_children(node, document, state, ctx);
    document.push(Segment::Span(Span::raw(marker)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::testing::{RecordingLayout, StoredLayout, TestNode};

    fn el(tag: &str, children: Vec<TestNode>) -> TestNode {
        TestNode::el(tag, children)
    }

    fn text(data: &str) -> TestNode {
        TestNode::text(data)
    }

    fn md(node: TestNode) -> String {
        convert(Input::Node(node), &ConversionOptions::default()).unwrap()
    }

    fn md_with(node: TestNode, options: &ConversionOptions) -> String {
        convert(Input::Node(node), options).unwrap()
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn test_heading_then_paragraph() {
        let root = el("div", vec![el("h2", vec![text("Title")]), el("p", vec![text("Body")])]);
        assert_eq!(md(root), "## Title\n\nBody");
    }

    #[test]
    fn test_single_br_is_a_newline() {
        let root = el("p", vec![text("a"), el("br", vec![]), text("b")]);
        assert_eq!(md(root), "a\nb");
    }

    #[test]
    fn test_double_br_is_a_paragraph_break() {
        let root = el("p", vec![text("a"), el("br", vec![]), el("br", vec![]), text("b")]);
        assert_eq!(md(root), "a\n\nb");
    }

    #[test]
    fn test_whitespace_between_brs_keeps_them_consecutive() {
        let root = el("p", vec![text("a"), el("br", vec![]), text("\n"), el("br", vec![]), text("b")]);
        assert_eq!(md(root), "a\n\nb");
    }

    #[test]
    fn test_trailing_br_is_dropped_at_boundary() {
        let root = el("div", vec![el("p", vec![text("a"), el("br", vec![])]), el("p", vec![text("b")])]);
        assert_eq!(md(root), "a\n\nb");
    }

    #[test]
    fn test_br_before_block_is_dropped() {
        let root = el("div", vec![text("a"), el("br", vec![]), el("p", vec![text("b")])]);
        assert_eq!(md(root), "a\n\nb");

        let root = el("div", vec![text("a"), el("br", vec![]), el("h2", vec![text("b")])]);
        assert_eq!(md(root), "a\n\n## b");

        let root = el(
            "div",
            vec![text("a"), el("br", vec![]), el("ul", vec![el("li", vec![text("b")])])],
        );
        assert_eq!(md(root), "a\n\n* b");
    }

    #[test]
    fn test_br_before_inline_element_is_kept() {
        let root = el("p", vec![text("a"), el("br", vec![]), el("b", vec![text("b")])]);
        assert_eq!(md(root), "a\n**b**");
    }

    #[test]
    fn test_unordered_list() {
        let root = el("ul", vec![el("li", vec![text("a")]), el("li", vec![text("b")])]);
        assert_eq!(md(root), "* a\n* b");
    }

    #[test]
    fn test_unordered_list_followed_by_paragraph() {
        let root = el(
            "div",
            vec![
                el("ul", vec![el("li", vec![text("a")]), el("li", vec![text("b")])]),
                el("p", vec![text("after")]),
            ],
        );
        assert_eq!(md(root), "* a\n* b\n\nafter");
    }

    #[test]
    fn test_ordered_list_ignores_start_attribute() {
        let root = TestNode::el_attrs(
            "ol",
            &[("start", "7")],
            vec![
                text("\n"),
                TestNode::el_attrs("li", &[("value", "9")], vec![text("x")]),
                text("\n"),
                el("li", vec![text("y")]),
            ],
        );
        assert_eq!(md(root), "1. x\n2. y");
    }

    #[test]
    fn test_list_item_paragraph_joins_prefix() {
        let root = el("ul", vec![el("li", vec![el("p", vec![text("para")])])]);
        assert_eq!(md(root), "* para");
    }

    #[test]
    fn test_definition_list() {
        let root = el(
            "dl",
            vec![
                el("dt", vec![text("Term")]),
                el("dd", vec![text("First")]),
                el("dd", vec![text("Second")]),
            ],
        );
        assert_eq!(md(root), "Term:\nFirst\nSecond");
    }

    #[test]
    fn test_blockquote() {
        let root = el(
            "div",
            vec![
                el("p", vec![text("before")]),
                el("blockquote", vec![el("p", vec![text("one")]), el("p", vec![text("two")])]),
                text("after"),
            ],
        );
        assert_eq!(md(root), "before\n\n> one\n\n> two\n\nafter");
    }

    #[test]
    fn test_nested_blockquote_restores_outer_state() {
        let root = el(
            "blockquote",
            vec![el("blockquote", vec![text("inner")]), text("outer")],
        );
        assert_eq!(md(root), "> inner\n\n> outer");
    }

    #[test]
    fn test_emphasis() {
        let root = el(
            "p",
            vec![
                el("b", vec![text("bold")]),
                text(" and "),
                el("em", vec![text("it")]),
                el("strong", vec![text("  ")]),
            ],
        );
        assert_eq!(md(root), "**bold** and *it*");
    }

    #[test]
    fn test_text_is_escaped() {
        let root = el("p", vec![text("2 * 3 = [x]_y")]);
        assert_eq!(md(root), "2 \\* 3 = \\[x]\\_y");
    }

    #[test]
    fn test_links() {
        let root = el(
            "p",
            vec![TestNode::el_attrs("a", &[("href", "http://e.com")], vec![text("t")])],
        );
        assert_eq!(md(root.clone()), "[t](http://e.com)");
        assert_eq!(md_with(root, &ConversionOptions::default().with_links(false)), "t");
    }

    #[test]
    fn test_link_around_block_content_is_transparent() {
        let root = TestNode::el_attrs("a", &[("href", "/post")], vec![el("h3", vec![text("Post")])]);
        assert_eq!(md(root), "### Post");
    }

    #[test]
    fn test_blank_link_is_skipped() {
        let root = el(
            "p",
            vec![
                text("x"),
                TestNode::el_attrs("a", &[("href", "/")], vec![TestNode::el_attrs("img", &[("src", "i.png")], vec![])]),
            ],
        );
        assert_eq!(md(root), "x");
    }

    #[test]
    fn test_images() {
        let root = el(
            "p",
            vec![TestNode::el_attrs(
                "img",
                &[("src", "http://e.com/a_b.png"), ("alt", "an *alt*")],
                vec![],
            )],
        );
        assert_eq!(md(root.clone()), "![an \\*alt\\*](http://e.com/a_b.png)");
        assert_eq!(md_with(root, &ConversionOptions::default().with_images(false)), "");
    }

    #[test]
    fn test_preformatted() {
        let root = el(
            "div",
            vec![
                el("pre", vec![text("line  one\nline two\n\n\nnext   para")]),
                el("p", vec![text("after")]),
            ],
        );
        assert_eq!(md(root), "line one line two\n\nnext para\n\nafter");
    }

    #[test]
    fn test_textarea_uses_text_when_no_form_value() {
        let root = el("form", vec![el("textarea", vec![text("typed\n\nvalue")])]);
        assert_eq!(md(root), "typed\n\nvalue");
    }

    #[test]
    fn test_non_content_tags_are_skipped() {
        let root = el(
            "html",
            vec![
                el("head", vec![el("title", vec![text("Title")])]),
                el(
                    "body",
                    vec![
                        el("script", vec![text("var x = 1;")]),
                        el("style", vec![text("p {}")]),
                        el("noscript", vec![text("enable js")]),
                        TestNode::comment("note"),
                        text("content"),
                    ],
                ),
            ],
        );
        assert_eq!(md(root), "content");
    }

    #[test]
    fn test_excluded_selectors() {
        let root = el(
            "body",
            vec![
                TestNode::el_attrs("nav", &[("class", "menu")], vec![text("menu")]),
                el("p", vec![text("kept")]),
            ],
        );
        let options = ConversionOptions::default().exclude(".menu");
        assert_eq!(md_with(root, &options), "kept");
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let options = ConversionOptions::default().exclude("p:first-child");
        let err = convert(Input::Node(el("p", vec![])), &options).unwrap_err();
        assert!(matches!(err, crate::ConversionError::InvalidSelector { .. }));
    }

    #[test]
    fn test_inline_elements_flatten() {
        let root = el("p", vec![el("span", vec![text("a "), el("code", vec![text("b")])]), text(" c")]);
        assert_eq!(md(root), "a b c");
    }

    #[test]
    fn test_multiple_roots() {
        let nodes = vec![el("span", vec![text("one")]), el("span", vec![text("two")])];
        let markdown = convert(Input::Nodes(nodes), &ConversionOptions::default()).unwrap();
        assert_eq!(markdown, "one\n\ntwo");
    }

    #[test]
    fn test_document_input_is_unwrapped() {
        let doc = TestNode::document(vec![el("html", vec![el("body", vec![el("h1", vec![text("Hi")])])])]);
        let markdown = convert(Input::Document(doc), &ConversionOptions::default()).unwrap();
        assert_eq!(markdown, "# Hi");
    }

    fn layout_page() -> (TestNode, TestNode) {
        let hidden = el("div", vec![el("p", vec![text("secret")])]);
        hidden.set_layout(BoxExtent::default(), Rect::default(), (0.0, 0.0));
        let body = el("body", vec![hidden.clone(), el("p", vec![text("shown")])]);
        body.set_layout(
            BoxExtent {
                width: 800.0,
                height: 600.0,
                client_rects: 1,
            },
            Rect::new(0.0, 0.0, 800.0, 600.0),
            (800.0, 600.0),
        );
        (body, hidden)
    }

    #[test]
    fn test_hidden_elements_are_excluded() {
        let (body, _) = layout_page();
        let markdown = convert_with_geometry(Input::Node(body), &ConversionOptions::default(), &StoredLayout).unwrap();
        assert_eq!(markdown, "shown");
    }

    #[test]
    fn test_hidden_subtree_is_not_visited() {
        let (body, hidden) = layout_page();
        let nested = hidden.child(0);
        let shown = body.child(1);
        let layout = RecordingLayout::default();

        let markdown = convert_with_geometry(Input::Node(body), &ConversionOptions::default(), &layout).unwrap();
        assert_eq!(markdown, "shown");
        assert!(layout.queried_extent_of(&hidden));
        assert!(layout.queried_extent_of(&shown));
        assert!(!layout.queried_extent_of(&nested));
        // body, div, two p: each scanned once for page bounds.
        assert_eq!(layout.scroll_queries.get(), 4);
    }

    #[test]
    fn test_page_bounds_scanned_once_per_call() {
        let (body, _) = layout_page();
        let layout = RecordingLayout::default();
        let roots = vec![body.clone(), body];
        convert_with_geometry(Input::Nodes(roots), &ConversionOptions::default(), &layout).unwrap();
        assert_eq!(layout.scroll_queries.get(), 8);

        layout.scroll_queries.set(0);
        let options = ConversionOptions::default().with_exclude_hidden(false);
        let (body, _) = layout_page();
        convert_with_geometry(Input::Node(body), &options, &layout).unwrap();
        assert_eq!(layout.scroll_queries.get(), 0);
    }

    #[test]
    fn test_offscreen_elements_are_excluded() {
        let offscreen = el("p", vec![text("far away")]);
        offscreen.set_layout(
            BoxExtent {
                width: 100.0,
                height: 20.0,
                client_rects: 1,
            },
            Rect::new(-5000.0, 0.0, 100.0, 20.0),
            (100.0, 20.0),
        );
        let (body, _) = layout_page();
        let root = el("main", vec![offscreen, body]);
        let markdown = convert_with_geometry(Input::Node(root), &ConversionOptions::default(), &StoredLayout).unwrap();
        assert_eq!(markdown, "shown");
    }

    #[test]
    fn test_exclude_hidden_disabled() {
        let (body, _) = layout_page();
        let options = ConversionOptions::default().with_exclude_hidden(false);
        let markdown = convert_with_geometry(Input::Node(body), &options, &StoredLayout).unwrap();
        assert_eq!(markdown, "secret\n\nshown");
    }

    #[test]
    fn test_without_geometry_everything_is_visible() {
        let (body, _) = layout_page();
        assert_eq!(md(body), "secret\n\nshown");
    }
}
