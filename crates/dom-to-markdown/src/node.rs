//! Read-only view over an external markup tree.
//!
//! The converter never parses HTML itself; it consumes whatever tree the
//! host's DOM library produced through [`MarkupNode`]. An implementation for
//! `markup5ever_rcdom` lives in [`crate::rcdom`].

use std::borrow::Cow;

/// Coarse classification of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// The document wrapper that owns the root element.
    Document,
    /// An element such as `<p>`.
    Element,
    /// A run of character data.
    Text,
    /// An HTML comment.
    Comment,
    /// Doctypes, processing instructions and anything else.
    Other,
}

/// A node of an external tree, consumed read-only.
///
/// Handles are expected to be cheap to clone (reference counted or indices).
pub trait MarkupNode: Clone {
    /// Which kind of node this is.
    fn kind(&self) -> NodeKind;

    /// Lower-case local tag name; `None` for anything but elements.
    fn tag_name(&self) -> Option<Cow<'_, str>>;

    /// Child nodes in document order.
    fn children(&self) -> Vec<Self>;

    /// The parent node, if attached.
    fn parent(&self) -> Option<Self>;

    /// Character data of a text node, or the concatenated descendant text of
    /// an element or document.
    fn text(&self) -> String;

    /// Value of the named attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Identity comparison.
    fn same_node(&self, other: &Self) -> bool;

    /// Literal value of a form control such as `<textarea>`.
    ///
    /// Trees without live form state return `None` and callers fall back to
    /// the element's text.
    fn form_value(&self) -> Option<String> {
        None
    }

    /// Whether this is an element with the given (lower-case) tag name.
    fn is_tag(&self, name: &str) -> bool {
        self.tag_name().is_some_and(|tag| tag == name)
    }

    /// Unwrap a document to its root element; other nodes are returned as-is.
    fn document_element(&self) -> Option<Self> {
        match self.kind() {
            NodeKind::Document => self
                .children()
                .into_iter()
                .find(|child| child.kind() == NodeKind::Element),
            _ => Some(self.clone()),
        }
    }

    /// The first element following this node among its parent's children.
    fn next_element_sibling(&self) -> Option<Self> {
        let parent = self.parent()?;
        parent
            .children()
            .into_iter()
            .skip_while(|sibling| !sibling.same_node(self))
            .skip(1)
            .find(|sibling| sibling.kind() == NodeKind::Element)
    }

    /// Number of elements preceding this node among its parent's children.
    fn preceding_element_siblings(&self) -> usize {
        let Some(parent) = self.parent() else {
            return 0;
        };
        parent
            .children()
            .into_iter()
            .take_while(|sibling| !sibling.same_node(self))
            .filter(|sibling| sibling.kind() == NodeKind::Element)
            .count()
    }

    /// Whether any descendant element satisfies `predicate`.
    fn has_descendant<F>(&self, predicate: &F) -> bool
    where
        F: Fn(&Self) -> bool,
    {
        self.children().iter().any(|child| {
            (child.kind() == NodeKind::Element && predicate(child)) || child.has_descendant(predicate)
        })
    }
}

/// What a conversion call operates on.
#[derive(Debug, Clone)]
pub enum Input<N> {
    /// A single node; a document node is unwrapped to its root element.
    Node(N),
    /// Several nodes, converted in order.
    Nodes(Vec<N>),
    /// A document wrapper, unwrapped to its root element.
    Document(N),
}

impl<N: MarkupNode> Input<N> {
    /// Resolve to the ordered list of nodes the traversal starts from.
    pub fn into_roots(self) -> Vec<N> {
        match self {
            Self::Node(node) | Self::Document(node) => node.document_element().into_iter().collect(),
            Self::Nodes(nodes) => nodes,
        }
    }
}

impl<N: MarkupNode> From<N> for Input<N> {
    fn from(node: N) -> Self {
        Self::Node(node)
    }
}

impl<N: MarkupNode> From<Vec<N>> for Input<N> {
    fn from(nodes: Vec<N>) -> Self {
        Self::Nodes(nodes)
    }
}
