//! Geometry-based visibility filtering.
//!
//! Layout is never computed here. A host whose tree is backed by a real
//! layout engine supplies a [`Geometry`]; the [`VisibilityOracle`] turns those
//! measurements into a hidden/visible verdict.

use tracing::debug;

use crate::node::{MarkupNode, NodeKind};

/// An axis-aligned rectangle in page coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Rect {
    /// Build a rectangle from its top-left corner and size.
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether the two rectangles overlap on both axes.
    ///
    /// Rectangles that merely touch do not intersect.
    pub fn intersects(&self, other: &Self) -> bool {
        self.left < other.right() && other.left < self.right() && self.top < other.bottom() && other.top < self.bottom()
    }
}

/// Box measurements of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxExtent {
    /// Layout width (e.g. `offsetWidth`).
    pub width: f64,
    /// Layout height (e.g. `offsetHeight`).
    pub height: f64,
    /// Number of client rects the element produces.
    pub client_rects: usize,
}

impl BoxExtent {
    /// An element with no width, no height and no client rects takes no space.
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0 && self.client_rects == 0
    }
}

/// Layout queries supplied by a layout-backed host.
pub trait Geometry<N> {
    /// Box measurements of an element.
    fn box_extent(&self, node: &N) -> BoxExtent;

    /// Bounding client rectangle of an element.
    fn bounding_rect(&self, node: &N) -> Rect;

    /// Scroll width and height of an element.
    fn scroll_size(&self, node: &N) -> (f64, f64);
}

/// The rectangle used as the filtering viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds(pub Rect);

impl PageBounds {
    /// Scan every element under `roots` and build bounds from the tallest
    /// scroll extent found. Returns `None` when there are no elements.
    pub fn compute<N, G>(roots: &[N], geometry: &G) -> Option<Self>
    where
        N: MarkupNode,
        G: Geometry<N> + ?Sized,
    {
        let mut tallest: Option<(f64, f64)> = None;
        let mut stack: Vec<N> = roots.to_vec();
        while let Some(node) = stack.pop() {
            if node.kind() == NodeKind::Element {
                let (width, height) = geometry.scroll_size(&node);
                if tallest.is_none_or(|(_, best)| height > best) {
                    tallest = Some((width, height));
                }
            }
            stack.extend(node.children());
        }

        let (width, height) = tallest?;
        debug!(width, height, "computed page bounds");
        Some(Self(Rect::new(0.0, 0.0, width, height)))
    }
}

/// Decides whether an element should be dropped as invisible.
pub struct VisibilityOracle<'g, G: ?Sized> {
    geometry: &'g G,
    bounds: Option<PageBounds>,
}

impl<'g, G: ?Sized> VisibilityOracle<'g, G> {
    /// Build the oracle, computing page bounds once for the whole call.
    pub fn new<N>(roots: &[N], geometry: &'g G) -> Self
    where
        N: MarkupNode,
        G: Geometry<N>,
    {
        Self {
            geometry,
            bounds: PageBounds::compute(roots, geometry),
        }
    }

    /// The page bounds in use, if any.
    pub const fn bounds(&self) -> Option<PageBounds> {
        self.bounds
    }

    /// Whether `node` is hidden.
    ///
    /// Zero box extent means hidden without consulting the bounds; otherwise
    /// the element is visible iff its bounding rect intersects the page bounds.
    pub fn is_hidden<N>(&self, node: &N) -> bool
    where
        G: Geometry<N>,
    {
        if self.geometry.box_extent(node).is_empty() {
            return true;
        }
        match self.bounds {
            Some(PageBounds(page)) => !self.geometry.bounding_rect(node).intersects(&page),
            None => false,
        }
    }
}
