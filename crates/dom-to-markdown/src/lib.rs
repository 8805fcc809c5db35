//! Convert an HTML node tree into Markdown.
//!
//! The converter walks a read-only node tree (anything implementing
//! [`MarkupNode`]) in document order and produces Markdown that keeps the
//! semantic structure of the page: headings, lists, definition lists,
//! blockquotes, preformatted blocks, emphasis, links and images. Text is
//! escaped so that characters with Markdown meaning survive literally.
//!
//! ```
//! use dom_to_markdown::{ConversionOptions, convert_html};
//!
//! let markdown = convert_html("<h2>Title</h2><p>Some *text*</p>", &ConversionOptions::default()).unwrap();
//! assert_eq!(markdown, "## Title\n\nSome \\*text\\*");
//! ```
//!
//! Trees backed by a real layout engine can additionally supply a
//! [`Geometry`] so that invisible elements are dropped; see
//! [`convert_with_geometry`].

pub mod converter;
pub mod error;
pub mod node;
pub mod options;
pub mod rcdom;
pub mod selector;
pub mod text;
pub mod visibility;

pub use converter::{convert, convert_with_geometry};
pub use error::{ConversionError, Result};
pub use node::{Input, MarkupNode, NodeKind};
pub use options::ConversionOptions;
pub use rcdom::{convert_html, parse_html, parse_html_bytes};
pub use visibility::{BoxExtent, Geometry, PageBounds, Rect, VisibilityOracle};
