//! Tree-to-Markdown conversion.
//!
//! - [`segment`]: inline spans and block kinds with their rendering rules
//! - [`render`]: folds rendered pieces into text
//! - [`document`]: the block accumulator
//! - `main`: the recursive tree walker and public entry points

pub mod document;
mod main;
pub mod render;
pub mod segment;

pub use main::{convert, convert_with_geometry};
