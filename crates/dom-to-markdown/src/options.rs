//! Configuration for a conversion call.

/// Options recognised by [`convert`](crate::convert) and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Render `<img>` elements as Markdown images.
    pub images: bool,
    /// Render `<a>` elements as Markdown links.
    pub links: bool,
    /// Drop elements the visibility oracle reports as hidden.
    ///
    /// Only meaningful when a [`Geometry`](crate::Geometry) backs the tree.
    pub exclude_hidden: bool,
    /// Selectors whose matching elements are skipped with their subtree.
    pub exclude: Vec<String>,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            images: true,
            links: true,
            exclude_hidden: true,
            exclude: Vec::new(),
        }
    }
}

impl ConversionOptions {
    /// Enable or disable image output.
    #[must_use]
    pub fn with_images(mut self, images: bool) -> Self {
        self.images = images;
        self
    }

    /// Enable or disable link output.
    #[must_use]
    pub fn with_links(mut self, links: bool) -> Self {
        self.links = links;
        self
    }

    /// Enable or disable geometry-based filtering of hidden elements.
    #[must_use]
    pub fn with_exclude_hidden(mut self, exclude_hidden: bool) -> Self {
        self.exclude_hidden = exclude_hidden;
        self
    }

    /// Add a selector to the exclusion list.
    #[must_use]
    pub fn exclude(mut self, selector: impl Into<String>) -> Self {
        self.exclude.push(selector.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ConversionOptions::default();
        assert!(options.images);
        assert!(options.links);
        assert!(options.exclude_hidden);
        assert!(options.exclude.is_empty());
    }

    #[test]
    fn test_builder_setters() {
        let options = ConversionOptions::default()
            .with_images(false)
            .with_links(false)
            .with_exclude_hidden(false)
            .exclude("nav")
            .exclude(".ad");
        assert!(!options.images);
        assert!(!options.links);
        assert!(!options.exclude_hidden);
        assert_eq!(options.exclude, vec!["nav".to_string(), ".ad".to_string()]);
    }
}
