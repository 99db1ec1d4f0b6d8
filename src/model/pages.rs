//! Pagination output types.

use serde::{Deserialize, Serialize};

/// Ordered page fragments produced by one pagination run.
///
/// Each entry of `pages` is the exact markup belonging on one physical page.
/// An empty `pages` list means the input had no content; callers render an
/// empty-state view instead of pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page content fragments in reading order
    pub pages: Vec<String>,

    /// Indices of pages holding a single element taller than the usable height
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub oversized: Vec<usize>,

    /// Diagnostic recorded when the run fell back to a single unsplit page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degraded: Option<String>,
}

impl Pagination {
    /// Result for empty input.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single page holding `html` unchanged.
    pub fn single(html: impl Into<String>) -> Self {
        Self {
            pages: vec![html.into()],
            oversized: Vec::new(),
            degraded: None,
        }
    }

    /// The unsplit fallback page, carrying the reason it was taken.
    pub fn fallback(html: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            pages: vec![html.into()],
            oversized: Vec::new(),
            degraded: Some(reason.into()),
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Check if there are no pages (empty input).
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Check if the run degraded to the unsplit fallback.
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Get a page by index (0-indexed).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.pages.get(index).map(String::as_str)
    }

    /// Iterate over the page fragments.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(String::as_str)
    }

    /// Consume the result and return the page fragments.
    pub fn into_pages(self) -> Vec<String> {
        self.pages
    }
}
