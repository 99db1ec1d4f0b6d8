//! Document model types: page geometry, theme tokens and pagination output.

mod geometry;
mod pages;
mod theme;

pub use geometry::{PageFormat, PageGeometry};
pub use pages::Pagination;
pub use theme::ThemeTokens;
