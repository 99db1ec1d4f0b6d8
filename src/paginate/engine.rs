//! Greedy, measurement-driven page breaking.

use super::fragment::split_blocks;
use super::PageInput;
use crate::error::{Error, Result};
use crate::measure::{MeasurementSurface, MountedSurface, SurfaceSpec};
use crate::model::Pagination;

/// Splits rendered content into page fragments using a measurement surface.
///
/// One paginator owns one surface; runs on the same paginator never overlap.
/// For concurrent pagination of several documents give each its own
/// paginator (see [`paginate_batch`](super::paginate_batch)).
pub struct Paginator<S: MeasurementSurface> {
    surface: S,
}

impl<S: MeasurementSurface> Paginator<S> {
    /// Create a paginator over `surface`.
    pub fn new(surface: S) -> Self {
        Self { surface }
    }

    /// Get the measurement surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Consume the paginator and return its surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Paginate `input`.
    ///
    /// Never fails: if the surface cannot measure or the markup cannot be
    /// tokenised, the result is the original markup as a single page with
    /// [`Pagination::degraded`] set. The surface is unmounted before this
    /// returns on every path.
    pub fn paginate(&mut self, input: &PageInput) -> Pagination {
        if input.html.trim().is_empty() {
            return Pagination::empty();
        }

        let geometry = input.format.geometry();
        let usable_height = geometry.usable_height(input.theme.page_padding);
        let spec = SurfaceSpec::for_page(&geometry, &input.theme, &input.author_css);

        let mut mounted = match MountedSurface::mount(&mut self.surface, &spec) {
            Ok(mounted) => mounted,
            Err(err) => return degrade(&input.html, err),
        };

        match break_pages(&mut mounted, &input.html, usable_height) {
            Ok(pagination) => {
                log::debug!(
                    "paginated into {} page(s) with {} measurement(s)",
                    pagination.page_count(),
                    mounted.measurements()
                );
                pagination
            }
            Err(err) => degrade(&input.html, err),
        }
    }
}

fn degrade(html: &str, err: Error) -> Pagination {
    log::warn!("pagination fell back to a single unsplit page: {}", err);
    Pagination::fallback(html, err.to_string())
}

fn break_pages<S: MeasurementSurface + ?Sized>(
    surface: &mut MountedSurface<'_, S>,
    html: &str,
    usable_height: f32,
) -> Result<Pagination> {
    if !(usable_height > 0.0) {
        return Err(Error::MeasurementUnavailable(format!(
            "page has no usable height ({}px)",
            usable_height
        )));
    }

    let total = surface.measure(html)?;
    if total <= usable_height {
        log::debug!("content fits one page ({} <= {})", total, usable_height);
        return Ok(Pagination::single(html));
    }

    let blocks = split_blocks(html)?;
    if blocks.units.is_empty() {
        return Ok(Pagination::single(html));
    }

    let mut pagination = Pagination::empty();
    let mut current: Vec<&str> = Vec::new();
    let mut current_height = 0.0;

    for unit in &blocks.units {
        let candidate = blocks.page(current.iter().copied().chain([unit.markup]));
        let height = surface.measure(&candidate)?;

        if height > usable_height && !current.is_empty() {
            let page = blocks.page(current.iter().copied());
            close_page(
                &mut pagination,
                &page,
                &current,
                current_height,
                usable_height,
            );
            current.clear();
            current.push(unit.markup);
            current_height = surface.measure(&blocks.page([unit.markup]))?;
        } else {
            current.push(unit.markup);
            current_height = height;
        }
    }

    if !current.is_empty() {
        let page = blocks.page(current.iter().copied());
        close_page(&mut pagination, &page, &current, current_height, usable_height);
    }

    Ok(pagination)
}

fn close_page(
    pagination: &mut Pagination,
    page: &str,
    units: &[&str],
    height: f32,
    usable_height: f32,
) {
    if units.len() == 1 && height > usable_height {
        log::debug!(
            "page {} holds one oversized element ({} > {})",
            pagination.pages.len() + 1,
            height,
            usable_height
        );
        pagination.oversized.push(pagination.pages.len());
    }
    pagination.pages.push(page.to_string());
}
