//! Live preview session.
//!
//! A session re-paginates only when its input actually changed, and drops
//! results computed against input that has since been superseded. Resizing the
//! viewport only recomputes the display scale.

use crate::measure::MeasurementSurface;
use crate::model::{PageFormat, Pagination};
use crate::paginate::{PageInput, Paginator};
use crate::scale::{resolve_scale, ScaleConstraints};

/// Identifies one requested pagination run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    fingerprint: u64,
    format: PageFormat,
}

impl Ticket {
    /// Fingerprint of the input this ticket was issued for.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

/// Preview state for one document view.
pub struct PreviewSession<S: MeasurementSurface> {
    paginator: Paginator<S>,
    constraints: ScaleConstraints,
    generation: u64,
    latest: Option<u64>,
    committed: Option<(u64, u64)>,
    pagination: Pagination,
    format: PageFormat,
    viewport: Option<(f32, Option<f32>)>,
    scale: f32,
}

impl<S: MeasurementSurface> PreviewSession<S> {
    /// Create a session measuring on `surface`.
    pub fn new(surface: S) -> Self {
        let constraints = ScaleConstraints::default();
        Self {
            paginator: Paginator::new(surface),
            scale: constraints.max_scale,
            constraints,
            generation: 0,
            latest: None,
            committed: None,
            pagination: Pagination::empty(),
            format: PageFormat::default(),
            viewport: None,
        }
    }

    /// Set the scale constraints.
    pub fn with_constraints(mut self, constraints: ScaleConstraints) -> Self {
        self.constraints = constraints;
        self.refresh_scale();
        self
    }

    /// Announce a new input. Any ticket issued earlier becomes stale.
    pub fn begin(&mut self, input: &PageInput) -> Ticket {
        self.generation += 1;
        self.latest = Some(self.generation);
        Ticket {
            generation: self.generation,
            fingerprint: input.fingerprint(),
            format: input.format,
        }
    }

    /// Publish `pagination` computed for `ticket`.
    ///
    /// Returns `false`, leaving the published pages untouched, if a newer
    /// input was announced after `ticket` was issued.
    pub fn commit(&mut self, ticket: Ticket, pagination: Pagination) -> bool {
        if self.latest != Some(ticket.generation) {
            log::debug!(
                "discarding stale pagination (generation {}, latest {:?})",
                ticket.generation,
                self.latest
            );
            return false;
        }
        self.committed = Some((ticket.generation, ticket.fingerprint));
        self.pagination = pagination;
        if self.format != ticket.format {
            self.format = ticket.format;
            self.refresh_scale();
        }
        true
    }

    /// Bring the published pages up to date with `input`.
    ///
    /// Pagination runs only when `input` differs from the last committed
    /// input or a newer input has been announced since.
    pub fn update(&mut self, input: &PageInput) -> &Pagination {
        if let Some((generation, fingerprint)) = self.committed {
            if self.latest == Some(generation) && fingerprint == input.fingerprint() {
                return &self.pagination;
            }
        }
        let ticket = self.begin(input);
        let pagination = self.paginator.paginate(input);
        self.commit(ticket, pagination);
        &self.pagination
    }

    /// Currently published pages.
    pub fn pages(&self) -> &Pagination {
        &self.pagination
    }

    /// Record a new viewport size and return the resulting display scale.
    pub fn resize(&mut self, width: f32, height: Option<f32>) -> f32 {
        self.viewport = Some((width, height));
        self.refresh_scale();
        self.scale
    }

    /// Current display scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Page format of the published pages.
    pub fn format(&self) -> PageFormat {
        self.format
    }

    fn refresh_scale(&mut self) {
        if let Some((width, height)) = self.viewport {
            self.scale = resolve_scale(width, height, &self.format.geometry(), &self.constraints);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::measure::SurfaceSpec;

    #[derive(Default)]
    struct CountingSurface {
        mounted: bool,
        mounts: usize,
    }

    impl MeasurementSurface for CountingSurface {
        fn mount(&mut self, _spec: &SurfaceSpec) -> Result<()> {
            self.mounted = true;
            self.mounts += 1;
            Ok(())
        }

        fn measure(&mut self, _html: &str) -> Result<f32> {
            Ok(10.0)
        }

        fn unmount(&mut self) {
            self.mounted = false;
        }

        fn is_mounted(&self) -> bool {
            self.mounted
        }
    }

    #[test]
    fn test_unchanged_input_is_not_repaginated() {
        let mut session = PreviewSession::new(CountingSurface::default());
        let input = PageInput::new("<p>a</p>");
        assert_eq!(session.update(&input).page_count(), 1);
        session.update(&input);
        assert_eq!(session.paginator.surface().mounts, 1);

        session.update(&input.clone().with_format(PageFormat::Letter));
        assert_eq!(session.paginator.surface().mounts, 2);
        assert_eq!(session.format(), PageFormat::Letter);
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let mut session = PreviewSession::new(CountingSurface::default());
        let old = session.begin(&PageInput::new("<p>old</p>"));
        let new = session.begin(&PageInput::new("<p>new</p>"));

        assert!(session.commit(new, Pagination::single("<p>new</p>")));
        assert!(!session.commit(old, Pagination::single("<p>old</p>")));
        assert_eq!(session.pages().pages, vec!["<p>new</p>".to_string()]);
    }

    #[test]
    fn test_resize_only_rescales() {
        let mut session = PreviewSession::new(CountingSurface::default());
        session.update(&PageInput::new("<p>a</p>"));
        let scale = session.resize(397.0, None);
        assert!((scale - 0.5).abs() < 1e-6);
        assert_eq!(session.paginator.surface().mounts, 1);

        let mut thumb = PreviewSession::new(CountingSurface::default())
            .with_constraints(ScaleConstraints::thumbnail());
        assert!((thumb.resize(794.0, Some(112.3)) - 0.2).abs() < 1e-6);
    }
}
