//! Viewport controller
//!
//! Owns the viewer state for one document session: the page source, the
//! current page, the scroll position and the single live page surface.
//! It is driven synchronously by the frame loop through [`Viewer::update`]
//! and [`Viewer::draw`] and never calls back into it.
//!
//! Any transition into rendering (session start, page change, resize)
//! releases the previous surface first. A failed render therefore leaves
//! the viewport empty with a diagnostic instead of showing a stale page.

use log::{debug, error, info, warn};

use crate::pdf::PageSource;

use super::config::ViewerConfig;
use super::fit;
use super::input::{Action, FrameInput};
use super::phase::{ViewError, ViewPhase};
use super::scroll::Scroll;
use super::state::{Command, Effect, NavState, Viewport};
use super::surface::{Graphics, PageSurface, PixelPoint, PixelRect, TextTone};

/// Where the fallback diagnostic goes, relative to the top-left corner
const DIAGNOSTIC_TITLE_AT: PixelPoint = PixelPoint::new(10.0, 50.0);
const DIAGNOSTIC_DETAIL_AT: PixelPoint = PixelPoint::new(10.0, 80.0);

pub struct Viewer<S: PageSource> {
    source: S,
    config: ViewerConfig,
    nav: NavState,
    viewport: Viewport,
    scroll: Scroll,
    phase: ViewPhase,
}

impl<S: PageSource> Viewer<S> {
    /// Create a viewer with nothing rendered yet
    #[must_use]
    pub fn new(source: S, viewport: Viewport, config: ViewerConfig) -> Self {
        let nav = NavState::new(source.page_count());
        Self {
            source,
            config,
            nav,
            viewport,
            scroll: Scroll::default(),
            phase: ViewPhase::Empty,
        }
    }

    /// Create a viewer and render the first page
    pub fn start<G: Graphics + ?Sized>(
        source: S,
        viewport: Viewport,
        config: ViewerConfig,
        gfx: &mut G,
    ) -> Self {
        let mut viewer = Self::new(source, viewport, config);
        viewer.render_current_page(gfx);
        viewer
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.nav.current_page
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.nav.page_count
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Scroll offset currently drawn
    #[must_use]
    pub fn scroll_y(&self) -> f32 {
        self.scroll.position
    }

    /// Scroll offset the drawn position is moving toward
    #[must_use]
    pub fn target_scroll_y(&self) -> f32 {
        self.scroll.target
    }

    #[must_use]
    pub fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    /// Whether a surface for the current page is on display
    #[must_use]
    pub fn page_rendered(&self) -> bool {
        self.phase
            .surface()
            .is_some_and(|surface| surface.page == self.nav.current_page)
    }

    #[must_use]
    pub fn surface(&self) -> Option<&PageSurface> {
        self.phase.surface()
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Largest valid scroll offset for the current surface and viewport
    #[must_use]
    pub fn max_scroll(&self) -> f32 {
        let surface_height = self.phase.surface().map_or(0.0, |s| s.height as f32);
        Scroll::max_offset(surface_height, self.viewport.height as f32)
    }

    /// Advance one frame: resize, scroll and navigation input, smoothing
    pub fn update<G: Graphics + ?Sized>(
        &mut self,
        input: &FrameInput,
        frame_time: f32,
        gfx: &mut G,
    ) {
        if let Some(viewport) = input.resized {
            self.resize(viewport, gfx);
        }

        let max = self.max_scroll();
        if input.wheel != 0.0 {
            self.scroll.nudge(-input.wheel * self.config.wheel_step, max);
        }

        let key_step = self.config.key_scroll_speed * frame_time;
        if input.scroll_up_held {
            self.scroll.nudge(-key_step, max);
        }
        if input.scroll_down_held {
            self.scroll.nudge(key_step, max);
        }

        let page_step = self.viewport.height as f32 * self.config.page_step;
        for action in &input.actions {
            // A page change earlier in the same frame alters the bound
            let max = self.max_scroll();
            match *action {
                Action::PageUp => self.scroll.nudge(-page_step, max),
                Action::PageDown => self.scroll.nudge(page_step, max),
                Action::ScrollToTop => self.scroll.reset_target(),
                Action::Navigate(cmd) => self.navigate(cmd, gfx),
            }
        }

        self.scroll.settle(self.config.smoothing_rate, frame_time);
    }

    /// Apply a single page command outside of a frame update
    pub fn navigate<G: Graphics + ?Sized>(&mut self, cmd: Command, gfx: &mut G) {
        let effects = self.nav.apply(cmd);
        self.execute_effects(effects, gfx);
    }

    fn execute_effects<G: Graphics + ?Sized>(&mut self, effects: Vec<Effect>, gfx: &mut G) {
        let mut render = false;
        for effect in effects {
            match effect {
                Effect::ResetScroll => self.scroll.reset(),
                Effect::RenderCurrentPage => render = true,
            }
        }
        if render {
            self.render_current_page(gfx);
        }
    }

    /// Track a new viewport size and re-fit the current page to it
    pub fn resize<G: Graphics + ?Sized>(&mut self, viewport: Viewport, gfx: &mut G) {
        if viewport == self.viewport {
            return;
        }
        debug!(
            "Viewport resized {}x{} -> {}x{}",
            self.viewport.width, self.viewport.height, viewport.width, viewport.height
        );
        self.viewport = viewport;
        self.render_current_page(gfx);
    }

    /// Rasterize the current page to fit the viewport width and replace the
    /// page surface with it
    pub fn render_current_page<G: Graphics + ?Sized>(&mut self, gfx: &mut G) {
        if let ViewPhase::Displaying(old) = std::mem::replace(&mut self.phase, ViewPhase::Rendering)
        {
            debug!("Releasing surface {} (page {})", old.id.get(), old.page);
            old.release(gfx);
        }

        let page = self.nav.current_page;
        self.phase = match self.build_surface(page, gfx) {
            Ok(surface) => {
                info!(
                    "Page {}/{} ready: {}x{}",
                    page + 1,
                    self.nav.page_count,
                    surface.width,
                    surface.height
                );
                ViewPhase::Displaying(surface)
            }
            Err(err) => {
                error!("Failed to render page {}: {err}", page + 1);
                ViewPhase::Failed(err)
            }
        };

        self.scroll.clamp_to(self.max_scroll());
    }

    fn build_surface<G: Graphics + ?Sized>(
        &mut self,
        page: usize,
        gfx: &mut G,
    ) -> Result<PageSurface, ViewError> {
        let raster = fit::render_fitted(
            &mut self.source,
            page,
            self.viewport.width,
            self.config.horizontal_padding,
        )?;
        Ok(PageSurface::create(gfx, &raster, page)?)
    }

    /// Draw the page, or a diagnostic when there is none
    pub fn draw<G: Graphics + ?Sized>(&self, gfx: &mut G) {
        if let Some(surface) = self.phase.surface() {
            let at = PixelPoint::new(self.config.margin, self.config.margin - self.scroll.position);
            gfx.draw_surface(surface.id, at);
            gfx.draw_outline(
                PixelRect {
                    x: at.x,
                    y: at.y,
                    width: surface.width as f32,
                    height: surface.height as f32,
                },
                self.config.border_thickness,
            );
            return;
        }

        gfx.draw_text(DIAGNOSTIC_TITLE_AT, "PDF page not rendered", TextTone::Error);
        let detail = match self.phase.error() {
            Some(err) => format!(
                "Page {}/{}: {err}",
                self.nav.current_page + 1,
                self.nav.page_count
            ),
            None => format!(
                "Page {}/{}: {}",
                self.nav.current_page + 1,
                self.nav.page_count,
                self.phase.label()
            ),
        };
        gfx.draw_text(DIAGNOSTIC_DETAIL_AT, &detail, TextTone::Normal);
    }

    /// End the session: release the surface, then drop the page source
    pub fn shutdown<G: Graphics + ?Sized>(mut self, gfx: &mut G) {
        self.release_surface(gfx);
    }

    fn release_surface<G: Graphics + ?Sized>(&mut self, gfx: &mut G) {
        if let ViewPhase::Displaying(surface) = std::mem::take(&mut self.phase) {
            debug!("Releasing surface {} on shutdown", surface.id.get());
            surface.release(gfx);
        }
    }
}

impl<S: PageSource> Drop for Viewer<S> {
    fn drop(&mut self) {
        if let Some(surface) = self.phase.surface() {
            warn!(
                "Viewer dropped while surface {} is live; call shutdown first",
                surface.id.get()
            );
        }
    }
}
