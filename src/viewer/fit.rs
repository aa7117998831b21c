//! Fit-to-width rasterization
//!
//! The page is rasterized twice: once at zoom 1.0 to learn its width in
//! pixels as the engine actually produces them, then at the zoom that makes
//! that width fill the viewport minus padding. Natural bounds in document
//! units are not used because they do not map 1:1 to pixels in every
//! backend.

use log::debug;

use crate::pdf::{PageSource, RasterBuffer};

use super::phase::ViewError;

/// Zoom that maps `natural_width` pixels onto `viewport_width - padding`
pub fn fit_zoom(viewport_width: u32, padding: f32, natural_width: u32) -> Result<f32, ViewError> {
    if natural_width == 0 {
        return Err(ViewError::DegenerateWidth { natural_width });
    }
    Ok((viewport_width as f32 - padding) / natural_width as f32)
}

/// Rasterize `page` so its width fits the viewport
pub fn render_fitted<S: PageSource + ?Sized>(
    source: &mut S,
    page: usize,
    viewport_width: u32,
    padding: f32,
) -> Result<RasterBuffer, ViewError> {
    source.set_zoom(1.0);
    let natural_width = {
        let probe = source.render_page(page)?;
        debug!("Page {page} natural size: {}x{}", probe.width, probe.height);
        probe.width
    };

    let zoom = fit_zoom(viewport_width, padding, natural_width)?;
    source.set_zoom(zoom);
    debug!("Fit zoom for page {page}: {zoom:.3} (applied {:.3})", source.zoom().get());

    Ok(source.render_page(page)?)
}
