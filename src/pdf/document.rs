//! Document renderer adapter over MuPDF
//!
//! Owns one open document and one zoom setting, and turns a page index into
//! an RGB [`RasterBuffer`]. Every call rasterizes from scratch; nothing is
//! cached because only one page is ever resident.

use std::path::{Path, PathBuf};

use log::{debug, info};
use mupdf::{Colorspace, Document, Matrix, Page, Pixmap};

use super::types::{PageBounds, RasterBuffer};
use super::zoom::ZoomFactor;

/// Errors that prevent a document session from starting
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("document not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("cannot open '{}': {source}", path.display())]
    Engine {
        path: PathBuf,
        #[source]
        source: mupdf::error::Error,
    },

    #[error("'{}' has no pages", path.display())]
    NoPages { path: PathBuf },
}

/// Errors from a single page query or rasterization
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {index} out of range (0-{})", count.saturating_sub(1))]
    PageOutOfRange { index: usize, count: usize },

    #[error("PDF engine: {0}")]
    Engine(#[from] mupdf::error::Error),

    #[error("unexpected pixel format: {components} components")]
    PixelFormat { components: usize },

    #[error("cannot fit a page into a {width}x{height} box")]
    EmptyTarget { width: u32, height: u32 },

    #[error("page {index} has non-positive bounds {width}x{height}")]
    DegenerateBounds { index: usize, width: f32, height: f32 },

    #[error("{detail}")]
    Backend { detail: String },
}

impl RenderError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend { detail: msg.into() }
    }
}

/// Page rasterization contract the viewer drives.
///
/// Implemented by [`DocumentRenderer`] for real documents and by scripted
/// sources in tests.
pub trait PageSource {
    /// Number of pages, fixed when the document was opened (always >= 1)
    fn page_count(&self) -> usize;

    /// Store `zoom` clamped to the valid range; affects later renders
    fn set_zoom(&mut self, zoom: f32);

    /// Current zoom factor
    fn zoom(&self) -> ZoomFactor;

    /// Natural page size in document units
    fn page_bounds(&self, index: usize) -> Result<PageBounds, RenderError>;

    /// Rasterize page `index` at the current zoom
    fn render_page(&mut self, index: usize) -> Result<RasterBuffer, RenderError>;

    fn is_valid_page(&self, index: usize) -> bool {
        index < self.page_count()
    }

    /// Rasterize page `index` as large as fits inside `target_width` x
    /// `target_height`, keeping its aspect ratio.
    ///
    /// The scale comes from the natural bounds. The zoom in effect before
    /// the call is restored afterwards, whether or not the render succeeds.
    fn render_fit_box(
        &mut self,
        index: usize,
        target_width: u32,
        target_height: u32,
    ) -> Result<RasterBuffer, RenderError> {
        if target_width == 0 || target_height == 0 {
            return Err(RenderError::EmptyTarget {
                width: target_width,
                height: target_height,
            });
        }
        let bounds = self.page_bounds(index)?;
        if !(bounds.width > 0.0 && bounds.height > 0.0) {
            return Err(RenderError::DegenerateBounds {
                index,
                width: bounds.width,
                height: bounds.height,
            });
        }

        let scale = (target_width as f32 / bounds.width).min(target_height as f32 / bounds.height);
        let previous = self.zoom();
        self.set_zoom(scale);
        let raster = self.render_page(index);
        self.set_zoom(previous.get());
        raster
    }
}

/// MuPDF-backed page source
pub struct DocumentRenderer {
    path: PathBuf,
    doc: Document,
    page_count: usize,
    zoom: ZoomFactor,
}

impl DocumentRenderer {
    /// Open a document and count its pages
    pub fn open(path: impl AsRef<Path>) -> Result<Self, OpenError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(OpenError::NotFound { path });
        }

        debug!("Opening document {}", path.display());
        let doc = match Document::open(path.to_string_lossy().as_ref()) {
            Ok(doc) => doc,
            Err(source) => return Err(OpenError::Engine { path, source }),
        };

        let page_count = match doc.page_count() {
            Ok(count) => usize::try_from(count).unwrap_or(0),
            Err(source) => return Err(OpenError::Engine { path, source }),
        };
        if page_count == 0 {
            return Err(OpenError::NoPages { path });
        }

        info!("Opened {}: {page_count} pages", path.display());
        Ok(Self {
            path,
            doc,
            page_count,
            zoom: ZoomFactor::IDENTITY,
        })
    }

    /// Path the document was opened from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_page(&self, index: usize) -> Result<Page, RenderError> {
        let out_of_range = || RenderError::PageOutOfRange {
            index,
            count: self.page_count,
        };
        if !self.is_valid_page(index) {
            return Err(out_of_range());
        }
        let page_no = i32::try_from(index).map_err(|_| out_of_range())?;
        Ok(self.doc.load_page(page_no)?)
    }
}

impl PageSource for DocumentRenderer {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = ZoomFactor::clamped(zoom);
    }

    fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    fn page_bounds(&self, index: usize) -> Result<PageBounds, RenderError> {
        let page = self.load_page(index)?;
        let rect = page.bounds()?;
        Ok(PageBounds {
            width: rect.x1 - rect.x0,
            height: rect.y1 - rect.y0,
        })
    }

    fn render_page(&mut self, index: usize) -> Result<RasterBuffer, RenderError> {
        let page = self.load_page(index)?;
        let scale = self.zoom.get();
        let transform = Matrix::new_scale(scale, scale);
        let rgb = Colorspace::device_rgb();
        let pixmap = page.to_pixmap(&transform, &rgb, false, false)?;
        let raster = raster_from_pixmap(&pixmap)?;
        debug!(
            "Rendered page {index} at zoom {scale:.2}: {}x{} (stride {})",
            raster.width, raster.height, raster.stride
        );
        Ok(raster)
    }
}

fn raster_from_pixmap(pixmap: &Pixmap) -> Result<RasterBuffer, RenderError> {
    let components = pixmap.n() as usize;
    if components != 3 {
        return Err(RenderError::PixelFormat { components });
    }

    let width = pixmap.width();
    let height = pixmap.height();
    let stride = pixmap.stride() as usize;
    let samples = pixmap.samples();
    let needed = stride.saturating_mul(height as usize);
    if samples.len() < needed || (width as usize) * components > stride {
        return Err(RenderError::backend("Pixmap buffer size mismatch"));
    }

    Ok(RasterBuffer {
        width,
        height,
        stride,
        pixels: samples[..needed].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{RenderCall, ScriptedDocument};

    #[test]
    fn fit_box_uses_the_tighter_axis() {
        let mut doc = ScriptedDocument::new(2, 200.0, 300.0);
        let raster = doc.render_fit_box(1, 100, 100).unwrap();
        assert_eq!((raster.width, raster.height), (67, 100));

        let raster = doc.render_fit_box(1, 100, 1000).unwrap();
        assert_eq!((raster.width, raster.height), (100, 150));
    }

    #[test]
    fn fit_box_restores_previous_zoom() {
        let mut doc = ScriptedDocument::new(1, 200.0, 300.0);
        doc.set_zoom(1.5);

        doc.render_fit_box(0, 400, 300).unwrap();
        assert_eq!(doc.zoom().get(), 1.5);
        assert_eq!(doc.render_calls(), &[RenderCall { page: 0, zoom: 1.0 }]);

        // A failed render restores it too
        let mut doc = doc.failing_on(0);
        assert!(doc.render_fit_box(0, 400, 300).is_err());
        assert_eq!(doc.zoom().get(), 1.5);
    }

    #[test]
    fn fit_box_rejects_empty_target_and_degenerate_bounds() {
        let mut doc = ScriptedDocument::new(2, 200.0, 300.0).with_page_size(1, 0.0, 300.0);
        assert!(matches!(
            doc.render_fit_box(0, 0, 100),
            Err(RenderError::EmptyTarget {
                width: 0,
                height: 100
            })
        ));
        assert!(matches!(
            doc.render_fit_box(1, 100, 100),
            Err(RenderError::DegenerateBounds { index: 1, .. })
        ));
        assert!(matches!(
            doc.render_fit_box(2, 100, 100),
            Err(RenderError::PageOutOfRange { index: 2, count: 2 })
        ));
        assert!(doc.render_calls().is_empty());
    }

    #[test]
    fn valid_pages_are_below_the_count() {
        let doc = ScriptedDocument::new(3, 10.0, 10.0);
        assert!(doc.is_valid_page(0));
        assert!(doc.is_valid_page(2));
        assert!(!doc.is_valid_page(3));
    }
}
