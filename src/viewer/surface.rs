//! Drawable page surfaces and the graphics contract the viewer draws through

use std::num::NonZeroU32;

use crate::pdf::RasterBuffer;

/// Handle to a surface living in the graphics backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub NonZeroU32);

impl SurfaceId {
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// Position in viewport pixels; may lie outside the viewport
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PixelPoint {
    pub x: f32,
    pub y: f32,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in viewport pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Emphasis for diagnostic text
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextTone {
    Error,
    Normal,
}

#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    #[error("surface upload failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("raster buffer does not match its declared {width}x{height} geometry")]
    InvalidRaster { width: u32, height: u32 },

    #[error("surface ids exhausted")]
    IdsExhausted,
}

/// Drawing primitives supplied by the windowing layer.
///
/// Calls are synchronous. A surface id stays valid until passed to
/// [`Graphics::destroy_surface`], which must happen exactly once.
pub trait Graphics {
    /// Upload RGB pixels and return a handle to the new surface
    fn create_surface(&mut self, raster: &RasterBuffer) -> Result<SurfaceId, GraphicsError>;

    /// Release a surface created by this backend
    fn destroy_surface(&mut self, id: SurfaceId);

    /// Draw a surface with its top-left corner at `at`
    fn draw_surface(&mut self, id: SurfaceId, at: PixelPoint);

    /// Draw a rectangle outline
    fn draw_outline(&mut self, rect: PixelRect, thickness: f32);

    /// Draw a single line of text
    fn draw_text(&mut self, at: PixelPoint, text: &str, tone: TextTone);
}

/// The one live surface holding the current page
#[derive(Debug, PartialEq, Eq)]
pub struct PageSurface {
    pub id: SurfaceId,
    pub page: usize,
    pub width: u32,
    pub height: u32,
}

impl PageSurface {
    /// Upload `raster` and record its dimensions
    pub fn create<G: Graphics + ?Sized>(
        gfx: &mut G,
        raster: &RasterBuffer,
        page: usize,
    ) -> Result<Self, GraphicsError> {
        if !raster.is_consistent() {
            return Err(GraphicsError::InvalidRaster {
                width: raster.width,
                height: raster.height,
            });
        }
        let id = gfx.create_surface(raster)?;
        Ok(Self {
            id,
            page,
            width: raster.width,
            height: raster.height,
        })
    }

    /// Give the surface back to the backend
    pub fn release<G: Graphics + ?Sized>(self, gfx: &mut G) {
        gfx.destroy_surface(self.id);
    }
}
