//! Test doubles for the viewer's two collaborators, plus a tiny PDF writer
//! for exercising the MuPDF adapter against real files.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::io::Write;
use std::num::NonZeroU32;
use std::path::Path;

use crate::pdf::{PageBounds, PageSource, RasterBuffer, RenderError, ZoomFactor};
use crate::viewer::{Graphics, GraphicsError, PixelPoint, PixelRect, SurfaceId, TextTone};

/// Padding bytes added to every raster row so stride handling is exercised
pub const ROW_PADDING: usize = 4;

/// One `render_page` call as seen by a [`ScriptedDocument`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCall {
    pub page: usize,
    pub zoom: f32,
}

/// Page source with fixed page sizes and scriptable failures.
///
/// Rendered size is the natural size times the zoom, rounded. Pixel values
/// depend only on page and position, so equal inputs give equal buffers.
pub struct ScriptedDocument {
    pages: Vec<PageBounds>,
    zoom: ZoomFactor,
    renders: Vec<RenderCall>,
    failing: BTreeSet<usize>,
}

impl ScriptedDocument {
    /// `page_count` pages of `width` x `height` natural pixels
    pub fn new(page_count: usize, width: f32, height: f32) -> Self {
        Self {
            pages: vec![PageBounds { width, height }; page_count],
            zoom: ZoomFactor::IDENTITY,
            renders: Vec::new(),
            failing: BTreeSet::new(),
        }
    }

    /// Override the size of a single page
    pub fn with_page_size(mut self, page: usize, width: f32, height: f32) -> Self {
        self.pages[page] = PageBounds { width, height };
        self
    }

    /// Make every render of `page` fail
    pub fn failing_on(mut self, page: usize) -> Self {
        self.failing.insert(page);
        self
    }

    pub fn set_failing(&mut self, page: usize, failing: bool) {
        if failing {
            self.failing.insert(page);
        } else {
            self.failing.remove(&page);
        }
    }

    pub fn render_calls(&self) -> &[RenderCall] {
        &self.renders
    }

    pub fn clear_render_calls(&mut self) {
        self.renders.clear();
    }

    fn bounds(&self, index: usize) -> Result<PageBounds, RenderError> {
        self.pages
            .get(index)
            .copied()
            .ok_or(RenderError::PageOutOfRange {
                index,
                count: self.pages.len(),
            })
    }
}

impl PageSource for ScriptedDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = ZoomFactor::clamped(zoom);
    }

    fn zoom(&self) -> ZoomFactor {
        self.zoom
    }

    fn page_bounds(&self, index: usize) -> Result<PageBounds, RenderError> {
        self.bounds(index)
    }

    fn render_page(&mut self, index: usize) -> Result<RasterBuffer, RenderError> {
        let zoom = self.zoom.get();
        self.renders.push(RenderCall { page: index, zoom });

        let bounds = self.bounds(index)?;
        if self.failing.contains(&index) {
            return Err(RenderError::backend(format!("scripted failure on page {index}")));
        }

        let width = (bounds.width * zoom).round().max(0.0) as u32;
        let height = (bounds.height * zoom).round().max(0.0) as u32;
        let stride = width as usize * 3 + ROW_PADDING;
        let mut pixels = vec![0u8; stride * height as usize];
        for (y, row) in pixels.chunks_mut(stride).enumerate() {
            for x in 0..width as usize {
                let px = &mut row[x * 3..x * 3 + 3];
                px[0] = (x % 251) as u8;
                px[1] = (y % 241) as u8;
                px[2] = (index % 256) as u8;
            }
        }

        Ok(RasterBuffer {
            width,
            height,
            stride,
            pixels,
        })
    }
}

/// Draw call captured by [`RecordingGraphics`]
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Surface { id: SurfaceId, at: PixelPoint },
    Outline { rect: PixelRect, thickness: f32 },
    Text { at: PixelPoint, text: String, tone: TextTone },
}

/// Graphics backend that keeps surfaces in memory and records every call
#[derive(Default)]
pub struct RecordingGraphics {
    next_id: u32,
    live: BTreeMap<u32, (u32, u32)>,
    pub created: usize,
    pub destroyed: usize,
    /// Destroys of ids that were never created or already destroyed
    pub invalid_destroys: usize,
    /// Draws of ids that are not live
    pub invalid_draws: usize,
    /// When set, the next `create_surface` calls fail
    pub fail_create: bool,
    draws: Vec<DrawCall>,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Dimensions of a live surface
    pub fn surface_size(&self, id: SurfaceId) -> Option<(u32, u32)> {
        self.live.get(&id.get()).copied()
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    /// Return and forget the draws recorded so far
    pub fn take_draws(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }

    /// Text drawn so far, in order
    pub fn texts(&self) -> Vec<&str> {
        self.draws
            .iter()
            .filter_map(|draw| match draw {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Graphics for RecordingGraphics {
    fn create_surface(&mut self, raster: &RasterBuffer) -> Result<SurfaceId, GraphicsError> {
        if self.fail_create {
            return Err(GraphicsError::Io(std::io::Error::other("scripted create failure")));
        }
        self.next_id += 1;
        let id = NonZeroU32::new(self.next_id).ok_or(GraphicsError::IdsExhausted)?;
        self.live.insert(id.get(), (raster.width, raster.height));
        self.created += 1;
        Ok(SurfaceId(id))
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        if self.live.remove(&id.get()).is_some() {
            self.destroyed += 1;
        } else {
            self.invalid_destroys += 1;
        }
    }

    fn draw_surface(&mut self, id: SurfaceId, at: PixelPoint) {
        if !self.live.contains_key(&id.get()) {
            self.invalid_draws += 1;
        }
        self.draws.push(DrawCall::Surface { id, at });
    }

    fn draw_outline(&mut self, rect: PixelRect, thickness: f32) {
        self.draws.push(DrawCall::Outline { rect, thickness });
    }

    fn draw_text(&mut self, at: PixelPoint, text: &str, tone: TextTone) {
        self.draws.push(DrawCall::Text {
            at,
            text: text.to_string(),
            tone,
        });
    }
}

/// Write a minimal PDF with `page_count` pages of `width` x `height` points.
///
/// Each page carries a filled square whose position depends on the page
/// number, so pages rasterize differently.
pub fn write_sample_pdf(
    path: &Path,
    page_count: usize,
    width: u32,
    height: u32,
) -> std::io::Result<()> {
    let mut objects: Vec<String> = Vec::new();
    let kids: Vec<String> = (0..page_count)
        .map(|i| format!("{} 0 R", 3 + 2 * i))
        .collect();

    objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
    objects.push(format!(
        "<< /Type /Pages /Kids [{}] /Count {page_count} >>",
        kids.join(" ")
    ));
    for i in 0..page_count {
        let content = format!("0 0 1 rg {} 20 40 40 re f", 20 + (i * 10) % 100);
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {width} {height}] /Contents {} 0 R >>",
            4 + 2 * i
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ));
    }

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (n, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{body}\nendobj\n", n + 1);
    }

    let xref_at = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    );

    let mut file = std::fs::File::create(path)?;
    file.write_all(out.as_bytes())?;
    file.flush()
}
