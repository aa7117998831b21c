//! Kitty graphics backend for the viewer
//!
//! Surfaces are transmitted to the terminal once, on creation, and live in
//! terminal memory under their id until destroyed. Draw calls made during a
//! frame are collected and flushed by [`KittyGraphics::present`]: text and
//! outlines go through ratatui, images become placements. A placement is only
//! re-sent when it moved, so a still page costs nothing per frame.

use std::collections::HashMap;
use std::io::Write;
use std::num::NonZeroU32;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};
use log::{debug, warn};
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::pdf::RasterBuffer;
use crate::viewer::{Graphics, GraphicsError, PixelPoint, PixelRect, SurfaceId, TextTone};

use super::encoder::PixelEncoder;
use super::placement::{self, Placement, ScreenGeometry};
use super::protocol::{DeleteCommand, DirectTransmit, DisplayCommand};

/// Placement id used for every image; one placement per image at most
const PLACEMENT_ID: u32 = 1;

/// Images go beneath text so the ratatui border stays on top
const IMAGE_Z_INDEX: i32 = -1;

#[derive(Debug, Default)]
struct DrawList {
    images: Vec<(SurfaceId, PixelPoint)>,
    outlines: Vec<(PixelRect, f32)>,
    texts: Vec<(PixelPoint, String, TextTone)>,
}

pub struct KittyGraphics<W: Write> {
    out: W,
    screen: ScreenGeometry,
    next_id: u32,
    live: HashMap<SurfaceId, (u32, u32)>,
    shown: HashMap<SurfaceId, Placement>,
    frame: DrawList,
}

impl<W: Write> KittyGraphics<W> {
    pub fn new(out: W, screen: ScreenGeometry) -> Self {
        Self {
            out,
            screen,
            next_id: 1,
            live: HashMap::new(),
            shown: HashMap::new(),
            frame: DrawList::default(),
        }
    }

    #[must_use]
    pub fn screen(&self) -> ScreenGeometry {
        self.screen
    }

    /// Track a new terminal size. Returns whether it changed.
    ///
    /// Placements are forgotten on change: the terminal clears them together
    /// with the screen, so they are re-sent on the next present.
    pub fn set_screen(&mut self, screen: ScreenGeometry) -> bool {
        if screen == self.screen {
            return false;
        }
        self.screen = screen;
        self.shown.clear();
        true
    }

    /// Number of surfaces held in terminal memory
    #[must_use]
    pub fn live_surfaces(&self) -> usize {
        self.live.len()
    }

    #[must_use]
    pub fn writer(&self) -> &W {
        &self.out
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn allocate_id(&mut self) -> Result<SurfaceId, GraphicsError> {
        let id = NonZeroU32::new(self.next_id).ok_or(GraphicsError::IdsExhausted)?;
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(GraphicsError::IdsExhausted)?;
        Ok(SurfaceId(id))
    }

    /// Flush the frame's draw calls to the terminal
    pub fn present<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B::Error: Send + Sync + 'static,
    {
        let frame = std::mem::take(&mut self.frame);
        let screen = self.screen;

        queue!(self.out, BeginSynchronizedUpdate)?;
        terminal.draw(|f| render_overlay(f, &frame, &screen))?;

        let mut visible = HashMap::new();
        for &(id, at) in &frame.images {
            let Some(&(width, height)) = self.live.get(&id) else {
                warn!("Draw of unknown surface {} ignored", id.get());
                continue;
            };
            if let Some(placement) = placement::place(width, height, at, &screen) {
                visible.insert(id, placement);
            }
        }

        let stale: Vec<SurfaceId> = self
            .shown
            .keys()
            .filter(|id| !visible.contains_key(id))
            .copied()
            .collect();
        for id in stale {
            DeleteCommand::by_id(id.get())
                .clear()
                .write_to(&mut self.out)?;
            self.shown.remove(&id);
        }

        for (id, placement) in visible {
            if self.shown.get(&id) == Some(&placement) {
                continue;
            }
            queue!(self.out, MoveTo(placement.column, placement.row))?;
            DisplayCommand::new(id.get())
                .placement_id(PLACEMENT_ID)
                .source_rect(placement.source)
                .cell_offset(placement.offset_x, placement.offset_y)
                .z_index(IMAGE_Z_INDEX)
                .write_to(&mut self.out)?;
            self.shown.insert(id, placement);
        }

        queue!(self.out, EndSynchronizedUpdate)?;
        self.out.flush()?;
        Ok(())
    }

    /// Free every image in terminal memory, including ones this backend did
    /// not create
    pub fn delete_all(&mut self) -> std::io::Result<()> {
        DeleteCommand::all().delete().write_to(&mut self.out)?;
        self.live.clear();
        self.shown.clear();
        self.out.flush()
    }
}

impl<W: Write> Graphics for KittyGraphics<W> {
    fn create_surface(&mut self, raster: &RasterBuffer) -> Result<SurfaceId, GraphicsError> {
        if raster.width == 0 || raster.height == 0 || !raster.is_consistent() {
            return Err(GraphicsError::InvalidRaster {
                width: raster.width,
                height: raster.height,
            });
        }
        let id = self.allocate_id()?;
        let encoded = PixelEncoder::encode_raster(raster)?;
        let chunks = DirectTransmit::new(raster.width, raster.height)
            .image_id(id.get())
            .send_encoded(&mut self.out, &encoded)?;
        self.out.flush()?;

        debug!(
            "Transmitted image {} ({}x{}, {} chunks)",
            id.get(),
            raster.width,
            raster.height,
            chunks
        );
        self.live.insert(id, (raster.width, raster.height));
        Ok(id)
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        if self.live.remove(&id).is_none() {
            warn!("Destroy of unknown surface {} ignored", id.get());
            return;
        }
        self.shown.remove(&id);
        let sent = DeleteCommand::by_id(id.get())
            .delete()
            .write_to(&mut self.out)
            .and_then(|()| self.out.flush());
        if let Err(err) = sent {
            warn!("Failed to delete image {}: {err}", id.get());
        }
    }

    fn draw_surface(&mut self, id: SurfaceId, at: PixelPoint) {
        self.frame.images.push((id, at));
    }

    fn draw_outline(&mut self, rect: PixelRect, thickness: f32) {
        self.frame.outlines.push((rect, thickness));
    }

    fn draw_text(&mut self, at: PixelPoint, text: &str, tone: TextTone) {
        self.frame.texts.push((at, text.to_string(), tone));
    }
}

fn render_overlay(f: &mut Frame, frame: &DrawList, screen: &ScreenGeometry) {
    let area = f.area();

    for &(rect, thickness) in &frame.outlines {
        let Some((cells, top, bottom)) = placement::outline_cells(rect, screen) else {
            continue;
        };
        let mut borders = Borders::LEFT | Borders::RIGHT;
        if top {
            borders |= Borders::TOP;
        }
        if bottom {
            borders |= Borders::BOTTOM;
        }
        let border_type = if thickness >= 2.0 {
            BorderType::Thick
        } else {
            BorderType::Plain
        };
        let block = Block::default()
            .borders(borders)
            .border_type(border_type)
            .border_style(Style::default().fg(Color::Gray));
        f.render_widget(block, cells.intersection(area));
    }

    for (at, text, tone) in &frame.texts {
        let (column, row) = screen.cell_at(*at);
        let style = match tone {
            TextTone::Error => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            TextTone::Normal => Style::default(),
        };
        let line = Rect::new(column, row, area.width.saturating_sub(column), 1);
        f.render_widget(
            Paragraph::new(Span::styled(text.as_str(), style)),
            line.intersection(area),
        );
    }
}
