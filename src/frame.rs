//! Fixed-rate frame loop
//!
//! Each frame drains terminal events until the frame deadline, turns them
//! into one [`FrameInput`](crate::viewer::FrameInput), advances the viewer by
//! a fixed frame time and presents. Frame time is `1 / fps` regardless of how
//! long the frame actually took, so scroll smoothing is reproducible.

use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::{debug, info};
use ratatui::{Terminal, backend::Backend};

use crate::event_source::EventSource;
use crate::input::InputMapper;
use crate::kitty::{KittyGraphics, ScreenGeometry};
use crate::pdf::PageSource;
use crate::viewer::Viewer;

pub const DEFAULT_FPS: u32 = 60;
const MAX_FPS: u32 = 240;

/// Safety cap on events handled per frame
const MAX_EVENTS_PER_FRAME: usize = 256;

#[derive(Clone, Copy, Debug)]
pub struct FrameLoop {
    frame_time: Duration,
    max_frames: Option<u64>,
}

impl FrameLoop {
    #[must_use]
    pub fn new(fps: u32) -> Self {
        let fps = fps.clamp(1, MAX_FPS);
        Self {
            frame_time: Duration::from_secs(1) / fps,
            max_frames: None,
        }
    }

    /// Stop after `frames` frames even without a quit request
    #[must_use]
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    #[must_use]
    pub fn frame_time(&self) -> Duration {
        self.frame_time
    }

    /// Run until quit. Returns the number of frames presented.
    ///
    /// `query_screen` maps a terminal size in cells to its pixel geometry and
    /// is called only on resize events.
    pub fn run<S, B, W, Q>(
        &self,
        viewer: &mut Viewer<S>,
        gfx: &mut KittyGraphics<W>,
        terminal: &mut Terminal<B>,
        events: &mut dyn EventSource,
        mapper: &mut InputMapper,
        mut query_screen: Q,
    ) -> Result<u64>
    where
        S: PageSource,
        B: Backend,
        B::Error: Send + Sync + 'static,
        W: Write,
        Q: FnMut(u16, u16) -> ScreenGeometry,
    {
        let dt = self.frame_time.as_secs_f32();
        let mut frames = 0u64;

        // First frame shows the initial render before any input arrives
        viewer.draw(gfx);
        gfx.present(terminal)?;

        loop {
            if self.max_frames.is_some_and(|max| frames >= max) {
                debug!("Frame limit reached after {frames} frames");
                break;
            }

            let deadline = Instant::now() + self.frame_time;
            let mut handled = 0;
            while handled < MAX_EVENTS_PER_FRAME {
                let timeout = deadline.saturating_duration_since(Instant::now());
                if !events.poll(timeout)? {
                    break;
                }
                mapper.handle(&events.read()?, Instant::now());
                handled += 1;
            }

            let mut input = mapper.take_frame(Instant::now());
            if let Some((columns, rows)) = mapper.take_resize() {
                let screen = query_screen(columns, rows);
                if gfx.set_screen(screen) {
                    input.resized = Some(screen.viewport());
                }
            }

            if input.quit {
                info!("Quit requested after {frames} frames");
                break;
            }

            viewer.update(&input, dt, gfx);
            viewer.draw(gfx);
            gfx.present(terminal)?;
            frames += 1;
        }

        Ok(frames)
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new(DEFAULT_FPS)
    }
}
