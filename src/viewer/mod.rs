//! Single-page viewport controller

mod config;
mod controller;
mod fit;
mod input;
mod phase;
mod scroll;
mod state;
mod surface;

pub use config::ViewerConfig;
pub use controller::Viewer;
pub use fit::{fit_zoom, render_fitted};
pub use input::{Action, FrameInput};
pub use phase::{ViewError, ViewPhase};
pub use scroll::Scroll;
pub use state::{Command, Effect, NavState, Viewport};
pub use surface::{
    Graphics, GraphicsError, PageSurface, PixelPoint, PixelRect, SurfaceId, TextTone,
};
