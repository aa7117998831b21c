//! Kitty terminal graphics protocol backend

pub mod encoder;
pub mod graphics;
pub mod placement;
pub mod protocol;

pub use graphics::KittyGraphics;
pub use placement::{CellSize, Placement, ScreenGeometry};
pub use protocol::{DeleteCommand, set_tmux_mode};
