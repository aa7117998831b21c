// Export modules for use in tests
pub mod event_source;
pub mod frame;
pub mod input;
pub mod kitty;
pub mod panic_handler;
pub mod pdf;
pub mod terminal;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export the viewer entry points
pub use frame::FrameLoop;
pub use pdf::{DocumentRenderer, OpenError, PageSource, RenderError};
pub use viewer::{Viewer, ViewerConfig};
