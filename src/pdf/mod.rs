//! PDF rasterization infrastructure

mod document;
mod types;
mod zoom;

pub use document::{DocumentRenderer, OpenError, PageSource, RenderError};
pub use types::*;
pub use zoom::*;
