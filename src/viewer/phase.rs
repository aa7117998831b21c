//! Display phase of the viewer

use crate::pdf::RenderError;

use super::surface::{GraphicsError, PageSurface};

/// Why the viewer has nothing to show
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("page has degenerate width ({natural_width}px)")]
    DegenerateWidth { natural_width: u32 },

    #[error("cannot create page surface: {0}")]
    Surface(#[from] GraphicsError),
}

/// What the viewport currently holds
#[derive(Debug, Default)]
pub enum ViewPhase {
    /// No surface, nothing attempted yet
    #[default]
    Empty,
    /// No surface because the last render attempt failed
    Failed(ViewError),
    /// A render is in progress; the previous surface is already gone
    Rendering,
    /// A surface for the current page at the current viewport width
    Displaying(PageSurface),
}

impl ViewPhase {
    #[must_use]
    pub fn surface(&self) -> Option<&PageSurface> {
        match self {
            Self::Displaying(surface) => Some(surface),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_displaying(&self) -> bool {
        matches!(self, Self::Displaying(_))
    }

    /// The error that emptied the viewport, if any
    #[must_use]
    pub fn error(&self) -> Option<&ViewError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Short label for diagnostics
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Empty | Self::Failed(_) => "empty",
            Self::Rendering => "rendering",
            Self::Displaying(_) => "displaying",
        }
    }
}
