//! Per-frame input snapshot consumed by the viewer

use super::state::{Command, Viewport};

/// Edge-triggered input, applied in arrival order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Discrete page change
    Navigate(Command),
    /// Scroll up by most of a screen
    PageUp,
    /// Scroll down by most of a screen
    PageDown,
    /// Scroll back to the top of the current page
    ScrollToTop,
}

/// Everything the windowing layer observed since the previous frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Accumulated wheel notches; positive rolls away from the user (up)
    pub wheel: f32,
    /// Scroll-up key is held down
    pub scroll_up_held: bool,
    /// Scroll-down key is held down
    pub scroll_down_held: bool,
    /// Edge-triggered actions
    pub actions: Vec<Action>,
    /// New viewport size, when it changed
    pub resized: Option<Viewport>,
    /// Quit requested
    pub quit: bool,
}

impl FrameInput {
    /// Input consisting of a single action
    #[must_use]
    pub fn action(action: Action) -> Self {
        Self {
            actions: vec![action],
            ..Self::default()
        }
    }

    /// Input consisting of a single page command
    #[must_use]
    pub fn navigate(cmd: Command) -> Self {
        Self::action(Action::Navigate(cmd))
    }

    /// Input consisting of wheel movement only
    #[must_use]
    pub fn wheel(delta: f32) -> Self {
        Self {
            wheel: delta,
            ..Self::default()
        }
    }

    /// Input consisting of a resize only
    #[must_use]
    pub fn resize(viewport: Viewport) -> Self {
        Self {
            resized: Some(viewport),
            ..Self::default()
        }
    }

    /// Whether nothing happened
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}
