//! Page navigation state

/// Viewport size in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Size used when the windowing layer cannot report one
    pub const DEFAULT: Self = Self::new(800, 1200);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which page is shown out of how many
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavState {
    /// Current page (0-indexed)
    pub current_page: usize,
    /// Total page count, fixed at load
    pub page_count: usize,
}

impl NavState {
    #[must_use]
    pub fn new(page_count: usize) -> Self {
        Self {
            current_page: 0,
            page_count,
        }
    }

    fn last_page(&self) -> usize {
        self.page_count.saturating_sub(1)
    }

    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        let target = match cmd {
            Command::NextPage => (self.current_page < self.last_page())
                .then(|| self.current_page + 1),
            Command::PreviousPage => self.current_page.checked_sub(1),
            Command::GoToPage(page) => (page < self.page_count).then_some(page),
            Command::FirstPage => Some(0),
            Command::LastPage => Some(self.last_page()),
        };

        match target {
            Some(page) if page != self.current_page => {
                self.current_page = page;
                vec![Effect::ResetScroll, Effect::RenderCurrentPage]
            }
            _ => vec![],
        }
    }
}

/// Discrete page navigation requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advance one page
    NextPage,
    /// Go back one page
    PreviousPage,
    /// Jump to a page (0-indexed); ignored when past the end
    GoToPage(usize),
    /// Jump to the first page
    FirstPage,
    /// Jump to the last page
    LastPage,
}

/// Effects produced by navigation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Put scroll position and target back at the top
    ResetScroll,
    /// Rasterize the current page again
    RenderCurrentPage,
}
