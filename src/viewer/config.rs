//! Viewer tuning parameters

/// Layout and scroll tunables.
///
/// Lengths are viewport pixels, speeds are pixels per second.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
    /// Gap between the viewport edge and the page, left and top
    pub margin: f32,
    /// Total horizontal space not covered by the page when fitted to width
    pub horizontal_padding: f32,
    /// Scroll distance per wheel notch
    pub wheel_step: f32,
    /// Scroll speed while an arrow key is held
    pub key_scroll_speed: f32,
    /// Page-up/page-down distance as a fraction of the viewport height
    pub page_step: f32,
    /// Exponential smoothing rate for the drawn scroll position (1/s)
    pub smoothing_rate: f32,
    /// Page border thickness
    pub border_thickness: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            margin: 10.0,
            horizontal_padding: 20.0,
            wheel_step: 50.0,
            key_scroll_speed: 300.0,
            page_step: 0.9,
            smoothing_rate: 15.0,
            border_thickness: 2.0,
        }
    }
}
