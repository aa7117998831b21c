//! Zoom factor for page rasterization
//!
//! The factor is a uniform scale applied to the page's natural bounds when
//! the engine rasterizes it. It is always finite and kept within
//! [`ZoomFactor::MIN`, `ZoomFactor::MAX`].

/// Uniform rasterization scale (1.0 = natural page size)
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ZoomFactor(f32);

impl ZoomFactor {
    /// Minimum allowed zoom factor
    pub const MIN: f32 = 0.1;
    /// Maximum allowed zoom factor
    pub const MAX: f32 = 20.0;
    /// Natural size
    pub const IDENTITY: Self = Self(1.0);

    /// Clamp factor to valid range, handling NaN/Inf
    #[must_use]
    pub fn clamped(factor: f32) -> Self {
        if factor.is_finite() {
            Self(factor.clamp(Self::MIN, Self::MAX))
        } else {
            Self::IDENTITY
        }
    }

    /// Returns the stored factor
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}
