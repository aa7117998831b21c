//! Core types for page rasterization

/// Natural (zoom-independent) page size in document units
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageBounds {
    pub width: f32,
    pub height: f32,
}

/// Raw rendered page before it becomes a drawable surface.
///
/// Rows are `stride` bytes apart; only the first `width * 3` bytes of each
/// row are pixel data (R, G, B), the rest is alignment padding.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Bytes between the starts of two consecutive rows
    pub stride: usize,
    /// `stride * height` bytes of RGB samples
    pub pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Bytes of pixel data per row, excluding padding
    #[must_use]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * 3
    }

    /// Iterate rows without their padding
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let row_bytes = self.row_bytes();
        self.pixels
            .chunks(self.stride.max(1))
            .take(self.height as usize)
            .map(move |row| &row[..row_bytes.min(row.len())])
    }

    /// Tightly packed `width * height * 3` RGB bytes
    #[must_use]
    pub fn packed(&self) -> Vec<u8> {
        if self.stride == self.row_bytes() {
            return self.pixels[..self.row_bytes() * self.height as usize].to_vec();
        }
        let mut out = Vec::with_capacity(self.row_bytes() * self.height as usize);
        for row in self.rows() {
            out.extend_from_slice(row);
        }
        out
    }

    /// Whether the sample buffer is large enough for the declared geometry
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.stride >= self.row_bytes()
            && self.pixels.len() >= self.stride.saturating_mul(self.height as usize)
    }
}

impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("pixels.len", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded() -> RasterBuffer {
        // 2x2 image, 8-byte stride (2 bytes of padding per row)
        RasterBuffer {
            width: 2,
            height: 2,
            stride: 8,
            pixels: vec![
                1, 2, 3, 4, 5, 6, 0xEE, 0xEE, //
                7, 8, 9, 10, 11, 12, 0xEE, 0xEE,
            ],
        }
    }

    #[test]
    fn packed_strips_stride_padding() {
        assert_eq!(
            padded().packed(),
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]
        );
    }

    #[test]
    fn packed_is_identity_without_padding() {
        let buf = RasterBuffer {
            width: 1,
            height: 2,
            stride: 3,
            pixels: vec![1, 2, 3, 4, 5, 6],
        };
        assert_eq!(buf.packed(), buf.pixels);
    }

    #[test]
    fn consistency_checks_length_and_stride() {
        assert!(padded().is_consistent());

        let mut short = padded();
        short.pixels.truncate(10);
        assert!(!short.is_consistent());

        let mut narrow = padded();
        narrow.stride = 4;
        assert!(!narrow.is_consistent());
    }
}
