use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

use crate::pdf::RasterBuffer;

pub struct PixelEncoder;

impl PixelEncoder {
    pub fn compress_and_encode(pixels: &[u8]) -> Result<Vec<u8>, std::io::Error> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(pixels)?;
        let compressed = encoder.finish()?;
        Ok(STANDARD.encode(compressed).into_bytes())
    }

    /// Tightly packed RGB rows, zlib compressed, base64 encoded
    pub fn encode_raster(raster: &RasterBuffer) -> Result<Vec<u8>, std::io::Error> {
        Self::compress_and_encode(&raster.packed())
    }
}
