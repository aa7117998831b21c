use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Escape sequence bytes.
const ESC: u8 = 0x1B;
const APC_START: &[u8] = &[ESC, b'_', b'G'];
const APC_END: &[u8] = &[ESC, b'\\'];

// Tmux DCS passthrough state and sequences.
static IS_TMUX: AtomicBool = AtomicBool::new(false);

/// Enable tmux DCS passthrough wrapping for all Kitty graphics commands.
pub fn set_tmux_mode(tmux: bool) {
    IS_TMUX.store(tmux, Ordering::Relaxed);
}

/// Returns true if tmux DCS wrapping is active.
pub fn is_tmux() -> bool {
    IS_TMUX.load(Ordering::Relaxed)
}

const DCS_START: &[u8] = b"\x1bPtmux;";
const DCS_END: &[u8] = b"\x1b\\";
const TMUX_APC_START: &[u8] = &[ESC, ESC, b'_', b'G'];
const TMUX_APC_END: &[u8] = &[ESC, ESC, b'\\'];

fn write_apc_start<W: Write>(writer: &mut W) -> io::Result<()> {
    if is_tmux() {
        writer.write_all(DCS_START)?;
        writer.write_all(TMUX_APC_START)
    } else {
        writer.write_all(APC_START)
    }
}

fn write_apc_end<W: Write>(writer: &mut W) -> io::Result<()> {
    if is_tmux() {
        writer.write_all(TMUX_APC_END)?;
        writer.write_all(DCS_END)
    } else {
        writer.write_all(APC_END)
    }
}

fn write_apc<W: Write>(writer: &mut W, params: &str, payload: &[u8]) -> io::Result<()> {
    write_apc_start(writer)?;
    writer.write_all(params.as_bytes())?;
    writer.write_all(b";")?;
    writer.write_all(payload)?;
    write_apc_end(writer)
}

/// Every command asks for no reply (`q=2`). Replies arrive on stdin, where
/// the input reader would take them for keystrokes.
const QUIET: &str = "q=2";

/// Source rectangle for cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

// ============================================================================
// Direct Transmission
// ============================================================================

/// Maximum payload size per chunk (base64 characters).
pub const CHUNK_LIMIT: usize = 4096;

/// Builds and writes a direct (inline) pixel transmission.
///
/// Transmits 24-bit RGB without displaying (`a=t`); the image stays in
/// terminal memory under its id until deleted and is shown with
/// [`DisplayCommand`]. The payload is zlib-compressed pixels in base64
/// (`o=z`), as produced by [`super::encoder::PixelEncoder`].
pub struct DirectTransmit {
    width: u32,
    height: u32,
    image_id: Option<u32>,
    chunk_limit: usize,
}

impl DirectTransmit {
    /// Creates a new direct transmission for the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            image_id: None,
            chunk_limit: CHUNK_LIMIT,
        }
    }

    /// Sets the image ID.
    pub fn image_id(mut self, id: u32) -> Self {
        self.image_id = Some(id);
        self
    }

    /// Sets maximum chunk size in base64 characters.
    ///
    /// Will be clamped to [4, CHUNK_LIMIT] and aligned down to multiple of 4.
    pub fn chunk_limit(mut self, limit: usize) -> Self {
        self.chunk_limit = limit;
        self
    }

    /// Transmits a zlib-compressed, base64-encoded payload to the writer.
    ///
    /// Returns the number of chunks written.
    pub fn send_encoded<W: Write>(self, writer: &mut W, encoded: &[u8]) -> io::Result<usize> {
        let limit = self.chunk_limit.clamp(4, CHUNK_LIMIT);
        let limit = limit - (limit % 4);

        let total_chunks = encoded.len().div_ceil(limit).max(1);

        let mut first_params = format!("a=t,t=d,f=24,s={},v={}", self.width, self.height);
        if let Some(id) = self.image_id {
            first_params.push_str(&format!(",i={id}"));
        }
        first_params.push_str(",o=z,");
        first_params.push_str(QUIET);

        if encoded.is_empty() {
            write_apc(writer, &first_params, &[])?;
            return Ok(1);
        }

        let mut chunks_written = 0;
        for (i, chunk) in encoded.chunks(limit).enumerate() {
            let more = i + 1 < total_chunks;
            let params = if i == 0 {
                if more {
                    format!("{first_params},m=1")
                } else {
                    first_params.clone()
                }
            } else {
                // Continuation chunks only carry `m` (and `q` so they stay silent)
                format!("m={},{QUIET}", u8::from(more))
            };
            write_apc(writer, &params, chunk)?;
            chunks_written += 1;
        }

        Ok(chunks_written)
    }
}

// ============================================================================
// Display Command
// ============================================================================

/// Builds and writes a display command.
///
/// Places an already-transmitted image at the cursor without re-sending
/// pixel data. Re-sending with the same placement id moves the placement.
pub struct DisplayCommand {
    image_id: u32,
    placement_id: Option<u32>,
    source_rect: Option<SourceRect>,
    cell_offset: Option<(u32, u32)>,
    z_index: Option<i32>,
}

impl DisplayCommand {
    /// Creates a new display command for the given image ID.
    pub fn new(image_id: u32) -> Self {
        Self {
            image_id,
            placement_id: None,
            source_rect: None,
            cell_offset: None,
            z_index: None,
        }
    }

    /// Sets the placement ID.
    pub fn placement_id(mut self, id: u32) -> Self {
        self.placement_id = Some(id);
        self
    }

    /// Sets the source rectangle for cropping.
    pub fn source_rect(mut self, rect: SourceRect) -> Self {
        self.source_rect = Some(rect);
        self
    }

    /// Sets the pixel offset inside the cursor cell (`X`, `Y`).
    pub fn cell_offset(mut self, x: u32, y: u32) -> Self {
        self.cell_offset = Some((x, y));
        self
    }

    /// Sets the stacking order; negative values draw beneath text.
    pub fn z_index(mut self, z: i32) -> Self {
        self.z_index = Some(z);
        self
    }

    /// Writes the escape sequence to the given writer.
    ///
    /// The cursor is left where it was (`C=1`).
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut params = format!("a=p,i={}", self.image_id);

        if let Some(id) = self.placement_id {
            params.push_str(&format!(",p={id}"));
        }
        params.push(',');
        params.push_str(QUIET);

        if let Some(ref rect) = self.source_rect {
            params.push_str(&format!(
                ",x={},y={},w={},h={}",
                rect.x, rect.y, rect.width, rect.height
            ));
        }

        if let Some((x, y)) = self.cell_offset {
            params.push_str(&format!(",X={x},Y={y}"));
        }

        if let Some(z) = self.z_index {
            params.push_str(&format!(",z={z}"));
        }

        params.push_str(",C=1");

        write_apc(writer, &params, &[])
    }
}

// ============================================================================
// Delete Command
// ============================================================================

/// Delete mode: clear (hide) or delete (free memory).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Hide image but keep in memory (lowercase mode chars).
    #[default]
    Clear,
    /// Remove from memory entirely (uppercase mode chars).
    Delete,
}

/// Delete target: what to delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeleteTarget {
    All,
    ById(u32),
}

/// Builds and writes a delete command.
///
/// Used to clear (hide) or delete (free memory) images from the terminal.
pub struct DeleteCommand {
    target: DeleteTarget,
    mode: DeleteMode,
}

impl DeleteCommand {
    /// Delete all images.
    pub fn all() -> Self {
        Self {
            target: DeleteTarget::All,
            mode: DeleteMode::default(),
        }
    }

    /// Delete a single image by ID.
    pub fn by_id(id: u32) -> Self {
        Self {
            target: DeleteTarget::ById(id),
            mode: DeleteMode::default(),
        }
    }

    /// Set to clear mode (hide only, keep in memory).
    pub fn clear(mut self) -> Self {
        self.mode = DeleteMode::Clear;
        self
    }

    /// Set to delete mode (free memory).
    pub fn delete(mut self) -> Self {
        self.mode = DeleteMode::Delete;
        self
    }

    /// Writes the escape sequence to the given writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mode_char = match (self.target, self.mode) {
            (DeleteTarget::All, DeleteMode::Clear) => 'a',
            (DeleteTarget::All, DeleteMode::Delete) => 'A',
            (DeleteTarget::ById(_), DeleteMode::Clear) => 'i',
            (DeleteTarget::ById(_), DeleteMode::Delete) => 'I',
        };

        let mut params = format!("a=d,d={mode_char},{QUIET}");
        if let DeleteTarget::ById(id) = self.target {
            params.push_str(&format!(",i={id}"));
        }

        write_apc(writer, &params, &[])
    }
}
