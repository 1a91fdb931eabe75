//! Display surface abstraction and the shared line buffer
//!
//! The receive state machine touches the display through exactly two
//! operations: blank everything, and write one byte at the current cursor.
//! Cursor advance and row wrapping belong to the implementation.

use heapless::Vec;
use marquee_protocol::{DISPLAY_CELLS, DISPLAY_COLS};

/// Minimal surface the receiver renders onto
///
/// Implemented by [`LineBuffer`] for the firmware's RAM copy of the screen
/// and by capturing stubs in tests.
pub trait DisplaySurface {
    /// Blank the surface and move the cursor home
    fn clear(&mut self);

    /// Write one byte at the cursor and advance it
    fn put_byte(&mut self, byte: u8);
}

/// RAM copy of the display contents
///
/// The firmware renders received bytes into this buffer from the USB control
/// handler and flushes it to the LCD from a separate task, so the handler
/// never waits on the I2C bus. Bytes written past [`DISPLAY_CELLS`] are
/// dropped; the receiver's render budget normally prevents that from ever
/// being attempted.
#[derive(Debug, Clone, Default)]
pub struct LineBuffer {
    cells: Vec<u8, DISPLAY_CELLS>,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// All written cells in write order
    pub fn as_bytes(&self) -> &[u8] {
        &self.cells
    }

    /// Number of cells written since the last clear
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Written cells belonging to one display row
    ///
    /// Rows fill in cursor order: row 0 holds the first `DISPLAY_COLS`
    /// bytes, row 1 the next, and so on. Returns an empty slice for rows
    /// the cursor has not reached.
    pub fn row(&self, row: u8) -> &[u8] {
        let start = row as usize * DISPLAY_COLS as usize;
        let end = (start + DISPLAY_COLS as usize).min(self.cells.len());
        if start >= self.cells.len() {
            &[]
        } else {
            &self.cells[start..end]
        }
    }
}

impl DisplaySurface for LineBuffer {
    fn clear(&mut self) {
        self.cells.clear();
    }

    fn put_byte(&mut self, byte: u8) {
        let _ = self.cells.push(byte);
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LineBuffer {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "LineBuffer({=[u8]:a})", self.cells.as_slice());
    }
}
