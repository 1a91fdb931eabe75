//! USB contract between the marquee host tool and the display firmware
//!
//! The whole protocol is a single vendor-defined, device-recipient control
//! transfer. The setup packet carries the command and the payload size; the
//! data stage carries the message bytes:
//!
//! ```text
//! ┌──────────────┬──────────┬─────────┬──────────────────────┐
//! │ bRequest     │ wLength  │ wValue  │ data stage           │
//! ├──────────────┼──────────┼─────────┼──────────────────────┤
//! │ SHOW_MESSAGE │ N        │ 0       │ N message bytes      │
//! │ CLEAR        │ 0        │ 0       │ (empty)              │
//! └──────────────┴──────────┴─────────┴──────────────────────┘
//! ```
//!
//! Message bytes are raw: no encoding is assumed, and anything past the
//! display's cell count is silently dropped by the device. There is no status
//! stage payload; the transfer's own completion is the only success signal
//! the host gets.

#![no_std]
#![deny(unsafe_code)]

pub mod request;

pub use request::{CommandHeader, Request, REQ_CLEAR, REQ_SHOW_MESSAGE};

/// USB vendor ID the host scans for (shared V-USB vendor-class pair)
pub const VENDOR_ID: u16 = 0x16c0;

/// USB product ID the host scans for
pub const PRODUCT_ID: u16 = 0x05dc;

/// Manufacturer descriptor string; the host requires an exact match because
/// the VID/PID pair above is shared between unrelated hobbyist devices
pub const MANUFACTURER: &str = "marquee.dev";

/// Product descriptor string, matched together with [`MANUFACTURER`]
pub const PRODUCT: &str = "Marquee LCD";

/// Display geometry: character rows
pub const DISPLAY_ROWS: u8 = 2;

/// Display geometry: characters per row
pub const DISPLAY_COLS: u8 = 16;

/// Total writable cells. This is the device's receive buffer capacity; a
/// `ShowMessage` payload longer than this renders only its first
/// `DISPLAY_CELLS` bytes.
pub const DISPLAY_CELLS: usize = DISPLAY_ROWS as usize * DISPLAY_COLS as usize;

/// Upper bound on one message's declared length, agreed by both sides: the
/// host refuses longer messages before any transfer is attempted, and the
/// firmware sizes its control buffer from it, so a maximal message still
/// completes (and truncates to [`DISPLAY_CELLS`]) instead of stalling the
/// data stage.
pub const MAX_MESSAGE_LEN: usize = 1024;

// One transfer must be able to carry at least a full display, and the
// declared length field is 16 bits wide
const _: () = assert!(DISPLAY_CELLS <= MAX_MESSAGE_LEN);
const _: () = assert!(MAX_MESSAGE_LEN <= u16::MAX as usize);
