//! Receive state machine for incoming display messages
//!
//! One `ShowMessage` operation is in flight at most. The transport calls
//! [`Receiver::on_command_header`] when the setup packet arrives and
//! [`Receiver::on_data_chunk`] for each data-stage chunk. A new header always
//! supersedes whatever was in progress; there is no queuing, and both entry
//! points run from the same poll context, so no locking is needed around the
//! counters.

use crate::surface::DisplaySurface;
use marquee_protocol::{CommandHeader, Request, DISPLAY_CELLS};

/// Receiver state, derived from the wire counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiverState {
    /// No operation in flight
    Idle,
    /// Data-stage bytes still expected
    Receiving,
}

/// What the transport should do after a command header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupDisposition {
    /// Solicit data-stage chunks and feed them to `on_data_chunk`
    NeedsData,
    /// The command is finished; no data stage follows
    Complete,
}

/// Result of consuming one data-stage chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkOutcome {
    /// Bytes taken from the chunk (clamped if the chunk overran the
    /// declared length)
    pub consumed: usize,
    /// True once the full declared length has been consumed from the wire;
    /// tells the transport to stop soliciting chunks
    pub complete: bool,
}

/// Display receive state machine
///
/// `remaining` counts wire bytes: it is armed with the full declared length
/// so the transfer stays well-formed even when the message is longer than
/// the display. `budget` counts renderable bytes and is capped at
/// [`DISPLAY_CELLS`]; once it runs out, further bytes are consumed but
/// silently dropped. The host is never told about truncation.
#[derive(Debug, Clone)]
pub struct Receiver {
    /// Wire bytes still expected for the current operation
    remaining: u16,
    /// Bytes still allowed onto the surface, never above `DISPLAY_CELLS`
    budget: u16,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver {
    pub const fn new() -> Self {
        Self {
            remaining: 0,
            budget: 0,
        }
    }

    pub fn state(&self) -> ReceiverState {
        if self.remaining == 0 {
            ReceiverState::Idle
        } else {
            ReceiverState::Receiving
        }
    }

    /// Handle a decoded command header
    ///
    /// Both commands blank the surface unconditionally, abandoning any
    /// partial message from a superseded operation. Unknown requests never
    /// reach this point; [`CommandHeader::parse`] already rejected them.
    pub fn on_command_header(
        &mut self,
        header: CommandHeader,
        surface: &mut impl DisplaySurface,
    ) -> SetupDisposition {
        surface.clear();
        match header.request {
            Request::ShowMessage => {
                self.remaining = header.declared_len;
                self.budget = header.declared_len.min(DISPLAY_CELLS as u16);
                if self.remaining == 0 {
                    SetupDisposition::Complete
                } else {
                    SetupDisposition::NeedsData
                }
            }
            Request::Clear => {
                // wLength is ignored for Clear; no data stage follows
                self.remaining = 0;
                self.budget = 0;
                SetupDisposition::Complete
            }
        }
    }

    /// Consume one data-stage chunk
    ///
    /// Chunks arriving while idle have no operation to receive them; they
    /// are dropped with zero bytes consumed.
    pub fn on_data_chunk(
        &mut self,
        data: &[u8],
        surface: &mut impl DisplaySurface,
    ) -> ChunkOutcome {
        if self.remaining == 0 {
            return ChunkOutcome {
                consumed: 0,
                complete: false,
            };
        }

        // Clamp malformed chunks that overrun the declared length
        let consumed = data.len().min(self.remaining as usize);
        let rendered = consumed.min(self.budget as usize);

        for &byte in &data[..rendered] {
            surface.put_byte(byte);
        }

        self.budget -= rendered as u16;
        self.remaining -= consumed as u16;

        ChunkOutcome {
            consumed,
            complete: self.remaining == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::LineBuffer;

    fn show_header(len: u16) -> CommandHeader {
        CommandHeader {
            request: Request::ShowMessage,
            declared_len: len,
        }
    }

    fn clear_header() -> CommandHeader {
        CommandHeader {
            request: Request::Clear,
            declared_len: 0,
        }
    }

    #[test]
    fn test_show_message_fits() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        let payload = b"Hello World";
        let disp = rx.on_command_header(show_header(payload.len() as u16), &mut lcd);
        assert_eq!(disp, SetupDisposition::NeedsData);
        assert_eq!(rx.state(), ReceiverState::Receiving);

        let outcome = rx.on_data_chunk(payload, &mut lcd);
        assert_eq!(outcome.consumed, 11);
        assert!(outcome.complete);
        assert_eq!(rx.state(), ReceiverState::Idle);
        assert_eq!(lcd.as_bytes(), b"Hello World");
    }

    #[test]
    fn test_show_message_truncates_to_capacity() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        // 79-byte payload, 8-byte chunks as a real control pipe delivers them
        let payload = [b'A'; 79];
        rx.on_command_header(show_header(79), &mut lcd);

        let mut total = 0;
        let mut complete = false;
        for chunk in payload.chunks(8) {
            assert!(!complete);
            let outcome = rx.on_data_chunk(chunk, &mut lcd);
            total += outcome.consumed;
            complete = outcome.complete;
        }

        // The wire drains fully, the display keeps only its cell count
        assert!(complete);
        assert_eq!(total, 79);
        assert_eq!(lcd.len(), DISPLAY_CELLS);
        assert_eq!(lcd.as_bytes(), &payload[..DISPLAY_CELLS]);
    }

    #[test]
    fn test_completion_requires_full_declared_length() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        rx.on_command_header(show_header(40), &mut lcd);

        // 32 bytes exhaust the render budget but not the wire
        let outcome = rx.on_data_chunk(&[b'x'; 32], &mut lcd);
        assert_eq!(outcome.consumed, 32);
        assert!(!outcome.complete);
        assert_eq!(rx.state(), ReceiverState::Receiving);

        let outcome = rx.on_data_chunk(&[b'y'; 8], &mut lcd);
        assert_eq!(outcome.consumed, 8);
        assert!(outcome.complete);
        assert_eq!(lcd.len(), DISPLAY_CELLS);
        assert!(lcd.as_bytes().iter().all(|&b| b == b'x'));
    }

    #[test]
    fn test_zero_length_show_clears_and_completes() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();
        lcd.put_byte(b'z');

        let disp = rx.on_command_header(show_header(0), &mut lcd);
        assert_eq!(disp, SetupDisposition::Complete);
        assert_eq!(rx.state(), ReceiverState::Idle);
        assert!(lcd.is_empty());
    }

    #[test]
    fn test_clear_blanks_display() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        rx.on_command_header(show_header(5), &mut lcd);
        rx.on_data_chunk(b"hello", &mut lcd);
        assert_eq!(lcd.as_bytes(), b"hello");

        let disp = rx.on_command_header(clear_header(), &mut lcd);
        assert_eq!(disp, SetupDisposition::Complete);
        assert_eq!(rx.state(), ReceiverState::Idle);
        assert!(lcd.is_empty());
    }

    #[test]
    fn test_clear_abandons_partial_receive() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        rx.on_command_header(show_header(20), &mut lcd);
        rx.on_data_chunk(b"partial", &mut lcd);
        assert_eq!(rx.state(), ReceiverState::Receiving);

        rx.on_command_header(clear_header(), &mut lcd);
        assert_eq!(rx.state(), ReceiverState::Idle);
        assert!(lcd.is_empty());

        // Stray data from the abandoned operation is dropped
        let outcome = rx.on_data_chunk(b"stale", &mut lcd);
        assert_eq!(outcome.consumed, 0);
        assert!(lcd.is_empty());
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        rx.on_command_header(clear_header(), &mut lcd);
        let state_once = rx.state();

        rx.on_command_header(clear_header(), &mut lcd);
        assert_eq!(rx.state(), state_once);
        assert_eq!(rx.state(), ReceiverState::Idle);
        assert!(lcd.is_empty());
    }

    #[test]
    fn test_new_header_supersedes_receive() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        rx.on_command_header(show_header(10), &mut lcd);
        rx.on_data_chunk(b"old", &mut lcd);

        rx.on_command_header(show_header(3), &mut lcd);
        let outcome = rx.on_data_chunk(b"new", &mut lcd);
        assert!(outcome.complete);
        assert_eq!(lcd.as_bytes(), b"new");
    }

    #[test]
    fn test_oversized_chunk_is_clamped() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        rx.on_command_header(show_header(4), &mut lcd);
        let outcome = rx.on_data_chunk(b"abcdefgh", &mut lcd);
        assert_eq!(outcome.consumed, 4);
        assert!(outcome.complete);
        assert_eq!(lcd.as_bytes(), b"abcd");
    }

    #[test]
    fn test_idle_chunk_dropped() {
        let mut rx = Receiver::new();
        let mut lcd = LineBuffer::new();

        let outcome = rx.on_data_chunk(b"noise", &mut lcd);
        assert_eq!(outcome.consumed, 0);
        assert!(!outcome.complete);
        assert!(lcd.is_empty());
    }

    mod properties {
        extern crate std;

        use super::*;
        use proptest::prelude::*;
        use std::vec::Vec;

        proptest! {
            /// Any declared length and any chunking render exactly the first
            /// min(declared, cells) bytes and drain the full declared length
            /// from the wire.
            #[test]
            fn receive_renders_prefix_and_drains_wire(
                payload in proptest::collection::vec(any::<u8>(), 0..200),
                chunk_size in 1usize..64,
            ) {
                let mut rx = Receiver::new();
                let mut lcd = LineBuffer::new();

                let declared = payload.len() as u16;
                rx.on_command_header(show_header(declared), &mut lcd);

                let mut consumed = 0;
                for chunk in payload.chunks(chunk_size) {
                    consumed += rx.on_data_chunk(chunk, &mut lcd).consumed;
                }

                let rendered: Vec<u8> =
                    payload.iter().copied().take(DISPLAY_CELLS).collect();
                prop_assert_eq!(consumed, payload.len());
                prop_assert_eq!(lcd.as_bytes(), rendered.as_slice());
                prop_assert_eq!(rx.state(), ReceiverState::Idle);
            }
        }
    }
}
