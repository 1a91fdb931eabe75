//! Device lookup and the vendor control transfer
//!
//! The VID/PID pair is shared between hobbyist devices, so a match also
//! requires the manufacturer and product descriptor strings. One invocation
//! opens the device, performs its single transfer, and drops the handle.

use std::time::Duration;

use rusb::{Direction, GlobalContext, Recipient, RequestType};
use thiserror::Error;
use tracing::debug;

use marquee_protocol::{Request, MANUFACTURER, MAX_MESSAGE_LEN, PRODUCT, PRODUCT_ID, VENDOR_ID};

/// Timeout for the control transfer; exceeding it is a transport failure
/// surfaced directly to the caller, with no retry.
const TIMEOUT: Duration = Duration::from_secs(5);

/// Errors talking to the display
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no USB device \"{PRODUCT}\" with vid=0x{VENDOR_ID:04x} pid=0x{PRODUCT_ID:04x} found")]
    NotFound,
    #[error("message is {0} bytes; one transfer carries at most {MAX_MESSAGE_LEN}")]
    MessageTooLong(usize),
    #[error("USB transport error: {0}")]
    Transport(#[from] rusb::Error),
}

/// True when the descriptor fields identify a marquee display
///
/// VID/PID alone is not enough: the pair is shared, so the manufacturer
/// and product strings must match exactly as well.
fn matches_display(vid: u16, pid: u16, manufacturer: &str, product: &str) -> bool {
    vid == VENDOR_ID && pid == PRODUCT_ID && manufacturer == MANUFACTURER && product == PRODUCT
}

/// True when a message fits in one transfer
///
/// The firmware sizes its control buffer from the same bound, so anything
/// accepted here completes on the wire (and truncates on the display).
fn message_fits(len: usize) -> bool {
    len <= MAX_MESSAGE_LEN
}

/// An opened marquee display
pub struct Display {
    handle: rusb::DeviceHandle<GlobalContext>,
}

impl Display {
    /// Locate and open the display
    ///
    /// Only control endpoint 0 is used, so no configuration or interface is
    /// claimed. Devices that match the VID/PID but not the descriptor
    /// strings are skipped.
    pub fn open() -> Result<Self, DeviceError> {
        for device in rusb::devices()?.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(d) => d,
                Err(_) => continue,
            };
            if descriptor.vendor_id() != VENDOR_ID || descriptor.product_id() != PRODUCT_ID {
                continue;
            }

            let handle = match device.open() {
                Ok(h) => h,
                Err(e) => {
                    debug!("skipping candidate device: {e}");
                    continue;
                }
            };

            let manufacturer = handle
                .read_manufacturer_string_ascii(&descriptor)
                .unwrap_or_default();
            let product = handle
                .read_product_string_ascii(&descriptor)
                .unwrap_or_default();

            if matches_display(
                descriptor.vendor_id(),
                descriptor.product_id(),
                &manufacturer,
                &product,
            ) {
                debug!(
                    "opened {manufacturer} {product} on bus {:03} device {:03}",
                    device.bus_number(),
                    device.address()
                );
                return Ok(Self { handle });
            }
        }

        Err(DeviceError::NotFound)
    }

    /// Send a message; the device renders at most its cell count of it
    pub fn show(&self, payload: &[u8]) -> Result<(), DeviceError> {
        if !message_fits(payload.len()) {
            return Err(DeviceError::MessageTooLong(payload.len()));
        }
        self.control_out(Request::ShowMessage, payload)
    }

    /// Blank the display
    pub fn clear(&self) -> Result<(), DeviceError> {
        self.control_out(Request::Clear, &[])
    }

    fn control_out(&self, request: Request, payload: &[u8]) -> Result<(), DeviceError> {
        let request_type =
            rusb::request_type(Direction::Out, RequestType::Vendor, Recipient::Device);
        self.handle
            .write_control(request_type, request.to_byte(), 0, 0, payload, TIMEOUT)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_protocol::DISPLAY_CELLS;

    #[test]
    fn test_descriptor_match() {
        assert!(matches_display(VENDOR_ID, PRODUCT_ID, MANUFACTURER, PRODUCT));
    }

    #[test]
    fn test_shared_vid_pid_needs_matching_strings() {
        // The VID/PID pair is shared between unrelated devices; anything
        // with the wrong strings must be skipped, leading to NotFound
        assert!(!matches_display(
            VENDOR_ID,
            PRODUCT_ID,
            "someone else",
            PRODUCT
        ));
        assert!(!matches_display(
            VENDOR_ID,
            PRODUCT_ID,
            MANUFACTURER,
            "Other Gadget"
        ));
        assert!(!matches_display(VENDOR_ID, PRODUCT_ID, "", ""));
    }

    #[test]
    fn test_wrong_ids_never_match() {
        assert!(!matches_display(0x1234, PRODUCT_ID, MANUFACTURER, PRODUCT));
        assert!(!matches_display(VENDOR_ID, 0x5678, MANUFACTURER, PRODUCT));
    }

    #[test]
    fn test_message_bound_is_the_shared_one() {
        // A full display always fits; the first length past the shared
        // bound is refused host-side instead of stalling on the wire
        assert!(message_fits(DISPLAY_CELLS));
        assert!(message_fits(MAX_MESSAGE_LEN));
        assert!(!message_fits(MAX_MESSAGE_LEN + 1));
        assert!(!message_fits(u16::MAX as usize + 1));
    }
}
