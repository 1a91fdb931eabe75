//! Vendor control-request handling
//!
//! The whole protocol rides on endpoint 0: the setup packet is the command
//! header, the OUT data stage is the message. This handler decodes the
//! header and drives the core receiver; rendering happens elsewhere so the
//! control pipe never waits on the I2C bus.

use defmt::*;
use embassy_usb::control::{OutResponse, Recipient, Request, RequestType};
use embassy_usb::Handler;

use marquee_core::{Receiver, SetupDisposition};
use marquee_protocol::CommandHeader;

use crate::{LINE, REFRESH};

/// Control handler owning the receive state machine
pub struct VendorHandler {
    receiver: Receiver,
}

impl VendorHandler {
    pub const fn new() -> Self {
        Self {
            receiver: Receiver::new(),
        }
    }
}

impl Handler for VendorHandler {
    fn reset(&mut self) {
        // Bus reset (including one forced by the watchdog rebooting us)
        // abandons any in-flight operation
        self.receiver = Receiver::new();
    }

    fn control_out(&mut self, req: Request, data: &[u8]) -> Option<OutResponse> {
        if req.request_type != RequestType::Vendor || req.recipient != Recipient::Device {
            return None;
        }

        let Some(header) = CommandHeader::parse(req.request, req.length) else {
            // Unknown vendor request: complete the transfer, touch nothing
            trace!("ignoring vendor request {=u8:x}", req.request);
            return Some(OutResponse::Accepted);
        };

        debug!("command {:?}, declared {=u16} bytes", header.request, header.declared_len);

        LINE.lock(|line| {
            let mut line = line.borrow_mut();
            if let SetupDisposition::NeedsData =
                self.receiver.on_command_header(header, &mut *line)
            {
                // embassy-usb hands over the whole data stage in one chunk
                let outcome = self.receiver.on_data_chunk(data, &mut *line);
                if !outcome.complete {
                    warn!(
                        "data stage ended short of the declared {=u16} bytes",
                        header.declared_len
                    );
                }
            }
        });

        REFRESH.signal(());
        Some(OutResponse::Accepted)
    }
}
