//! Vendor request codes and setup-packet decoding

/// Wire value of the "show message" request
pub const REQ_SHOW_MESSAGE: u8 = 0x01;

/// Wire value of the "clear display" request
pub const REQ_CLEAR: u8 = 0x02;

/// Commands carried in the `bRequest` field of the control transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Request {
    /// A message follows in the data stage; `wLength` gives its size
    ShowMessage,
    /// Blank the display; no data stage
    Clear,
}

impl Request {
    /// Parse a request from its wire byte
    ///
    /// Returns `None` for any other value. The device treats unknown
    /// requests as no-ops: it neither arms its receiver nor returns data.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            REQ_SHOW_MESSAGE => Some(Request::ShowMessage),
            REQ_CLEAR => Some(Request::Clear),
            _ => None,
        }
    }

    /// Convert to the wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Request::ShowMessage => REQ_SHOW_MESSAGE,
            Request::Clear => REQ_CLEAR,
        }
    }
}

/// Decoded command header of one control transfer
///
/// `declared_len` is the payload size the host commits to before the data
/// stage. It is meaningful only for [`Request::ShowMessage`]; for
/// [`Request::Clear`] the field is carried but ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandHeader {
    pub request: Request,
    pub declared_len: u16,
}

impl CommandHeader {
    /// Decode the relevant setup-packet fields
    ///
    /// Returns `None` when `b_request` is not one of ours; the caller should
    /// complete the transfer without doing anything.
    pub fn parse(b_request: u8, w_length: u16) -> Option<Self> {
        Request::from_byte(b_request).map(|request| Self {
            request,
            declared_len: w_length,
        })
    }
}
