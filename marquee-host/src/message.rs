//! Message assembly from command-line tokens
//!
//! Tokens are joined with single spaces into one payload; the device is the
//! side that truncates, so nothing is trimmed or escaped here. An empty token
//! list selects the clear operation instead of an empty message.

use thiserror::Error;

/// Errors while building the payload, before any transfer is attempted
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not allocate {0} bytes for the message payload")]
    Alloc(usize),
}

/// The single operation one invocation performs
#[derive(Debug, PartialEq, Eq)]
pub enum Operation {
    /// Send the payload to the display
    Show(Vec<u8>),
    /// Blank the display
    Clear,
}

impl Operation {
    /// Decide the operation from the command-line tokens
    pub fn from_tokens(tokens: &[String]) -> Result<Self, BuildError> {
        if tokens.is_empty() {
            Ok(Operation::Clear)
        } else {
            build_payload(tokens).map(Operation::Show)
        }
    }
}

/// Join tokens with single space separators, no trailing separator
///
/// The result length is exactly `sum(len(token)) + count - 1`. Allocation is
/// reserved up front so failure aborts the operation before any bytes move.
fn build_payload(tokens: &[String]) -> Result<Vec<u8>, BuildError> {
    let size = tokens.iter().map(String::len).sum::<usize>() + tokens.len() - 1;

    let mut payload = Vec::new();
    payload
        .try_reserve_exact(size)
        .map_err(|_| BuildError::Alloc(size))?;

    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            payload.push(b' ');
        }
        payload.extend_from_slice(token.as_bytes());
    }

    debug_assert_eq!(payload.len(), size);
    Ok(payload)
}
