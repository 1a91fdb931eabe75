//! Board-agnostic device-side logic for the marquee firmware
//!
//! This crate contains everything the firmware does that does not depend on
//! specific hardware:
//!
//! - Display surface abstraction (clear + write one byte at the cursor)
//! - In-RAM line buffer implementing that surface
//! - Receive state machine driven by the USB transport's two callbacks
//!
//! The state machine is deliberately transport-agnostic: the firmware's
//! control-request handler calls [`Receiver::on_command_header`] when a setup
//! packet arrives and [`Receiver::on_data_chunk`] for the data stage, in one
//! or more chunks. Tests drive the same entry points with a capturing stub
//! surface instead of real hardware.

#![no_std]
#![deny(unsafe_code)]

pub mod receiver;
pub mod surface;

pub use receiver::{ChunkOutcome, Receiver, ReceiverState, SetupDisposition};
pub use surface::{DisplaySurface, LineBuffer};
