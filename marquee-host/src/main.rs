//! marquee - push a line of text to a USB character display
//!
//! Usage:
//!   marquee                # Clear the display
//!   marquee <text>...      # Show the text, arguments joined by spaces
//!
//! One invocation performs exactly one operation: it opens the device,
//! issues a single vendor control transfer, and exits. All failures are
//! terminal; there is no retry.

mod device;
mod message;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use crate::device::Display;
use crate::message::Operation;

/// Push a line of text to the marquee USB display
///
/// With no TEXT arguments the display is cleared instead.
#[derive(Parser)]
#[command(name = "marquee", version, about)]
struct Cli {
    /// Text to show; multiple arguments are joined with single spaces
    text: Vec<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    // Build the payload first; an allocation failure must abort before any
    // transfer is attempted
    let operation = Operation::from_tokens(&cli.text)?;

    let display = Display::open().context("could not open the display")?;

    match operation {
        Operation::Show(payload) => {
            info!(
                "setting display text to: {}",
                String::from_utf8_lossy(&payload)
            );
            display
                .show(&payload)
                .context("control transfer did not complete")?;
        }
        Operation::Clear => {
            info!("clearing display");
            display
                .clear()
                .context("control transfer did not complete")?;
        }
    }

    Ok(())
}
