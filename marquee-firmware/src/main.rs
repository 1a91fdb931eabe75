//! Marquee display firmware
//!
//! Firmware for an RP2040 with an HD44780 16x2 character module on I2C.
//! The device enumerates as a vendor-class USB device and renders whatever
//! the `marquee` host tool pushes at it. A hardware watchdog reboots the
//! chip if the executor ever wedges; the display and receiver state are
//! rebuilt from scratch on boot, so an abrupt reset loses nothing that
//! matters.

#![no_std]
#![no_main]

mod hd44780;
mod usb;

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_futures::join::join;
use embassy_rp::bind_interrupts;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::{I2C0, USB};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_rp::watchdog::Watchdog;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use embassy_usb::Builder;
use {defmt_rtt as _, panic_probe as _};

use marquee_core::LineBuffer;
use marquee_protocol::{
    DISPLAY_ROWS, MANUFACTURER, MAX_MESSAGE_LEN, PRODUCT, PRODUCT_ID, VENDOR_ID,
};

use crate::hd44780::Hd44780;
use crate::usb::VendorHandler;

bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// RAM copy of the display; written by the control handler, flushed to the
/// LCD by `display_task`
pub(crate) static LINE: Mutex<CriticalSectionRawMutex, RefCell<LineBuffer>> =
    Mutex::new(RefCell::new(LineBuffer::new()));

/// Wakes `display_task` after the handler changed [`LINE`]
pub(crate) static REFRESH: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Watchdog window; a stalled executor reboots the chip after this long
const WATCHDOG_TIMEOUT_MS: u64 = 1_000;

/// How often the main loop feeds the watchdog
const WATCHDOG_FEED_MS: u64 = 250;

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("marquee firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Arm the watchdog before anything that can block. This is the only
    // recovery mechanism for a wedged device.
    let mut watchdog = Watchdog::new(p.WATCHDOG);
    watchdog.start(Duration::from_millis(WATCHDOG_TIMEOUT_MS));

    // LCD on I2C0 (GP4=SDA, GP5=SCL)
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, i2c::Config::default());
    let mut lcd = Hd44780::new(i2c);
    match lcd.init().await {
        Ok(()) => {
            info!("LCD initialized");
            lcd.write_bytes(b"marquee").await.ok();
            lcd.goto(1, 0).await.ok();
            lcd.write_bytes(b"ready").await.ok();
        }
        Err(_) => error!("failed to initialize LCD"),
    }

    // USB device, vendor class, control endpoint only
    let driver = Driver::new(p.USB, Irqs);

    let mut config = embassy_usb::Config::new(VENDOR_ID, PRODUCT_ID);
    config.manufacturer = Some(MANUFACTURER);
    config.product = Some(PRODUCT);
    config.max_power = 100;
    config.max_packet_size_0 = 64;

    let mut config_descriptor = [0; 64];
    let mut bos_descriptor = [0; 16];
    // Holds one transfer's data stage. Anything up to the shared message
    // bound completes and gets truncated on the render side; the control
    // pipe only rejects declared lengths the host never sends.
    let mut control_buf = [0; MAX_MESSAGE_LEN];

    let mut handler = VendorHandler::new();

    let mut builder = Builder::new(
        driver,
        config,
        &mut config_descriptor,
        &mut bos_descriptor,
        &mut [], // no msos descriptors
        &mut control_buf,
    );

    // One vendor interface with no endpoints; everything rides on EP0
    let mut function = builder.function(0xFF, 0x00, 0x00);
    let mut interface = function.interface();
    let _alt = interface.alt_setting(0xFF, 0x00, 0x00, None);
    drop(function);

    builder.handler(&mut handler);

    let mut device = builder.build();

    spawner.spawn(display_task(lcd)).unwrap();

    // Run the USB device alongside the watchdog feed loop
    let feed = async {
        let mut ticker = Ticker::every(Duration::from_millis(WATCHDOG_FEED_MS));
        loop {
            ticker.next().await;
            watchdog.feed();
        }
    };

    join(device.run(), feed).await;
}

/// Flushes [`LINE`] to the LCD whenever the control handler signals
#[embassy_executor::task]
async fn display_task(mut lcd: Hd44780<I2c<'static, I2C0, i2c::Async>>) {
    info!("display task started");

    loop {
        REFRESH.wait().await;

        // Snapshot under the lock, render outside it
        let snapshot = LINE.lock(|line| line.borrow().clone());

        if render(&mut lcd, &snapshot).await.is_err() {
            warn!("LCD write failed, dropping frame");
        }
    }
}

async fn render<I2C>(lcd: &mut Hd44780<I2C>, line: &LineBuffer) -> Result<(), I2C::Error>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    lcd.clear().await?;
    for row in 0..DISPLAY_ROWS {
        let cells = line.row(row);
        if !cells.is_empty() {
            lcd.goto(row, 0).await?;
            lcd.write_bytes(cells).await?;
        }
    }
    Ok(())
}
