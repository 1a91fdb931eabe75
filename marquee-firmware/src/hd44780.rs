//! HD44780 character LCD driver
//!
//! Drives a 16x2 HD44780-compatible module behind a PCF8574 I2C expander
//! in 4-bit mode. Only what the marquee needs: init, clear, cursor
//! positioning, and raw byte output.

use embassy_time::Timer;

/// PCF8574 backpack I2C address (typically 0x27 or 0x3F)
const LCD_ADDR: u8 = 0x27;

/// Expander bit assignments (standard backpack wiring)
const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

/// HD44780 commands
#[allow(dead_code)]
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const HOME: u8 = 0x02;
    pub const ENTRY_MODE: u8 = 0x06; // increment, no shift
    pub const DISPLAY_OFF: u8 = 0x08;
    pub const DISPLAY_ON: u8 = 0x0C; // display on, cursor off
    pub const FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x8 font
    pub const SET_DDRAM: u8 = 0x80;
}

/// DDRAM start address per row
const ROW_OFFSETS: [u8; 2] = [0x00, 0x40];

/// HD44780 driver over an I2C expander
pub struct Hd44780<I2C> {
    i2c: I2C,
}

impl<I2C> Hd44780<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Initialize the controller into 4-bit mode
    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        // Power-on settle time
        Timer::after_millis(50).await;

        // Magic 8-bit -> 4-bit switch sequence from the datasheet
        self.write_nibble(0x30, 0).await?;
        Timer::after_millis(5).await;
        self.write_nibble(0x30, 0).await?;
        Timer::after_micros(150).await;
        self.write_nibble(0x30, 0).await?;
        Timer::after_micros(150).await;
        self.write_nibble(0x20, 0).await?;
        Timer::after_micros(150).await;

        self.command(cmd::FUNCTION_SET).await?;
        self.command(cmd::DISPLAY_OFF).await?;
        self.clear().await?;
        self.command(cmd::ENTRY_MODE).await?;
        self.command(cmd::DISPLAY_ON).await?;

        Ok(())
    }

    /// Blank the display and return the cursor home
    pub async fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(cmd::CLEAR).await?;
        // Clear is the slowest instruction on this controller
        Timer::after_millis(2).await;
        Ok(())
    }

    /// Move the cursor to a row/column
    pub async fn goto(&mut self, row: u8, col: u8) -> Result<(), I2C::Error> {
        let row = (row as usize).min(ROW_OFFSETS.len() - 1);
        self.command(cmd::SET_DDRAM | (ROW_OFFSETS[row] + col)).await
    }

    /// Write one byte at the cursor; the controller advances it
    pub async fn write_byte(&mut self, byte: u8) -> Result<(), I2C::Error> {
        self.write_split(byte, RS).await
    }

    /// Write a run of bytes at the cursor
    pub async fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), I2C::Error> {
        for &byte in bytes {
            self.write_byte(byte).await?;
        }
        Ok(())
    }

    async fn command(&mut self, command: u8) -> Result<(), I2C::Error> {
        self.write_split(command, 0).await
    }

    /// Send one byte as two nibbles with the given control flags
    async fn write_split(&mut self, byte: u8, flags: u8) -> Result<(), I2C::Error> {
        self.write_nibble(byte & 0xF0, flags).await?;
        self.write_nibble(byte << 4, flags).await
    }

    /// Put a nibble on the bus and strobe EN
    async fn write_nibble(&mut self, nibble: u8, flags: u8) -> Result<(), I2C::Error> {
        let bits = nibble | flags | BACKLIGHT;
        self.i2c.write(LCD_ADDR, &[bits | EN]).await?;
        Timer::after_micros(1).await;
        self.i2c.write(LCD_ADDR, &[bits]).await?;
        Timer::after_micros(50).await;
        Ok(())
    }
}
