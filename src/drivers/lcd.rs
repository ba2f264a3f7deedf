//! 16×2 HD44780 character LCD behind a PCF8574 I²C backpack.
//!
//! The expander drives the controller in 4-bit mode.  Each expander byte
//! carries one nibble on P4–P7 plus the control lines:
//!
//! ```text
//!  P7  P6  P5  P4  P3  P2  P1  P0
//!  D7  D6  D5  D4  BL  EN  RW  RS
//! ```
//!
//! A nibble is latched on the falling edge of EN.  RW is held low (write
//! only), so the busy flag is never read; fixed delays cover execution time.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

pub use crate::app::dispatch::LCD_COLS;
use crate::error::DisplayError;

pub const LCD_ROWS: usize = 2;

const RS: u8 = 0x01;
const EN: u8 = 0x04;
const BACKLIGHT: u8 = 0x08;

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

/// DDRAM start address of each row.
const ROW_OFFSETS: [u8; LCD_ROWS] = [0x00, 0x40];

pub struct Lcd1602<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C: I2c, D: DelayNs> Lcd1602<I2C, D> {
    /// Does not touch the bus; call [`init`](Self::init) before writing.
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
        }
    }

    /// The underlying bus, for inspection.
    pub fn bus(&self) -> &I2C {
        &self.i2c
    }

    /// Power-on reset into 4-bit, 2-line mode with the backlight on.
    pub fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_ms(50);

        // "Initialisation by instruction": three 8-bit function sets, then 4-bit.
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(4_500);
        self.write_nibble(0x03, 0)?;
        self.delay.delay_us(150);
        self.write_nibble(0x02, 0)?;

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)?;

        info!("LCD: initialised at 0x{:02X}", self.address);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(2_000);
        Ok(())
    }

    pub fn set_cursor(&mut self, col: u8, row: usize) -> Result<(), DisplayError> {
        let offset = ROW_OFFSETS[row.min(LCD_ROWS - 1)];
        self.command(CMD_SET_DDRAM | (offset + col.min(LCD_COLS as u8 - 1)))
    }

    /// Clear, then write both rows padded (or cut) to 16 columns.
    pub fn write_lines(&mut self, line1: &str, line2: &str) -> Result<(), DisplayError> {
        self.clear()?;
        for (row, text) in [line1, line2].into_iter().enumerate() {
            self.set_cursor(0, row)?;
            self.write_row(text)?;
        }
        debug!("LCD: [{}] [{}]", line1, line2);
        Ok(())
    }

    fn write_row(&mut self, text: &str) -> Result<(), DisplayError> {
        let mut chars = text.chars();
        for _ in 0..LCD_COLS {
            // The character ROM only covers ASCII reliably.
            let byte = match chars.next() {
                Some(c) if c.is_ascii() && !c.is_ascii_control() => c as u8,
                Some(_) => b'?',
                None => b' ',
            };
            self.send(byte, RS)?;
        }
        Ok(())
    }

    fn command(&mut self, cmd: u8) -> Result<(), DisplayError> {
        self.send(cmd, 0)
    }

    fn send(&mut self, byte: u8, mode: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4, mode)?;
        self.write_nibble(byte & 0x0F, mode)
    }

    fn write_nibble(&mut self, nibble: u8, mode: u8) -> Result<(), DisplayError> {
        let data = (nibble << 4) | BACKLIGHT | mode;
        self.expander_write(data | EN)?;
        self.delay.delay_us(1);
        self.expander_write(data & !EN)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn expander_write(&mut self, data: u8) -> Result<(), DisplayError> {
        self.i2c
            .write(self.address, &[data])
            .map_err(|_| DisplayError::BusWrite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation};

    #[derive(Default)]
    struct BusLog {
        frames: Vec<(u8, u8)>,
        fail: bool,
    }

    impl ErrorType for BusLog {
        type Error = ErrorKind;
    }

    impl I2c for BusLog {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), ErrorKind> {
            if self.fail {
                return Err(ErrorKind::Other);
            }
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.frames.extend(bytes.iter().map(|b| (address, *b)));
                }
            }
            Ok(())
        }
    }

    struct NoDelay;
    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// Reassemble (rs, byte) pairs from the latched (EN-high) nibbles.
    fn decode(frames: &[(u8, u8)]) -> Vec<(bool, u8)> {
        let latched: Vec<u8> = frames
            .iter()
            .map(|&(_, b)| b)
            .filter(|b| b & EN != 0)
            .collect();
        latched
            .chunks(2)
            .map(|pair| (pair[0] & RS != 0, (pair[0] & 0xF0) | (pair[1] >> 4)))
            .collect()
    }

    fn lcd() -> Lcd1602<BusLog, NoDelay> {
        Lcd1602::new(BusLog::default(), NoDelay, 0x27)
    }

    #[test]
    fn new_does_not_touch_bus() {
        assert!(lcd().i2c.frames.is_empty());
    }

    #[test]
    fn init_sequence_ends_in_4bit_mode() {
        let mut lcd = lcd();
        lcd.init().unwrap();
        let latched: Vec<u8> = lcd
            .i2c
            .frames
            .iter()
            .map(|&(_, b)| b)
            .filter(|b| b & EN != 0)
            .collect();
        // Four single nibbles, then whole commands.
        assert_eq!(latched[..4].iter().map(|b| b >> 4).collect::<Vec<_>>(), [3, 3, 3, 2]);
        let cmds = decode(&lcd.i2c.frames[8..]);
        assert_eq!(
            cmds,
            vec![
                (false, CMD_FUNCTION_4BIT_2LINE),
                (false, CMD_DISPLAY_ON),
                (false, CMD_CLEAR),
                (false, CMD_ENTRY_MODE_INC),
            ]
        );
        assert!(lcd.i2c.frames.iter().all(|&(addr, b)| addr == 0x27 && b & BACKLIGHT != 0));
    }

    #[test]
    fn write_lines_pads_both_rows() {
        let mut lcd = lcd();
        lcd.write_lines("Flood Monitor", "Starting...").unwrap();
        let sent = decode(&lcd.i2c.frames);

        assert_eq!(sent[0], (false, CMD_CLEAR));
        assert_eq!(sent[1], (false, CMD_SET_DDRAM));
        let row1: String = sent[2..18].iter().map(|&(_, b)| b as char).collect();
        assert_eq!(row1, "Flood Monitor   ");
        assert_eq!(sent[18], (false, CMD_SET_DDRAM | 0x40));
        let row2: String = sent[19..35].iter().map(|&(_, b)| b as char).collect();
        assert_eq!(row2, "Starting...     ");
        assert!(sent[2..18].iter().all(|&(rs, _)| rs));
        assert_eq!(sent.len(), 35);
    }

    #[test]
    fn long_and_non_ascii_text_is_cut() {
        let mut lcd = lcd();
        lcd.write_lines("0123456789abcdefXYZ", "T:25°C").unwrap();
        let sent = decode(&lcd.i2c.frames);
        let row1: String = sent[2..18].iter().map(|&(_, b)| b as char).collect();
        assert_eq!(row1, "0123456789abcdef");
        let row2: String = sent[19..35].iter().map(|&(_, b)| b as char).collect();
        assert_eq!(row2, "T:25?C          ");
    }

    #[test]
    fn bus_error_maps_to_display_error() {
        let mut lcd = Lcd1602::new(
            BusLog {
                fail: true,
                ..Default::default()
            },
            NoDelay,
            0x27,
        );
        assert_eq!(lcd.init(), Err(DisplayError::BusWrite));
        assert_eq!(lcd.write_lines("a", "b"), Err(DisplayError::BusWrite));
    }
}
