//! GPIO / peripheral pin assignments for the flood monitor board (ESP32).
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Sensors, digital
// ---------------------------------------------------------------------------

/// DHT22 humidity/temperature sensor, single-wire open-drain data line.
pub const DHT_GPIO: i32 = 22;

/// HC-SR04 ultrasonic ranger: trigger output (10 µs pulse).
pub const ULTRASONIC_TRIG_GPIO: i32 = 5;
/// HC-SR04 ultrasonic ranger: echo input (pulse width = round trip).
pub const ULTRASONIC_ECHO_GPIO: i32 = 18;

/// PIR motion sensor output. HIGH = motion.
pub const PIR_GPIO: i32 = 19;

// ---------------------------------------------------------------------------
// Sensors, analog (ADC1)
// ---------------------------------------------------------------------------

/// LDR voltage divider.  GPIO 34 = ADC1 channel 6 (input-only pin).
pub const LDR_ADC_GPIO: i32 = 34;
pub const LDR_ADC1_CHANNEL: u32 = 6;
/// Full-scale reading of the 12-bit ADC.
pub const ADC_FULL_SCALE: u16 = 4095;

// ---------------------------------------------------------------------------
// Buzzer (passive piezo, LEDC tone)
// ---------------------------------------------------------------------------

pub const BUZZER_GPIO: i32 = 4;
/// LEDC duty resolution for the buzzer (bits).  50 % duty = 512.
pub const BUZZER_PWM_RESOLUTION_BITS: u32 = 10;

// ---------------------------------------------------------------------------
// I²C bus (16×2 LCD via PCF8574 backpack)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 23;
pub const I2C_FREQ_HZ: u32 = 100_000;
pub const LCD_I2C_ADDR: u8 = 0x27;
