//! PIR motion sensor (HC-SR501 style): digital HIGH while motion is seen.

use embedded_hal::digital::InputPin;
use log::debug;

use super::MotionDetector;

pub struct PirSensor<P> {
    pin: P,
}

impl<P: InputPin> PirSensor<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> MotionDetector for PirSensor<P> {
    /// A failed pin read counts as "no motion".
    fn motion(&mut self) -> bool {
        self.pin.is_high().unwrap_or_else(|_| {
            debug!("PIR: GPIO read failed");
            false
        })
    }
}
