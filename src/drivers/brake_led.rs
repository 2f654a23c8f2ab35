//! Brake indicator LED (single GPIO, active HIGH).

use embedded_hal::digital::OutputPin;

pub struct BrakeLed<P> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> BrakeLed<P> {
    /// Take the line and switch the LED off.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, on: false })
    }

    /// Light or clear the indicator; `Ok(false)` if already there.
    pub fn set(&mut self, on: bool) -> Result<bool, P::Error> {
        if on == self.on {
            return Ok(false);
        }
        if on {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(true)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
