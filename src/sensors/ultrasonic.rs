//! HC-SR04 ultrasonic ranger driver.
//!
//! A 10 µs HIGH pulse on TRIG starts a measurement; the module then holds
//! ECHO HIGH for the round-trip time of flight.  Distance is half the
//! round trip at 0.034 cm/µs, truncated to whole centimetres.
//!
//! The echo wait is bounded by `timeout_us`, measured from the moment the
//! trigger pulse ends and covering both the wait for the rising edge and
//! the pulse itself.  No echo inside that window yields
//! [`DistanceSample::NoEcho`]; the driver never blocks longer.
//!
//! Generic over `embedded-hal` pins and delay so the timing logic runs on
//! the host against simulated lines.  Trigger delays are microsecond
//! precise on the device (`esp_rom_delay_us`); any slack there biases the
//! reading.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use log::debug;

use super::DistanceSample;
use crate::app::ports::{ProximityPort, TimePort};
use crate::error::SensorError;

/// Speed of sound, cm per µs (≈ 340 m/s).
pub const SPEED_OF_SOUND_CM_PER_US: f32 = 0.034;

/// Settle time with TRIG held LOW before the pulse.
const TRIGGER_SETTLE_US: u32 = 2;
/// Width of the TRIG pulse.
const TRIGGER_PULSE_US: u32 = 10;

/// Convert an echo pulse width to centimetres (round trip halved).
pub fn pulse_to_cm(width_us: u32) -> i32 {
    (width_us as f32 * SPEED_OF_SOUND_CM_PER_US / 2.0) as i32
}

pub struct Ultrasonic<T, E, D, C> {
    trig: T,
    echo: E,
    delay: D,
    clock: C,
    timeout_us: u32,
}

impl<T, E, D, C> Ultrasonic<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: TimePort,
{
    pub fn new(trig: T, echo: E, delay: D, clock: C, timeout_us: u32) -> Self {
        Self {
            trig,
            echo,
            delay,
            clock,
            timeout_us,
        }
    }

    /// Fire one trigger pulse and return the echo pulse width in µs.
    pub fn measure_pulse(&mut self) -> Result<u32, SensorError> {
        self.trig.set_low().map_err(|_| SensorError::TriggerFailed)?;
        self.delay.delay_us(TRIGGER_SETTLE_US);
        self.trig.set_high().map_err(|_| SensorError::TriggerFailed)?;
        self.delay.delay_us(TRIGGER_PULSE_US);
        self.trig.set_low().map_err(|_| SensorError::TriggerFailed)?;

        let deadline = self.clock.now_us() + u64::from(self.timeout_us);

        // Wait for the rising edge.
        while !self.echo_high()? {
            if self.clock.now_us() >= deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        let rise = self.clock.now_us();

        // Time the pulse.
        while self.echo_high()? {
            if self.clock.now_us() >= deadline {
                return Err(SensorError::EchoTimeout);
            }
        }
        let fall = self.clock.now_us();

        Ok(fall.saturating_sub(rise) as u32)
    }

    fn echo_high(&mut self) -> Result<bool, SensorError> {
        self.echo.is_high().map_err(|_| SensorError::EchoReadFailed)
    }

    /// Release the pins and delay.
    pub fn release(self) -> (T, E, D, C) {
        (self.trig, self.echo, self.delay, self.clock)
    }
}

impl<T, E, D, C> ProximityPort for Ultrasonic<T, E, D, C>
where
    T: OutputPin,
    E: InputPin,
    D: DelayNs,
    C: TimePort,
{
    fn measure_distance(&mut self) -> DistanceSample {
        match self.measure_pulse() {
            Ok(width_us) => DistanceSample::Cm(pulse_to_cm(width_us)),
            Err(e) => {
                debug!("ultrasonic: {}", e);
                DistanceSample::NoEcho
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;
    use std::rc::Rc;

    /// Simulated microsecond timeline shared by the pins, delay and clock.
    #[derive(Clone, Default)]
    struct Timeline {
        now: Rc<Cell<u64>>,
        trig_fell_at: Rc<Cell<Option<u64>>>,
        trig_high: Rc<Cell<bool>>,
    }

    struct SimTrig(Timeline);
    struct SimEcho {
        t: Timeline,
        /// (delay after trigger, pulse width); None = no echo.
        echo: Option<(u64, u64)>,
    }
    struct SimDelay(Timeline);
    struct SimClock(Timeline);

    impl embedded_hal::digital::ErrorType for SimTrig {
        type Error = Infallible;
    }
    impl OutputPin for SimTrig {
        fn set_low(&mut self) -> Result<(), Infallible> {
            if self.0.trig_high.get() {
                self.0.trig_fell_at.set(Some(self.0.now.get()));
            }
            self.0.trig_high.set(false);
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.trig_high.set(true);
            Ok(())
        }
    }

    impl embedded_hal::digital::ErrorType for SimEcho {
        type Error = Infallible;
    }
    impl InputPin for SimEcho {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            // Every poll costs one microsecond.
            let now = self.t.now.get() + 1;
            self.t.now.set(now);
            let high = match (self.t.trig_fell_at.get(), self.echo) {
                (Some(t0), Some((lead, width))) => now >= t0 + lead && now < t0 + lead + width,
                _ => false,
            };
            Ok(high)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|h| !h)
        }
    }

    impl DelayNs for SimDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.0.now.set(self.0.now.get() + u64::from(ns.div_ceil(1000)));
        }
    }

    impl TimePort for SimClock {
        fn now_us(&self) -> u64 {
            self.0.now.get()
        }
    }

    fn sensor(echo: Option<(u64, u64)>) -> Ultrasonic<SimTrig, SimEcho, SimDelay, SimClock> {
        let t = Timeline::default();
        Ultrasonic::new(
            SimTrig(t.clone()),
            SimEcho { t: t.clone(), echo },
            SimDelay(t.clone()),
            SimClock(t),
            30_000,
        )
    }

    #[test]
    fn conversion_matches_speed_of_sound() {
        assert_eq!(pulse_to_cm(0), 0);
        assert_eq!(pulse_to_cm(1000), 17);
        assert_eq!(pulse_to_cm(8824), 150);
        // Truncation, not rounding.
        assert_eq!(pulse_to_cm(1175), 19);
    }

    #[test]
    fn measures_echo_width() {
        let mut s = sensor(Some((200, 1000)));
        let width = s.measure_pulse().unwrap();
        assert!((999..=1001).contains(&width), "width={width}");
        assert_eq!(s.measure_distance(), DistanceSample::Cm(17));
    }

    #[test]
    fn no_echo_is_sentinel() {
        let mut s = sensor(None);
        assert_eq!(s.measure_pulse(), Err(SensorError::EchoTimeout));
        assert_eq!(s.measure_distance(), DistanceSample::NoEcho);
    }

    #[test]
    fn pulse_longer_than_window_times_out() {
        let mut s = sensor(Some((100, 40_000)));
        assert_eq!(s.measure_pulse(), Err(SensorError::EchoTimeout));
    }

    #[test]
    fn wait_is_bounded_by_timeout() {
        let mut s = sensor(None);
        let _ = s.measure_distance();
        let (_, _, _, clock) = s.release();
        // Trigger sequence (12 µs) + window + one final poll.
        assert!(clock.now_us() <= 12 + 30_000 + 1);
    }

    #[test]
    fn trigger_pulse_is_ten_microseconds() {
        let t = Timeline::default();
        let mut trig = SimTrig(t.clone());
        let mut delay = SimDelay(t.clone());
        trig.set_low().unwrap();
        delay.delay_us(TRIGGER_SETTLE_US);
        trig.set_high().unwrap();
        let rose = t.now.get();
        delay.delay_us(TRIGGER_PULSE_US);
        trig.set_low().unwrap();
        assert_eq!(t.trig_fell_at.get(), Some(rose + 10));
    }
}
