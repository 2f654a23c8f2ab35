//! Hardware adapter: bridges the board's drivers to the domain ports.
//!
//! Owns the proximity sensor and all three actuator drivers, exposing
//! them through [`ProximityPort`] and [`ActuatorPort`].  The actuator
//! port is infallible, so a line error is logged and the driver keeps
//! its previous state.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::actuation::{PropulsionState, SteerState};
use crate::adapters::time::{Esp32TimeAdapter, SystemDelay};
use crate::app::ports::{ActuatorPort, ProximityPort};
use crate::config::SystemConfig;
use crate::drivers::brake_led::BrakeLed;
use crate::drivers::hw_init::{GpioInput, GpioOutput};
use crate::drivers::motor::MotorDriver;
use crate::drivers::steering::SteeringDriver;
use crate::pins;
use crate::sensors::DistanceSample;
use crate::sensors::ultrasonic::Ultrasonic;

/// HC-SR04 wired to the board GPIOs.
pub type BoardRanger = Ultrasonic<GpioOutput, GpioInput, SystemDelay, Esp32TimeAdapter>;

/// The adapter as wired on the vehicle.
pub type BoardHardware = HardwareAdapter<BoardRanger, GpioOutput>;

/// Concrete adapter that combines the sensor and actuators behind ports.
pub struct HardwareAdapter<S, P> {
    ranger: S,
    motor: MotorDriver<P>,
    steering: SteeringDriver<P>,
    brake_led: BrakeLed<P>,
}

impl<S, P> HardwareAdapter<S, P>
where
    S: ProximityPort,
    P: OutputPin,
{
    pub fn new(
        ranger: S,
        motor: MotorDriver<P>,
        steering: SteeringDriver<P>,
        brake_led: BrakeLed<P>,
    ) -> Self {
        Self {
            ranger,
            motor,
            steering,
            brake_led,
        }
    }

    pub fn motor(&self) -> &MotorDriver<P> {
        &self.motor
    }

    pub fn steering(&self) -> &SteeringDriver<P> {
        &self.steering
    }

    pub fn brake_led(&self) -> &BrakeLed<P> {
        &self.brake_led
    }
}

impl BoardHardware {
    /// Wire the drivers to the pins in [`pins`].  Call after
    /// `hw_init::init_peripherals()`.
    pub fn from_board(config: &SystemConfig) -> Self {
        let ranger = Ultrasonic::new(
            GpioOutput::new(pins::TRIG_GPIO),
            GpioInput::new(pins::ECHO_GPIO),
            SystemDelay::new(),
            Esp32TimeAdapter::new(),
            config.echo_timeout_us,
        );
        // GpioOutput is infallible.
        let Ok(motor) = MotorDriver::new(
            GpioOutput::new(pins::MOTOR_A1_GPIO),
            GpioOutput::new(pins::MOTOR_A2_GPIO),
        );
        let Ok(steering) = SteeringDriver::new(
            GpioOutput::new(pins::STEER_LEFT_GPIO),
            GpioOutput::new(pins::STEER_RIGHT_GPIO),
        );
        let Ok(brake_led) = BrakeLed::new(GpioOutput::new(pins::BRAKE_LED_GPIO));
        Self::new(ranger, motor, steering, brake_led)
    }
}

// ── ProximityPort implementation ──────────────────────────────

impl<S, P> ProximityPort for HardwareAdapter<S, P>
where
    S: ProximityPort,
    P: OutputPin,
{
    fn measure_distance(&mut self) -> DistanceSample {
        let sample = self.ranger.measure_distance();
        debug!("Distance: {}", sample);
        sample
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<S, P> ActuatorPort for HardwareAdapter<S, P>
where
    S: ProximityPort,
    P: OutputPin,
{
    fn set_propulsion(&mut self, state: PropulsionState) {
        if let Err(e) = self.motor.set(state) {
            warn!("motor: failed to apply {:?}: {:?}", state, e);
        }
    }

    fn set_steering(&mut self, state: SteerState) {
        if let Err(e) = self.steering.set(state) {
            warn!("steering: failed to apply {:?}: {:?}", state, e);
        }
    }

    fn set_brake_indicator(&mut self, on: bool) {
        if let Err(e) = self.brake_led.set(on) {
            warn!("brake LED: failed to set {}: {:?}", on, e);
        }
    }
}
