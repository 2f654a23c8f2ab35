//! GPIO / peripheral pin assignments for the AI-Thinker ESP32-CAM board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// HC-SR04 ultrasonic ranger
// ---------------------------------------------------------------------------

/// Digital output: trigger pulse (10 µs HIGH starts a measurement).
pub const TRIG_GPIO: i32 = 12;
/// Digital input: echo pulse, HIGH for the round-trip time of flight.
pub const ECHO_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Propulsion motor (two-line H-bridge)
// ---------------------------------------------------------------------------

/// HIGH drives the motor forward.
pub const MOTOR_A1_GPIO: i32 = 25;
/// HIGH drives the motor in reverse.
pub const MOTOR_A2_GPIO: i32 = 26;

// ---------------------------------------------------------------------------
// Steering (two-line, left / right)
// ---------------------------------------------------------------------------

pub const STEER_LEFT_GPIO: i32 = 14;
pub const STEER_RIGHT_GPIO: i32 = 27;

// ---------------------------------------------------------------------------
// Brake indicator LED
// ---------------------------------------------------------------------------

pub const BRAKE_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// OV2640 camera (AI-Thinker pinout).  -1 = not connected.
// ---------------------------------------------------------------------------

pub const CAM_PWDN_GPIO: i32 = 32;
pub const CAM_RESET_GPIO: i32 = -1;
pub const CAM_XCLK_GPIO: i32 = 0;
pub const CAM_SIOD_GPIO: i32 = 26;
pub const CAM_SIOC_GPIO: i32 = 27;
pub const CAM_Y9_GPIO: i32 = 35;
pub const CAM_Y8_GPIO: i32 = 34;
pub const CAM_Y7_GPIO: i32 = 39;
pub const CAM_Y6_GPIO: i32 = 36;
pub const CAM_Y5_GPIO: i32 = 21;
pub const CAM_Y4_GPIO: i32 = 19;
pub const CAM_Y3_GPIO: i32 = 18;
pub const CAM_Y2_GPIO: i32 = 5;
pub const CAM_VSYNC_GPIO: i32 = 25;
pub const CAM_HREF_GPIO: i32 = 23;
pub const CAM_PCLK_GPIO: i32 = 22;

/// Camera master clock (20 MHz).
pub const CAM_XCLK_FREQ_HZ: i32 = 20_000_000;

/// All digital outputs driven by the control loop.
pub const OUTPUT_PINS: [i32; 6] = [
    TRIG_GPIO,
    MOTOR_A1_GPIO,
    MOTOR_A2_GPIO,
    STEER_LEFT_GPIO,
    STEER_RIGHT_GPIO,
    BRAKE_LED_GPIO,
];
