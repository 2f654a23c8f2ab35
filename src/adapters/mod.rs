//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `camera`   | FrameSource        | esp32-camera frame buffers    |
//! | `hardware` | ProximityPort      | HC-SR04 over GPIO             |
//! |            | ActuatorPort       | H-bridge, steering, brake LED |
//! | `http`     | HttpPort           | EspHttpConnection / reqwest   |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `time`     | TimePort, DelayNs  | ESP32 system timer            |
//! | `wifi`     | ConnectivityPort   | ESP-IDF WiFi STA              |

pub mod camera;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod wifi;
