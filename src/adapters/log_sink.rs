//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each application event as one
//! tagged line to the logger (UART on the device, stderr on the host).

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | posture={:?}", state);
            }
            AppEvent::Distance(sample) => {
                // Only real echoes are worth a line.
                if sample.centimetres().is_some() {
                    info!("RANGE | {}", sample);
                }
            }
            AppEvent::BrakeEngaged { distance_cm } => {
                info!("BRAKE | obstacle at {} cm", distance_cm);
            }
            AppEvent::FrameUnavailable => {
                warn!("FRAME | capture failed, stopped");
            }
            AppEvent::OracleFallback(origin) => {
                warn!("ORACLE | fallback ({})", origin);
            }
            AppEvent::CommandApplied { command, state } => {
                info!("DRIVE | {} -> steer={:?} prop={:?}", command, state.steering, state.propulsion);
            }
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | cycles={} brakes={} frame_fail={} answers={} \
                     fallback(link={} transport={} token={}) | last={} ({}) | {:?}/{:?} led={}",
                    t.cycles,
                    t.brakes,
                    t.frame_failures,
                    t.oracle_answers,
                    t.fallback_unassociated,
                    t.fallback_transport,
                    t.fallback_unrecognized,
                    t.last_distance.map_or_else(|| "-".into(), |d| d.to_string()),
                    t.proximity.map_or_else(|| "-".into(), |g| g.to_string()),
                    t.actuation.propulsion,
                    t.actuation.steering,
                    if t.actuation.brake_indicator { "on" } else { "off" },
                );
            }
            AppEvent::Halted(cause) => {
                error!("HALT | {}", cause);
            }
        }
    }
}
