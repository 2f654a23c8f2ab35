//! Camera frame source adapter.
//!
//! Implements [`FrameSource`] over the esp32-camera frame buffer pool:
//! `acquire` is `esp_camera_fb_get()`, `release` is
//! `esp_camera_fb_return()`.  The pool holds one or two buffers, so a
//! frame that is never returned starves every later capture; the control
//! loop holds frames only through a `FrameLease`.
//!
//! On the host the source serves a fixed JPEG and can be told to fail,
//! which exercises the frame-unavailable path.

use log::debug;

use crate::app::ports::FrameSource;
use crate::error::FrameError;

/// One captured JPEG, borrowed from the camera driver until released.
pub struct CameraFrame {
    #[cfg(target_os = "espidf")]
    fb: core::ptr::NonNull<esp_idf_svc::sys::camera::camera_fb_t>,
    #[cfg(not(target_os = "espidf"))]
    data: &'static [u8],
}

impl AsRef<[u8]> for CameraFrame {
    #[cfg(target_os = "espidf")]
    fn as_ref(&self) -> &[u8] {
        // SAFETY: the driver keeps `buf` valid for `len` bytes until the
        // frame is handed back via esp_camera_fb_return().
        unsafe {
            let fb = self.fb.as_ref();
            core::slice::from_raw_parts(fb.buf, fb.len)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn as_ref(&self) -> &[u8] {
        self.data
    }
}

pub struct CameraSource {
    outstanding: u32,
    #[cfg(not(target_os = "espidf"))]
    sim_fail: bool,
}

impl Default for CameraSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraSource {
    /// Frame source over an initialised camera (see
    /// [`init_camera`](crate::drivers::camera::init_camera)).
    pub fn new() -> Self {
        Self {
            outstanding: 0,
            #[cfg(not(target_os = "espidf"))]
            sim_fail: false,
        }
    }

    /// Frames acquired and not yet released.
    pub fn outstanding(&self) -> u32 {
        self.outstanding
    }

    /// Simulation: make every capture fail (or succeed again).
    #[cfg(not(target_os = "espidf"))]
    pub fn set_sim_fail(&mut self, fail: bool) {
        self.sim_fail = fail;
    }
}

/// Smallest well-formed JPEG marker pair (SOI … EOI).
#[cfg(not(target_os = "espidf"))]
const SIM_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0xFF, 0xD9];

impl FrameSource for CameraSource {
    type Frame = CameraFrame;

    #[cfg(target_os = "espidf")]
    fn acquire(&mut self) -> Result<CameraFrame, FrameError> {
        // SAFETY: camera initialised in main() before the loop starts.
        let fb = unsafe { esp_idf_svc::sys::camera::esp_camera_fb_get() };
        let fb = core::ptr::NonNull::new(fb).ok_or(FrameError::Unavailable)?;
        self.outstanding += 1;
        debug!("camera: frame acquired");
        Ok(CameraFrame { fb })
    }

    #[cfg(not(target_os = "espidf"))]
    fn acquire(&mut self) -> Result<CameraFrame, FrameError> {
        if self.sim_fail {
            return Err(FrameError::Unavailable);
        }
        self.outstanding += 1;
        debug!("camera(sim): frame acquired");
        Ok(CameraFrame { data: SIM_JPEG })
    }

    fn release(&mut self, frame: CameraFrame) {
        #[cfg(target_os = "espidf")]
        // SAFETY: `frame.fb` came from esp_camera_fb_get() and is returned
        // exactly once, here.
        unsafe {
            esp_idf_svc::sys::camera::esp_camera_fb_return(frame.fb.as_ptr());
        }
        #[cfg(not(target_os = "espidf"))]
        let _ = frame;
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}
