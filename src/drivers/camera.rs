//! OV2640 camera bring-up (esp32-camera component).
//!
//! Chooses the capture profile from the available memory: with PSRAM the
//! camera gets the PSRAM profile (QVGA, double-buffered by default),
//! otherwise the DRAM profile (CIF, single buffer).  Both capture JPEG.
//!
//! Initialisation failure is the one fatal condition in the system; the
//! caller decides how to halt.

use log::info;

use crate::config::{FrameSize, SystemConfig};
use crate::error::InitError;

#[cfg(target_os = "espidf")]
use crate::pins;

/// Capture parameters actually passed to the camera driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraProfile {
    pub frame_size: FrameSize,
    pub jpeg_quality: u8,
    pub frame_buffers: u8,
    pub psram: bool,
}

impl CameraProfile {
    pub fn select(config: &SystemConfig, psram: bool) -> Self {
        if psram {
            Self {
                frame_size: config.frame_size_psram,
                jpeg_quality: config.jpeg_quality_psram,
                frame_buffers: config.frame_buffers_psram,
                psram,
            }
        } else {
            Self {
                frame_size: config.frame_size_dram,
                jpeg_quality: config.jpeg_quality_dram,
                frame_buffers: config.frame_buffers_dram,
                psram,
            }
        }
    }
}

/// True when external PSRAM is mapped into the heap.
#[cfg(target_os = "espidf")]
pub fn psram_available() -> bool {
    use esp_idf_svc::sys::{MALLOC_CAP_SPIRAM, heap_caps_get_total_size};
    // SAFETY: heap statistics query, no side effects.
    (unsafe { heap_caps_get_total_size(MALLOC_CAP_SPIRAM) }) > 0
}

#[cfg(not(target_os = "espidf"))]
pub fn psram_available() -> bool {
    false
}

#[cfg(target_os = "espidf")]
pub fn init_camera(config: &SystemConfig) -> Result<CameraProfile, InitError> {
    use esp_idf_svc::sys::camera;
    use esp_idf_svc::sys::{ESP_OK, ledc_channel_t_LEDC_CHANNEL_0, ledc_timer_t_LEDC_TIMER_0};

    let profile = CameraProfile::select(config, psram_available());

    let frame_size = match profile.frame_size {
        FrameSize::Qvga => camera::framesize_t_FRAMESIZE_QVGA,
        FrameSize::Cif => camera::framesize_t_FRAMESIZE_CIF,
    };
    let fb_location = if profile.psram {
        camera::camera_fb_location_t_CAMERA_FB_IN_PSRAM
    } else {
        camera::camera_fb_location_t_CAMERA_FB_IN_DRAM
    };

    let cfg = camera::camera_config_t {
        pin_pwdn: pins::CAM_PWDN_GPIO,
        pin_reset: pins::CAM_RESET_GPIO,
        pin_xclk: pins::CAM_XCLK_GPIO,
        __bindgen_anon_1: camera::camera_config_t__bindgen_ty_1 {
            pin_sccb_sda: pins::CAM_SIOD_GPIO,
        },
        __bindgen_anon_2: camera::camera_config_t__bindgen_ty_2 {
            pin_sccb_scl: pins::CAM_SIOC_GPIO,
        },
        pin_d7: pins::CAM_Y9_GPIO,
        pin_d6: pins::CAM_Y8_GPIO,
        pin_d5: pins::CAM_Y7_GPIO,
        pin_d4: pins::CAM_Y6_GPIO,
        pin_d3: pins::CAM_Y5_GPIO,
        pin_d2: pins::CAM_Y4_GPIO,
        pin_d1: pins::CAM_Y3_GPIO,
        pin_d0: pins::CAM_Y2_GPIO,
        pin_vsync: pins::CAM_VSYNC_GPIO,
        pin_href: pins::CAM_HREF_GPIO,
        pin_pclk: pins::CAM_PCLK_GPIO,
        xclk_freq_hz: pins::CAM_XCLK_FREQ_HZ,
        ledc_timer: ledc_timer_t_LEDC_TIMER_0,
        ledc_channel: ledc_channel_t_LEDC_CHANNEL_0,
        pixel_format: camera::pixformat_t_PIXFORMAT_JPEG,
        frame_size,
        jpeg_quality: i32::from(profile.jpeg_quality),
        fb_count: usize::from(profile.frame_buffers),
        fb_location,
        grab_mode: camera::camera_grab_mode_t_CAMERA_GRAB_WHEN_EMPTY,
        ..Default::default()
    };

    // SAFETY: called once from main() before the first capture.
    let ret = unsafe { camera::esp_camera_init(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(InitError::Camera(ret));
    }

    info!(
        "camera: ready ({:?}, quality {}, {} buffer(s), psram={})",
        profile.frame_size, profile.jpeg_quality, profile.frame_buffers, profile.psram
    );
    Ok(profile)
}

#[cfg(not(target_os = "espidf"))]
pub fn init_camera(config: &SystemConfig) -> Result<CameraProfile, InitError> {
    let profile = CameraProfile::select(config, psram_available());
    info!("camera(sim): {:?}, quality {}", profile.frame_size, profile.jpeg_quality);
    Ok(profile)
}
