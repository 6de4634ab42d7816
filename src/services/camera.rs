use crate::error::{Result, ScanError};
use image::RgbImage;

/// Source of camera frames. The holder has exclusive use of the device.
pub trait FrameSource {
    fn read_frame(&mut self) -> Result<RgbImage>;

    /// Release the device. Must be safe to call more than once.
    fn release(&mut self) {}
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> Result<RgbImage> {
        (**self).read_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Where live preview frames go
pub trait FrameSink: Send {
    fn show(&mut self, frame: &RgbImage);

    /// Called once when the preview ends
    fn clear(&mut self);
}

/// Open the camera at `index`
pub fn open_camera(index: u32) -> Result<Box<dyn FrameSource>> {
    #[cfg(feature = "camera")]
    {
        Ok(Box::new(native::NokhwaCamera::open(index)?))
    }

    #[cfg(not(feature = "camera"))]
    {
        Err(ScanError::Camera(format!(
            "cannot open camera {}: medscan was built without the `camera` feature",
            index
        )))
    }
}

/// Grab one frame from the camera at `index` and release it again
pub fn capture_snapshot(index: u32) -> Result<RgbImage> {
    let mut camera = open_camera(index)?;
    let frame = camera.read_frame();
    camera.release();
    frame
}

#[cfg(feature = "camera")]
mod native {
    use super::FrameSource;
    use crate::error::{Result, ScanError};
    use image::RgbImage;
    use nokhwa::pixel_format::RgbFormat;
    use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType};
    use nokhwa::Camera;

    /// Webcam through nokhwa's native backend
    pub struct NokhwaCamera {
        camera: Camera,
        streaming: bool,
    }

    impl NokhwaCamera {
        pub fn open(index: u32) -> Result<Self> {
            let format =
                RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate);
            let mut camera = Camera::new(CameraIndex::Index(index), format)
                .map_err(|e| ScanError::Camera(format!("Failed to open camera {}: {}", index, e)))?;
            camera
                .open_stream()
                .map_err(|e| ScanError::Camera(format!("Failed to start camera stream: {}", e)))?;

            tracing::info!(index, "Camera opened");
            Ok(Self {
                camera,
                streaming: true,
            })
        }
    }

    impl FrameSource for NokhwaCamera {
        fn read_frame(&mut self) -> Result<RgbImage> {
            let buffer = self
                .camera
                .frame()
                .map_err(|e| ScanError::Camera(format!("Failed to read frame: {}", e)))?;
            let decoded = buffer
                .decode_image::<RgbFormat>()
                .map_err(|e| ScanError::Camera(format!("Failed to decode frame: {}", e)))?;

            let (width, height) = (decoded.width(), decoded.height());
            RgbImage::from_raw(width, height, decoded.into_raw())
                .ok_or_else(|| ScanError::Camera("Frame buffer size mismatch".to_string()))
        }

        fn release(&mut self) {
            if !self.streaming {
                return;
            }
            self.streaming = false;
            if let Err(e) = self.camera.stop_stream() {
                tracing::warn!(error = %e, "Failed to stop camera stream");
            } else {
                tracing::info!("Camera released");
            }
        }
    }

    impl Drop for NokhwaCamera {
        fn drop(&mut self) {
            self.release();
        }
    }
}

#[cfg(feature = "camera")]
pub use native::NokhwaCamera;
