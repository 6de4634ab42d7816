use crate::error::{Result, ScanError};
use crate::models::config::CameraConfig;
use crate::services::camera::{open_camera, FrameSink};
use crate::services::live_preview::LivePreview;
use image::RgbImage;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Terminal preview sink: a one-line frame counter on stderr, and optionally
/// the last frame written to disk when the preview ends
pub struct TerminalSink {
    save_last: Option<PathBuf>,
    last: Option<RgbImage>,
    shown: u64,
}

impl TerminalSink {
    pub fn new(save_last: Option<PathBuf>) -> Self {
        Self {
            save_last,
            last: None,
            shown: 0,
        }
    }
}

impl FrameSink for TerminalSink {
    fn show(&mut self, frame: &RgbImage) {
        self.shown += 1;
        eprint!(
            "\rLive preview: frame {} ({}x{})  ",
            self.shown,
            frame.width(),
            frame.height()
        );
        let _ = std::io::stderr().flush();

        if self.save_last.is_some() {
            self.last = Some(frame.clone());
        }
    }

    fn clear(&mut self) {
        if self.shown > 0 {
            eprintln!();
        }

        let (Some(path), Some(frame)) = (&self.save_last, self.last.take()) else {
            return;
        };
        match frame.save(path) {
            Ok(()) => tracing::info!(path = %path.display(), "Saved last preview frame"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to save preview frame"),
        }
    }
}

/// Start the live preview on the configured camera.
///
/// Refuses when live mode is switched off in the configuration.
pub fn start_preview(config: &CameraConfig, sink: TerminalSink) -> Result<LivePreview> {
    if !config.live_enabled {
        return Err(ScanError::Camera(
            "live camera mode is disabled (set camera.live_enabled to true)".to_string(),
        ));
    }

    let index = config.device_index;
    Ok(LivePreview::start(
        move || open_camera(index),
        sink,
        Duration::from_millis(config.frame_interval_ms),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::TempDir;

    #[test]
    fn test_disabled_live_mode_is_refused() {
        let config = CameraConfig {
            live_enabled: false,
            ..CameraConfig::default()
        };

        let result = start_preview(&config, TerminalSink::new(None));
        assert!(matches!(result, Err(ScanError::Camera(_))));
    }

    #[test]
    fn test_sink_saves_last_frame() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last.png");
        let mut sink = TerminalSink::new(Some(path.clone()));

        sink.show(&RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        sink.show(&RgbImage::from_pixel(4, 4, Rgb([9, 9, 9])));
        sink.clear();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.get_pixel(0, 0).0, [9, 9, 9]);
    }

    #[test]
    fn test_sink_without_frames_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last.png");
        let mut sink = TerminalSink::new(Some(path.clone()));

        sink.clear();
        assert!(!path.exists());
    }

    #[cfg(not(feature = "camera"))]
    #[tokio::test]
    async fn test_preview_without_camera_support_reports_open_failure() {
        use crate::services::live_preview::PreviewEnd;

        let preview = start_preview(&CameraConfig::default(), TerminalSink::new(None)).unwrap();
        let summary = preview.wait().await;

        assert_eq!(summary.end, PreviewEnd::OpenFailed);
        assert!(summary.error.is_some());
    }
}
