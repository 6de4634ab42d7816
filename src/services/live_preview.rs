use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use image::RgbImage;
use serde::Serialize;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::camera::{FrameSink, FrameSource};
use crate::error::Result;

/// Default preview cadence, about 10 frames per second
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Why a preview session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewEnd {
    /// Stop requested (or every stop handle dropped)
    Stopped,
    /// Frame read failed mid-stream
    SourceFailed,
    /// Camera could not be opened; nothing was shown
    OpenFailed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewSummary {
    pub frames: u64,
    pub end: PreviewEnd,
    pub error: Option<String>,
}

/// Cloneable handle that asks a running preview to stop
#[derive(Clone)]
pub struct StopHandle(Sender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // Full channel means a stop is already pending
        let _ = self.0.try_send(());
    }
}

/// Live camera preview running on the blocking pool.
///
/// Frames are read and handed to the sink at a fixed cadence until a stop is
/// requested or a read fails. The stop signal is checked on every iteration,
/// so a stop takes effect within one frame interval. The camera is opened on
/// the preview thread and released on every exit path.
pub struct LivePreview {
    stop_tx: Sender<()>,
    handle: JoinHandle<PreviewSummary>,
}

impl LivePreview {
    pub fn start<O, S, K>(open: O, sink: K, interval: Duration) -> Self
    where
        O: FnOnce() -> Result<S> + Send + 'static,
        S: FrameSource,
        K: FrameSink + 'static,
    {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded(1);
        let handle = tokio::task::spawn_blocking(move || {
            let mut sink = sink;
            run_preview(open, &mut sink, interval, &stop_rx)
        });

        Self { stop_tx, handle }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_tx.clone())
    }

    /// Request a stop and wait for the preview thread to finish
    pub async fn stop(self) -> PreviewSummary {
        let _ = self.stop_tx.try_send(());
        join_summary(self.handle.await)
    }

    /// Wait for the preview to end on its own (read failure or a stop
    /// through a [`StopHandle`])
    pub async fn wait(self) -> PreviewSummary {
        let Self { stop_tx, handle } = self;
        let summary = join_summary(handle.await);
        drop(stop_tx);
        summary
    }

    /// Run until the preview ends or `shutdown` completes, whichever is first
    pub async fn run_until<F>(self, shutdown: F) -> PreviewSummary
    where
        F: Future<Output = ()>,
    {
        let Self { stop_tx, mut handle } = self;

        tokio::select! {
            joined = &mut handle => join_summary(joined),
            _ = shutdown => {
                let _ = stop_tx.try_send(());
                join_summary(handle.await)
            }
        }
    }
}

fn join_summary(joined: std::result::Result<PreviewSummary, tokio::task::JoinError>) -> PreviewSummary {
    joined.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Preview task panicked");
        PreviewSummary {
            frames: 0,
            end: PreviewEnd::SourceFailed,
            error: Some(e.to_string()),
        }
    })
}

fn stop_requested(stop: &Receiver<()>) -> bool {
    !matches!(stop.try_recv(), Err(TryRecvError::Empty))
}

fn run_preview<O, S>(
    open: O,
    sink: &mut dyn FrameSink,
    interval: Duration,
    stop: &Receiver<()>,
) -> PreviewSummary
where
    O: FnOnce() -> Result<S>,
    S: FrameSource,
{
    let mut source = match open() {
        Ok(source) => source,
        Err(e) => {
            tracing::warn!(error = %e, "Live preview could not open the camera");
            return PreviewSummary {
                frames: 0,
                end: PreviewEnd::OpenFailed,
                error: Some(e.to_string()),
            };
        }
    };

    tracing::info!(interval_ms = interval.as_millis() as u64, "Live preview started");
    let mut frames = 0u64;

    let (end, error) = loop {
        let started = Instant::now();
        if stop_requested(stop) {
            break (PreviewEnd::Stopped, None);
        }

        match source.read_frame() {
            Ok(frame) => {
                show(sink, &frame);
                frames += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, frames, "Camera read failed, stopping preview");
                break (PreviewEnd::SourceFailed, Some(e.to_string()));
            }
        }

        match stop.recv_timeout(interval.saturating_sub(started.elapsed())) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break (PreviewEnd::Stopped, None),
        }
    };

    source.release();
    sink.clear();
    tracing::info!(frames, end = ?end, "Live preview stopped");

    PreviewSummary { frames, end, error }
}

fn show(sink: &mut dyn FrameSink, frame: &RgbImage) {
    sink.show(frame);
    tracing::trace!(width = frame.width(), height = frame.height(), "Preview frame");
}
