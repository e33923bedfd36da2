use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::debug;

use crate::render::FrameTarget;
use crate::stage::Stage;

/// Frame gaps longer than this are treated as a hiccup, not elapsed time.
pub const LAG_THRESHOLD: f64 = 0.5;
pub const LAG_ADJUSTED: f64 = 0.033;

/// Cancellation token shared by a render loop and whoever owns its teardown.
#[derive(Debug, Clone)]
pub struct LoopHandle {
    running: Arc<AtomicBool>,
}

impl LoopHandle {
    fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("render loop cancelled");
        }
    }
}

/// What the host should do after a frame ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Reschedule,
    Stopped,
}

/// Self-rescheduling per-frame work: advance controls and animations, draw.
#[derive(Debug)]
pub struct RenderLoop {
    handle: LoopHandle,
    last_timestamp: Option<f64>,
    frames: u64,
}

impl RenderLoop {
    pub fn start() -> Self {
        Self {
            handle: LoopHandle::new(),
            last_timestamp: None,
            frames: 0,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Seconds since the previous frame; the first frame has zero delta.
    pub fn frame_delta(&mut self, timestamp: f64) -> f32 {
        let delta = match self.last_timestamp {
            None => 0.0,
            Some(previous) => {
                let elapsed = (timestamp - previous).max(0.0);
                if elapsed > LAG_THRESHOLD {
                    LAG_ADJUSTED
                } else {
                    elapsed
                }
            }
        };
        self.last_timestamp = Some(timestamp);
        delta as f32
    }

    /// Runs one frame at `timestamp` (seconds, any monotonic origin).
    pub fn run_frame<T: FrameTarget>(
        &mut self,
        stage: &mut Stage,
        target: &mut T,
        timestamp: f64,
    ) -> Result<LoopStatus, T::Error> {
        if !self.handle.is_running() || !stage.is_mounted() {
            return Ok(LoopStatus::Stopped);
        }
        let dt = self.frame_delta(timestamp);
        stage.advance(dt);
        target.draw(&stage.snapshot())?;
        self.frames += 1;
        Ok(LoopStatus::Reschedule)
    }

    pub fn cancel(&self) {
        self.handle.cancel();
    }
}
