use anyhow::Result;
use glam::DVec2;
use log::info;

use crate::color::Rgb;
use crate::input::HostEvent;
use crate::lifecycle::Registrations;
use crate::render::FrameTarget;
use crate::render_loop::{LoopHandle, LoopStatus, RenderLoop};
use crate::scene::Scene;
use crate::stage::{PointerButton, Stage, StageConfig};
use crate::viewport::SharedViewport;

/// A mounted stage together with its render target, render loop and
/// listener registrations.
pub struct Session<T: FrameTarget> {
    stage: Stage,
    target: Option<T>,
    render_loop: RenderLoop,
    registrations: Registrations,
}

impl<T: FrameTarget> Session<T> {
    pub fn mount(
        scene: &Scene,
        config: StageConfig,
        viewport: SharedViewport,
        mut target: T,
    ) -> Result<Self> {
        let stage = Stage::mount(scene, config, viewport, &mut target)?;
        Ok(Self {
            stage,
            target: Some(target),
            render_loop: RenderLoop::start(),
            registrations: Registrations::new(),
        })
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    pub fn target_mut(&mut self) -> Option<&mut T> {
        self.target.as_mut()
    }

    pub fn registrations_mut(&mut self) -> &mut Registrations {
        &mut self.registrations
    }

    pub fn loop_handle(&self) -> LoopHandle {
        self.render_loop.handle()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.render_loop.frames()
    }

    pub fn is_mounted(&self) -> bool {
        self.stage.is_mounted()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(target) = self.target.as_mut() {
            self.stage.resize(width, height, target);
        }
    }

    pub fn pointer_pressed(&mut self, button: PointerButton, position: DVec2) {
        self.stage.pointer_pressed(button, position);
    }

    pub fn pointer_released(&mut self, button: PointerButton) {
        self.stage.pointer_released(button);
    }

    pub fn pointer_moved(&mut self, position: DVec2) -> Option<Rgb> {
        self.stage.pointer_moved(position)
    }

    /// Routes a host event to the matching entry point. Returns the color
    /// target a pointer move started, if any.
    pub fn handle_event(&mut self, event: HostEvent) -> Option<Rgb> {
        match event {
            HostEvent::Resized { width, height } => {
                self.resize(width, height);
                None
            }
            HostEvent::PointerPressed {
                button,
                position,
                on_surface,
            } => {
                if on_surface {
                    self.pointer_pressed(button, position);
                } else {
                    self.stage.pointer_pressed_off_surface();
                }
                None
            }
            HostEvent::PointerReleased { button } => {
                self.pointer_released(button);
                None
            }
            HostEvent::PointerMoved { position } => self.pointer_moved(position),
        }
    }

    /// Runs one frame; the host schedules another only on `Reschedule`.
    pub fn frame(&mut self, timestamp: f64) -> Result<LoopStatus, T::Error> {
        match self.target.as_mut() {
            Some(target) => self.render_loop.run_frame(&mut self.stage, target, timestamp),
            None => Ok(LoopStatus::Stopped),
        }
    }

    /// Stops the loop, drops listeners, releases controls, then the target.
    /// Calling it again does nothing.
    pub fn teardown(&mut self) {
        if !self.stage.is_mounted() && self.target.is_none() {
            return;
        }
        self.render_loop.cancel();
        self.registrations.dispose_all();
        self.stage.unmount();
        if let Some(mut target) = self.target.take() {
            target.release();
        }
        info!(
            "session torn down after {} frame(s)",
            self.render_loop.frames()
        );
    }
}

impl<T: FrameTarget> Drop for Session<T> {
    fn drop(&mut self) {
        self.teardown();
    }
}
