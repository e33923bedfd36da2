use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use glam::DVec2;
use log::{info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use spinning_ball::app::{print_final_state, scene_summary, HeadlessRun};
use spinning_ball::{
    HostEvent, LoopStatus, PointerButton, PointerPolicy, Renderer, Scene, Session,
    SharedViewport, StageConfig, ViewportSize,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

/// Rotating lit sphere with orbit controls and drag-driven color.
#[derive(Debug, Parser)]
#[command(name = "spinning-ball", version, about)]
struct CliOptions {
    /// Scene XML file; the built-in scene is used when omitted.
    #[arg(long, value_name = "FILE")]
    scene: Option<PathBuf>,

    /// Simulate without opening a window and print the final state.
    #[arg(long)]
    summary_only: bool,

    /// Frames simulated in summary mode before any drag.
    #[arg(long, default_value_t = 240)]
    frames: u32,

    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 720)]
    height: u32,

    /// Drag path point in pixels; repeat to build a path.
    #[arg(long = "drag", value_name = "X,Y", value_parser = parse_point)]
    drag: Vec<DVec2>,

    /// Map pointers outside the window without clamping the channels.
    #[arg(long)]
    unclamped_pointer: bool,

    #[arg(long, value_name = "SPEED")]
    auto_rotate_speed: Option<f32>,
}

impl CliOptions {
    fn stage_config(&self) -> StageConfig {
        let mut config = StageConfig::default();
        if self.unclamped_pointer {
            config.pointer_policy = PointerPolicy::Unclamped;
        }
        if let Some(speed) = self.auto_rotate_speed {
            config.auto_rotate_speed = speed;
        }
        config
    }

    fn size(&self) -> ViewportSize {
        ViewportSize::new(self.width, self.height)
    }

    fn load_scene(&self) -> Result<Scene> {
        match &self.scene {
            Some(path) => {
                let xml = fs::read_to_string(path)
                    .with_context(|| format!("failed to read scene {}", path.display()))?;
                Scene::from_xml(&xml).context("failed to parse scene XML")
            }
            None => Scene::builtin(),
        }
    }
}

fn parse_point(value: &str) -> Result<DVec2, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got {value:?}"))?;
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid x {x:?}: {err}"))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid y {y:?}: {err}"))?;
    Ok(DVec2::new(x, y))
}

fn run() -> Result<()> {
    let options = CliOptions::parse();
    let scene = options.load_scene()?;
    for line in scene_summary(&scene) {
        println!("{line}");
    }

    if options.summary_only {
        return run_headless(&scene, &options);
    }

    match run_interactive(&scene, &options) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(&scene, &options)
        }
        Err(err) => Err(err),
    }
}

fn run_headless(scene: &Scene, options: &CliOptions) -> Result<()> {
    let run = HeadlessRun {
        size: options.size(),
        frames: options.frames,
        drag: options.drag.clone(),
    };
    let mut session = run.execute(scene, options.stage_config())?;
    if !run.drag.is_empty() {
        if let Some(color) = session.stage().last_target_color() {
            println!("Target color {color}");
        }
    }
    print_final_state(session.stage());
    session.teardown();
    Ok(())
}

fn run_interactive(scene: &Scene, options: &CliOptions) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::Panicked(panic_message(panic)))?
        .map_err(WindowInitError::EventLoop)?;

    let mut app = WindowApp {
        scene: scene.clone(),
        config: options.stage_config(),
        size: options.size(),
        window: None,
        session: None,
        cursor: DVec2::ZERO,
        started: Instant::now(),
        error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[derive(Debug, Error)]
enum WindowInitError {
    #[error("failed to initialize event loop: {0}")]
    EventLoop(#[source] winit::error::EventLoopError),
    #[error("failed to initialize event loop: {0}")]
    Panicked(String),
    #[error("failed to initialize window: {0}")]
    Window(#[source] winit::error::OsError),
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct WindowApp {
    scene: Scene,
    config: StageConfig,
    size: ViewportSize,
    window: Option<Arc<Window>>,
    session: Option<Session<Renderer>>,
    cursor: DVec2,
    started: Instant,
    error: Option<anyhow::Error>,
}

impl WindowApp {
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attributes = Window::default_attributes()
            .with_title("spinning ball")
            .with_inner_size(LogicalSize::new(self.size.width, self.size.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(WindowInitError::Window)?,
        );

        let inner = window.inner_size();
        let size = ViewportSize::new(inner.width, inner.height);
        let geometry = self.scene.sphere()?.geometry()?;
        let renderer = block_on(Renderer::new(Arc::clone(&window), size, &geometry))
            .context("failed to create renderer")?;
        let viewport = SharedViewport::new(size.width, size.height);
        let session = Session::mount(&self.scene, self.config, viewport, renderer)?;

        self.window = Some(window);
        self.session = Some(session);
        self.started = Instant::now();
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let timestamp = self.started.elapsed().as_secs_f64();
        match session.frame(timestamp) {
            Ok(LoopStatus::Reschedule) => {}
            Ok(LoopStatus::Stopped) => event_loop.exit(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(renderer) = session.target_mut() {
                    renderer.recover_surface();
                }
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.error = Some(anyhow!("GPU is out of memory"));
                event_loop.exit();
            }
            Err(wgpu::SurfaceError::Timeout) => {
                info!("surface timeout; retrying next frame");
            }
            Err(wgpu::SurfaceError::Other) => {
                warn!("surface reported an unknown error; retrying next frame");
            }
        }
    }

    fn dispatch(&mut self, event: HostEvent) {
        if let Some(session) = self.session.as_mut() {
            session.handle_event(event);
        }
    }
}

impl ApplicationHandler for WindowApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        if let Err(err) = self.open(event_loop) {
            self.error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().map(|window| window.id()) != Some(window_id) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.dispatch(HostEvent::Resized {
                width: size.width,
                height: size.height,
            }),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = PointerButton::from(button);
                let event = match state {
                    ElementState::Pressed => HostEvent::PointerPressed {
                        button,
                        position: self.cursor,
                        on_surface: true,
                    },
                    ElementState::Released => HostEvent::PointerReleased { button },
                };
                self.dispatch(event);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = DVec2::new(position.x, position.y);
                self.dispatch(HostEvent::PointerMoved {
                    position: self.cursor,
                });
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut session) = self.session.take() {
            print_final_state(session.stage());
            session.teardown();
        }
    }
}
