use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlElement, Window};

use crate::app::log_scene_summary;
use crate::input::wasm::{attach_window_listeners, window_inner_size};
use crate::input::HostEvent;
use crate::render::Renderer;
use crate::render_loop::LoopStatus;
use crate::scene::Scene;
use crate::session::Session;
use crate::stage::StageConfig;
use crate::viewport::SharedViewport;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

/// Mounts the spinning ball on `canvas_id`, animating the elements matched by
/// the two selectors. Missing overlay elements are skipped.
#[wasm_bindgen]
pub async fn mount(
    canvas_id: String,
    nav_selector: String,
    caption_selector: String,
) -> Result<MountedStage, JsValue> {
    mount_stage(&canvas_id, &nav_selector, &caption_selector)
        .await
        .map_err(|err| js_sys::Error::new(&format!("{err:#}")).into())
}

/// Handle returned to JavaScript; `unmount` tears the page down.
#[wasm_bindgen]
pub struct MountedStage {
    state: Rc<RefCell<WebState>>,
    frame_callback: FrameCallback,
}

#[wasm_bindgen]
impl MountedStage {
    pub fn unmount(&self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.cancel_frame();
            state.session.teardown();
        }
        self.frame_callback.borrow_mut().take();
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.state
            .try_borrow()
            .map(|state| state.session.is_mounted())
            .unwrap_or(false)
    }
}

impl Drop for MountedStage {
    fn drop(&mut self) {
        self.unmount();
    }
}

struct WebState {
    session: Session<Renderer>,
    window: Window,
    canvas: HtmlCanvasElement,
    nav: Option<HtmlElement>,
    caption: Option<HtmlElement>,
    frame_request: Option<i32>,
}

impl WebState {
    fn dispatch(&mut self, event: HostEvent) {
        if let HostEvent::Resized { width, height } = event {
            self.canvas.set_width(width.max(1));
            self.canvas.set_height(height.max(1));
        }
        self.session.handle_event(event);
    }

    fn render_frame(&mut self, timestamp_ms: f64) -> LoopStatus {
        self.frame_request = None;
        let status = match self.session.frame(timestamp_ms / 1000.0) {
            Ok(status) => status,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                if let Some(renderer) = self.session.target_mut() {
                    renderer.recover_surface();
                }
                LoopStatus::Reschedule
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("GPU is out of memory; stopping the stage");
                self.session.teardown();
                LoopStatus::Stopped
            }
            Err(err) => {
                warn!("surface error {err:?}; retrying next frame");
                LoopStatus::Reschedule
            }
        };
        self.apply_overlay();
        status
    }

    fn apply_overlay(&self) {
        let overlay = self.session.stage().overlay();
        if let Some(nav) = &self.nav {
            if let Err(err) = nav
                .style()
                .set_property("transform", &overlay.nav_transform())
            {
                warn!("failed to move nav: {err:?}");
            }
        }
        if let Some(caption) = &self.caption {
            if let Err(err) = caption
                .style()
                .set_property("opacity", &overlay.caption_opacity_css())
            {
                warn!("failed to fade caption: {err:?}");
            }
        }
    }

    fn request_frame(&mut self, callback: &FrameCallback) -> Result<()> {
        let callback = callback.borrow();
        let closure = callback
            .as_ref()
            .ok_or_else(|| anyhow!("frame callback already released"))?;
        let id = self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
        self.frame_request = Some(id);
        Ok(())
    }

    fn cancel_frame(&mut self) {
        if let Some(id) = self.frame_request.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                warn!("cancelAnimationFrame failed: {err:?}");
            }
        }
    }
}

async fn mount_stage(
    canvas_id: &str,
    nav_selector: &str,
    caption_selector: &str,
) -> Result<MountedStage> {
    let window = web_sys::window().ok_or_else(|| anyhow!("window not available"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow!("document not available"))?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| anyhow!("canvas element #{canvas_id} not found"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| anyhow!("element #{canvas_id} is not a canvas"))?;
    let nav = query_html(&document, nav_selector);
    let caption = query_html(&document, caption_selector);

    let scene = Scene::builtin()?;
    log_scene_summary(&scene);

    let size = window_inner_size(&window)?;
    canvas.set_width(size.width);
    canvas.set_height(size.height);

    let geometry = scene.sphere()?.geometry()?;
    let renderer = Renderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), size, &geometry)
        .await
        .context("failed to create renderer")?;
    let viewport = SharedViewport::new(size.width, size.height);
    let session = Session::mount(&scene, StageConfig::default(), viewport, renderer)?;

    let state = Rc::new(RefCell::new(WebState {
        session,
        window: window.clone(),
        canvas,
        nav,
        caption,
        frame_request: None,
    }));

    let weak = Rc::downgrade(&state);
    let dispatch: Rc<dyn Fn(HostEvent)> = Rc::new(move |event| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        if let Ok(mut state) = state.try_borrow_mut() {
            state.dispatch(event);
        }
    });
    {
        let mut web_state = state.borrow_mut();
        let WebState {
            session, canvas, ..
        } = &mut *web_state;
        attach_window_listeners(&window, canvas, session.registrations_mut(), dispatch);
    }

    let frame_callback: FrameCallback = Rc::new(RefCell::new(None));
    let weak = Rc::downgrade(&state);
    let reschedule = Rc::clone(&frame_callback);
    *frame_callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        let Ok(mut state) = state.try_borrow_mut() else {
            return;
        };
        if state.render_frame(timestamp) == LoopStatus::Reschedule {
            if let Err(err) = state.request_frame(&reschedule) {
                error!("{err:#}");
            }
        }
    }));
    state.borrow_mut().request_frame(&frame_callback)?;

    info!("stage mounted on #{canvas_id}");
    Ok(MountedStage {
        state,
        frame_callback,
    })
}

fn query_html(document: &Document, selector: &str) -> Option<HtmlElement> {
    match document.query_selector(selector) {
        Ok(Some(element)) => element.dyn_into::<HtmlElement>().ok(),
        Ok(None) => {
            warn!("no element matches {selector}");
            None
        }
        Err(err) => {
            warn!("invalid selector {selector}: {err:?}");
            None
        }
    }
}
