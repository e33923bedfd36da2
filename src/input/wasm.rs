use std::rc::Rc;

use anyhow::{anyhow, Result};
use glam::DVec2;
use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, MouseEvent, Window};

use super::HostEvent;
use crate::lifecycle::Registrations;
use crate::stage::PointerButton;
use crate::viewport::ViewportSize;

/// Reads `innerWidth`/`innerHeight` from the window.
pub fn window_inner_size(window: &Window) -> Result<ViewportSize> {
    let width = window
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .ok_or_else(|| anyhow!("window.innerWidth not available"))?;
    let height = window
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .ok_or_else(|| anyhow!("window.innerHeight not available"))?;
    Ok(ViewportSize::new(width as u32, height as u32))
}

/// Registers resize and mouse listeners on `window`. Each listener lives in
/// `registrations` and is removed when they are disposed. Presses report
/// whether they hit `canvas`.
pub fn attach_window_listeners(
    window: &Window,
    canvas: &HtmlCanvasElement,
    registrations: &mut Registrations,
    dispatch: Rc<dyn Fn(HostEvent)>,
) {
    {
        let dispatch = Rc::clone(&dispatch);
        let target = window.clone();
        registrations.hold(
            "resize",
            EventListener::new(window, "resize", move |_| {
                if let Ok(size) = window_inner_size(&target) {
                    dispatch(HostEvent::Resized {
                        width: size.width,
                        height: size.height,
                    });
                }
            }),
        );
    }

    {
        let dispatch = Rc::clone(&dispatch);
        let canvas = canvas.clone();
        registrations.hold(
            "mousedown",
            EventListener::new(window, "mousedown", move |event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let on_surface = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlCanvasElement>().ok())
                    .is_some_and(|target| target == canvas);
                dispatch(HostEvent::PointerPressed {
                    button: PointerButton::from_dom_index(mouse.button()),
                    position: page_position(mouse),
                    on_surface,
                });
            }),
        );
    }

    {
        let dispatch = Rc::clone(&dispatch);
        registrations.hold(
            "mouseup",
            EventListener::new(window, "mouseup", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                dispatch(HostEvent::PointerReleased {
                    button: PointerButton::from_dom_index(event.button()),
                });
            }),
        );
    }

    registrations.hold(
        "mousemove",
        EventListener::new(window, "mousemove", move |event| {
            let Some(event) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            dispatch(HostEvent::PointerMoved {
                position: page_position(event),
            });
        }),
    );
}

fn page_position(event: &MouseEvent) -> DVec2 {
    DVec2::new(f64::from(event.page_x()), f64::from(event.page_y()))
}
