use std::cell::Cell;
use std::rc::Rc;

use glam::DVec2;
use spinning_ball::{
    HeadlessTarget, HostEvent, LoopStatus, PointerButton, Rgb, Scene, Session, SharedViewport,
    StageConfig,
};

fn mount(width: u32, height: u32) -> Session<HeadlessTarget> {
    let scene = Scene::builtin().expect("builtin scene");
    Session::mount(
        &scene,
        StageConfig::default(),
        SharedViewport::new(width, height),
        HeadlessTarget::new(),
    )
    .expect("mount")
}

#[test]
fn drag_scenario_on_800_by_600() {
    let mut session = mount(800, 600);

    session.pointer_pressed(PointerButton::Primary, DVec2::new(400.0, 300.0));
    assert_eq!(
        session.pointer_moved(DVec2::new(800.0, 600.0)),
        Some(Rgb::new(255, 255, 200))
    );
    assert_eq!(
        session.pointer_moved(DVec2::new(0.0, 0.0)),
        Some(Rgb::new(0, 0, 200))
    );
    session.pointer_released(PointerButton::Primary);
    assert_eq!(session.pointer_moved(DVec2::new(100.0, 100.0)), None);
    assert_eq!(
        session.stage().last_target_color(),
        Some(Rgb::new(0, 0, 200))
    );

    for frame in 0..90 {
        session.frame(frame as f64 / 60.0).expect("headless frame");
    }
    assert_eq!(
        Rgb::from_linear(session.stage().mesh_color()),
        Rgb::new(0, 0, 200)
    );
}

#[test]
fn host_events_resize_the_target() {
    let mut session = mount(800, 600);
    session.handle_event(HostEvent::Resized {
        width: 1024,
        height: 512,
    });
    let stage = session.stage();
    assert_eq!(stage.viewport().width, 1024);
    assert!((stage.camera().aspect - 2.0).abs() < 1e-6);
    let size = session.target().and_then(HeadlessTarget::size).expect("sized");
    assert_eq!((size.width, size.height), (1024, 512));
}

#[test]
fn press_and_release_without_move_keeps_color() {
    let mut session = mount(800, 600);
    let before = session.stage().mesh_color();
    session.handle_event(HostEvent::PointerPressed {
        button: PointerButton::Primary,
        position: DVec2::new(10.0, 10.0),
        on_surface: true,
    });
    session.handle_event(HostEvent::PointerReleased {
        button: PointerButton::Primary,
    });
    for frame in 0..30 {
        session.frame(frame as f64 / 60.0).expect("headless frame");
    }
    assert_eq!(session.stage().mesh_color(), before);
    assert_eq!(session.stage().last_target_color(), None);
}

#[test]
fn press_on_overlay_changes_color_but_not_camera() {
    let mut session = mount(800, 600);
    session.handle_event(HostEvent::PointerPressed {
        button: PointerButton::Primary,
        position: DVec2::new(400.0, 20.0),
        on_surface: false,
    });
    let controls = session.stage().controls().expect("controls");
    assert!(!controls.is_rotating());
    assert_eq!(
        session.handle_event(HostEvent::PointerMoved {
            position: DVec2::new(0.0, 600.0),
        }),
        Some(Rgb::new(0, 255, 200))
    );
    session.handle_event(HostEvent::PointerReleased {
        button: PointerButton::Primary,
    });

    session.handle_event(HostEvent::PointerPressed {
        button: PointerButton::Primary,
        position: DVec2::new(400.0, 300.0),
        on_surface: true,
    });
    assert!(session.stage().controls().expect("controls").is_rotating());
}

#[test]
fn teardown_stops_frames_and_disposes_listeners() {
    let mut session = mount(800, 600);
    let disposed = Rc::new(Cell::new(0));
    for name in ["resize", "mousedown", "mouseup", "mousemove"] {
        let disposed = Rc::clone(&disposed);
        session
            .registrations_mut()
            .push(name, Box::new(move || disposed.set(disposed.get() + 1)));
    }
    let handle = session.loop_handle();

    assert_eq!(session.frame(0.0).expect("frame"), LoopStatus::Reschedule);
    assert_eq!(session.frames_drawn(), 1);

    session.teardown();
    assert!(!handle.is_running());
    assert_eq!(disposed.get(), 4);
    assert!(!session.is_mounted());
    assert!(session.target().is_none());

    assert_eq!(session.frame(1.0).expect("frame"), LoopStatus::Stopped);
    assert_eq!(session.frames_drawn(), 1);
    session.pointer_pressed(PointerButton::Primary, DVec2::ZERO);
    assert_eq!(session.pointer_moved(DVec2::new(50.0, 50.0)), None);

    session.teardown();
    assert_eq!(disposed.get(), 4);
}

#[test]
fn entrance_plays_once_per_mount() {
    let mut session = mount(800, 600);
    assert_eq!(session.stage().entrance_playbacks(), 1);
    assert_eq!(session.stage().mesh().scale, glam::Vec3::ZERO);
    let overlay = session.stage().overlay();
    assert_eq!(overlay.nav_offset_percent, -100.0);
    assert_eq!(overlay.caption_opacity, 0.0);

    for frame in 0..300 {
        session.frame(frame as f64 / 60.0).expect("headless frame");
    }
    let stage = session.stage();
    assert_eq!(stage.entrance_playbacks(), 1);
    assert_eq!(stage.mesh().scale, glam::Vec3::ONE);
    assert_eq!(stage.overlay().nav_offset_percent, 0.0);
    assert_eq!(stage.overlay().caption_opacity, 1.0);
}
