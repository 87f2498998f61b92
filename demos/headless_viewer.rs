//! Drives a viewer node offscreen: two viewports, a few objects, a click.
//!
//! Run with `RUST_LOG=info cargo run --example headless_viewer`. Without a
//! GPU adapter the viewer still runs, drawing nothing.

use std::time::{Duration, Instant};

use flowscope::*;

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };

    let left = ViewportId(1);
    let right = ViewportId(2);
    let mut platform = HeadlessPlatform::new();
    platform.set_viewport_rect(left, ScreenRect::new(0.0, 0.0, 320.0, 240.0));
    platform.set_viewport_rect(right, ScreenRect::new(320.0, 0.0, 320.0, 240.0));

    let mut module = ViewerModule::new(config, platform);
    module.connected(left);
    module.connected(right);
    module.flush_deferred();

    let selector = SelectorHandle::new();
    let red = Object3D::mesh(
        Geometry::cuboid(1.0, 1.0, 1.0),
        Material::new(Color::from_hex(0xcc3333)),
    )
    .with_name("red")
    .selectable(selector.clone());
    let blue = Object3D::mesh(
        Geometry::cuboid(0.5, 2.0, 0.5),
        Material::new(Color::from_hex(0x3355cc)),
    )
    .with_name("blue")
    .with_position(Vec3::new(1.5, 0.0, 0.0))
    .selectable(selector);
    let bare = Geometry::cuboid(0.25, 0.25, 0.25);

    module.process(InputMessage {
        objects: vec![red.into(), blue.into(), bare.into()],
    })?;
    for _ in 0..3 {
        module.state_mut().run_pending_frames();
    }

    // click the middle of the left viewport
    let at = Instant::now();
    let center = Vec2::new(160.0, 120.0);
    module.dispatch_input(
        left,
        &InputEvent::PointerDown {
            button: PointerButton::Primary,
            position: center,
        },
        at,
    );
    module.dispatch_input(
        left,
        &InputEvent::PointerUp {
            button: PointerButton::Primary,
            position: center,
        },
        at + Duration::from_millis(80),
    );
    module.state_mut().run_pending_frames();

    match module.state().selection() {
        Some(selection) => log::info!("selected object {}", selection.object.raw()),
        None => log::info!("nothing selected"),
    }
    for click in module.state_mut().gateway_mut().take_click() {
        log::info!("plugin click relay: viewport {} at {}", click.viewport.0, click.position);
    }

    module.disconnected(left);
    module.state_mut().run_pending_frames();
    module.disconnected(right);

    println!("{}", module.journal().to_json()?);
    Ok(())
}
