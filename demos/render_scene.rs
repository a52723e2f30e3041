use std::sync::Arc;

use tableau::prelude::*;

fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    let mut stage = Stage::new(StageConfig::new(400, 300).mouse_over(Some(20)))?;
    let root = stage.root();
    let tree = stage.tree_mut();

    // Background
    let mut bg = Graphics::new();
    bg.begin_linear_gradient_fill(
        &[Color::rgb(0.1, 0.1, 0.2), Color::rgb(0.2, 0.1, 0.3)],
        &[0.0, 1.0],
        0.0,
        0.0,
        0.0,
        300.0,
    )
    .draw_rect(0.0, 0.0, 400.0, 300.0);
    let background = tree.create_shape(bg);
    tree.add_child(root, background)?;

    // A group of shapes rotated together
    let group = tree.create_container();
    tree.display_mut(group)
        .ok_or(SceneError::NodeNotFound(group))?
        .set_transform(200.0, 150.0, 1.0, 1.0, 15.0, 0.0, 0.0, 0.0, 0.0);
    tree.add_child(root, group)?;

    let mut star = Graphics::new();
    star.begin_fill(Color::rgb(1.0, 0.8, 0.2))
        .begin_stroke(Color::WHITE)
        .set_stroke_width(3.0)
        .draw_poly_star(0.0, 0.0, 60.0, 5, 0.6, -90.0);
    let star = tree.create_shape(star);
    if let Some(display) = tree.display_mut(star) {
        display.shadow = Some(Shadow::new(Color::rgba(0.0, 0.0, 0.0, 0.6), 4.0, 4.0, 8.0));
        display.cursor = Some(CursorIcon::Pointer);
    }
    tree.add_child(group, star)?;

    let mut ring = Graphics::new();
    ring.begin_stroke(Color::rgb(0.3, 0.8, 1.0))
        .set_stroke_style(6.0, LineCap::Round, LineJoin::Round, 10.0, false)
        .set_stroke_dash(vec![12.0, 8.0], 0.0)
        .draw_circle(0.0, 0.0, 90.0);
    let ring = tree.create_shape(ring);
    tree.add_child(group, ring)?;

    // A blurred label-like block, cached so the filter applies
    let mut block = Graphics::new();
    block
        .begin_fill(Color::rgb(0.9, 0.3, 0.4))
        .draw_round_rect(0.0, 0.0, 120.0, 40.0, 10.0);
    let block = tree.create_shape(block);
    if let Some(display) = tree.display_mut(block) {
        display.x = 20.0;
        display.y = 230.0;
        display.filters = vec![Arc::new(BlurFilter::new(6.0, 6.0, 2))];
    }
    tree.add_child(root, block)?;
    stage.cache(block, 0.0, 0.0, 120.0, 40.0, 1.0)?;

    stage.tree_mut().on(star, EventType::Click, |tree, event| {
        if let Some(target) = event.target() {
            if let Some(display) = tree.display_mut(target) {
                display.rotation += 36.0;
            }
        }
        log::info!("Star clicked");
    })?;

    stage.update(Some(&Tick::new(16.0)));

    // Simulate a click on the star, then redraw.
    stage.handle_pointer_move(-1, 200.0, 150.0);
    stage.advance_mouse_over(50.0);
    log::info!("Cursor over the star: {}", stage.cursor());
    stage.handle_pointer_down(-1, 200.0, 150.0);
    stage.handle_pointer_up(-1, 200.0, 150.0, false);
    stage.update(Some(&Tick::new(16.0)));

    let path = std::env::temp_dir().join("tableau_scene.png");
    std::fs::write(&path, stage.to_png()?).map_err(|e| SceneError::Encode(e.to_string()))?;
    log::info!("Wrote {}", path.display());
    Ok(())
}
