use puppetry::{Category, EditorOpts, EditorSession, ObjectPatch, Point, Rect, ScreenGeometry};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let puppet_svg = include_str!("../tests/data/puppet.svg");
    let sword_svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="40"><rect x="3" width="2" height="40"/></svg>"#;

    let mut session = EditorSession::new(EditorOpts::default())?;
    let puppet = session.spawn(puppet_svg, Category::Puppet, Rect::new(100.0, 50.0, 200.0, 250.0))?;
    let sword = session.spawn(sword_svg, Category::Prop, Rect::new(116.0, 180.0, 124.0, 220.0))?;
    session.attach(&sword, &puppet, "left-forearm")?;

    // Swing the arm by dragging it, once per keyframe.
    for (frame, pointer) in [(0, Point::new(140.0, 95.0)), (12, Point::new(120.0, 115.0)), (24, Point::new(140.0, 95.0))] {
        session.seek(frame);
        if session.pointer_down(&puppet, "left-arm-shape", Point::new(140.0, 95.0)) {
            session.pointer_move(&puppet, pointer)?;
            session.pointer_up(&puppet);
        }
    }
    session.seek(24);
    session.update_object(&puppet, &ObjectPatch::position(160.0, 50.0))?;

    for f in [0u64, 6, 12, 18, 24] {
        session.seek(f);
        let origin = session
            .layout()
            .object_frame(&sword)
            .map(|m| m * Point::ORIGIN);
        println!(
            "frame {f}: overrides {} sword at {:?}",
            serde_json::to_string(session.overrides())?,
            origin
        );
    }

    println!("{}", session.snapshot().to_json()?);
    Ok(())
}
