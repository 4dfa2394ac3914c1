//! A thousand boids steered by a compute shader. Drag to orbit, wheel to
//! zoom.

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::Flocking)
        .with_title("Vitrine: Flocking")
        .run()?;
    Ok(())
}
