//! Hyperbolic tiling on the Poincare disk; the cursor drags the Mobius
//! anchor. Press `d` to toggle ordered dithering.

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::Poincare)
        .with_title("Vitrine: Poincare Disk")
        .run()?;
    Ok(())
}
