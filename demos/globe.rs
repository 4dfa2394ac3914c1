//! A slowly spinning planet with procedurally generated surface textures.
//! Press `g` to cycle terra / topographic / graticule styles.

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::Globe)
        .with_title("Vitrine: Globe")
        .run()?;
    Ok(())
}
