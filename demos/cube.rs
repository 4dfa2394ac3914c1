//! A lattice of tumbling cubes with per-instance phase and tint. Runs with
//! vsync off to make an easy frame-rate smoke test.

use vitrine::{App, EngineSettings, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::CubeField)
        .with_title("Vitrine: Cube Field")
        .with_settings(EngineSettings {
            vsync: false,
            ..Default::default()
        })
        .run()?;
    Ok(())
}
