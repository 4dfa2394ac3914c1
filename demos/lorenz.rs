//! Eight thousand particles falling through the Lorenz attractor.

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::Lorenz)
        .with_title("Vitrine: Lorenz Attractor")
        .run()?;
    Ok(())
}
