//! Complex function graphs as displaced surfaces, colored by argument.
//! Press `s` to cycle z^2 / 1/z / sqrt(z) / sin(z).

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::Riemann)
        .with_title("Vitrine: Riemann Surfaces")
        .run()?;
    Ok(())
}
