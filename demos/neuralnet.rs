//! A node cloud with pulses travelling along its edges, rendered additively.

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::NeuralNet)
        .with_title("Vitrine: Neural Net")
        .run()?;
    Ok(())
}
