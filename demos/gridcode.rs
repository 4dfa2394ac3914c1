//! Entorhinal grid-cell firing fields tracking the cursor. Press `k` to
//! cycle the module spacing.

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    App::new(ExperienceKind::GridCode)
        .with_title("Vitrine: Grid Code")
        .run()?;
    Ok(())
}
