//! Full gallery: starts on the flocking experience (or the one named on
//! the command line) and switches between all eight with the number keys.
//!
//! ```sh
//! cargo run --example gallery            # start on flocking
//! cargo run --example gallery riemann    # start elsewhere
//! ```

use std::str::FromStr;

use vitrine::{App, ExperienceKind};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let kind = std::env::args()
        .nth(1)
        .map(|arg| ExperienceKind::from_str(&arg))
        .transpose()?
        .unwrap_or(ExperienceKind::Flocking);

    App::new(kind).with_title("Vitrine Gallery").run()?;
    Ok(())
}
