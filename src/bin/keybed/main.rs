//! keybed - virtual piano for the terminal
//!
//! Play with the mouse or the computer keyboard; hold space for sustain.
//! Run with: cargo run -- --keys 24 --start-note 60 --waveform sine

mod app;
mod config;
mod ui;

use clap::Parser;

use app::App;
use config::Settings;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let settings = Settings::parse().clamped();
    App::new(settings).run()
}
