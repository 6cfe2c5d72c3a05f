// What you SEE now:
// • A window filled with a soft, posterised animated background.
// • --variant swarm: seven white blobs drifting around the centre.
// • --variant pulse: one breathing blob that throws out fading rings.
// • --variant noise: slowly evolving cloud bands.
// • Resize the window and the animation restarts at the new shape. ESC quits.

mod config;
mod draw;
mod driver;
mod error;
mod filter;
mod gamma;
mod headless;
mod motion;
mod noise;
mod pulse;
mod render;
mod surface;
mod swarm;
mod types;

use clap::Parser;
use config::{AppConfig, Cli};
use draw::Drawer;
use driver::Animator;
use error::Error;
use headless::Headless;
use log::{info, warn};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = Cli::parse().into_config()?;
    info!(
        "{:?} variant, {}x{}, seed {}",
        cfg.variant.kind(),
        cfg.width,
        cfg.height,
        cfg.seed
    );

    if cfg.headless { run_headless(cfg) } else { run_windowed(cfg) }
}

/* --- Window host ---
   Visual: the background fills the window until it is closed. */
fn run_windowed(cfg: AppConfig) -> Result<(), Error> {
    let mut drawer = match Drawer::new("Backdrop", cfg.width, cfg.height, cfg.fps) {
        Ok(d) => d,
        Err(e) => {
            // No drawing surface: nothing to animate, but not a crash either.
            warn!("{e}; animation disabled");
            return Ok(());
        }
    };

    let mut animator = Animator::new(cfg.variant, cfg.seed);
    if let Err(e) = animator.run(&mut drawer) {
        warn!("{e}; animation stopped");
    }
    Ok(())
}

/* --- Headless host ---
   Visual: none; optionally the final frame lands in a PNG. */
fn run_headless(cfg: AppConfig) -> Result<(), Error> {
    let mut host = Headless::new(cfg.width, cfg.height, cfg.frames);
    let mut animator = Animator::new(cfg.variant, cfg.seed);
    let frames = animator.run(&mut host)?;
    info!("rendered {frames} frames headless");

    if let Some(path) = &cfg.snapshot {
        if !host.save_snapshot(path)? {
            warn!("no frame was rendered; {} not written", path.display());
        }
    }
    Ok(())
}
