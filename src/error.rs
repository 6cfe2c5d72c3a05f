// Error type for the background renderer.
// Every variant states *where* things went wrong. None of these are fatal to
// anything but the animation itself.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Creating the window failed (no drawing surface available).
    #[error("window init error: {0}")]
    WindowInit(String),
    /// Pushing a frame to the window failed.
    #[error("window update error: {0}")]
    WindowUpdate(String),
    /// Writing the headless PNG snapshot failed.
    #[error("snapshot error: {0}")]
    Snapshot(#[from] image::ImageError),
    /// Command line values that cannot drive an animation.
    #[error("config error: {0}")]
    Config(String),
}
