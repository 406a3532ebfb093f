//! Icon tooling for the Caffeine tray app.
//!
//! Renders the tray/app artwork at every icon size, packs the bitmaps into a
//! multi-resolution `.ico` container and reads generated containers back to
//! check their directory.

pub mod batch;
pub mod bitmap;
pub mod config;
pub mod container;
pub mod error;
pub mod raster;

pub use bitmap::Bitmap;
pub use config::Config;
pub use error::Error;

pub const APP_NAME: &str = "Caffeine Icons";

/// Install the console logger shared by both binaries.
pub fn init_logger(level: log::LevelFilter) -> Result<(), Error> {
  ftail::Ftail::new()
    .console(level)
    .init()
    .map_err(|err| Error::Logger(format!("{:?}", err)))
}
