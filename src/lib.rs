//! specclean - Batch Spectrogram Noise Classifier
//!
//! Runs every spectrogram of a dataset through a trained denoising network,
//! labels each file clean or noisy, and writes denoised arrays for the noisy
//! ones together with a `results.csv` summary.

pub mod config;
pub mod error;
pub mod onnx;
pub mod processing;
pub mod spectrogram;

pub use config::{Config, Args};
pub use error::{SpecCleanError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Info by default, debug when verbose. `RUST_LOG` takes precedence.
pub fn init_logging(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init()
        .ok();
}

pub fn get_library_info() -> LibraryInfo {
    LibraryInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub name: String,
    pub version: String,
    pub description: String,
}

impl std::fmt::Display for LibraryInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} v{} - {}", self.name, self.version, self.description)
    }
}
