//! Spectrogram Processing Pipeline

pub mod classifier;
pub mod denoiser;
pub mod pipeline;
pub mod progress;
pub mod results;

pub use classifier::{Classification, NoiseStats};
pub use denoiser::Denoiser;
pub use pipeline::{BatchOutcome, BatchProcessor, FileOutcome};
pub use progress::{BarProgress, NoProgress, ProgressReporter};
pub use results::{ResultRecord, ResultTable};
