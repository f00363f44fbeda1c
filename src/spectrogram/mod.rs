//! Spectrogram Module
//!
//! Reading and writing single-channel spectrogram arrays and enumerating
//! them from a source directory.

pub mod dataset;
pub mod npy;

pub use dataset::{Sample, SpectrogramDataset};
pub use npy::{Precision, Spectrogram};
