//! Network abstraction used by the batch loop

use ndarray::{Array4, ArrayView4};
use crate::error::Result;

/// A trained network that predicts the noise component of a spectrogram.
///
/// `estimate_noise` receives a `[1, C, H, W]` batch and returns an array of
/// the same shape. Implementations must not change their parameters between
/// calls; the same input always yields the same estimate.
pub trait Denoiser {
    fn estimate_noise(&mut self, input: ArrayView4<'_, f32>) -> Result<Array4<f32>>;
}

impl<D: Denoiser + ?Sized> Denoiser for Box<D> {
    fn estimate_noise(&mut self, input: ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        (**self).estimate_noise(input)
    }
}
