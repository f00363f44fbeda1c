//! ONNX model loader module
//!
//! Loads the trained denoising network and checks it against the configured
//! hyperparameters before any sample is processed.

use std::path::{Path, PathBuf};
use ndarray::{Array4, ArrayView4, Ix4};
use crate::config::ModelConfig;
use crate::error::{SpecCleanError, Result};
use crate::processing::Denoiser;
use super::{OnnxEnvironment, OnnxSession, SessionConfig, TensorSignature};

/// Model file metadata
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    pub model_path: PathBuf,
    /// Extracted from the file name
    pub model_name: String,
    pub model_size: u64,
}

impl ModelMetadata {
    pub fn from_path<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        let metadata = std::fs::metadata(model_path).map_err(|e| SpecCleanError::load(format!(
            "Cannot read weights file {}: {}", model_path.display(), e
        )))?;

        if !metadata.is_file() {
            return Err(SpecCleanError::load(format!(
                "Weights path is not a file: {}", model_path.display()
            )));
        }
        if metadata.len() == 0 {
            return Err(SpecCleanError::load(format!(
                "Weights file is empty: {}", model_path.display()
            )));
        }

        let model_name = model_path
            .file_stem()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        Ok(Self {
            model_path: model_path.to_path_buf(),
            model_name,
            model_size: metadata.len(),
        })
    }

    /// Get human-readable format of model file size
    pub fn size_human_readable(&self) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
        let mut size_f = self.model_size as f64;
        let mut unit_index = 0;

        while size_f >= 1024.0 && unit_index < UNITS.len() - 1 {
            size_f /= 1024.0;
            unit_index += 1;
        }

        format!("{:.2} {}", size_f, UNITS[unit_index])
    }
}

/// Architecture hyperparameters of the residual dense denoising network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Architecture {
    pub growth_rate: usize,
    pub kernel_size: usize,
    pub num_blocks: usize,
    pub num_channels: usize,
    pub num_features: usize,
    pub num_layers: usize,
}

impl From<&ModelConfig> for Architecture {
    fn from(config: &ModelConfig) -> Self {
        Self {
            growth_rate: config.growth_rate,
            kernel_size: config.kernel_size,
            num_blocks: config.num_blocks,
            num_channels: config.num_channels,
            num_features: config.num_features,
            num_layers: config.num_layers,
        }
    }
}

impl Architecture {
    /// Check that a graph signature can be driven with these hyperparameters:
    /// one float `[N, C, H, W]` input with `C == num_channels`, and one float
    /// output whose static dimensions agree with the input.
    pub fn check_signature(&self, inputs: &[TensorSignature], outputs: &[TensorSignature]) -> Result<()> {
        let (input, output) = match (inputs, outputs) {
            ([input], [output]) => (input, output),
            _ => {
                return Err(SpecCleanError::load(format!(
                    "Expected a network with 1 input and 1 output, found {} and {}",
                    inputs.len(), outputs.len()
                )));
            }
        };

        for signature in [input, output] {
            if !signature.is_float {
                return Err(SpecCleanError::load(format!(
                    "Tensor '{}' is not float32", signature.name
                )));
            }
            if signature.dims.len() != 4 {
                return Err(SpecCleanError::load(format!(
                    "Tensor '{}' has rank {}, expected [N, C, H, W]", signature.name, signature.dims.len()
                )));
            }
        }

        if let Some(channels) = input.dims[1] {
            if channels as usize != self.num_channels {
                return Err(SpecCleanError::load(format!(
                    "Network expects {} input channel(s) but num_channels is {}",
                    channels, self.num_channels
                )));
            }
        }

        for (axis, (i, o)) in input.dims.iter().zip(&output.dims).enumerate() {
            if let (Some(i), Some(o)) = (i, o) {
                if i != o {
                    return Err(SpecCleanError::load(format!(
                        "Output dimension {} is {} but input dimension is {}", axis, o, i
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Denoising network backed by an ONNX Runtime session
#[derive(Debug)]
pub struct OnnxDenoiser {
    metadata: ModelMetadata,
    architecture: Architecture,
    session: OnnxSession,
}

impl OnnxDenoiser {
    /// Load the network described by `config`. Any missing, unreadable or
    /// incompatible weights file yields a load error.
    pub fn load(config: &ModelConfig) -> Result<Self> {
        let metadata = ModelMetadata::from_path(&config.weights)?;
        let architecture = Architecture::from(config);

        let env = OnnxEnvironment::new()?;
        let session_config = SessionConfig {
            intra_op_num_threads: i16::try_from(config.inference_threads).unwrap_or(i16::MAX),
            ..Default::default()
        };
        let session = OnnxSession::new(&metadata.model_path, session_config, &env)?;
        architecture.check_signature(session.inputs(), session.outputs())?;

        log::info!(
            "Loaded network '{}' ({}), execution provider: CPU, threads: {}",
            metadata.model_name, metadata.size_human_readable(), config.inference_threads
        );

        Ok(Self { metadata, architecture, session })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }
}

impl Denoiser for OnnxDenoiser {
    fn estimate_noise(&mut self, input: ArrayView4<'_, f32>) -> Result<Array4<f32>> {
        let expected = input.shape().to_vec();
        let output = self.session.run(input)?
            .into_dimensionality::<Ix4>()
            .map_err(|e| SpecCleanError::inference(format!("Network output is not 4-D: {}", e)))?;

        if output.shape() != expected.as_slice() {
            return Err(SpecCleanError::inference(format!(
                "Network output shape {:?} differs from input shape {:?}",
                output.shape(), expected
            )));
        }
        Ok(output)
    }
}
