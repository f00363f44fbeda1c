//! Configuration management for batch spectrogram processing

use crate::error::{SpecCleanError, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub paths: PathsConfig,
    pub detection: DetectionConfig,
    pub processing: ProcessingConfig,
}

/// Network hyperparameters and weights location. The hyperparameters must
/// agree with the ones the weights were trained with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub growth_rate: usize,
    pub kernel_size: usize,
    pub num_blocks: usize,
    pub num_channels: usize,
    pub num_features: usize,
    pub num_layers: usize,
    pub weights: PathBuf,
    pub inference_threads: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub denoised_subdir: String,
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Absolute tolerance around zero for every element of the noise estimate
    pub threshold: f32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub verbose: bool,
}

pub const DEFAULT_SOURCE_DIR: &str = "/dataset";
pub const DEFAULT_TARGET_DIR: &str = "/results";
pub const RESULTS_FILE_NAME: &str = "results.csv";

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            paths: PathsConfig::default(),
            detection: DetectionConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            growth_rate: 24,
            kernel_size: 3,
            num_blocks: 9,
            num_channels: 1,
            num_features: 16,
            num_layers: 6,
            weights: PathBuf::from("./weights/audio_denoising.onnx"),
            inference_threads: num_cpus::get().clamp(1, 4),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            target_dir: PathBuf::from(DEFAULT_TARGET_DIR),
            denoised_subdir: "denoised".to_string(),
            extension: "npy".to_string(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self { threshold: 5e-3 }
    }
}

impl Config {
    /// Get weights path (convenience method)
    pub fn weights_path(&self) -> &Path {
        &self.model.weights
    }

    pub fn source_dir(&self) -> &Path {
        &self.paths.source_dir
    }

    pub fn target_dir(&self) -> &Path {
        &self.paths.target_dir
    }

    /// Root under which denoised arrays mirror the source tree
    pub fn denoised_dir(&self) -> PathBuf {
        self.paths.target_dir.join(&self.paths.denoised_subdir)
    }

    pub fn results_path(&self) -> PathBuf {
        self.paths.target_dir.join(RESULTS_FILE_NAME)
    }

    /// Extension filter without a leading dot
    pub fn extension(&self) -> &str {
        self.paths.extension.trim_start_matches('.')
    }

    pub fn threshold(&self) -> f32 {
        self.detection.threshold
    }

    pub fn inference_threads(&self) -> usize {
        self.model.inference_threads
    }

    pub fn verbose(&self) -> bool {
        self.processing.verbose
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "specclean", about = "Classify spectrograms as clean or noisy and denoise the noisy ones", version)]
pub struct Args {
    #[arg(long = "growth-rate", help = "Network growth rate")]
    pub growth_rate: Option<usize>,

    #[arg(long = "kernel-size", help = "Network convolution kernel size")]
    pub kernel_size: Option<usize>,

    #[arg(long = "num-blocks", help = "Number of residual dense blocks")]
    pub num_blocks: Option<usize>,

    #[arg(long = "num-channels", help = "Number of spectrogram channels")]
    pub num_channels: Option<usize>,

    #[arg(long = "num-features", help = "Number of feature maps")]
    pub num_features: Option<usize>,

    #[arg(long = "num-layers", help = "Number of layers per dense block")]
    pub num_layers: Option<usize>,

    #[arg(long = "source-dir", env = "SOURCE_DIR", help = "Directory scanned for input spectrograms")]
    pub source_dir: Option<PathBuf>,

    #[arg(long = "target-dir", env = "TARGET_DIR", help = "Directory receiving denoised arrays and results.csv")]
    pub target_dir: Option<PathBuf>,

    #[arg(long = "denoised-subdir", help = "Subdirectory of the target directory for denoised arrays")]
    pub denoised_subdir: Option<String>,

    #[arg(long = "extension", help = "Input file extension")]
    pub extension: Option<String>,

    #[arg(long = "weights", help = "Trained network file (ONNX)")]
    pub weights: Option<PathBuf>,

    #[arg(long = "threshold", help = "Absolute tolerance for the clean/noisy decision")]
    pub threshold: Option<f32>,

    #[arg(long = "inference-threads", help = "ONNX intra-op thread count")]
    pub inference_threads: Option<usize>,

    #[arg(short = 'c', long = "config", help = "Config file path (TOML format)")]
    pub config_file: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", help = "Enable verbose output mode")]
    pub verbose: bool,
}

impl Config {
    /// Create config from command line arguments and config file
    pub fn from_args(args: Args) -> Result<Self> {
        let mut config = if let Some(config_path) = &args.config_file {
            Self::from_file(config_path)?
        } else {
            Self::default()
        };

        // Command line arguments (and their environment fallbacks) override the file
        let model = &mut config.model;
        if let Some(v) = args.growth_rate {
            model.growth_rate = v;
        }
        if let Some(v) = args.kernel_size {
            model.kernel_size = v;
        }
        if let Some(v) = args.num_blocks {
            model.num_blocks = v;
        }
        if let Some(v) = args.num_channels {
            model.num_channels = v;
        }
        if let Some(v) = args.num_features {
            model.num_features = v;
        }
        if let Some(v) = args.num_layers {
            model.num_layers = v;
        }
        if let Some(v) = args.weights {
            model.weights = v;
        }
        if let Some(v) = args.inference_threads {
            model.inference_threads = v;
        }

        let paths = &mut config.paths;
        if let Some(v) = args.source_dir {
            paths.source_dir = v;
        }
        if let Some(v) = args.target_dir {
            paths.target_dir = v;
        }
        if let Some(v) = args.denoised_subdir {
            paths.denoised_subdir = v;
        }
        if let Some(v) = args.extension {
            paths.extension = v;
        }

        if let Some(v) = args.threshold {
            config.detection.threshold = v;
        }
        config.processing.verbose |= args.verbose;

        config.validate()?;

        Ok(config)
    }

    /// Load config from TOML config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SpecCleanError::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| SpecCleanError::config(format!("Failed to parse config file: {}", e)))
    }

    /// Validate configuration parameter validity
    pub fn validate(&self) -> Result<()> {
        let model = &self.model;
        let hyperparameters = [
            ("growth rate", model.growth_rate),
            ("kernel size", model.kernel_size),
            ("block count", model.num_blocks),
            ("channel count", model.num_channels),
            ("feature count", model.num_features),
            ("layer count", model.num_layers),
        ];
        for (name, value) in hyperparameters {
            if value == 0 {
                return Err(SpecCleanError::config(format!("Network {} must be greater than 0", name)));
            }
        }
        if model.kernel_size % 2 == 0 {
            return Err(SpecCleanError::config("Kernel size must be odd"));
        }

        if model.inference_threads == 0 {
            return Err(SpecCleanError::config("Inference thread count must be greater than 0"));
        }
        if model.inference_threads > num_cpus::get() * 2 {
            return Err(SpecCleanError::config("Inference thread count cannot exceed 2x logical CPU cores"));
        }

        if !self.detection.threshold.is_finite() || self.detection.threshold < 0.0 {
            return Err(SpecCleanError::config("Threshold must be a finite, non-negative number"));
        }

        if self.extension().is_empty() {
            return Err(SpecCleanError::config("Extension cannot be empty"));
        }

        // The subdirectory must stay inside the target directory
        let subdir = Path::new(&self.paths.denoised_subdir);
        if subdir.is_absolute() || subdir.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
            return Err(SpecCleanError::config(format!(
                "Denoised subdirectory must be a relative path inside the target directory: {}",
                self.paths.denoised_subdir
            )));
        }

        Ok(())
    }

    /// Save config to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| SpecCleanError::config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| SpecCleanError::config(format!("Failed to write config file: {}", e)))
    }

    /// Lines of the startup banner, one `key: value` pair each
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        vec![
            ("growth_rate", self.model.growth_rate.to_string()),
            ("kernel_size", self.model.kernel_size.to_string()),
            ("num_blocks", self.model.num_blocks.to_string()),
            ("num_channels", self.model.num_channels.to_string()),
            ("num_features", self.model.num_features.to_string()),
            ("num_layers", self.model.num_layers.to_string()),
            ("source_dir", self.paths.source_dir.display().to_string()),
            ("target_dir", self.paths.target_dir.display().to_string()),
            ("denoised_subdir", self.paths.denoised_subdir.clone()),
            ("extension", self.paths.extension.clone()),
            ("weights", self.model.weights.display().to_string()),
            ("threshold", self.detection.threshold.to_string()),
        ]
    }
}
