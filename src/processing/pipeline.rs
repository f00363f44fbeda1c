//! Batch classification and denoising pipeline

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use crate::config::Config;
use crate::error::{SpecCleanError, Result};
use crate::onnx::OnnxDenoiser;
use crate::spectrogram::{Sample, SpectrogramDataset};
use super::{Classification, Denoiser, NoiseStats, ProgressReporter, ResultRecord, ResultTable};

/// Result of processing one sample
#[derive(Debug, Clone)]
pub struct FileOutcome {
    pub index: usize,
    pub relative_path: PathBuf,
    pub record: ResultRecord,
    pub stats: NoiseStats,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub table: ResultTable,
    pub results_path: PathBuf,
    pub processing_time: Duration,
}

impl BatchOutcome {
    pub fn clean_count(&self) -> usize {
        self.table.count(Classification::Clean)
    }

    pub fn noisy_count(&self) -> usize {
        self.table.count(Classification::Noisy)
    }
}

/// Runs every spectrogram of the source directory through a [`Denoiser`],
/// one file at a time.
#[derive(Debug)]
pub struct BatchProcessor<D> {
    config: Config,
    denoiser: D,
}

impl BatchProcessor<OnnxDenoiser> {
    /// Load the configured ONNX network
    pub fn from_config(config: Config) -> Result<Self> {
        let denoiser = OnnxDenoiser::load(&config.model)?;
        Ok(Self::new(config, denoiser))
    }
}

impl<D: Denoiser> BatchProcessor<D> {
    pub fn new(config: Config, denoiser: D) -> Self {
        Self { config, denoiser }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn denoiser(&self) -> &D {
        &self.denoiser
    }

    /// Process all files and write `results.csv`. The first failure aborts
    /// the run; denoised files written before it stay on disk.
    pub fn run(&mut self, progress: &mut dyn ProgressReporter) -> Result<BatchOutcome> {
        let start = Instant::now();

        let dataset = SpectrogramDataset::new(
            self.config.source_dir(),
            self.config.extension(),
            self.config.model.num_channels,
        )?;

        progress.start(dataset.len());

        let mut table = ResultTable::new();
        for sample in dataset.iter() {
            let outcome = self.process_sample(&sample?)?;
            progress.file_done(&outcome);
            table.push(outcome.record);
        }

        let results_path = self.config.results_path();
        table.write_csv(&results_path)?;
        progress.finish(&table);

        let outcome = BatchOutcome {
            table,
            results_path,
            processing_time: start.elapsed(),
        };
        log::info!(
            "Processed {} file(s) in {:.2}s: {} clean, {} noisy",
            outcome.table.len(),
            outcome.processing_time.as_secs_f64(),
            outcome.clean_count(),
            outcome.noisy_count()
        );
        Ok(outcome)
    }

    /// Classify one sample and, when noisy, write `input - noise` to its
    /// mirrored location under the denoised directory
    pub fn process_sample(&mut self, sample: &Sample) -> Result<FileOutcome> {
        let input = sample.spectrogram.network_input();
        let noise = self.denoiser.estimate_noise(input.view())?;

        if noise.shape() != input.shape() {
            return Err(SpecCleanError::inference(format!(
                "Noise estimate shape {:?} differs from input shape {:?} for {}",
                noise.shape(), input.shape(), sample.path.display()
            )));
        }

        let stats = NoiseStats::measure(&noise);
        let classification = Classification::from_noise(&noise, self.config.threshold());
        log::debug!(
            "{}: {} (mse={:.6e}, max_abs={:.6e})",
            sample.path.display(), classification, stats.mse, stats.max_abs
        );

        let record = match classification {
            Classification::Clean => ResultRecord::clean(&sample.path),
            Classification::Noisy => {
                let denoised_path = self.denoised_path(&sample.relative_path);
                if let Some(parent) = denoised_path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| SpecCleanError::io(format!(
                        "Cannot create {}: {}", parent.display(), e
                    )))?;
                }

                sample.spectrogram.denoised(&noise)?.save(&denoised_path)?;
                ResultRecord::noisy(&sample.path, &denoised_path)
            }
        };

        Ok(FileOutcome {
            index: sample.index,
            relative_path: sample.relative_path.clone(),
            record,
            stats,
        })
    }

    /// `target_dir/denoised_subdir/<relative>`, with `.npy` appended when the
    /// input uses another extension
    pub fn denoised_path(&self, relative: &Path) -> PathBuf {
        let mut path = self.config.denoised_dir().join(relative);
        if path.extension().is_none_or(|ext| ext != "npy") {
            let mut name = path.file_name().unwrap_or_default().to_os_string();
            name.push(".npy");
            path.set_file_name(name);
        }
        path
    }
}
