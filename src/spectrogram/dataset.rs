//! Spectrogram dataset enumeration

use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use crate::error::{SpecCleanError, Result};
use super::Spectrogram;

/// One decoded input file
#[derive(Debug, Clone)]
pub struct Sample {
    pub index: usize,
    pub path: PathBuf,
    /// Location of the file below the dataset root
    pub relative_path: PathBuf,
    pub spectrogram: Spectrogram,
}

/// All files with a given extension below a root directory, in
/// lexicographic path order. Files are decoded on access.
#[derive(Debug, Clone)]
pub struct SpectrogramDataset {
    root: PathBuf,
    extension: String,
    channels: usize,
    files: Vec<PathBuf>,
}

impl SpectrogramDataset {
    pub fn new<P: AsRef<Path>>(root: P, extension: &str, channels: usize) -> Result<Self> {
        let root = root.as_ref();
        let extension = extension.trim_start_matches('.').to_string();

        if !root.is_dir() {
            return Err(SpecCleanError::config(format!(
                "Source directory does not exist: {}", root.display()
            )));
        }

        let mut files = Vec::new();
        // Symlinked files and directories are enumerated like regular ones
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| SpecCleanError::io(format!(
                "Failed to scan {}: {}", root.display(), e
            )))?;

            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == extension.as_str())
            {
                files.push(entry.into_path());
            }
        }

        log::info!("Found {} .{} file(s) in {}", files.len(), extension, root.display());

        Ok(Self {
            root: root.to_path_buf(),
            extension,
            channels,
            files,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Path of `path` below the dataset root
    pub fn relative_path<'a>(&self, path: &'a Path) -> Result<&'a Path> {
        path.strip_prefix(&self.root).map_err(|_| SpecCleanError::config(format!(
            "{} is not inside {}", path.display(), self.root.display()
        )))
    }

    /// Decode the file at `index`
    pub fn get(&self, index: usize) -> Result<Sample> {
        let path = self.files.get(index).ok_or_else(|| SpecCleanError::config(format!(
            "Sample index {} out of range ({} files)", index, self.files.len()
        )))?;

        let relative_path = self.relative_path(path)?.to_path_buf();
        let spectrogram = Spectrogram::load(path, self.channels)?;
        log::trace!(
            "Decoded {} as {} {:?}",
            path.display(), spectrogram.precision().name(), spectrogram.original_shape()
        );

        Ok(Sample {
            index,
            path: path.clone(),
            relative_path,
            spectrogram,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Result<Sample>> + '_ {
        (0..self.files.len()).map(move |index| self.get(index))
    }
}
