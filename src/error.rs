//! Error Types

use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum SpecCleanError {
    /// Weights file missing, unreadable, or incompatible with the configured network
    #[error("Load error: {message}")]
    Load { message: String },
    /// Input file could not be decoded into a spectrogram
    #[error("Decode error: {message}")]
    Decode { message: String },
    #[error("Config error: {message}")]
    Config { message: String },
    #[error("Inference error: {message}")]
    Inference { message: String },
    #[error("IO error: {message}")]
    Io { message: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SpecCleanError {
    pub fn load<S: Into<String>>(msg: S) -> Self {
        Self::Load { message: msg.into() }
    }

    pub fn decode<S: Into<String>>(msg: S) -> Self {
        Self::Decode { message: msg.into() }
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config { message: msg.into() }
    }

    pub fn inference<S: Into<String>>(msg: S) -> Self {
        Self::Inference { message: msg.into() }
    }

    pub fn io<S: Into<String>>(msg: S) -> Self {
        Self::Io { message: msg.into() }
    }
}

pub type Result<T> = std::result::Result<T, SpecCleanError>;

impl From<std::io::Error> for SpecCleanError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<onnxruntime::OrtError> for SpecCleanError {
    fn from(err: onnxruntime::OrtError) -> Self {
        Self::inference(format!("ORT: {}", err))
    }
}

impl From<ndarray_npy::WriteNpyError> for SpecCleanError {
    fn from(err: ndarray_npy::WriteNpyError) -> Self {
        Self::io(format!("Failed to write npy: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = SpecCleanError::load("missing weights");
        assert_eq!(e.to_string(), "Load error: missing weights");
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let e: SpecCleanError = io.into();
        assert!(matches!(e, SpecCleanError::Io { .. }));
        assert!(e.to_string().contains("denied"));
    }

    #[test]
    fn test_constructors_pick_variant() {
        assert!(matches!(SpecCleanError::decode("x"), SpecCleanError::Decode { .. }));
        assert!(matches!(SpecCleanError::config("x"), SpecCleanError::Config { .. }));
        assert!(matches!(SpecCleanError::inference("x"), SpecCleanError::Inference { .. }));
        assert_eq!(SpecCleanError::io("disk full").to_string(), "IO error: disk full");
    }
}
