//! ONNX Inference Module

pub mod model;
pub mod session;

#[cfg(test)]
pub(crate) mod test_graph;

pub use model::{ModelMetadata, Architecture, OnnxDenoiser};
pub use session::{OnnxEnvironment, OnnxSession, SessionConfig, TensorSignature};
