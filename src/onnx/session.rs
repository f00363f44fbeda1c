//! ONNX Runtime bindings module
//!
//! Wraps an `onnxruntime` session that maps one f32 tensor to one f32 tensor.

use std::path::Path;
use ndarray::{Array4, ArrayD, ArrayView4, ArrayViewD};
use onnxruntime::{
    environment::Environment, session::Session, tensor::OrtOwnedTensor,
    GraphOptimizationLevel, LoggingLevel, TensorElementDataType,
};
use crate::error::{SpecCleanError, Result};

/// ONNX environment wrapper
pub struct OnnxEnvironment {
    env: &'static Environment,
}

impl std::fmt::Debug for OnnxEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEnvironment").finish()
    }
}

impl OnnxEnvironment {
    pub fn new() -> Result<Self> {
        let env = Environment::builder()
            .with_name("specclean")
            .with_log_level(LoggingLevel::Warning)
            .build()
            .map_err(|e| SpecCleanError::load(format!("Failed to create ONNX environment: {}", e)))?;

        // Sessions borrow the environment for their whole lifetime
        Ok(Self { env: Box::leak(Box::new(env)) })
    }
}

/// Name, element type and dimensions of a graph input or output.
/// `None` marks a dynamic dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorSignature {
    pub name: String,
    pub is_float: bool,
    pub dims: Vec<Option<u32>>,
}

/// Session configuration
#[derive(Debug)]
pub struct SessionConfig {
    pub optimization_level: GraphOptimizationLevel,
    pub intra_op_num_threads: i16,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            optimization_level: GraphOptimizationLevel::All,
            intra_op_num_threads: 4,
        }
    }
}

/// ONNX inference session
pub struct OnnxSession {
    session: Session<'static>,
    inputs: Vec<TensorSignature>,
    outputs: Vec<TensorSignature>,
}

impl std::fmt::Debug for OnnxSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSession")
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish()
    }
}

impl OnnxSession {
    /// Create new ONNX session
    pub fn new(model_path: &Path, config: SessionConfig, env: &OnnxEnvironment) -> Result<Self> {
        if !model_path.is_file() {
            return Err(SpecCleanError::load(format!(
                "Weights file does not exist: {}", model_path.display()
            )));
        }

        let session = env.env.new_session_builder()
            .and_then(|builder| builder.with_optimization_level(config.optimization_level))
            .and_then(|builder| builder.with_number_threads(config.intra_op_num_threads))
            .and_then(|builder| builder.with_model_from_file(model_path.to_path_buf()))
            .map_err(|e| SpecCleanError::load(format!(
                "Failed to load {}: {}", model_path.display(), e
            )))?;

        let inputs = session.inputs.iter()
            .map(|input| TensorSignature {
                name: input.name.clone(),
                is_float: matches!(input.input_type, TensorElementDataType::Float),
                dims: input.dimensions.clone(),
            })
            .collect();
        let outputs = session.outputs.iter()
            .map(|output| TensorSignature {
                name: output.name.clone(),
                is_float: matches!(output.output_type, TensorElementDataType::Float),
                dims: output.dimensions.clone(),
            })
            .collect();

        log::info!("ONNX model loaded successfully");
        log::debug!("Inputs: {:?}", inputs);
        log::debug!("Outputs: {:?}", outputs);

        Ok(Self { session, inputs, outputs })
    }

    pub fn inputs(&self) -> &[TensorSignature] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TensorSignature] {
        &self.outputs
    }

    /// Run the graph on a single `[N, C, H, W]` tensor and return its first output
    pub fn run(&mut self, input: ArrayView4<'_, f32>) -> Result<ArrayD<f32>> {
        let input: Array4<f32> = input.to_owned();
        log::trace!("Executing ONNX inference on shape {:?}", input.shape());

        let outputs: Vec<OrtOwnedTensor<f32, _>> = self.session.run(vec![input])
            .map_err(|e| SpecCleanError::inference(format!("ONNX inference failed: {}", e)))?;

        let first = outputs.first()
            .ok_or_else(|| SpecCleanError::inference("Network produced no output"))?;
        let view: &ArrayViewD<f32> = first;
        Ok(view.to_owned())
    }
}
