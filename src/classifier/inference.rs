//! Inference Engine - ONNX Runtime Integration
//!
//! The artifact is expected to take one input per record column, named
//! after the column (the layout tabular converters emit). Each input is fed
//! a `[1, 1]` tensor of the element type the model declares.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::tensor::TensorElementType;
use ort::value::{DynValue, Tensor, ValueType};
use parking_lot::Mutex;

use super::{Classifier, EngineStatus, InferenceError, InferenceStats};
use crate::models::{ColumnValue, DetectionRecord, Label};

/// Declared model input
#[derive(Debug, Clone)]
struct ModelInput {
    name: String,
    ty: TensorElementType,
}

pub struct OnnxClassifier {
    session: Mutex<Session>,
    inputs: Vec<ModelInput>,
    output_name: String,
    model_path: PathBuf,
    stats: InferenceStats,
}

impl OnnxClassifier {
    /// Load the ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.is_file() {
            return Err(InferenceError(format!(
                "Model not found: {}",
                model_path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError(format!("Failed to load model: {}", e)))?;

        let inputs = session
            .inputs
            .iter()
            .map(|input| match &input.input_type {
                ValueType::Tensor { ty, .. } => Ok(ModelInput {
                    name: input.name.clone(),
                    ty: *ty,
                }),
                other => Err(InferenceError(format!(
                    "Model input `{}` is not a tensor ({:?})",
                    input.name, other
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError("No output defined".to_string()))?;

        tracing::info!(
            "ONNX model loaded: {} inputs, label output `{}`",
            inputs.len(),
            output_name
        );

        Ok(Self {
            session: Mutex::new(session),
            inputs,
            output_name,
            model_path: model_path.to_path_buf(),
            stats: InferenceStats::default(),
        })
    }

    fn run(&self, record: &DetectionRecord) -> Result<Label, InferenceError> {
        let mut feeds: Vec<(String, DynValue)> = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let value = record.column(&input.name).ok_or_else(|| {
                InferenceError(format!(
                    "Model input `{}` has no matching record column",
                    input.name
                ))
            })?;
            feeds.push((input.name.clone(), input_tensor(input, value)?));
        }

        let mut session = self.session.lock();
        let outputs = session
            .run(feeds)
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| InferenceError("No output".to_string()))?;

        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            let first = data
                .first()
                .ok_or_else(|| InferenceError("Empty prediction".to_string()))?;
            return Ok(Label::from_prediction(*first));
        }

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Extract error: {}", e)))?;
        let first = data
            .first()
            .ok_or_else(|| InferenceError("Empty prediction".to_string()))?;
        Ok(Label::from_prediction(i64::from(*first != 0.0)))
    }
}

/// Build the `[1, 1]` tensor for one input from one record cell
fn input_tensor(input: &ModelInput, value: ColumnValue<'_>) -> Result<DynValue, InferenceError> {
    let tensor_err = |e: ort::Error| InferenceError(format!("Tensor error for `{}`: {}", input.name, e));

    let tensor = match (input.ty, value) {
        (TensorElementType::String, value) => {
            let text = match value {
                ColumnValue::Text(s) => s.to_string(),
                ColumnValue::Int(i) => i.to_string(),
                ColumnValue::Float(f) => f.to_string(),
            };
            Tensor::from_string_array(&Array2::from_elem((1, 1), text))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (TensorElementType::Int64, ColumnValue::Int(i)) => {
            Tensor::from_array(Array2::from_elem((1, 1), i))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (TensorElementType::Int32, ColumnValue::Int(i)) => {
            let narrowed = i32::try_from(i).map_err(|_| {
                InferenceError(format!("Value {} for `{}` does not fit in int32", i, input.name))
            })?;
            Tensor::from_array(Array2::from_elem((1, 1), narrowed))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (TensorElementType::Float32, ColumnValue::Int(i)) => {
            Tensor::from_array(Array2::from_elem((1, 1), i as f32))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (TensorElementType::Float32, ColumnValue::Float(f)) => {
            Tensor::from_array(Array2::from_elem((1, 1), f as f32))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (TensorElementType::Float64, ColumnValue::Int(i)) => {
            Tensor::from_array(Array2::from_elem((1, 1), i as f64))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (TensorElementType::Float64, ColumnValue::Float(f)) => {
            Tensor::from_array(Array2::from_elem((1, 1), f))
                .map_err(tensor_err)?
                .into_dyn()
        }
        (ty, value) => {
            return Err(InferenceError(format!(
                "Model input `{}` expects {:?}, cannot feed {:?}",
                input.name, ty, value
            )))
        }
    };

    Ok(tensor)
}

impl Classifier for OnnxClassifier {
    fn predict(&self, record: &DetectionRecord) -> Result<Label, InferenceError> {
        let start_time = Instant::now();
        let result = self.run(record);
        self.stats.record(start_time.elapsed());
        result
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            model_loaded: true,
            model_name: self.model_path.display().to_string(),
            inputs: self.inputs.iter().map(|i| i.name.clone()).collect(),
            inference_device: "ONNX Runtime (CPU)".to_string(),
            avg_latency_ms: self.stats.avg_latency_ms(),
            inference_count: self.stats.count(),
        }
    }
}
