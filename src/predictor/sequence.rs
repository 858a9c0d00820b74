use anyhow::{Context, Result};
use ndarray::Array3;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use std::path::Path;

use crate::error::AgentError;
use crate::feature::window::SequenceWindow;

/// Number of regime classes emitted by the sequence model
/// (bull / bear / neutral).
pub const REGIME_CLASSES: usize = 3;

/// ONNX sequence classifier over a windowed feature history. The model takes
/// a `float32[1, seq_len, num_features]` tensor and emits one logit per
/// regime class.
pub struct SequenceModel {
    session: Session,
    output_name: String,
}

impl SequenceModel {
    pub fn from_file(path: &Path) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .commit_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .context("sequence model declares no outputs")?;
        Ok(Self {
            session,
            output_name,
        })
    }

    /// Softmax-normalized class probabilities for one window.
    pub fn predict_class_probs(&mut self, window: &SequenceWindow) -> Result<Vec<f64>> {
        let seq_len = window.seq_len();
        let num_features = window.num_features();

        let mut input = Array3::<f32>::zeros((1, seq_len, num_features));
        for (t, row) in window.rows().iter().enumerate() {
            for (f, value) in row.iter().enumerate() {
                input[[0, t, f]] = if value.is_finite() { *value as f32 } else { 0.0 };
            }
        }

        let input_tensor = Value::from_array(input)
            .map_err(|e| AgentError::Inference(format!("input tensor build failed: {e}")))?;
        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .map_err(|e| AgentError::Inference(format!("session run failed: {e}")))?;
        let output = outputs.get(self.output_name.as_str()).ok_or_else(|| {
            AgentError::Inference(format!("output {:?} missing from results", self.output_name))
        })?;
        let (_, logits) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AgentError::Inference(format!("output tensor extract failed: {e}")))?;

        if logits.len() < REGIME_CLASSES {
            return Err(AgentError::Inference(format!(
                "expected {} regime logits, got {}",
                REGIME_CLASSES,
                logits.len()
            ))
            .into());
        }

        Ok(softmax(&logits[..REGIME_CLASSES]))
    }
}

fn softmax(scores: &[f32]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let exp: Vec<f64> = scores.iter().map(|s| ((*s as f64) - max).exp()).collect();
    let denom: f64 = exp.iter().sum();
    exp.iter().map(|e| e / denom).collect()
}
