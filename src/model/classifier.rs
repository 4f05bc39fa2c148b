//! Binary image classifier around a single ONNX session.

use std::path::Path;

use image::DynamicImage;
use ort::session::Session;
use ort::value::{Tensor, ValueType};

use crate::error::{Error, Result};
use crate::image::{preprocess, InputTensor, DEFAULT_INPUT_SIZE, RGB_CHANNELS};

/// Decision threshold for scalar-output models: outputs strictly above this
/// select the second label, anything at or below it the first. A symmetric
/// binary split would use 0.5; every release so far has thresholded at 0.2,
/// so the value is kept as-is rather than silently corrected.
pub const SCALAR_THRESHOLD: f32 = 0.2;

/// Output convention of a loaded model, resolved from its declared output
/// shape at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// The model emits a single probability; [`SCALAR_THRESHOLD`] picks
    /// between exactly two labels.
    Scalar,
    /// The model emits one score per class; the greatest score wins, with
    /// the lower index taking exact ties.
    Scores,
}

/// Image classifier owning exactly one inference session for the process
/// lifetime.
#[derive(Debug)]
pub struct Classifier {
    session: Session,
    mode: OutputMode,
    input_size: u32,
}

impl Classifier {
    /// Load a classifier from an ONNX model file.
    ///
    /// The file's existence is checked up front so a missing artifact is
    /// reported before the inference engine is touched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelMissing`] if the file does not exist and
    /// [`Error::ModelLoad`] if the engine rejects it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(Error::ModelMissing {
                path: path.to_path_buf(),
            });
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("model")
            .to_string();

        let session = Session::builder()
            .map_err(|source| Error::ModelLoad {
                name: name.clone(),
                source,
            })?
            .commit_from_file(path)
            .map_err(|source| Error::ModelLoad {
                name: name.clone(),
                source,
            })?;

        Ok(Self::from_session(session, &name))
    }

    /// Load a classifier from an in-memory ONNX model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ModelLoad`] if the engine rejects the bytes.
    pub fn from_memory(bytes: &[u8]) -> Result<Self> {
        let name = "<memory>";

        let session = Session::builder()
            .map_err(|source| Error::ModelLoad {
                name: name.to_string(),
                source,
            })?
            .commit_from_memory(bytes)
            .map_err(|source| Error::ModelLoad {
                name: name.to_string(),
                source,
            })?;

        Ok(Self::from_session(session, name))
    }

    fn from_session(session: Session, name: &str) -> Self {
        let input_size = declared_input_size(&session).unwrap_or(DEFAULT_INPUT_SIZE);
        // A model whose declared output has one element per batch entry is a
        // single-probability head; anything else (including a dynamic shape)
        // is treated as a per-class score vector, the more general form.
        let mode = match declared_output_units(&session) {
            Some(1) => OutputMode::Scalar,
            _ => OutputMode::Scores,
        };

        tracing::info!("loaded {name}: input {input_size}x{input_size}, {mode:?} output");

        Self {
            session,
            mode,
            input_size,
        }
    }

    /// Square input size expected by the loaded model.
    #[must_use]
    pub const fn input_size(&self) -> u32 {
        self.input_size
    }

    /// Output convention of the loaded model.
    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Classify a decoded image, returning the selected label.
    ///
    /// Convenience wrapper that preprocesses to the model's input size and
    /// calls [`classify`](Self::classify).
    ///
    /// # Errors
    ///
    /// Returns an error if inference fails or the label list does not fit
    /// the model's output convention.
    pub fn classify_image(&mut self, img: &DynamicImage, labels: &[&str]) -> Result<String> {
        let tensor = preprocess(img, self.input_size);
        self.classify(&tensor, labels)
    }

    /// Classify a preprocessed input tensor, returning the selected label.
    ///
    /// The tensor must have shape `(1, N, N, 3)` for the model's input size
    /// `N`, with values in [0, 1] as produced by
    /// [`preprocess`](crate::image::preprocess).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] for a malformed tensor,
    /// [`Error::InvalidLabels`] for a label list that does not fit the
    /// output convention, and [`Error::Inference`] if the engine fails.
    pub fn classify(&mut self, input: &InputTensor, labels: &[&str]) -> Result<String> {
        check_input_shape(input.shape(), self.input_size)?;

        let value =
            Tensor::from_array(input.clone()).map_err(|source| Error::Inference { source })?;

        let outputs = self
            .session
            .run(ort::inputs![value])
            .map_err(|source| Error::Inference { source })?;

        let output = outputs.values().next().ok_or_else(|| Error::ShapeMismatch {
            expected: "at least one output".to_string(),
            actual: "no output".to_string(),
        })?;

        let scores = extract_scores(&output)?;

        tracing::debug!("raw model output: {scores:?}");

        Ok(select(self.mode, &scores, labels)?.to_string())
    }
}

/// Pick the winning label for the given scores under the given convention.
fn select<'a>(mode: OutputMode, scores: &[f32], labels: &[&'a str]) -> Result<&'a str> {
    match mode {
        OutputMode::Scalar => {
            if labels.len() != 2 {
                return Err(Error::InvalidLabels {
                    reason: format!(
                        "scalar-output models distinguish exactly 2 classes, got {} labels",
                        labels.len()
                    ),
                });
            }
            let probability = scores.first().copied().ok_or_else(|| Error::ShapeMismatch {
                expected: "1 output value".to_string(),
                actual: "0 output values".to_string(),
            })?;
            Ok(labels[usize::from(probability > SCALAR_THRESHOLD)])
        }
        OutputMode::Scores => {
            if labels.is_empty() || labels.len() != scores.len() {
                return Err(Error::InvalidLabels {
                    reason: format!(
                        "expected one label per class score ({}), got {}",
                        scores.len(),
                        labels.len()
                    ),
                });
            }
            Ok(labels[argmax(scores)])
        }
    }
}

/// Index of the strictly greatest score; the scan starts at 0 and only
/// replaces on strict inequality, so the lower index wins exact ties.
fn argmax(scores: &[f32]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

fn check_input_shape(shape: &[usize], size: u32) -> Result<()> {
    let side = size as usize;
    if shape != [1, side, side, RGB_CHANNELS].as_slice() {
        return Err(Error::ShapeMismatch {
            expected: format!("[1, {side}, {side}, {RGB_CHANNELS}]"),
            actual: format!("{shape:?}"),
        });
    }
    Ok(())
}

/// Flatten the first session output into a score vector, regardless of
/// whether the model declares it as `[1, k]`, `[k]`, or a bare scalar.
fn extract_scores(value: &ort::value::ValueRef<'_>) -> Result<Vec<f32>> {
    let (_, data) = value
        .try_extract_tensor::<f32>()
        .map_err(|source| Error::Inference { source })?;

    Ok(data.to_vec())
}

/// Square input size from the model's declared input shape, if static.
/// Expects NHWC `[batch, height, width, channels]`.
fn declared_input_size(session: &Session) -> Option<u32> {
    let input = session.inputs.first()?;
    let ValueType::Tensor { shape, .. } = &input.input_type else {
        return None;
    };
    let dims: Vec<i64> = shape.iter().copied().collect();
    if dims.len() == 4 && dims[1] > 0 && dims[1] == dims[2] {
        u32::try_from(dims[1]).ok()
    } else {
        None
    }
}

/// Number of output elements per batch entry from the model's declared
/// output shape, or `None` if any non-batch dimension is dynamic.
fn declared_output_units(session: &Session) -> Option<usize> {
    let output = session.outputs.first()?;
    let ValueType::Tensor { shape, .. } = &output.output_type else {
        return None;
    };
    let dims: Vec<i64> = shape.iter().copied().collect();
    if dims.iter().skip(1).any(|&d| d < 1) {
        return None;
    }
    usize::try_from(dims.iter().skip(1).product::<i64>()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LABELS: [&str; 2] = ["Cat", "Dog"];

    #[test]
    fn test_scalar_below_threshold() {
        let label = select(OutputMode::Scalar, &[0.15], &LABELS).unwrap();
        assert_eq!(label, "Cat");
    }

    #[test]
    fn test_scalar_above_threshold() {
        let label = select(OutputMode::Scalar, &[0.25], &LABELS).unwrap();
        assert_eq!(label, "Dog");
    }

    #[test]
    fn test_scalar_boundary_is_first_label() {
        // The threshold is non-strict on the low side: exactly 0.2 stays Cat.
        let label = select(OutputMode::Scalar, &[0.2], &LABELS).unwrap();
        assert_eq!(label, "Cat");
    }

    #[test]
    fn test_scalar_rejects_wrong_label_count() {
        let err = select(OutputMode::Scalar, &[0.9], &["Cat"]).unwrap_err();
        assert!(matches!(err, Error::InvalidLabels { .. }));
    }

    #[test]
    fn test_scalar_rejects_empty_output() {
        let err = select(OutputMode::Scalar, &[], &LABELS).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_scores_argmax() {
        assert_eq!(
            select(OutputMode::Scores, &[0.7, 0.3], &LABELS).unwrap(),
            "Cat"
        );
        assert_eq!(
            select(OutputMode::Scores, &[0.3, 0.7], &LABELS).unwrap(),
            "Dog"
        );
    }

    #[test]
    fn test_scores_tie_takes_lower_index() {
        let label = select(OutputMode::Scores, &[0.5, 0.5], &LABELS).unwrap();
        assert_eq!(label, "Cat");
    }

    #[test]
    fn test_scores_rejects_label_count_mismatch() {
        let err = select(OutputMode::Scores, &[0.2, 0.3, 0.5], &LABELS).unwrap_err();
        assert!(matches!(err, Error::InvalidLabels { .. }));
    }

    #[test]
    fn test_argmax_first_of_many() {
        assert_eq!(argmax(&[0.9, 0.1, 0.9]), 0);
        assert_eq!(argmax(&[0.1, 0.2, 0.9]), 2);
        assert_eq!(argmax(&[0.5]), 0);
    }

    #[test]
    fn test_check_input_shape() {
        assert!(check_input_shape(&[1, 224, 224, 3], 224).is_ok());

        let err = check_input_shape(&[1, 128, 128, 3], 224).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));

        let err = check_input_shape(&[224, 224, 3], 224).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_missing_model_file() {
        let err = Classifier::from_file("definitely/not/here.onnx").unwrap_err();
        assert!(matches!(err, Error::ModelMissing { .. }));
    }
}
