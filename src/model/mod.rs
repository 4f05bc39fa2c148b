//! Model loading and classification.

mod classifier;

pub use classifier::{Classifier, OutputMode, SCALAR_THRESHOLD};
