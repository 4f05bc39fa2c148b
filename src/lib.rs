//! # catsdogs
//!
//! On-device cat vs. dog image classification with a pre-trained ONNX model.
//!
//! The pipeline is deliberately small and synchronous: decode an image,
//! resize and normalize it into the model's input tensor, run one forward
//! pass, and map the output to a label. Model execution itself is delegated
//! to ONNX Runtime and treated as a black box.
//!
//! ## Example
//!
//! ```no_run
//! use catsdogs::{image::load_image, Classifier};
//!
//! # fn main() -> catsdogs::Result<()> {
//! let mut classifier = Classifier::from_file("cats_vs_dogs.onnx")?;
//!
//! let img = load_image("photo.jpg")?;
//! let label = classifier.classify_image(&img, &["Cat", "Dog"])?;
//! println!("{label}");
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod image;
pub mod model;

pub use error::{Error, Result};
pub use model::{Classifier, OutputMode};
